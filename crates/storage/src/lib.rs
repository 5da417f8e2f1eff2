#![warn(clippy::pedantic)]

use grippo_domain::Session;
use grippo_web_app::Settings;

pub mod local_storage;
pub mod rest;

/// Client-side persistence of UI state. Local storage is synchronous in the
/// browser, so unlike the network repositories this seam is not async.
pub trait UI {
    fn read_settings(&self) -> Result<Settings, String>;
    fn write_settings(&self, settings: &Settings) -> Result<(), String>;

    fn read_session(&self) -> Result<Session, String>;
    fn write_session(&self, session: &Session) -> Result<(), String>;
    fn delete_session(&self) -> Result<(), String>;

    fn read_edited_ids(&self) -> Result<Vec<String>, String>;
    fn write_edited_ids(&self, ids: &[String]) -> Result<(), String>;
}
