use gloo_storage::Storage as GlooStorage;
use grippo_domain::Session;
use grippo_web_app::{log, Settings};

pub struct UI;

const KEY_SETTINGS: &str = "settings";
const KEY_SESSION: &str = "session";
const KEY_EDITED_IDS: &str = "edited ids";

impl super::UI for UI {
    fn read_settings(&self) -> Result<Settings, String> {
        read_or(gloo_storage::LocalStorage::get(KEY_SETTINGS), Settings::default)
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), String> {
        gloo_storage::LocalStorage::set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }

    fn read_session(&self) -> Result<Session, String> {
        read_or(gloo_storage::LocalStorage::get(KEY_SESSION), Session::default)
    }

    fn write_session(&self, session: &Session) -> Result<(), String> {
        gloo_storage::LocalStorage::set(KEY_SESSION, session).map_err(|err| err.to_string())
    }

    fn delete_session(&self) -> Result<(), String> {
        gloo_storage::LocalStorage::delete(KEY_SESSION);
        Ok(())
    }

    // Edited markers only live for the browser tab's lifetime.
    fn read_edited_ids(&self) -> Result<Vec<String>, String> {
        read_or(gloo_storage::SessionStorage::get(KEY_EDITED_IDS), Vec::new)
    }

    fn write_edited_ids(&self, ids: &[String]) -> Result<(), String> {
        gloo_storage::SessionStorage::set(KEY_EDITED_IDS, ids).map_err(|err| err.to_string())
    }
}

fn read_or<T>(
    result: Result<T, gloo_storage::errors::StorageError>,
    default: impl FnOnce() -> T,
) -> Result<T, String> {
    match result {
        Ok(value) => Ok(value),
        Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => Ok(default()),
        Err(err) => Err(err.to_string()),
    }
}

pub struct Log;

const KEY_LOG: &str = "log";

impl log::Repository for Log {
    fn read_entries(&self) -> Result<std::collections::VecDeque<log::Entry>, log::Error> {
        match gloo_storage::LocalStorage::get(KEY_LOG) {
            Ok(entries) => Ok(entries),
            Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => {
                Ok(std::collections::VecDeque::new())
            }
            Err(err) => Err(log::Error::Unknown(err.to_string())),
        }
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(100);
        gloo_storage::LocalStorage::set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
