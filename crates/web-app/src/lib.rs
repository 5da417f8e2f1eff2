#![warn(clippy::pedantic)]

use grippo_domain::Locale;

pub mod controller;
pub mod log;

pub use controller::{Controller, EditorState, Origin};

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Settings {
    pub locale: Locale,
    pub view_mode: ViewMode,
}

/// The editor shows the entity either as a structured form or as raw JSON;
/// both views edit the same canonical entity.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Form,
    Json,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            locale: Locale::Ua,
            view_mode: ViewMode::Json,
        };

        let raw = serde_json::to_value(settings).unwrap();

        assert_eq!(raw, json!({"locale": "ua", "view_mode": "json"}));
        assert_eq!(
            serde_json::from_value::<Settings>(raw).unwrap(),
            settings
        );
    }
}
