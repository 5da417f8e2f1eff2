use std::{collections::BTreeMap, fmt, slice::Iter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locale-iteration order. Localized fetches and merges always process
/// locales in this order, independent of response-arrival order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ua,
    Ru,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::DEFAULT
    }
}

impl Locale {
    pub const DEFAULT: Locale = Locale::En;

    pub fn iter() -> Iter<'static, Locale> {
        static LOCALES: [Locale; 3] = [Locale::En, Locale::Ua, Locale::Ru];
        LOCALES.iter()
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ua => "ua",
            Locale::Ru => "ru",
        }
    }
}

impl TryFrom<&str> for Locale {
    type Error = LocaleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ua" => Ok(Locale::Ua),
            "ru" => Ok(Locale::Ru),
            _ => Err(LocaleError::Unsupported),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LocaleError {
    #[error("Unsupported locale")]
    Unsupported,
}

/// Fixed-locale string map. Every supported locale always has a slot; a
/// missing or uninterpretable input value leaves the slot empty, never absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TranslationMap(BTreeMap<Locale, String>);

impl TranslationMap {
    /// Builds a map from any JSON value. String values are copied verbatim,
    /// non-null scalars are coerced to their string representation, anything
    /// else yields an empty slot.
    #[must_use]
    pub fn ensure(value: &Value) -> Self {
        let mut map = Self::default();
        if let Some(object) = value.as_object() {
            for locale in Locale::iter() {
                match object.get(locale.code()) {
                    Some(Value::String(text)) => map.set(*locale, text.clone()),
                    Some(Value::Number(number)) => map.set(*locale, number.to_string()),
                    Some(Value::Bool(flag)) => map.set(*locale, flag.to_string()),
                    _ => {}
                }
            }
        }
        map
    }

    #[must_use]
    pub fn get(&self, locale: Locale) -> &str {
        self.0.get(&locale).map_or("", String::as_str)
    }

    pub fn set(&mut self, locale: Locale, value: String) {
        self.0.insert(locale, value);
    }

    #[must_use]
    pub fn is_blank(&self, locale: Locale) -> bool {
        self.get(locale).is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        Locale::iter().all(|locale| self.is_blank(*locale))
    }

    pub fn entries(&self) -> impl Iterator<Item = (Locale, &str)> {
        Locale::iter().map(|locale| (*locale, self.get(*locale)))
    }
}

impl Default for TranslationMap {
    fn default() -> Self {
        Self(
            Locale::iter()
                .map(|locale| (*locale, String::new()))
                .collect(),
        )
    }
}
