use serde_json::{json, Map, Value};

use crate::{Entity, TranslationMap};

/// Wire form of one translated field: `value` is omitted entirely when the
/// locale's text is blank, rather than sent as an empty string.
#[must_use]
pub fn localized_entries(map: &TranslationMap) -> Vec<Value> {
    map.entries()
        .map(|(locale, text)| {
            let value = text.trim();
            if value.is_empty() {
                json!({"language": locale.code()})
            } else {
                json!({"language": locale.code(), "value": value})
            }
        })
        .collect()
}

/// Derives the create/update request body from the live entity.
///
/// The translation maps are re-expanded into locale-tagged `name` and
/// `description` arrays; the entity's identity and timestamps stay
/// client-side, the server being authoritative for both.
#[must_use]
pub fn build_persistence_payload(entity: &Entity) -> Value {
    let mut payload = match serde_json::to_value(entity) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    payload.remove("id");
    payload.remove("createdAt");
    payload.remove("updatedAt");
    payload.remove("nameTranslations");
    payload.remove("descriptionTranslations");

    payload.insert(
        "name".to_string(),
        Value::Array(localized_entries(&entity.name_translations)),
    );
    payload.insert(
        "description".to_string(),
        Value::Array(localized_entries(&entity.description_translations)),
    );

    Value::Object(payload)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{normalize, Context, Locale, MuscleBundle, RequiredFlag};

    fn entity() -> Entity {
        let mut entity = Entity::template();
        entity.name_translations.set(Locale::En, "Bench Press".to_string());
        entity.name_translations.set(Locale::Ua, "Жим лежачи".to_string());
        entity.name_translations.set(Locale::Ru, "Жим лёжа".to_string());
        entity.name = "Bench Press".to_string();
        entity.weight_type = "free".to_string();
        entity.bundles = vec![MuscleBundle {
            muscle_id: "pectoralis".to_string(),
            percentage: 100.0,
        }];
        entity.rules.components.external_weight = Some(RequiredFlag { required: true });
        entity
    }

    #[test]
    fn test_entries_follow_locale_order_and_omit_blank_values() {
        let mut map = TranslationMap::default();
        map.set(Locale::En, "Push Up".to_string());
        map.set(Locale::Ru, "  ".to_string());

        assert_eq!(
            localized_entries(&map),
            vec![
                json!({"language": "en", "value": "Push Up"}),
                json!({"language": "ua"}),
                json!({"language": "ru"}),
            ]
        );
    }

    #[test]
    fn test_entries_trim_values() {
        let mut map = TranslationMap::default();
        map.set(Locale::En, "  Push Up  ".to_string());

        assert_eq!(localized_entries(&map)[0]["value"], "Push Up");
    }

    #[test]
    fn test_payload_shape() {
        let payload = build_persistence_payload(&entity());

        assert_eq!(
            payload["name"],
            json!([
                {"language": "en", "value": "Bench Press"},
                {"language": "ua", "value": "Жим лежачи"},
                {"language": "ru", "value": "Жим лёжа"},
            ])
        );
        assert_eq!(payload["weightType"], "free");
        assert_eq!(payload["exerciseExampleBundles"][0]["muscleId"], "pectoralis");
        assert_eq!(payload["rules"]["components"]["externalWeight"]["required"], true);
    }

    #[test]
    fn test_payload_strips_client_only_fields() {
        let payload = build_persistence_payload(&entity());

        for key in [
            "id",
            "createdAt",
            "updatedAt",
            "nameTranslations",
            "descriptionTranslations",
            "translations",
            "locales",
            "localizedName",
            "localizedDescription",
        ] {
            assert!(payload.get(key).is_none(), "{key} leaked into the payload");
        }
    }

    #[test]
    fn test_locale_text_round_trips() {
        let original = entity();

        let payload = build_persistence_payload(&original);
        let reparsed = normalize(&payload, &Context::default());

        assert_eq!(reparsed.name_translations, original.name_translations);
    }
}
