use serde_json::Value;

use crate::{normalize, Context, Entity, Locale};

/// Folds one per-locale detail response into the accumulated entity.
///
/// The backend returns only the requesting locale's text per call, so the
/// edit flow fetches one payload per supported locale and merges them here.
/// Scalar fields keep the first non-empty value; the array fields are not
/// expected to vary by locale, so a non-empty addition replaces them
/// wholesale; each addition carries the authoritative text for its own
/// locale, so its translation slots win per key.
#[must_use]
pub fn merge(base: Option<Entity>, addition: Entity) -> Entity {
    let Some(base) = base else {
        return addition;
    };

    let mut merged = base;

    fill_scalar(&mut merged.id, addition.id);
    fill_scalar(&mut merged.weight_type, addition.weight_type);
    fill_scalar(&mut merged.category, addition.category);
    fill_scalar(&mut merged.experience, addition.experience);
    fill_scalar(&mut merged.force_type, addition.force_type);
    fill_scalar(&mut merged.image_url, addition.image_url);

    if addition.created_at.is_some() {
        merged.created_at = addition.created_at;
    }
    if addition.updated_at.is_some() {
        merged.updated_at = addition.updated_at;
    }

    if !addition.equipment_refs.is_empty() {
        merged.equipment_refs = addition.equipment_refs;
    }
    if !addition.bundles.is_empty() {
        merged.bundles = addition.bundles;
    }
    if !addition.rules.components.is_empty() {
        merged.rules = addition.rules;
    }

    merged.name_translations = addition.name_translations;
    merged.description_translations = addition.description_translations;

    merged.name = merged.name_translations.get(Locale::DEFAULT).to_string();
    merged.description = merged
        .description_translations
        .get(Locale::DEFAULT)
        .to_string();

    merged
}

fn fill_scalar(target: &mut String, addition: String) {
    if !addition.is_empty() {
        *target = addition;
    }
}

/// Normalizes and merges the per-locale payloads of one item selection.
///
/// Payloads are processed in locale-iteration order regardless of arrival
/// order, so the result is deterministic under network timing. Missing
/// locales are simply skipped: a partially failed load still yields a
/// usable entity from whatever locales did arrive.
#[must_use]
pub fn merge_locale_payloads(payloads: &[(Locale, Value)]) -> Option<Entity> {
    let mut merged: Option<Entity> = None;

    for locale in Locale::iter() {
        let Some((_, payload)) = payloads.iter().find(|(l, _)| l == locale) else {
            continue;
        };

        let normalized = normalize(
            payload,
            &Context {
                locale: *locale,
                previous: merged.as_ref(),
            },
        );

        merged = Some(merge(merged, normalized));
    }

    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{EquipmentRef, MuscleBundle};

    fn payload(locale: Locale, name: &str) -> (Locale, Value) {
        (
            locale,
            json!({
                "id": "e-1",
                "name": name,
                "description": format!("{name} description"),
                "weightType": "free",
                "category": "compound",
                "experience": "beginner",
                "forceType": "push",
                "equipmentRefs": ["barbell"],
                "exerciseExampleBundles": [{"muscleId": "pectoralis", "percentage": 100}]
            }),
        )
    }

    #[test]
    fn test_merge_without_base() {
        let addition = Entity {
            name: "Bench Press".to_string(),
            ..Entity::default()
        };

        assert_eq!(merge(None, addition.clone()), addition);
    }

    #[test]
    fn test_merge_keeps_populated_scalars() {
        let base = Entity {
            weight_type: "free".to_string(),
            image_url: "https://cdn.example.com/bench.png".to_string(),
            ..Entity::default()
        };
        let addition = Entity {
            category: "compound".to_string(),
            ..Entity::default()
        };

        let merged = merge(Some(base), addition);

        assert_eq!(merged.weight_type, "free");
        assert_eq!(merged.category, "compound");
        assert_eq!(merged.image_url, "https://cdn.example.com/bench.png");
    }

    #[test]
    fn test_merge_replaces_arrays_only_when_non_empty() {
        let base = Entity {
            equipment_refs: vec![EquipmentRef { equipment_id: "barbell".to_string() }],
            bundles: vec![MuscleBundle { muscle_id: "pectoralis".to_string(), percentage: 100.0 }],
            ..Entity::default()
        };
        let addition = Entity {
            equipment_refs: vec![EquipmentRef { equipment_id: "dumbbell".to_string() }],
            ..Entity::default()
        };

        let merged = merge(Some(base), addition);

        assert_eq!(merged.equipment_refs[0].equipment_id, "dumbbell");
        assert_eq!(merged.bundles.len(), 1);
    }

    #[test]
    fn test_merged_scalars_follow_default_slot() {
        let mut addition = Entity::default();
        addition.name_translations.set(Locale::En, "Bench Press".to_string());

        let merged = merge(Some(Entity::default()), addition);

        assert_eq!(merged.name, "Bench Press");
    }

    #[test]
    fn test_locale_payloads_accumulate_translations() {
        let payloads = vec![
            payload(Locale::En, "Bench Press"),
            payload(Locale::Ua, "Жим лежачи"),
            payload(Locale::Ru, "Жим лёжа"),
        ];

        let merged = merge_locale_payloads(&payloads).unwrap();

        assert_eq!(merged.name_translations.get(Locale::En), "Bench Press");
        assert_eq!(merged.name_translations.get(Locale::Ua), "Жим лежачи");
        assert_eq!(merged.name_translations.get(Locale::Ru), "Жим лёжа");
        assert_eq!(merged.name, "Bench Press");
        assert_eq!(merged.id, "e-1");
    }

    #[test]
    fn test_locale_payloads_deterministic_under_arrival_order() {
        let ordered = vec![
            payload(Locale::En, "Bench Press"),
            payload(Locale::Ru, "Жим лёжа"),
            payload(Locale::Ua, "Жим лежачи"),
        ];
        let reversed: Vec<_> = ordered.iter().rev().cloned().collect();

        assert_eq!(
            merge_locale_payloads(&ordered),
            merge_locale_payloads(&reversed)
        );
    }

    #[test]
    fn test_locale_payloads_tolerate_missing_locale() {
        let payloads = vec![
            payload(Locale::En, "Bench Press"),
            payload(Locale::Ru, "Жим лёжа"),
        ];

        let merged = merge_locale_payloads(&payloads).unwrap();

        assert_eq!(merged.name_translations.get(Locale::Ua), "");
        assert_eq!(merged.name_translations.get(Locale::Ru), "Жим лёжа");
    }

    #[test]
    fn test_locale_payloads_empty_input() {
        assert_eq!(merge_locale_payloads(&[]), None);
    }
}
