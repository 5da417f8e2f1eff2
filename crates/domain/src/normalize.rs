use serde_json::Value;

use crate::{Entity, EquipmentRef, Locale, MuscleBundle, Rules, TranslationMap};

/// Normalization context: which locale the raw payload was fetched for, and
/// the previously held entity whose data fills gaps the payload leaves.
#[derive(Clone, Copy, Debug, Default)]
pub struct Context<'a> {
    pub locale: Locale,
    pub previous: Option<&'a Entity>,
}

/// Adapts an entity-shaped JSON value of any provenance (API response,
/// hand-edited JSON, legacy cache) into the canonical [`Entity`].
///
/// Total over its input: malformed sub-fields degrade to empty values
/// instead of failing the whole pass, and transitional keys such as
/// `translations` never survive into the result.
#[must_use]
pub fn normalize(raw: &Value, ctx: &Context<'_>) -> Entity {
    let mut name_translations =
        TranslationMap::ensure(field(raw, "nameTranslations").unwrap_or(&Value::Null));
    let mut description_translations =
        TranslationMap::ensure(field(raw, "descriptionTranslations").unwrap_or(&Value::Null));

    apply_localized_entries(&mut name_translations, field(raw, "name"));
    apply_localized_entries(&mut description_translations, field(raw, "description"));

    if let Some(previous) = ctx.previous {
        back_fill(&mut name_translations, &previous.name_translations);
        back_fill(&mut description_translations, &previous.description_translations);
    }

    apply_legacy_translations(
        &mut name_translations,
        &mut description_translations,
        field(raw, "translations"),
    );

    fill_plain_string(&mut name_translations, field(raw, "name"), ctx.locale);
    fill_plain_string(
        &mut description_translations,
        field(raw, "description"),
        ctx.locale,
    );

    if name_translations.is_blank(Locale::DEFAULT) {
        if let Some(previous) = ctx.previous {
            name_translations.set(Locale::DEFAULT, previous.name.clone());
        }
    }
    if description_translations.is_blank(Locale::DEFAULT) {
        if let Some(previous) = ctx.previous {
            description_translations.set(Locale::DEFAULT, previous.description.clone());
        }
    }

    let name = name_translations.get(Locale::DEFAULT).to_string();
    let description = description_translations.get(Locale::DEFAULT).to_string();

    Entity {
        id: string_field(raw, "id"),
        name,
        description,
        name_translations,
        description_translations,
        weight_type: string_field(raw, "weightType"),
        category: string_field(raw, "category"),
        experience: string_field(raw, "experience"),
        force_type: string_field(raw, "forceType"),
        image_url: string_field(raw, "imageUrl"),
        equipment_refs: equipment_refs(field(raw, "equipmentRefs")),
        bundles: bundles(field(raw, "exerciseExampleBundles")),
        rules: Rules::normalize(
            field(raw, "rules").unwrap_or(&Value::Null),
            ctx.previous.map(|previous| &previous.rules),
        ),
        created_at: optional_string_field(raw, "createdAt"),
        updated_at: optional_string_field(raw, "updatedAt"),
    }
}

fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key)
}

fn string_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Bare ID strings and objects with any of the historical ID keys are
/// accepted; entries without a usable ID are dropped.
fn equipment_refs(raw: Option<&Value>) -> Vec<EquipmentRef> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) if !id.is_empty() => Some(EquipmentRef {
                equipment_id: id.clone(),
            }),
            Value::Object(_) => ["equipmentId", "id", "key", "code"]
                .iter()
                .find_map(|key| scalar_string(entry.get(key)))
                .map(|id| EquipmentRef { equipment_id: id }),
            _ => None,
        })
        .collect()
}

fn bundles(raw: Option<&Value>) -> Vec<MuscleBundle> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            if !entry.is_object() {
                return None;
            }

            let muscle_id = ["muscleId", "muscle", "muscle_id", "targetMuscleId"]
                .iter()
                .find_map(|key| scalar_string(entry.get(key)))
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())?;
            let percentage = ["percentage", "percent", "ratio", "load"]
                .iter()
                .find_map(|key| entry.get(key).filter(|value| !value.is_null()))
                .map_or(Some(0.0), numeric_value)?;

            percentage.is_finite().then_some(MuscleBundle {
                muscle_id,
                percentage,
            })
        })
        .collect()
}

/// Old exports carry bundle percentages as strings; coerce them the way the
/// wire's other numeric scalars are coerced. The first alias key present
/// decides, even when its value turns out non-numeric.
fn numeric_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(value) => value.as_f64(),
        Value::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        Value::String(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

fn scalar_string(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Merges a localized-entries array (`[{language, value|name|text}]`) into
/// the map; entries with unrecognized locale codes are skipped.
fn apply_localized_entries(target: &mut TranslationMap, raw: Option<&Value>) {
    let Some(Value::Array(entries)) = raw else {
        return;
    };

    for entry in entries {
        let Some(locale) = entry
            .get("language")
            .and_then(Value::as_str)
            .and_then(|code| Locale::try_from(code).ok())
        else {
            continue;
        };

        let value = ["value", "name", "text"]
            .iter()
            .find_map(|key| entry.get(key).and_then(Value::as_str));

        if let Some(value) = value {
            target.set(locale, value.to_string());
        }
    }
}

fn back_fill(target: &mut TranslationMap, previous: &TranslationMap) {
    for locale in Locale::iter() {
        if target.is_blank(*locale) && !previous.is_blank(*locale) {
            target.set(*locale, previous.get(*locale).to_string());
        }
    }
}

/// The oldest cached records carry a `translations` array with `name` and
/// `description` side by side; its entries overwrite whatever was built so
/// far for their locale.
fn apply_legacy_translations(
    names: &mut TranslationMap,
    descriptions: &mut TranslationMap,
    raw: Option<&Value>,
) {
    let Some(Value::Array(entries)) = raw else {
        return;
    };

    for entry in entries {
        let Some(locale) = entry
            .get("language")
            .and_then(Value::as_str)
            .and_then(|code| Locale::try_from(code).ok())
        else {
            continue;
        };

        if let Some(name) = entry.get("name").and_then(Value::as_str) {
            names.set(locale, name.to_string());
        }
        if let Some(description) = entry.get("description").and_then(Value::as_str) {
            descriptions.set(locale, description.to_string());
        }
    }
}

fn fill_plain_string(target: &mut TranslationMap, raw: Option<&Value>, locale: Locale) {
    if let Some(Value::String(value)) = raw {
        if target.is_blank(locale) {
            target.set(locale, value.clone());
        }
    }
}
