use crate::{Category, Dictionaries, Entity, Experience, ForceType, Locale, Property, WeightType};

/// Outcome of validating one entity. Errors block saving, warnings do not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    /// Status line for the editor: the first error, the first warning, or
    /// a confirmation that the entity can be saved.
    #[must_use]
    pub fn headline(&self) -> &str {
        self.errors
            .first()
            .or_else(|| self.warnings.first())
            .map_or("Valid", String::as_str)
    }
}

/// Checks every business invariant of a canonical entity against the given
/// dictionary snapshot. Pure and total; check order is fixed because the
/// first finding becomes the editor's headline status.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn validate(entity: &Entity, dictionaries: &Dictionaries) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if entity.default_name().trim().is_empty() {
        errors.push(format!("Missing: name ({})", Locale::DEFAULT.code().to_uppercase()));
    }
    if entity.default_description().trim().is_empty() {
        errors.push(format!(
            "Missing: description ({})",
            Locale::DEFAULT.code().to_uppercase()
        ));
    }
    if entity.weight_type.is_empty() {
        errors.push("Missing: weightType".to_string());
    }
    if entity.category.is_empty() {
        errors.push("Missing: category".to_string());
    }
    if entity.experience.is_empty() {
        errors.push("Missing: experience".to_string());
    }
    if entity.force_type.is_empty() {
        errors.push("Missing: forceType".to_string());
    }

    if entity.image_url.is_empty() {
        warnings.push("imageUrl is empty".to_string());
    }

    check_components(entity, &mut errors);
    check_enums(entity, &mut errors);

    let unknown_equipment = dictionaries.unknown_equipment(entity);
    if !unknown_equipment.is_empty() {
        errors.push(format!("Unknown equipment: {}", unknown_equipment.join(", ")));
    }

    if entity.bundles.is_empty() {
        errors.push("No muscle bundles added".to_string());
    }

    let stats = dictionaries.bundle_stats(entity);
    if !stats.unknown_muscles.is_empty() {
        errors.push(format!("Unknown muscles: {}", stats.unknown_muscles.join(", ")));
    }
    if stats.out_of_range {
        errors.push("Bundle percentage out of [0..100]".to_string());
    }
    if stats.sum != 100.0 {
        errors.push(format!(
            "Bundles sum {}% (must be 100%)",
            format_percentage(stats.sum)
        ));
    }

    Validation {
        ok: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_components(entity: &Entity, errors: &mut Vec<String>) {
    let components = &entity.rules.components;

    if components.external_weight.is_some() && components.body_weight.is_some() {
        errors.push(
            "components.externalWeight and components.bodyWeight are mutually exclusive"
                .to_string(),
        );
    }

    if let Some(body_weight) = &components.body_weight {
        let multiplier = body_weight.multiplier;
        if !multiplier.is_finite() || !(0.05..=2.0).contains(&multiplier) {
            errors.push(
                "components.bodyWeight.multiplier must be a number between 0.05 and 2.0"
                    .to_string(),
            );
        }
    }

    let has_extras = components.extra_weight.is_some() || components.assist_weight.is_some();

    if components.body_weight.is_none() && has_extras {
        errors.push(
            "components.extraWeight and components.assistWeight require bodyWeight".to_string(),
        );
    }
    if components.external_weight.is_some() && has_extras {
        errors.push(
            "components.extraWeight and components.assistWeight must be null when externalWeight is set"
                .to_string(),
        );
    }
}

fn check_enums(entity: &Entity, errors: &mut Vec<String>) {
    let fields = [
        ("weightType", &entity.weight_type, WeightType::is_valid as fn(&str) -> bool),
        ("category", &entity.category, Category::is_valid),
        ("experience", &entity.experience, Experience::is_valid),
        ("forceType", &entity.force_type, ForceType::is_valid),
    ];

    for (name, value, is_valid) in fields {
        if !value.is_empty() && !is_valid(value) {
            errors.push(format!("{name} invalid"));
        }
    }
}

/// Renders a percentage the way the editor expects: no trailing `.0` on
/// whole numbers, fractional sums as-is.
fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
