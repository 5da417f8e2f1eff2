use std::slice::Iter;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Locale, Rules, TranslationMap};

/// One exercise-example record in canonical in-memory form. All raw and
/// legacy wire shapes are adapted into this representation by
/// [`normalize`](crate::normalize); every other code path consumes it.
///
/// The four enum-backed fields are kept as plain strings: an empty string
/// means "unset" and an unrecognized value survives normalization so the
/// validator can report it as invalid rather than silently dropping it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub name_translations: TranslationMap,
    pub description_translations: TranslationMap,
    pub weight_type: String,
    pub category: String,
    pub experience: String,
    pub force_type: String,
    pub image_url: String,
    pub equipment_refs: Vec<EquipmentRef>,
    #[serde(rename = "exerciseExampleBundles")]
    pub bundles: Vec<MuscleBundle>,
    pub rules: Rules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Entity {
    /// Empty entity for the new-item flow. The client-side ID is provisional;
    /// the server assigns the authoritative one on create.
    #[must_use]
    pub fn template() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn default_name(&self) -> &str {
        self.name_translations.get(Locale::DEFAULT)
    }

    #[must_use]
    pub fn default_description(&self) -> &str {
        self.description_translations.get(Locale::DEFAULT)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRef {
    pub equipment_id: String,
}

/// One muscle's share of the exercise's load. Semantically part of a set,
/// but kept in insertion order for stable editing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleBundle {
    pub muscle_id: String,
    pub percentage: f64,
}

/// One row of the list endpoint: the entity plus usage metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub entity: Entity,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

pub trait Property: Clone + Copy + Sized + 'static {
    fn iter() -> Iter<'static, Self>;
    /// Wire value of the variant.
    fn code(self) -> &'static str;

    fn is_valid(value: &str) -> bool {
        Self::iter().any(|variant| variant.code() == value)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WeightType {
    Free,
    Fixed,
    BodyWeight,
}

impl Property for WeightType {
    fn iter() -> Iter<'static, WeightType> {
        static WEIGHT_TYPES: [WeightType; 3] =
            [WeightType::Free, WeightType::Fixed, WeightType::BodyWeight];
        WEIGHT_TYPES.iter()
    }

    fn code(self) -> &'static str {
        match self {
            WeightType::Free => "free",
            WeightType::Fixed => "fixed",
            WeightType::BodyWeight => "body_weight",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    Compound,
    Isolation,
}

impl Property for Category {
    fn iter() -> Iter<'static, Category> {
        static CATEGORIES: [Category; 2] = [Category::Compound, Category::Isolation];
        CATEGORIES.iter()
    }

    fn code(self) -> &'static str {
        match self {
            Category::Compound => "compound",
            Category::Isolation => "isolation",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
    Pro,
}

impl Property for Experience {
    fn iter() -> Iter<'static, Experience> {
        static EXPERIENCES: [Experience; 4] = [
            Experience::Beginner,
            Experience::Intermediate,
            Experience::Advanced,
            Experience::Pro,
        ];
        EXPERIENCES.iter()
    }

    fn code(self) -> &'static str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Advanced => "advanced",
            Experience::Pro => "pro",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ForceType {
    Push,
    Pull,
    Hinge,
}

impl Property for ForceType {
    fn iter() -> Iter<'static, ForceType> {
        static FORCE_TYPES: [ForceType; 3] = [ForceType::Push, ForceType::Pull, ForceType::Hinge];
        FORCE_TYPES.iter()
    }

    fn code(self) -> &'static str {
        match self {
            ForceType::Push => "push",
            ForceType::Pull => "pull",
            ForceType::Hinge => "hinge",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_template_has_unique_id() {
        let a = Entity::template();
        let b = Entity::template();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_template_is_otherwise_empty() {
        let entity = Entity::template();

        assert!(entity.name.is_empty());
        assert!(entity.name_translations.is_empty());
        assert!(entity.equipment_refs.is_empty());
        assert!(entity.bundles.is_empty());
        assert_eq!(entity.rules, Rules::default());
    }

    fn assert_unique_codes<P: Property>() {
        let mut codes = HashSet::new();

        for variant in P::iter() {
            let code = variant.code();

            assert!(!code.is_empty());
            assert!(!codes.contains(code));

            codes.insert(code);
        }
    }

    #[test]
    fn test_property_codes_unique() {
        assert_unique_codes::<WeightType>();
        assert_unique_codes::<Category>();
        assert_unique_codes::<Experience>();
        assert_unique_codes::<ForceType>();
    }

    #[rstest]
    #[case("free", true)]
    #[case("fixed", true)]
    #[case("body_weight", true)]
    #[case("", false)]
    #[case("bodyweight", false)]
    fn test_weight_type_is_valid(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(WeightType::is_valid(value), expected);
    }

    #[rstest]
    #[case("push", true)]
    #[case("pull", true)]
    #[case("hinge", true)]
    #[case("static", false)]
    fn test_force_type_is_valid(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ForceType::is_valid(value), expected);
    }
}
