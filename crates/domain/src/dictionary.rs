use std::collections::BTreeMap;

use serde_json::Value;

use crate::Entity;

/// Read-only reference dictionaries the validator checks entity references
/// against. Both backend endpoints historically returned either a flat
/// array of `{id, name}` records or an array of groups carrying the
/// records under an `equipments`/`muscles` key; both shapes are accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionaries {
    equipment: BTreeMap<String, String>,
    muscles: BTreeMap<String, String>,
}

/// Aggregate bundle diagnostics for one entity, computed in a single pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BundleStats {
    pub sum: f64,
    pub out_of_range: bool,
    pub unknown_muscles: Vec<String>,
}

impl Dictionaries {
    pub fn insert_equipment(&mut self, raw: &Value) {
        insert_records(&mut self.equipment, raw, "equipments");
    }

    pub fn insert_muscles(&mut self, raw: &Value) {
        insert_records(&mut self.muscles, raw, "muscles");
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.muscles.is_empty()
    }

    #[must_use]
    pub fn equipment_name(&self, id: &str) -> Option<&str> {
        self.equipment.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn muscle_name(&self, id: &str) -> Option<&str> {
        self.muscles.get(id).map(String::as_str)
    }

    /// Distinct equipment IDs the entity references but the dictionary does
    /// not know, in first-seen order.
    #[must_use]
    pub fn unknown_equipment(&self, entity: &Entity) -> Vec<String> {
        let mut unknown = Vec::new();

        for reference in &entity.equipment_refs {
            let id = &reference.equipment_id;
            if !self.equipment.contains_key(id) && !unknown.contains(id) {
                unknown.push(id.clone());
            }
        }

        unknown
    }

    #[must_use]
    pub fn bundle_stats(&self, entity: &Entity) -> BundleStats {
        let mut stats = BundleStats::default();

        for bundle in &entity.bundles {
            let percentage = bundle.percentage;

            if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
                stats.out_of_range = true;
            }
            if percentage.is_finite() {
                stats.sum += percentage;
            }
            if !self.muscles.contains_key(&bundle.muscle_id)
                && !stats.unknown_muscles.contains(&bundle.muscle_id)
            {
                stats.unknown_muscles.push(bundle.muscle_id.clone());
            }
        }

        stats
    }
}

fn insert_records(target: &mut BTreeMap<String, String>, raw: &Value, group_key: &str) {
    let Value::Array(entries) = raw else {
        return;
    };

    let grouped = entries
        .first()
        .is_some_and(|first| first.get(group_key).is_some_and(Value::is_array));

    if grouped {
        for group in entries {
            if let Some(Value::Array(records)) = group.get(group_key) {
                for record in records {
                    insert_record(target, record);
                }
            }
        }
    } else {
        for record in entries {
            insert_record(target, record);
        }
    }
}

fn insert_record(target: &mut BTreeMap<String, String>, record: &Value) {
    let Some(id) = record.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) else {
        return;
    };

    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();

    target.insert(id.to_string(), name);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{EquipmentRef, MuscleBundle};

    fn dictionaries() -> Dictionaries {
        let mut dictionaries = Dictionaries::default();
        dictionaries.insert_equipment(&json!([
            {"id": "barbell", "name": "Barbell"},
            {"id": "dumbbell", "name": "Dumbbell"}
        ]));
        dictionaries.insert_muscles(&json!([
            {"muscles": [
                {"id": "pectoralis", "name": "Pectoralis"},
                {"id": "triceps", "name": "Triceps"}
            ]}
        ]));
        dictionaries
    }

    fn bundle(muscle_id: &str, percentage: f64) -> MuscleBundle {
        MuscleBundle {
            muscle_id: muscle_id.to_string(),
            percentage,
        }
    }

    #[test]
    fn test_flat_and_grouped_shapes() {
        let dictionaries = dictionaries();

        assert_eq!(dictionaries.equipment_name("barbell"), Some("Barbell"));
        assert_eq!(dictionaries.muscle_name("triceps"), Some("Triceps"));
        assert_eq!(dictionaries.muscle_name("quads"), None);
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let mut dictionaries = Dictionaries::default();
        dictionaries.insert_equipment(&json!([{"id": "barbell"}]));

        assert_eq!(dictionaries.equipment_name("barbell"), Some("barbell"));
    }

    #[test]
    fn test_malformed_records_skipped() {
        let mut dictionaries = Dictionaries::default();
        dictionaries.insert_equipment(&json!([{"name": "no id"}, null, "junk", {"id": ""}]));
        dictionaries.insert_muscles(&json!({"not": "an array"}));

        assert!(dictionaries.is_empty());
    }

    #[test]
    fn test_unknown_equipment_distinct_first_seen() {
        let entity = Entity {
            equipment_refs: ["smith", "barbell", "rings", "smith"]
                .iter()
                .map(|id| EquipmentRef { equipment_id: (*id).to_string() })
                .collect(),
            ..Entity::default()
        };

        assert_eq!(
            dictionaries().unknown_equipment(&entity),
            vec!["smith".to_string(), "rings".to_string()]
        );
    }

    #[test]
    fn test_bundle_stats() {
        let entity = Entity {
            bundles: vec![
                bundle("pectoralis", 60.0),
                bundle("forearms", 120.0),
                bundle("forearms", 10.0),
            ],
            ..Entity::default()
        };

        let stats = dictionaries().bundle_stats(&entity);

        assert_eq!(stats.sum, 190.0);
        assert!(stats.out_of_range);
        assert_eq!(stats.unknown_muscles, vec!["forearms".to_string()]);
    }

    #[test]
    fn test_bundle_stats_clean() {
        let entity = Entity {
            bundles: vec![bundle("pectoralis", 70.0), bundle("triceps", 30.0)],
            ..Entity::default()
        };

        let stats = dictionaries().bundle_stats(&entity);

        assert_eq!(stats.sum, 100.0);
        assert!(!stats.out_of_range);
        assert!(stats.unknown_muscles.is_empty());
    }
}
