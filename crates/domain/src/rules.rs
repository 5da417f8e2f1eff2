use serde::Serialize;
use serde_json::Value;

/// Canonical load/weight-input configuration of an exercise example.
///
/// The catalog went through several schema generations for how a logged
/// set's required inputs are described. Old records and old client caches
/// still surface the old shapes, so [`Rules::normalize`] sniffs whichever
/// shape is present and adapts it; everything downstream only ever sees
/// this canonical form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Rules {
    pub components: Components,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub external_weight: Option<RequiredFlag>,
    pub body_weight: Option<BodyWeightComponent>,
    pub extra_weight: Option<RequiredFlag>,
    pub assist_weight: Option<RequiredFlag>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RequiredFlag {
    pub required: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BodyWeightComponent {
    pub required: bool,
    pub multiplier: f64,
}

impl Rules {
    /// Adapts a raw `rules`-like value of unknown schema generation into
    /// the canonical shape. Shape detection priority: `components` (current),
    /// `inputs` (legacy v2), `entry`/`load`/`options` (legacy v1), otherwise
    /// the previous entity's rules so editing in place never loses the
    /// configuration.
    #[must_use]
    pub fn normalize(raw: &Value, previous: Option<&Rules>) -> Rules {
        let mut components = if let Some(current) = raw.get("components") {
            Components::from_components(current)
        } else if let Some(inputs) = raw.get("inputs") {
            Components::from_inputs(inputs)
        } else if raw.get("entry").is_some()
            || raw.get("load").is_some()
            || raw.get("options").is_some()
        {
            Components::from_entry_load(raw)
        } else {
            previous.map(|rules| rules.components.clone()).unwrap_or_default()
        };

        components.reconcile();

        Rules { components }
    }
}

impl Components {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.external_weight.is_none()
            && self.body_weight.is_none()
            && self.extra_weight.is_none()
            && self.assist_weight.is_none()
    }

    /// Forces the structural invariants that validation only reports:
    /// `externalWeight` and `bodyWeight` are mutually exclusive (the
    /// body-weight entry wins a conflict, being the newer schema intent),
    /// and the extra/assist components only make sense alongside
    /// `bodyWeight`.
    fn reconcile(&mut self) {
        if self.body_weight.is_some() {
            self.external_weight = None;
        }
        if self.body_weight.is_none() {
            self.extra_weight = None;
            self.assist_weight = None;
        }
    }

    fn from_components(raw: &Value) -> Components {
        Components {
            external_weight: required_flag(raw.get("externalWeight")),
            body_weight: body_weight(raw.get("bodyWeight")),
            extra_weight: required_flag(raw.get("extraWeight")),
            assist_weight: required_flag(raw.get("assistWeight")),
        }
    }

    fn from_inputs(raw: &Value) -> Components {
        Components {
            external_weight: required_flag(raw.get("externalWeight")),
            body_weight: body_weight(raw.get("bodyWeight")),
            extra_weight: required_flag(raw.get("extraWeight")),
            assist_weight: required_flag(raw.get("assistance")),
        }
    }

    fn from_entry_load(raw: &Value) -> Components {
        let mut components = match raw.pointer("/entry/type").and_then(Value::as_str) {
            Some("RepetitionsAndWeight") => Components {
                external_weight: Some(RequiredFlag { required: true }),
                ..Components::default()
            },
            Some(
                "RepetitionsWithOptionalExtraWeight"
                | "RepetitionsWithOptionalExtraAndAssistance",
            ) => Components {
                body_weight: Some(BodyWeightComponent {
                    required: true,
                    multiplier: 1.0,
                }),
                ..Components::default()
            },
            // A bare repetitions entry still tracks the lifter's own weight,
            // just without requiring it as an input.
            Some("RepetitionsOnly") => Components {
                body_weight: Some(BodyWeightComponent {
                    required: false,
                    multiplier: 1.0,
                }),
                ..Components::default()
            },
            _ => Components::from_load(raw.get("load")),
        };

        if let Some(options) = raw.get("options") {
            if truthy(options.get("canAddExtraWeight")) {
                components.extra_weight = Some(RequiredFlag { required: false });
            }
            if truthy(options.get("canUseAssistance")) {
                components.assist_weight = Some(RequiredFlag { required: false });
            }
        }

        components
    }

    fn from_load(load: Option<&Value>) -> Components {
        let Some(load) = load else {
            return Components::default();
        };

        match load.get("type").and_then(Value::as_str) {
            Some("DirectWeight") => Components {
                external_weight: Some(RequiredFlag { required: true }),
                ..Components::default()
            },
            Some("BodyWeightFull") => Components {
                body_weight: Some(BodyWeightComponent {
                    required: true,
                    multiplier: 1.0,
                }),
                ..Components::default()
            },
            Some("BodyWeightMultiplier") => Components {
                body_weight: Some(BodyWeightComponent {
                    required: true,
                    multiplier: load
                        .get("multiplier")
                        .and_then(Value::as_f64)
                        .unwrap_or(1.0),
                }),
                ..Components::default()
            },
            _ => Components::default(),
        }
    }
}

fn required_flag(raw: Option<&Value>) -> Option<RequiredFlag> {
    let raw = raw?;

    if let Value::Object(fields) = raw {
        Some(RequiredFlag {
            required: truthy(fields.get("required")),
        })
    } else if truthy(Some(raw)) {
        Some(RequiredFlag { required: true })
    } else {
        None
    }
}

fn body_weight(raw: Option<&Value>) -> Option<BodyWeightComponent> {
    let raw = raw?;

    if let Value::Object(fields) = raw {
        Some(BodyWeightComponent {
            required: truthy(fields.get("required")),
            multiplier: fields
                .get("multiplier")
                .and_then(Value::as_f64)
                .unwrap_or(1.0),
        })
    } else if truthy(Some(raw)) {
        Some(BodyWeightComponent {
            required: true,
            multiplier: 1.0,
        })
    } else {
        None
    }
}

fn truthy(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(Value::Bool(value)) => *value,
        Some(Value::Number(value)) => value.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(value)) => !value.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn external(required: bool) -> Option<RequiredFlag> {
        Some(RequiredFlag { required })
    }

    fn body(required: bool, multiplier: f64) -> Option<BodyWeightComponent> {
        Some(BodyWeightComponent {
            required,
            multiplier,
        })
    }

    #[test]
    fn test_components_pass_through() {
        let raw = json!({
            "components": {
                "externalWeight": {"required": true},
                "bodyWeight": null,
                "extraWeight": null,
                "assistWeight": null
            }
        });

        assert_eq!(
            Rules::normalize(&raw, None),
            Rules {
                components: Components {
                    external_weight: external(true),
                    ..Components::default()
                }
            }
        );
    }

    #[test]
    fn test_body_weight_wins_conflict() {
        let raw = json!({
            "components": {
                "externalWeight": {"required": true},
                "bodyWeight": {"required": true, "multiplier": 1}
            }
        });

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.external_weight, None);
        assert_eq!(rules.components.body_weight, body(true, 1.0));
    }

    #[test]
    fn test_extras_dropped_without_body_weight() {
        let raw = json!({
            "components": {
                "externalWeight": {"required": true},
                "extraWeight": {"required": false},
                "assistWeight": {"required": false}
            }
        });

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.external_weight, external(true));
        assert_eq!(rules.components.extra_weight, None);
        assert_eq!(rules.components.assist_weight, None);
    }

    #[test]
    fn test_inputs_shape_with_truthy_markers() {
        let raw = json!({
            "inputs": {
                "bodyWeight": 1,
                "extraWeight": {"required": false},
                "assistance": true
            }
        });

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.body_weight, body(true, 1.0));
        assert_eq!(rules.components.extra_weight, external(false));
        assert_eq!(rules.components.assist_weight, external(true));
    }

    #[rstest]
    #[case("RepetitionsAndWeight", external(true), None)]
    #[case("RepetitionsWithOptionalExtraWeight", None, body(true, 1.0))]
    #[case("RepetitionsWithOptionalExtraAndAssistance", None, body(true, 1.0))]
    #[case("RepetitionsOnly", None, body(false, 1.0))]
    fn test_entry_shape(
        #[case] entry_type: &str,
        #[case] expected_external: Option<RequiredFlag>,
        #[case] expected_body: Option<BodyWeightComponent>,
    ) {
        let raw = json!({"entry": {"type": entry_type}});

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.external_weight, expected_external);
        assert_eq!(rules.components.body_weight, expected_body);
    }

    #[test]
    fn test_entry_shape_with_options() {
        let raw = json!({
            "entry": {"type": "RepetitionsWithOptionalExtraAndAssistance"},
            "options": {"canAddExtraWeight": true, "canUseAssistance": true}
        });

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.external_weight, None);
        assert_eq!(rules.components.body_weight, body(true, 1.0));
        assert_eq!(rules.components.extra_weight, external(false));
        assert_eq!(rules.components.assist_weight, external(false));
    }

    #[rstest]
    #[case("DirectWeight", external(true), None)]
    #[case("BodyWeightFull", None, body(true, 1.0))]
    fn test_load_shape(
        #[case] load_type: &str,
        #[case] expected_external: Option<RequiredFlag>,
        #[case] expected_body: Option<BodyWeightComponent>,
    ) {
        let raw = json!({"load": {"type": load_type}});

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.external_weight, expected_external);
        assert_eq!(rules.components.body_weight, expected_body);
    }

    #[test]
    fn test_load_multiplier() {
        let raw = json!({"load": {"type": "BodyWeightMultiplier", "multiplier": 0.6}});

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.body_weight, body(true, 0.6));
    }

    #[test]
    fn test_unrecognized_shape_keeps_previous() {
        let previous = Rules {
            components: Components {
                body_weight: body(true, 1.5),
                ..Components::default()
            }
        };

        assert_eq!(Rules::normalize(&json!({}), Some(&previous)), previous);
        assert_eq!(Rules::normalize(&json!("junk"), None), Rules::default());
    }

    #[test]
    fn test_missing_multiplier_defaults() {
        let raw = json!({"components": {"bodyWeight": {"required": true}}});

        let rules = Rules::normalize(&raw, None);

        assert_eq!(rules.components.body_weight, body(true, 1.0));
    }

    #[test]
    fn test_serializes_null_components() {
        let rules = Rules::default();

        assert_eq!(
            serde_json::to_value(&rules).unwrap(),
            json!({
                "components": {
                    "externalWeight": null,
                    "bodyWeight": null,
                    "extraWeight": null,
                    "assistWeight": null
                }
            })
        );
    }
}
