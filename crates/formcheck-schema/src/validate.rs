//! # Schema Validation
//!
//! Self-consistency checking of a [`Config`] before any data is validated
//! against it.
//!
//! ## Checks
//!
//! Declaration checks run once per attribute, where the attribute is
//! declared (`attributes[i]` or `compositeTypeConfigs[k].attributes[j]`):
//!
//! - presence: `code` and `label` not blank, `type` set, no duplicate codes;
//! - LOOKUP ⇔ `lookupCode` and COMPOSITE ⇔ `compositeCode`;
//! - `validateItems` only on list attributes;
//! - validator `field` only on COMPOSITE attributes;
//! - validator operands present exactly for the rules that compare;
//! - `defaultValue` coerces to the attribute's type and list-ness.
//!
//! Reference checks follow the attribute tree from the top-level attributes
//! into every composite they reach, addressed by tree position
//! (`attributes[0].attributes[2]`):
//!
//! - `lookupCode` / `compositeCode` resolve to a declared config;
//! - validator `field` paths resolve inside the referenced composite;
//! - dependencies name a top-level attribute;
//! - no composite reaches itself.
//!
//! A composite reached along several paths is walked once, at the first of
//! them, so problems inside it are reported once.
//!
//! Finally every lookup config and composite type config must be reached by
//! the tree walk. Nothing short-circuits: one call reports every problem.
//!
//! ## Ordering
//!
//! Violations are emitted in traversal order: top-level attributes in
//! declaration order with nested composites depth-first, then lookup
//! configs, then composite type configs. Two calls on the same config
//! return identical lists.

use std::collections::HashSet;

use formcheck_core::{coerce, PropertyPath, Type, Violation, ViolationCode};

use crate::index::SchemaIndex;
use crate::model::{Attribute, Config, Validator};

/// Check a config for internal consistency.
pub fn validate_schema(config: &Config) -> Vec<Violation> {
    let mut checker = SchemaChecker::new(config);
    checker.run();
    tracing::debug!(
        attributes = config.attributes.len(),
        lookup_configs = config.lookup_configs.len(),
        composite_type_configs = config.composite_type_configs.len(),
        violations = checker.violations.len(),
        "schema validated"
    );
    checker.violations
}

struct SchemaChecker<'a> {
    config: &'a Config,
    index: SchemaIndex<'a>,
    used_lookups: HashSet<&'a str>,
    used_composites: HashSet<&'a str>,
    /// Composites whose nested attributes have been fully walked once.
    walked_composites: HashSet<&'a str>,
    violations: Vec<Violation>,
}

impl<'a> SchemaChecker<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            index: SchemaIndex::new(config),
            used_lookups: HashSet::new(),
            used_composites: HashSet::new(),
            walked_composites: HashSet::new(),
            violations: Vec::new(),
        }
    }

    fn report(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn run(&mut self) {
        let config = self.config;
        let attributes_path = PropertyPath::root().property("attributes");
        if config.attributes.is_empty() {
            self.report(Violation::new(ViolationCode::SchemaEmpty, &attributes_path));
        }
        let mut composite_stack = Vec::new();
        for (i, attribute) in config.attributes.iter().enumerate() {
            let path = attributes_path.index(i);
            self.check_declaration(attribute, &config.attributes[..i], &path);
            self.check_references(attribute, &path, &mut composite_stack);
        }
        self.check_lookup_configs();
        self.check_composite_type_configs();
    }

    /// Checks that depend only on the attribute itself and its earlier siblings.
    fn check_declaration(&mut self, attribute: &'a Attribute, earlier: &[Attribute], path: &PropertyPath) {
        if is_blank(&attribute.code) {
            self.report(Violation::new(ViolationCode::SchemaBlank, &path.property("code")));
        } else if earlier.iter().any(|a| a.code == attribute.code) {
            self.report(
                Violation::new(ViolationCode::SchemaDuplicateCode, &path.property("code"))
                    .with_param("code", &attribute.code),
            );
        }
        if is_blank(&attribute.label) {
            self.report(Violation::new(ViolationCode::SchemaBlank, &path.property("label")));
        }
        if attribute.ty.is_none() {
            self.report(Violation::new(ViolationCode::SchemaMissing, &path.property("type")));
        }

        if let Some(ty) = attribute.ty {
            self.check_coherence(attribute, ty, path);
        }

        for (j, validator) in attribute.validators.iter().enumerate() {
            self.check_validator(validator, &path.property("validators").index(j));
        }
        for (j, validator) in attribute.validate_items.iter().enumerate() {
            self.check_validator(validator, &path.property("validateItems").index(j));
        }

        for (j, dependent) in attribute.dependencies.iter().enumerate() {
            let dependent_path = path.property("dependencies").index(j);
            if is_blank(&dependent.attribute_code) {
                self.report(Violation::new(
                    ViolationCode::SchemaBlank,
                    &dependent_path.property("attributeCode"),
                ));
            }
            if dependent.values.is_empty() {
                self.report(Violation::new(
                    ViolationCode::SchemaEmpty,
                    &dependent_path.property("values"),
                ));
            }
        }

        if let (Some(ty), Some(default)) = (attribute.ty, &attribute.default_value) {
            if coerce(default, ty, attribute.list).is_err() {
                self.report(
                    Violation::new(
                        ViolationCode::AttributeInvalidDefaultValue,
                        &path.property("defaultValue"),
                    )
                    .with_param("default_value", default.to_string())
                    .with_param("type", ty.as_str()),
                );
            }
        }
    }

    fn check_coherence(&mut self, attribute: &Attribute, ty: Type, path: &PropertyPath) {
        let is_lookup = ty.extends(Type::Lookup);
        let is_composite = ty.extends(Type::Composite);

        if is_lookup && attribute.lookup_ref().is_none() {
            self.report(
                Violation::new(ViolationCode::AttributeNoLookupCode, &path.property("lookupCode"))
                    .with_param("attribute_type", ty.as_str()),
            );
        }
        if let (Some(code), false) = (attribute.lookup_ref(), is_lookup) {
            self.report(
                Violation::new(ViolationCode::AttributeNotLookupType, &path.property("type"))
                    .with_param("attribute_type", ty.as_str())
                    .with_param("lookup_code", code),
            );
        }
        if is_composite && attribute.composite_ref().is_none() {
            self.report(
                Violation::new(
                    ViolationCode::AttributeNoCompositeCode,
                    &path.property("compositeCode"),
                )
                .with_param("attribute_type", ty.as_str()),
            );
        }
        if let (Some(code), false) = (attribute.composite_ref(), is_composite) {
            self.report(
                Violation::new(ViolationCode::AttributeNotCompositeType, &path.property("type"))
                    .with_param("attribute_type", ty.as_str())
                    .with_param("composite_code", code),
            );
        }
        if !attribute.validate_items.is_empty() && !attribute.list {
            self.report(Violation::new(
                ViolationCode::AttributeValidateItemsNotList,
                &path.property("list"),
            ));
        }
        if !is_composite {
            let selectors = [
                (
                    &attribute.validators,
                    "validators",
                    ViolationCode::AttributeValidatorFieldNotComposite,
                ),
                (
                    &attribute.validate_items,
                    "validateItems",
                    ViolationCode::AttributeValidateItemFieldNotComposite,
                ),
            ];
            for (validators, name, rule) in selectors {
                for (j, validator) in validators.iter().enumerate() {
                    if let Some(field) = validator.field_ref() {
                        self.report(
                            Violation::new(rule, &path.property(name).index(j).property("field"))
                                .with_param("field", field)
                                .with_param("attribute_type", ty.as_str()),
                        );
                    }
                }
            }
        }
    }

    fn check_validator(&mut self, validator: &Validator, path: &PropertyPath) {
        let Some(ty) = validator.ty else {
            self.report(Violation::new(ViolationCode::SchemaMissing, &path.property("type")));
            return;
        };
        match (&validator.value, ty.requires_operand()) {
            (None, true) => self.report(
                Violation::new(ViolationCode::ValidatorNoValue, &path.property("value"))
                    .with_param("validator_type", ty.as_str()),
            ),
            (Some(operand), false) => self.report(
                Violation::new(ViolationCode::ValidatorValueSet, &path.property("value"))
                    .with_param("validator_type", ty.as_str())
                    .with_param("operand", operand.to_string()),
            ),
            _ => {}
        }
    }

    /// Resolve the attribute's references and descend into its composite.
    fn check_references(
        &mut self,
        attribute: &'a Attribute,
        path: &PropertyPath,
        composite_stack: &mut Vec<&'a str>,
    ) {
        if let Some(ty) = attribute.ty {
            if let (true, Some(code)) = (ty.extends(Type::Lookup), attribute.lookup_ref()) {
                if self.index.lookup(code).is_some() {
                    self.used_lookups.insert(code);
                } else {
                    self.report(
                        Violation::new(
                            ViolationCode::ConfigUnknownLookupCode,
                            &path.property("lookupCode"),
                        )
                        .with_param("lookup_code", code),
                    );
                }
            }
            if let (true, Some(code)) = (ty.extends(Type::Composite), attribute.composite_ref()) {
                self.check_composite_reference(attribute, code, path, composite_stack);
            }
        }

        for (j, dependent) in attribute.dependencies.iter().enumerate() {
            let code = dependent.attribute_code.as_str();
            if !is_blank(code) && !self.index.is_top_level(code) {
                self.report(
                    Violation::new(
                        ViolationCode::ConfigInvalidDependentReference,
                        &path.property("dependencies").index(j).property("attributeCode"),
                    )
                    .with_param("dependee", code),
                );
            }
        }
    }

    fn check_composite_reference(
        &mut self,
        attribute: &'a Attribute,
        code: &'a str,
        path: &PropertyPath,
        composite_stack: &mut Vec<&'a str>,
    ) {
        let Some(composite) = self.index.composite(code) else {
            self.report(
                Violation::new(
                    ViolationCode::ConfigUnknownCompositeCode,
                    &path.property("compositeCode"),
                )
                .with_param("composite_code", code),
            );
            return;
        };
        self.used_composites.insert(code);

        let selectors = [
            (
                &attribute.validators,
                "validators",
                ViolationCode::ConfigUnknownValidatorField,
            ),
            (
                &attribute.validate_items,
                "validateItems",
                ViolationCode::ConfigUnknownValidateItemField,
            ),
        ];
        for (validators, name, rule) in selectors {
            for (j, validator) in validators.iter().enumerate() {
                let Some(field) = validator.field_ref() else {
                    continue;
                };
                if self.index.resolve_field(code, field).is_none() {
                    self.report(
                        Violation::new(rule, &path.property(name).index(j).property("field"))
                            .with_param("field", field)
                            .with_param("composite_code", code),
                    );
                }
            }
        }

        if composite_stack.contains(&code) {
            self.report(
                Violation::new(
                    ViolationCode::ConfigCyclicComposite,
                    &path.property("compositeCode"),
                )
                .with_param("composite_code", code),
            );
            return;
        }
        // A shared composite is walked at the first path that reaches it.
        if self.walked_composites.contains(code) {
            return;
        }
        composite_stack.push(code);
        let nested_path = path.property("attributes");
        for (j, nested) in composite.attributes.iter().enumerate() {
            self.check_references(nested, &nested_path.index(j), composite_stack);
        }
        composite_stack.pop();
        self.walked_composites.insert(code);
    }

    fn check_lookup_configs(&mut self) {
        let config = self.config;
        let lookups = &config.lookup_configs;
        let root = PropertyPath::root().property("lookupConfigs");
        for (i, lookup) in lookups.iter().enumerate() {
            let path = root.index(i);
            if is_blank(&lookup.code) {
                self.report(Violation::new(ViolationCode::SchemaBlank, &path.property("code")));
            } else if lookups[..i].iter().any(|l| l.code == lookup.code) {
                self.report(
                    Violation::new(ViolationCode::SchemaDuplicateCode, &path.property("code"))
                        .with_param("code", &lookup.code),
                );
            }
            if lookup.lookup_items.is_empty() {
                self.report(Violation::new(
                    ViolationCode::SchemaEmpty,
                    &path.property("lookupItems"),
                ));
            }
            for (j, item) in lookup.lookup_items.iter().enumerate() {
                let item_path = path.property("lookupItems").index(j);
                if is_blank(&item.code) {
                    self.report(Violation::new(
                        ViolationCode::SchemaBlank,
                        &item_path.property("code"),
                    ));
                } else if lookup.lookup_items[..j].iter().any(|li| li.code == item.code) {
                    self.report(
                        Violation::new(
                            ViolationCode::SchemaDuplicateCode,
                            &item_path.property("code"),
                        )
                        .with_param("code", &item.code),
                    );
                }
                if is_blank(&item.label) {
                    self.report(Violation::new(
                        ViolationCode::SchemaBlank,
                        &item_path.property("label"),
                    ));
                }
            }
            if !is_blank(&lookup.code) && !self.used_lookups.contains(lookup.code.as_str()) {
                self.report(
                    Violation::new(ViolationCode::ConfigLookupConfigUnused, &path)
                        .with_param("code", &lookup.code),
                );
            }
        }
    }

    fn check_composite_type_configs(&mut self) {
        let config = self.config;
        let composites = &config.composite_type_configs;
        let root = PropertyPath::root().property("compositeTypeConfigs");
        for (k, composite) in composites.iter().enumerate() {
            let path = root.index(k);
            if is_blank(&composite.code) {
                self.report(Violation::new(ViolationCode::SchemaBlank, &path.property("code")));
            } else if composites[..k].iter().any(|c| c.code == composite.code) {
                self.report(
                    Violation::new(ViolationCode::SchemaDuplicateCode, &path.property("code"))
                        .with_param("code", &composite.code),
                );
            }
            let attributes_path = path.property("attributes");
            if composite.attributes.is_empty() {
                self.report(Violation::new(ViolationCode::SchemaEmpty, &attributes_path));
            }
            for (j, attribute) in composite.attributes.iter().enumerate() {
                self.check_declaration(
                    attribute,
                    &composite.attributes[..j],
                    &attributes_path.index(j),
                );
            }
            if !is_blank(&composite.code) && !self.used_composites.contains(composite.code.as_str())
            {
                self.report(
                    Violation::new(ViolationCode::ConfigCompositeTypeConfigUnused, &path)
                        .with_param("code", &composite.code),
                );
            }
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompositeTypeConfig, LookupConfig, LookupItem};
    use crate::rules::ValidatorType;
    use serde_json::json;

    fn rules(violations: &[Violation]) -> Vec<(&str, &str)> {
        violations
            .iter()
            .map(|v| (v.path.as_str(), v.rule.as_str()))
            .collect()
    }

    #[test]
    fn test_valid_minimal_config() {
        let config = Config::new(vec![Attribute::new("code", "label", Type::String)]);
        assert!(validate_schema(&config).is_empty());
    }

    #[test]
    fn test_empty_attributes() {
        let violations = validate_schema(&Config::default());
        assert_eq!(rules(&violations), vec![("attributes", "schema.empty")]);
    }

    #[test]
    fn test_attribute_null_fields() {
        let config = Config::new(vec![Attribute::default()]);
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![
                ("attributes[0].code", "schema.blank"),
                ("attributes[0].label", "schema.blank"),
                ("attributes[0].type", "schema.missing"),
            ]
        );
    }

    #[test]
    fn test_duplicate_attribute_code() {
        let config = Config::new(vec![
            Attribute::new("a", "A", Type::String),
            Attribute::new("a", "A again", Type::Integer),
        ]);
        let violations = validate_schema(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "attributes[1].code");
        assert_eq!(violations[0].rule, ViolationCode::SchemaDuplicateCode);
        assert_eq!(violations[0].param("code"), Some("a"));
    }

    #[test]
    fn test_operand_checks() {
        let config = Config::new(vec![Attribute::new("n", "N", Type::Integer)
            .with_validator(Validator::new(ValidatorType::Min))
            .with_validator(Validator::new(ValidatorType::NotNull).with_value(3))
            .with_validator(Validator::default())]);
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![
                ("attributes[0].validators[0].value", "validator.no_value"),
                ("attributes[0].validators[1].value", "validator.value_set"),
                ("attributes[0].validators[2].type", "schema.missing"),
            ]
        );
        assert_eq!(violations[0].param("validator_type"), Some("Min"));
        assert_eq!(violations[1].param("operand"), Some("3"));
    }

    #[test]
    fn test_invalid_default_value() {
        let config = Config::new(vec![
            Attribute::new("n", "N", Type::Integer).with_default(json!("one")),
            Attribute::new("l", "L", Type::Integer)
                .list()
                .with_default(json!([1, 2])),
            Attribute::new("m", "M", Type::Integer)
                .list()
                .with_default(json!(1)),
        ]);
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![
                ("attributes[0].defaultValue", "attribute.invalid_default_value"),
                ("attributes[2].defaultValue", "attribute.invalid_default_value"),
            ]
        );
        assert_eq!(violations[0].param("type"), Some("INTEGER"));
        assert_eq!(violations[0].param("default_value"), Some("\"one\""));
    }

    #[test]
    fn test_unset_type_skips_coherence() {
        let mut attribute = Attribute::new("c", "C", Type::String)
            .with_lookup_code("nowhere")
            .with_default(json!({}));
        attribute.ty = None;
        let violations = validate_schema(&Config::new(vec![attribute]));
        assert_eq!(rules(&violations), vec![("attributes[0].type", "schema.missing")]);
    }

    #[test]
    fn test_cyclic_composite_detected() {
        let config = Config::new(vec![
            Attribute::new("node", "Node", Type::Composite).with_composite_code("tree"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "tree",
            vec![
                Attribute::new("value", "Value", Type::Integer),
                Attribute::new("child", "Child", Type::Composite).with_composite_code("tree"),
            ],
        ));
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![(
                "attributes[0].attributes[1].compositeCode",
                "config.cyclic_composite"
            )]
        );
    }

    #[test]
    fn test_mutual_cycle_detected() {
        let config = Config::new(vec![
            Attribute::new("a", "A", Type::Composite).with_composite_code("ping"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "ping",
            vec![Attribute::new("p", "P", Type::Composite).with_composite_code("pong")],
        ))
        .with_composite_type_config(CompositeTypeConfig::new(
            "pong",
            vec![Attribute::new("q", "Q", Type::Composite).with_composite_code("ping")],
        ));
        let violations = validate_schema(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, ViolationCode::ConfigCyclicComposite);
        assert_eq!(violations[0].path, "attributes[0].attributes[0].attributes[0].compositeCode");
        assert_eq!(violations[0].param("composite_code"), Some("ping"));
    }

    #[test]
    fn test_shared_composite_is_not_a_cycle() {
        let config = Config::new(vec![
            Attribute::new("home", "Home", Type::Composite).with_composite_code("address"),
            Attribute::new("work", "Work", Type::Composite).with_composite_code("address"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "address",
            vec![Attribute::new("line", "Line", Type::String)],
        ));
        assert!(validate_schema(&config).is_empty());
    }

    /// `depth` composites, each holding two attributes of the next one.
    fn shared_chain(depth: usize) -> Config {
        let mut config = Config::new(vec![
            Attribute::new("root", "Root", Type::Composite).with_composite_code("level0"),
        ]);
        for level in 0..depth {
            let attributes = if level + 1 == depth {
                vec![Attribute::new("leaf", "Leaf", Type::Integer)]
            } else {
                let next = format!("level{}", level + 1);
                vec![
                    Attribute::new("left", "Left", Type::Composite).with_composite_code(&next),
                    Attribute::new("right", "Right", Type::Composite).with_composite_code(&next),
                ]
            };
            config = config
                .with_composite_type_config(CompositeTypeConfig::new(format!("level{level}"), attributes));
        }
        config
    }

    #[test]
    fn test_deep_shared_composites_walked_once() {
        let started = std::time::Instant::now();
        let violations = validate_schema(&shared_chain(64));
        assert!(violations.is_empty(), "{violations:#?}");
        assert!(started.elapsed().as_secs() < 1, "took {:?}", started.elapsed());
    }

    #[test]
    fn test_shared_composite_problem_reported_once() {
        let config = Config::new(vec![
            Attribute::new("home", "Home", Type::Composite).with_composite_code("address"),
            Attribute::new("work", "Work", Type::Composite).with_composite_code("address"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "address",
            vec![Attribute::new("country", "Country", Type::Lookup).with_lookup_code("missing")],
        ));
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![("attributes[0].attributes[0].lookupCode", "config.unknown_lookup_code")]
        );
    }

    #[test]
    fn test_cycle_behind_shared_composite_still_detected() {
        let config = Config::new(vec![
            Attribute::new("a", "A", Type::Composite).with_composite_code("shared"),
            Attribute::new("b", "B", Type::Composite).with_composite_code("shared"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "shared",
            vec![Attribute::new("loop", "Loop", Type::Composite).with_composite_code("back")],
        ))
        .with_composite_type_config(CompositeTypeConfig::new(
            "back",
            vec![Attribute::new("again", "Again", Type::Composite).with_composite_code("shared")],
        ));
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![(
                "attributes[0].attributes[0].attributes[0].compositeCode",
                "config.cyclic_composite"
            )]
        );
    }

    #[test]
    fn test_oversized_default_rejected_promptly() {
        let started = std::time::Instant::now();
        let config = Config::new(vec![
            Attribute::new("n", "N", Type::Integer).with_default(json!("1e200000000")),
        ]);
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![("attributes[0].defaultValue", "attribute.invalid_default_value")]
        );
        assert!(started.elapsed().as_secs() < 1, "took {:?}", started.elapsed());
    }

    #[test]
    fn test_unreachable_lookup_inside_unused_composite() {
        let config = Config::new(vec![Attribute::new("c", "C", Type::String)])
            .with_lookup_config(LookupConfig::new("l", vec![LookupItem::new("a", "A")]))
            .with_composite_type_config(CompositeTypeConfig::new(
                "orphan",
                vec![Attribute::new("x", "X", Type::Lookup).with_lookup_code("l")],
            ));
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![
                ("lookupConfigs[0]", "config.lookup_config_unused"),
                ("compositeTypeConfigs[0]", "config.composite_type_config_unused"),
            ]
        );
    }

    #[test]
    fn test_composite_declaration_checked_at_declaration_path() {
        let config = Config::new(vec![
            Attribute::new("c", "C", Type::Composite).with_composite_code("comp"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "comp",
            vec![Attribute::new("", "Label", Type::Lookup)],
        ));
        let violations = validate_schema(&config);
        assert_eq!(
            rules(&violations),
            vec![
                ("compositeTypeConfigs[0].attributes[0].code", "schema.blank"),
                (
                    "compositeTypeConfigs[0].attributes[0].lookupCode",
                    "attribute.no_lookup_code"
                ),
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let config = Config::new(vec![
            Attribute::new("l", "L", Type::Lookup),
            Attribute::new("s", "S", Type::String).with_composite_code("x"),
        ])
        .with_lookup_config(LookupConfig::new("unused", vec![]));
        let first = validate_schema(&config);
        let second = validate_schema(&config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
