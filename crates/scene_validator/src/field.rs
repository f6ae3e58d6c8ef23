//! Per-field validation.
//!
//! Checks type, required-ness, option membership and value formats,
//! recursing into subfields with a threaded path prefix. Validation is
//! total: every problem becomes a `Finding`, nothing aborts early.

use crate::{FieldId, FieldNode, FieldType, OptionPolicy, SchemaModel};
use indexmap::IndexMap;
use scene_core::{Finding, RuleId, SceneDocument, SceneValue};

/// Findings of one per-field pass over a document.
#[derive(Debug, Default)]
pub struct FieldPass {
    /// Findings, not yet tagged with a document index
    pub findings: Vec<Finding>,
    /// Number of field values visited
    pub fields_checked: usize,
}

impl FieldPass {
    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

/// Validates document values against field definitions.
pub struct FieldValidator<'a> {
    schema: &'a SchemaModel,
    report_unknown: bool,
}

impl<'a> FieldValidator<'a> {
    /// Creates a validator over a loaded schema.
    pub fn new(schema: &'a SchemaModel) -> Self {
        Self {
            schema,
            report_unknown: true,
        }
    }

    /// Enables or disables `UnknownField` warnings.
    pub fn with_unknown_fields(mut self, report: bool) -> Self {
        self.report_unknown = report;
        self
    }

    /// Validates every top-level field of a document.
    pub fn validate_document(&self, document: &SceneDocument) -> FieldPass {
        let mut pass = FieldPass::default();

        for root in self.schema.roots() {
            self.validate(root.id, document.get(&root.name), &root.path, &mut pass);
        }

        if self.report_unknown {
            for (key, _) in document.fields() {
                let declared = self
                    .schema
                    .lookup(key)
                    .is_some_and(|node| node.parent.is_none());
                if !declared {
                    pass.push(Finding::warning(
                        RuleId::UnknownField,
                        key.as_str(),
                        "field is not declared in the schema",
                    ));
                }
            }
        }

        pass
    }

    /// Validates one value (or its absence) against a field definition.
    pub fn validate(&self, id: FieldId, value: Option<&SceneValue>, path: &str, pass: &mut FieldPass) {
        let node = self.schema.node(id);
        pass.fields_checked += 1;

        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => {
                // Conditional fields are handled by the consistency engine
                if node.required && !node.visibility.is_conditional() {
                    pass.push(Finding::error(
                        RuleId::MissingRequired,
                        path,
                        "required value is missing or empty",
                    ));
                }
                return;
            }
        };

        match node.field_type {
            FieldType::Object => match value {
                SceneValue::Object(map) => self.validate_object(node, map, path, pass),
                SceneValue::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", path, index);
                        match item {
                            SceneValue::Object(map) => {
                                self.validate_object(node, map, &item_path, pass)
                            }
                            other => pass.push(mismatch(&item_path, "object", other)),
                        }
                    }
                }
                other => pass.push(mismatch(path, "object", other)),
            },
            FieldType::Array => match value {
                SceneValue::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", path, index);
                        self.validate_element(node, item, &item_path, pass);
                    }
                }
                other => pass.push(mismatch(path, "array", other)),
            },
            FieldType::String | FieldType::Boolean => {
                if node.field_type.accepts_scalar(value) {
                    self.check_literal(node, value, path, pass);
                } else {
                    pass.push(mismatch(path, node.field_type.as_str(), value));
                }
            }
        }
    }

    fn validate_object(
        &self,
        node: &FieldNode,
        map: &IndexMap<String, SceneValue>,
        path: &str,
        pass: &mut FieldPass,
    ) {
        for child in self.schema.children(node.id) {
            let child_path = format!("{}.{}", path, child.name);
            self.validate(child.id, map.get(&child.name), &child_path, pass);
        }

        // Objects without declared subfields are free-form
        if self.report_unknown && !node.children.is_empty() {
            for key in map.keys() {
                if !self.schema.children(node.id).any(|child| child.name == *key) {
                    pass.push(Finding::warning(
                        RuleId::UnknownField,
                        format!("{}.{}", path, key),
                        format!("field is not declared under '{}'", node.path),
                    ));
                }
            }
        }
    }

    fn validate_element(&self, node: &FieldNode, item: &SceneValue, path: &str, pass: &mut FieldPass) {
        pass.fields_checked += 1;
        match item {
            SceneValue::Object(map) if !node.children.is_empty() => {
                self.validate_object(node, map, path, pass)
            }
            SceneValue::String(_) | SceneValue::Int(_) | SceneValue::Float(_) | SceneValue::Bool(_)
                if node.children.is_empty() =>
            {
                self.check_literal(node, item, path, pass)
            }
            other => {
                let expected = if node.children.is_empty() {
                    "scalar"
                } else {
                    "object"
                };
                pass.push(mismatch(path, expected, other));
            }
        }
    }

    /// Option membership and format checks on a scalar.
    fn check_literal(&self, node: &FieldNode, value: &SceneValue, path: &str, pass: &mut FieldPass) {
        let Some(literal) = value.as_literal() else {
            return;
        };

        if !node.options.is_empty() && !node.options.iter().any(|option| *option == literal) {
            let custom_accepted =
                node.allow_custom && node.patterns.iter().all(|p| p.is_match(&literal));
            if !custom_accepted {
                let message = format!(
                    "'{}' is not one of the declared options ({})",
                    literal,
                    node.options.join(", ")
                );
                pass.push(match node.option_policy {
                    OptionPolicy::Strict => Finding::error(RuleId::OutOfEnum, path, message),
                    OptionPolicy::Advisory => Finding::warning(RuleId::OutOfEnum, path, message),
                });
            }
        }

        if let SceneValue::String(text) = value {
            for pattern in &node.patterns {
                if !pattern.is_match(text) {
                    pass.push(Finding::error(
                        RuleId::FormatViolation,
                        path,
                        format!("'{}' does not match {}", text, pattern.rule()),
                    ));
                }
            }
        }
    }
}

fn mismatch(path: &str, expected: &str, found: &SceneValue) -> Finding {
    Finding::error(
        RuleId::TypeMismatch,
        path,
        format!("expected {}, found {}", expected, found.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_schema;
    use pretty_assertions::assert_eq;
    use scene_core::{FieldBuilder, Severity};

    fn schema() -> SchemaModel {
        let raw = vec![
            FieldBuilder::new("SceneID", "string")
                .required(true)
                .format("Alphanumeric string with optional underscores or hyphens")
                .restriction("No whitespace")
                .build(),
            FieldBuilder::new("Duration", "string")
                .options(["3s", "5s", "10s"])
                .restriction("Must be one of the predefined durations unless custom allowed")
                .restriction("Suffix 's' must always be included")
                .build(),
            FieldBuilder::new("Mood", "string")
                .options(["Calm", "Tense"])
                .build(),
            FieldBuilder::new("Characters", "object")
                .subfield(FieldBuilder::new("Name", "string").required(true).build())
                .subfield(FieldBuilder::new("Type", "string").build())
                .build(),
            FieldBuilder::new("Subtitles", "boolean").build(),
            FieldBuilder::new("Tags", "array").options(["night", "day"]).build(),
        ];
        load_schema(&raw).unwrap()
    }

    fn rules(pass: &FieldPass) -> Vec<(RuleId, &str)> {
        pass.findings
            .iter()
            .map(|f| (f.rule_id, f.field_path.as_str()))
            .collect()
    }

    #[test]
    fn test_valid_document() {
        let schema = schema();
        let document = SceneDocument::new()
            .with("SceneID", "desert_intro01")
            .with("Duration", "10s")
            .with("Subtitles", true);

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert!(pass.findings.is_empty(), "{:?}", pass.findings);
        assert_eq!(pass.fields_checked, 6);
    }

    #[test]
    fn test_missing_required() {
        let schema = schema();
        let document = SceneDocument::new().with("SceneID", "   ");

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(rules(&pass), vec![(RuleId::MissingRequired, "SceneID")]);
    }

    #[test]
    fn test_strict_and_advisory_options() {
        let schema = schema();
        let document = SceneDocument::new()
            .with("SceneID", "s1")
            .with("Duration", "7s")
            .with("Mood", "Joyful");

        let pass = FieldValidator::new(&schema).validate_document(&document);
        let severities: Vec<(&str, Severity)> = pass
            .findings
            .iter()
            .map(|f| (f.field_path.as_str(), f.severity))
            .collect();
        assert_eq!(
            severities,
            vec![("Duration", Severity::Error), ("Mood", Severity::Warning)]
        );
    }

    #[test]
    fn test_format_violations_reported_together() {
        let schema = schema();
        let document = SceneDocument::new()
            .with("SceneID", "desert intro")
            .with("Duration", "10");

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(
            rules(&pass),
            vec![
                (RuleId::FormatViolation, "SceneID"),
                (RuleId::FormatViolation, "SceneID"),
                (RuleId::OutOfEnum, "Duration"),
                (RuleId::FormatViolation, "Duration"),
            ]
        );
    }

    #[test]
    fn test_custom_values_matching_pattern() {
        let raw = vec![FieldBuilder::new("Duration", "string")
            .options(["5s", "10s"])
            .allow_custom(true)
            .restriction("Suffix 's' must always be included")
            .strict_options(true)
            .build()];
        let schema = load_schema(&raw).unwrap();
        let validator = FieldValidator::new(&schema);

        let accepted = validator.validate_document(&SceneDocument::new().with("Duration", "7s"));
        assert!(accepted.findings.is_empty());

        let rejected = validator.validate_document(&SceneDocument::new().with("Duration", "7 s"));
        assert_eq!(
            rules(&rejected),
            vec![
                (RuleId::OutOfEnum, "Duration"),
                (RuleId::FormatViolation, "Duration")
            ]
        );
    }

    #[test]
    fn test_type_mismatch() {
        let schema = schema();
        let document = SceneDocument::new()
            .with("SceneID", 42_i64)
            .with("Subtitles", "yes");

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(
            rules(&pass),
            vec![
                (RuleId::TypeMismatch, "SceneID"),
                (RuleId::TypeMismatch, "Subtitles")
            ]
        );
    }

    #[test]
    fn test_object_list_paths() {
        let schema = schema();
        let characters: SceneValue = serde_json::json!([
            { "Name": "Ava", "Type": "Human" },
            { "Type": "Robot", "Mood": "Curious" }
        ])
        .into();
        let document = SceneDocument::new()
            .with("SceneID", "s1")
            .with("Characters", characters);

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(
            rules(&pass),
            vec![
                (RuleId::MissingRequired, "Characters[1].Name"),
                (RuleId::UnknownField, "Characters[1].Mood"),
            ]
        );
    }

    #[test]
    fn test_array_elements() {
        let schema = schema();
        let tags: SceneValue = serde_json::json!(["night", "dusk", { "x": 1 }]).into();
        let document = SceneDocument::new().with("SceneID", "s1").with("Tags", tags);

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(
            rules(&pass),
            vec![
                (RuleId::OutOfEnum, "Tags[1]"),
                (RuleId::TypeMismatch, "Tags[2]")
            ]
        );
    }

    #[test]
    fn test_unknown_top_level_field() {
        let schema = schema();
        let document = SceneDocument::new().with("SceneID", "s1").with("Weather", "Rain");

        let pass = FieldValidator::new(&schema).validate_document(&document);
        assert_eq!(rules(&pass), vec![(RuleId::UnknownField, "Weather")]);

        let quiet = FieldValidator::new(&schema)
            .with_unknown_fields(false)
            .validate_document(&document);
        assert!(quiet.findings.is_empty());
    }
}
