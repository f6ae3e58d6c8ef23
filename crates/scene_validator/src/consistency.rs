//! Cross-field and cross-document consistency rules.
//!
//! Rules run in dependency order: uniqueness and reference resolution over
//! the sequence context, conditional requirement, advisory restrictions and
//! (opt-in) dependency coverage. Rules on nested fields are evaluated per
//! instance, so a field under a list of objects reports `Parent[i].Field`.

use crate::{FieldId, FieldNode, SchemaModel, Visibility};
use indexmap::IndexMap;
use scene_core::{Condition, Finding, RuleId, SceneDocument, SceneValue, ValidationOptions};

/// Where an identifier value occurs within a sequence.
#[derive(Debug, Clone, Default)]
struct Occurrences {
    documents: Vec<usize>,
    count: usize,
}

/// Read-only view of a sequence, built once before documents are validated.
///
/// Indexes every value held by identifier fields (unique fields and
/// reference targets) to the documents holding it.
#[derive(Debug, Clone, Default)]
pub struct SequenceContext {
    identifiers: IndexMap<FieldId, IndexMap<String, Occurrences>>,
    len: usize,
}

impl SequenceContext {
    /// Indexes the identifier values of a sequence.
    pub fn build(schema: &SchemaModel, documents: &[SceneDocument]) -> Self {
        let mut fields: Vec<FieldId> = schema.unique_fields().map(|node| node.id).collect();
        for node in schema.reference_fields() {
            if let Some(target) = node.references {
                if !fields.contains(&target) {
                    fields.push(target);
                }
            }
        }

        let mut identifiers = IndexMap::with_capacity(fields.len());
        for id in fields {
            let path = &schema.node(id).path;
            let mut values: IndexMap<String, Occurrences> = IndexMap::new();
            for (index, document) in documents.iter().enumerate() {
                for value in document.lookup(path) {
                    if value.is_empty() {
                        continue;
                    }
                    let Some(literal) = value.as_literal() else {
                        continue;
                    };
                    let entry = values.entry(literal).or_default();
                    entry.count += 1;
                    if entry.documents.last() != Some(&index) {
                        entry.documents.push(index);
                    }
                }
            }
            identifiers.insert(id, values);
        }

        Self {
            identifiers,
            len: documents.len(),
        }
    }

    /// Number of documents in the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true for an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the documents whose field holds `value`, ascending.
    pub fn holders(&self, field: FieldId, value: &str) -> &[usize] {
        self.occurrences(field, value)
            .map(|occurrences| occurrences.documents.as_slice())
            .unwrap_or_default()
    }

    /// Number of times `value` occurs in the field across the sequence,
    /// repeats within one document included.
    pub fn count(&self, field: FieldId, value: &str) -> usize {
        self.occurrences(field, value)
            .map_or(0, |occurrences| occurrences.count)
    }

    fn occurrences(&self, field: FieldId, value: &str) -> Option<&Occurrences> {
        self.identifiers
            .get(&field)
            .and_then(|values| values.get(value))
    }
}

/// Position of a document within its sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequencePosition<'a> {
    /// Shared sequence context
    pub context: &'a SequenceContext,
    /// Index of the document being validated
    pub index: usize,
}

/// One occurrence of a field in a document.
#[derive(Debug)]
struct Instance<'d> {
    /// Path with list indices (`Characters[1].Weapon`)
    path: String,
    value: Option<&'d SceneValue>,
}

impl Instance<'_> {
    fn is_present(&self) -> bool {
        self.value.is_some_and(|value| !value.is_empty())
    }
}

/// Every slot a field occupies in a document, one per enclosing object.
///
/// A top-level field has exactly one slot. A nested field has one slot per
/// present parent object, or per object element when the parent is a list.
fn instances<'d>(
    schema: &SchemaModel,
    node: &FieldNode,
    document: &'d SceneDocument,
) -> Vec<Instance<'d>> {
    let Some(parent) = node.parent else {
        return vec![Instance {
            path: node.path.clone(),
            value: document.get(&node.name),
        }];
    };

    let mut out = Vec::new();
    for holder in instances(schema, schema.node(parent), document) {
        let Some(value) = holder.value.filter(|value| !value.is_empty()) else {
            continue;
        };
        match value {
            SceneValue::Object(map) => out.push(Instance {
                path: format!("{}.{}", holder.path, node.name),
                value: map.get(&node.name),
            }),
            SceneValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if let SceneValue::Object(map) = item {
                        out.push(Instance {
                            path: format!("{}[{}].{}", holder.path, index, node.name),
                            value: map.get(&node.name),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Evaluates a visibility condition against a document.
pub fn evaluate_condition(condition: &Condition, document: &SceneDocument) -> bool {
    match condition {
        Condition::Present(field) => document.is_present(field),
        Condition::Equals { field, value } => document
            .lookup(field)
            .iter()
            .any(|v| v.as_literal().as_deref() == Some(value.as_str())),
        Condition::OneOf { field, values } => document.lookup(field).iter().any(|v| {
            v.as_literal()
                .is_some_and(|literal| values.iter().any(|candidate| *candidate == literal))
        }),
        Condition::All(items) => items.iter().all(|item| evaluate_condition(item, document)),
        Condition::Any(items) => items.iter().any(|item| evaluate_condition(item, document)),
        Condition::Not(inner) => !evaluate_condition(inner, document),
    }
}

/// Consistency rules for one document.
pub struct ConsistencyEngine<'a> {
    schema: &'a SchemaModel,
    options: &'a ValidationOptions,
}

impl<'a> ConsistencyEngine<'a> {
    /// Creates an engine over a loaded schema.
    pub fn new(schema: &'a SchemaModel, options: &'a ValidationOptions) -> Self {
        Self { schema, options }
    }

    /// Evaluates every rule for a document, fields in dependency order.
    ///
    /// Without a sequence position, uniqueness and reference rules are skipped.
    pub fn evaluate(
        &self,
        document: &SceneDocument,
        position: Option<SequencePosition<'_>>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        for node in self.schema.evaluation_order() {
            let slots = instances(self.schema, node, document);

            for slot in slots.iter().filter(|slot| !slot.is_present()) {
                self.conditional_requirement(node, slot, document, &mut findings);
            }

            let present: Vec<&Instance<'_>> =
                slots.iter().filter(|slot| slot.is_present()).collect();
            if present.is_empty() {
                continue;
            }

            if let Some(position) = position {
                for slot in &present {
                    if node.unique {
                        self.uniqueness(node, slot, position, &mut findings);
                    }
                    if let Some(target) = node.references {
                        self.reference(target, slot, position, &mut findings);
                    }
                }
            }

            if self.options.include_advisories {
                for text in &node.advisories {
                    findings.push(Finding::warning(
                        RuleId::AdvisoryRestriction,
                        &node.path,
                        text.as_str(),
                    ));
                }
            }

            if self.options.check_dependency_coverage {
                for dep in &node.dependencies {
                    let dep = self.schema.node(*dep);
                    if !document.is_present(&dep.path) {
                        findings.push(Finding::warning(
                            RuleId::UnsatisfiedDependency,
                            &node.path,
                            format!("depends on '{}', which is absent", dep.path),
                        ));
                    }
                }
            }
        }

        findings
    }

    fn conditional_requirement(
        &self,
        node: &FieldNode,
        slot: &Instance<'_>,
        document: &SceneDocument,
        findings: &mut Vec<Finding>,
    ) {
        let Visibility::Conditional(Some(condition)) = &node.visibility else {
            return;
        };
        if node.required && evaluate_condition(condition, document) {
            findings.push(Finding::error(
                RuleId::MissingRequired,
                slot.path.as_str(),
                "required value is missing while its visibility condition holds",
            ));
        }
    }

    fn uniqueness(
        &self,
        node: &FieldNode,
        slot: &Instance<'_>,
        position: SequencePosition<'_>,
        findings: &mut Vec<Finding>,
    ) {
        for literal in literals(slot.value) {
            let holders = position.context.holders(node.id, &literal);
            let message = if holders.len() > 1 {
                format!(
                    "identifier '{}' is used by scenes {}",
                    literal,
                    join(holders)
                )
            } else if position.context.count(node.id, &literal) > 1 {
                format!(
                    "identifier '{}' is repeated within scene {}",
                    literal, position.index
                )
            } else {
                continue;
            };

            findings.push(
                Finding::error(RuleId::DuplicateIdentifier, slot.path.as_str(), message)
                    .with_related(holders.to_vec()),
            );
        }
    }

    fn reference(
        &self,
        target: FieldId,
        slot: &Instance<'_>,
        position: SequencePosition<'_>,
        findings: &mut Vec<Finding>,
    ) {
        let target_path = &self.schema.node(target).path;

        for literal in literals(slot.value) {
            let others: Vec<usize> = position
                .context
                .holders(target, &literal)
                .iter()
                .copied()
                .filter(|index| *index != position.index)
                .collect();

            if others.is_empty() {
                findings.push(Finding::error(
                    RuleId::DanglingReference,
                    slot.path.as_str(),
                    format!(
                        "'{}' does not match the {} of any other scene",
                        literal, target_path
                    ),
                ));
            } else if !self.options.allow_forward_references
                && others.iter().all(|index| *index > position.index)
            {
                findings.push(
                    Finding::error(
                        RuleId::ForwardReference,
                        slot.path.as_str(),
                        format!(
                            "'{}' refers to a later scene ({}) and forward references are disabled",
                            literal,
                            join(&others)
                        ),
                    )
                    .with_related(others),
                );
            }
        }
    }
}

/// Distinct non-empty literals of a slot value, lists flattened.
fn literals(value: Option<&SceneValue>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut pending: Vec<&SceneValue> = value.into_iter().collect();
    while let Some(value) = pending.pop() {
        match value {
            SceneValue::List(items) => pending.extend(items.iter().rev()),
            value if value.is_empty() => {}
            value => {
                if let Some(literal) = value.as_literal() {
                    if !out.contains(&literal) {
                        out.push(literal);
                    }
                }
            }
        }
    }
    out
}

fn join(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_schema;
    use pretty_assertions::assert_eq;
    use scene_core::{FieldBuilder, FieldConstraint};

    fn schema() -> SchemaModel {
        let raw = vec![
            FieldBuilder::new("SceneID", "string")
                .required(true)
                .restriction("No duplicates across timeline")
                .build(),
            FieldBuilder::new("EchoScene", "string")
                .restriction("Referenced SceneID must exist within the full scene dataset.")
                .restriction("Should not reference future scenes unless intentional.")
                .build(),
            FieldBuilder::new("Camera", "object")
                .subfield(FieldBuilder::new("Motion", "string").build())
                .build(),
            FieldBuilder::new("Stabilizer", "string")
                .required(true)
                .visible_when(Condition::Equals {
                    field: "Motion".to_string(),
                    value: "Handheld".to_string(),
                })
                .build(),
            FieldBuilder::new("Style", "string")
                .restriction("Avoid mixing Filmic and Stylised styles.")
                .depends_on("Camera")
                .build(),
        ];
        load_schema(&raw).unwrap()
    }

    fn scene(id: &str) -> SceneDocument {
        SceneDocument::new().with("SceneID", id)
    }

    fn evaluate_all(
        schema: &SchemaModel,
        options: &ValidationOptions,
        documents: &[SceneDocument],
    ) -> Vec<Finding> {
        let context = SequenceContext::build(schema, documents);
        let engine = ConsistencyEngine::new(schema, options);
        documents
            .iter()
            .enumerate()
            .flat_map(|(index, document)| {
                engine
                    .evaluate(
                        document,
                        Some(SequencePosition {
                            context: &context,
                            index,
                        }),
                    )
                    .into_iter()
                    .map(move |f| f.in_document(index))
            })
            .collect()
    }

    #[test]
    fn test_context_holders() {
        let schema = schema();
        let documents = vec![scene("a"), scene("b"), scene("a")];
        let context = SequenceContext::build(&schema, &documents);
        let id = schema.lookup("SceneID").unwrap().id;

        assert_eq!(context.len(), 3);
        assert_eq!(context.holders(id, "a"), &[0, 2]);
        assert_eq!(context.holders(id, "b"), &[1]);
        assert!(context.holders(id, "c").is_empty());
    }

    #[test]
    fn test_duplicate_identifier_lists_every_holder() {
        let schema = schema();
        let options = ValidationOptions::new();
        let findings = evaluate_all(&schema, &options, &[scene("a"), scene("b"), scene("a")]);

        let duplicates: Vec<(Option<usize>, Vec<usize>)> = findings
            .iter()
            .filter(|f| f.rule_id == RuleId::DuplicateIdentifier)
            .map(|f| (f.document_index, f.related_documents.clone()))
            .collect();
        assert_eq!(
            duplicates,
            vec![(Some(0), vec![0, 2]), (Some(2), vec![0, 2])]
        );
    }

    #[test]
    fn test_reference_rules() {
        let schema = schema();
        let documents = vec![
            scene("a").with("EchoScene", "b"),
            scene("b").with("EchoScene", "a"),
            scene("c").with("EchoScene", "zzz"),
            scene("d").with("EchoScene", "d"),
        ];

        let strict = evaluate_all(&schema, &ValidationOptions::new(), &documents);
        let rules: Vec<(Option<usize>, RuleId)> =
            strict.iter().map(|f| (f.document_index, f.rule_id)).collect();
        assert_eq!(
            rules,
            vec![
                (Some(0), RuleId::ForwardReference),
                (Some(2), RuleId::DanglingReference),
                (Some(3), RuleId::DanglingReference),
            ]
        );

        let lenient = evaluate_all(
            &schema,
            &ValidationOptions::new().with_forward_references(true),
            &documents,
        );
        assert!(lenient
            .iter()
            .all(|f| f.rule_id != RuleId::ForwardReference));
    }

    #[test]
    fn test_single_document_skips_sequence_rules() {
        let schema = schema();
        let options = ValidationOptions::new();
        let engine = ConsistencyEngine::new(&schema, &options);

        let findings = engine.evaluate(&scene("a").with("EchoScene", "missing"), None);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_conditional_requirement() {
        let schema = schema();
        let options = ValidationOptions::new();
        let engine = ConsistencyEngine::new(&schema, &options);

        let camera: scene_core::SceneValue = serde_json::json!({ "Motion": "Handheld" }).into();
        let handheld = scene("a").with("Camera", camera);
        let findings = engine.evaluate(&handheld, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::MissingRequired);
        assert_eq!(findings[0].field_path, "Stabilizer");

        let satisfied = handheld.clone().with("Stabilizer", "Gimbal");
        assert!(engine.evaluate(&satisfied, None).is_empty());

        let static_shot = scene("b");
        assert!(engine.evaluate(&static_shot, None).is_empty());
    }

    #[test]
    fn test_advisories_only_for_present_fields() {
        let schema = schema();
        let options = ValidationOptions::new();
        let engine = ConsistencyEngine::new(&schema, &options);

        assert!(engine.evaluate(&scene("a"), None).is_empty());

        let findings = engine.evaluate(&scene("a").with("Style", "Filmic"), None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::AdvisoryRestriction);
        assert_eq!(
            findings[0].message,
            "Avoid mixing Filmic and Stylised styles."
        );

        let quiet = ValidationOptions::new().with_advisories(false);
        let engine = ConsistencyEngine::new(&schema, &quiet);
        assert!(engine.evaluate(&scene("a").with("Style", "Filmic"), None).is_empty());
    }

    #[test]
    fn test_dependency_coverage() {
        let schema = schema();
        let options = ValidationOptions::new()
            .with_advisories(false)
            .with_dependency_coverage(true);
        let engine = ConsistencyEngine::new(&schema, &options);

        let findings = engine.evaluate(&scene("a").with("Style", "Filmic"), None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::UnsatisfiedDependency);
        assert_eq!(findings[0].field_path, "Style");
    }

    #[test]
    fn test_condition_operators() {
        let document = scene("a").with("Mood", "Calm");
        let present = Condition::Present("Mood".to_string());
        let one_of = Condition::OneOf {
            field: "Mood".to_string(),
            values: vec!["Tense".to_string(), "Calm".to_string()],
        };

        assert!(evaluate_condition(&present, &document));
        assert!(evaluate_condition(&one_of, &document));
        assert!(!evaluate_condition(
            &Condition::Not(Box::new(present.clone())),
            &document
        ));
        assert!(evaluate_condition(
            &Condition::All(vec![present.clone(), one_of.clone()]),
            &document
        ));
        assert!(!evaluate_condition(
            &Condition::Any(vec![Condition::Present("Weather".to_string())]),
            &document
        ));
    }

    fn cast_schema() -> SchemaModel {
        let raw = vec![
            FieldBuilder::new("SceneID", "string").required(true).build(),
            FieldBuilder::new("Mood", "string").build(),
            FieldBuilder::new("Characters", "object")
                .subfield(FieldBuilder::new("Name", "string").build())
                .subfield(
                    FieldBuilder::new("Weapon", "string")
                        .required(true)
                        .visible_when(Condition::Equals {
                            field: "Mood".to_string(),
                            value: "Battle".to_string(),
                        })
                        .build(),
                )
                .build(),
            FieldBuilder::new("TriggerEvents", "array")
                .subfield(
                    FieldBuilder::new("EventID", "string")
                        .constraint(FieldConstraint::Unique)
                        .build(),
                )
                .subfield(
                    FieldBuilder::new("Recalls", "string")
                        .constraint(FieldConstraint::References {
                            target: "SceneID".to_string(),
                        })
                        .build(),
                )
                .build(),
        ];
        load_schema(&raw).unwrap()
    }

    fn with_json(document: SceneDocument, name: &str, value: serde_json::Value) -> SceneDocument {
        document.with(name, scene_core::SceneValue::from(value))
    }

    fn paths(findings: &[Finding], rule: RuleId) -> Vec<(Option<usize>, String)> {
        findings
            .iter()
            .filter(|f| f.rule_id == rule)
            .map(|f| (f.document_index, f.field_path.clone()))
            .collect()
    }

    #[test]
    fn test_conditional_requirement_per_list_element() {
        let schema = cast_schema();
        let options = ValidationOptions::new();
        let engine = ConsistencyEngine::new(&schema, &options);

        let battle = with_json(
            scene("a").with("Mood", "Battle"),
            "Characters",
            serde_json::json!([
                { "Name": "A", "Weapon": "Sword" },
                { "Name": "B" }
            ]),
        );
        let findings = engine.evaluate(&battle, None);
        assert_eq!(
            paths(&findings, RuleId::MissingRequired),
            vec![(None, "Characters[1].Weapon".to_string())]
        );

        let calm = with_json(
            scene("a").with("Mood", "Calm"),
            "Characters",
            serde_json::json!([{ "Name": "B" }]),
        );
        assert!(engine.evaluate(&calm, None).is_empty());
    }

    #[test]
    fn test_conditional_requirement_needs_present_parent() {
        let schema = cast_schema();
        let options = ValidationOptions::new();
        let engine = ConsistencyEngine::new(&schema, &options);

        let no_cast = scene("a").with("Mood", "Battle");
        assert!(engine.evaluate(&no_cast, None).is_empty());

        let single = with_json(
            scene("a").with("Mood", "Battle"),
            "Characters",
            serde_json::json!({ "Name": "Solo" }),
        );
        assert_eq!(
            paths(&engine.evaluate(&single, None), RuleId::MissingRequired),
            vec![(None, "Characters.Weapon".to_string())]
        );
    }

    #[test]
    fn test_nested_identifier_paths_are_indexed() {
        let schema = cast_schema();
        let options = ValidationOptions::new();
        let documents = vec![
            with_json(
                scene("a"),
                "TriggerEvents",
                serde_json::json!([
                    { "EventID": "bell" },
                    { "EventID": "bell" },
                    { "EventID": "storm", "Recalls": "b" }
                ]),
            ),
            with_json(
                scene("b"),
                "TriggerEvents",
                serde_json::json!([
                    { "EventID": "storm" },
                    { "EventID": "dawn", "Recalls": "nowhere" }
                ]),
            ),
        ];

        let findings = evaluate_all(&schema, &options, &documents);
        assert_eq!(
            paths(&findings, RuleId::DuplicateIdentifier),
            vec![
                (Some(0), "TriggerEvents[0].EventID".to_string()),
                (Some(0), "TriggerEvents[1].EventID".to_string()),
                (Some(0), "TriggerEvents[2].EventID".to_string()),
                (Some(1), "TriggerEvents[0].EventID".to_string()),
            ]
        );
        assert!(findings.iter().any(|f| f.message == "identifier 'bell' is repeated within scene 0"));
        assert_eq!(
            paths(&findings, RuleId::ForwardReference),
            vec![(Some(0), "TriggerEvents[2].Recalls".to_string())]
        );
        assert_eq!(
            paths(&findings, RuleId::DanglingReference),
            vec![(Some(1), "TriggerEvents[1].Recalls".to_string())]
        );
    }
}
