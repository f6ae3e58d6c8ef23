//! Scene validation engine.
//!
//! Combines the per-field pass and the consistency rules for each document,
//! runs documents of a sequence on a bounded worker pool and aggregates the
//! findings into a deterministic report.

use crate::consistency::{ConsistencyEngine, SequenceContext, SequencePosition};
use crate::field::FieldValidator;
use crate::report::aggregate;
use crate::SchemaModel;
use rayon::prelude::*;
use scene_core::{DocumentValidator, Finding, SceneDocument, ValidationOptions, ValidationReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Findings for one document, tagged with its index.
struct DocumentOutcome {
    findings: Vec<Finding>,
    fields_checked: usize,
}

/// Validation engine bound to a loaded schema.
///
/// # Example
///
/// ```rust
/// use scene_core::{DocumentValidator, FieldBuilder, SceneDocument, ValidationOptions};
/// use scene_validator::{load_schema, SceneValidator};
///
/// let raw = vec![
///     FieldBuilder::new("SceneID", "string")
///         .required(true)
///         .restriction("No duplicates across timeline")
///         .build(),
/// ];
/// let validator = SceneValidator::new(load_schema(&raw).unwrap())
///     .with_options(ValidationOptions::new().with_workers(2));
///
/// let scenes = vec![
///     SceneDocument::new().with("SceneID", "intro"),
///     SceneDocument::new().with("SceneID", "intro"),
/// ];
/// let report = validator.validate_sequence(&scenes);
/// assert!(!report.passed);
/// assert_eq!(report.stats.errors, 2);
/// ```
#[derive(Debug, Clone)]
pub struct SceneValidator {
    schema: Arc<SchemaModel>,
    options: ValidationOptions,
}

impl SceneValidator {
    /// Creates a validator with default options.
    pub fn new(schema: SchemaModel) -> Self {
        Self::from_shared(Arc::new(schema))
    }

    /// Creates a validator over a schema shared with other validators.
    pub fn from_shared(schema: Arc<SchemaModel>) -> Self {
        Self {
            schema,
            options: ValidationOptions::default(),
        }
    }

    /// Sets the validation options.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// The loaded schema.
    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    /// The validation options.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates one document, optionally within a sequence.
    pub fn validate_document_in(
        &self,
        document: &SceneDocument,
        position: Option<SequencePosition<'_>>,
    ) -> Vec<Finding> {
        aggregate(check_document(&self.schema, &self.options, document, position).findings)
    }
}

impl DocumentValidator for SceneValidator {
    fn validate_document(&self, document: &SceneDocument) -> Vec<Finding> {
        self.validate_document_in(document, None)
    }

    fn validate_sequence(&self, documents: &[SceneDocument]) -> ValidationReport {
        run_sequence(&self.schema, &self.options, documents)
    }
}

/// Validates one document against a schema with default options.
///
/// With a sequence position, uniqueness and reference rules are evaluated
/// against the sequence and findings carry the document index.
pub fn validate_document(
    schema: &SchemaModel,
    document: &SceneDocument,
    position: Option<SequencePosition<'_>>,
) -> Vec<Finding> {
    aggregate(check_document(schema, &ValidationOptions::default(), document, position).findings)
}

/// Validates an ordered sequence against a schema with default options.
pub fn validate_sequence(schema: &SchemaModel, documents: &[SceneDocument]) -> Vec<Finding> {
    run_sequence(schema, &ValidationOptions::default(), documents).findings
}

/// Validates an ordered sequence with explicit options.
pub fn validate_sequence_with(
    schema: &SchemaModel,
    documents: &[SceneDocument],
    options: &ValidationOptions,
) -> ValidationReport {
    run_sequence(schema, options, documents)
}

fn check_document(
    schema: &SchemaModel,
    options: &ValidationOptions,
    document: &SceneDocument,
    position: Option<SequencePosition<'_>>,
) -> DocumentOutcome {
    let pass = FieldValidator::new(schema)
        .with_unknown_fields(options.report_unknown_fields)
        .validate_document(document);

    let mut findings = pass.findings;
    findings.extend(ConsistencyEngine::new(schema, options).evaluate(document, position));

    if let Some(position) = position {
        findings = findings
            .into_iter()
            .map(|finding| finding.in_document(position.index))
            .collect();
    }

    DocumentOutcome {
        findings,
        fields_checked: pass.fields_checked,
    }
}

fn run_sequence(
    schema: &SchemaModel,
    options: &ValidationOptions,
    documents: &[SceneDocument],
) -> ValidationReport {
    let start = Instant::now();
    let context = SequenceContext::build(schema, documents);

    let job = |(index, document): (usize, &SceneDocument)| -> Option<DocumentOutcome> {
        if options.cancellation.is_cancelled() {
            return None;
        }
        let position = SequencePosition {
            context: &context,
            index,
        };
        Some(check_document(schema, options, document, Some(position)))
    };

    let outcomes: Vec<Option<DocumentOutcome>> = match options.workers {
        Some(1) => documents.iter().enumerate().map(&job).collect(),
        Some(workers) => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => {
                debug!("Validating {} documents on {} workers", documents.len(), workers);
                pool.install(|| documents.par_iter().enumerate().map(&job).collect())
            }
            Err(e) => {
                warn!("Failed to build worker pool, validating sequentially: {}", e);
                documents.iter().enumerate().map(&job).collect()
            }
        },
        None => documents.par_iter().enumerate().map(&job).collect(),
    };

    let mut findings = Vec::new();
    let mut validated = 0;
    let mut fields_checked = 0;
    for outcome in outcomes.into_iter().flatten() {
        validated += 1;
        fields_checked += outcome.fields_checked;
        findings.extend(outcome.findings);
    }

    let cancelled = validated < documents.len();
    if cancelled {
        info!(
            "Validation cancelled after {} of {} documents",
            validated,
            documents.len()
        );
    }

    let mut report = ValidationReport::from_findings(aggregate(findings), options.strict);
    report.cancelled = cancelled;
    report.stats.documents_validated = validated;
    report.stats.fields_checked = fields_checked;
    report.stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(
        "Validated {} documents: {} errors, {} warnings",
        validated, report.stats.errors, report.stats.warnings
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_schema;
    use pretty_assertions::assert_eq;
    use scene_core::{CancellationFlag, Condition, FieldBuilder, RuleId, SceneValue};

    fn validator() -> SceneValidator {
        let raw = vec![
            FieldBuilder::new("SceneID", "string")
                .required(true)
                .restriction("No duplicates across timeline")
                .build(),
            FieldBuilder::new("Duration", "string")
                .options(["5s", "10s"])
                .strict_options(true)
                .build(),
        ];
        SceneValidator::new(load_schema(&raw).unwrap())
    }

    #[test]
    fn test_standalone_document_has_no_index() {
        let findings = validator().validate_document(&SceneDocument::new());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::MissingRequired);
        assert_eq!(findings[0].document_index, None);
    }

    #[test]
    fn test_sequence_report_stats() {
        let documents = vec![
            SceneDocument::new().with("SceneID", "a").with("Duration", "5s"),
            SceneDocument::new().with("SceneID", "b").with("Duration", "7s"),
        ];

        let report = validator().validate_sequence(&documents);
        assert!(!report.passed);
        assert!(!report.cancelled);
        assert_eq!(report.stats.documents_validated, 2);
        assert_eq!(report.stats.fields_checked, 4);
        assert_eq!(report.stats.errors, 1);
        assert_eq!(report.findings[0].document_index, Some(1));
        assert_eq!(report.findings[0].field_path, "Duration");
    }

    #[test]
    fn test_empty_sequence_passes() {
        let report = validator().validate_sequence(&[]);
        assert!(report.passed);
        assert!(report.findings.is_empty());
        assert_eq!(report.stats.documents_validated, 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = CancellationFlag::new();
        flag.cancel();
        let validator = validator().with_options(
            ValidationOptions::new()
                .with_workers(1)
                .with_cancellation(flag),
        );

        let report = validator.validate_sequence(&[SceneDocument::new()]);
        assert!(report.cancelled);
        assert_eq!(report.stats.documents_validated, 0);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_strict_mode_fails_on_warnings() {
        let raw = vec![FieldBuilder::new("Mood", "string").options(["Calm"]).build()];
        let schema = load_schema(&raw).unwrap();
        let documents = vec![SceneDocument::new().with("Mood", "Tense")];

        let lenient = validate_sequence_with(&schema, &documents, &ValidationOptions::new());
        assert!(lenient.passed);
        assert_eq!(lenient.stats.warnings, 1);

        let strict = validate_sequence_with(
            &schema,
            &documents,
            &ValidationOptions::new().with_strict(true),
        );
        assert!(!strict.passed);
    }

    #[test]
    fn test_conditional_subfield_checked_in_every_list_element() {
        let raw = vec![
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
        ];
        let schema = load_schema(&raw).unwrap();
        let characters: SceneValue = serde_json::json!([
            { "Name": "A", "Weapon": "Sword" },
            { "Name": "B" }
        ])
        .into();
        let document = SceneDocument::new()
            .with("Mood", "Battle")
            .with("Characters", characters);

        let findings = validate_document(&schema, &document, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::MissingRequired);
        assert_eq!(findings[0].field_path, "Characters[1].Weapon");
    }
}
