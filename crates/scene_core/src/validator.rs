//! Validation traits and types for scene documents.
//!
//! This module defines the trait implemented by validation engines, the
//! options that tune a validation run and the report it produces.

use crate::{Finding, SceneDocument, Severity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Core trait for validating scene documents against a loaded schema.
///
/// # Example
///
/// ```rust
/// use scene_core::{DocumentValidator, Finding, SceneDocument, ValidationReport};
///
/// struct AcceptAll;
///
/// impl DocumentValidator for AcceptAll {
///     fn validate_document(&self, _document: &SceneDocument) -> Vec<Finding> {
///         Vec::new()
///     }
///
///     fn validate_sequence(&self, documents: &[SceneDocument]) -> ValidationReport {
///         let mut report = ValidationReport::success();
///         report.stats.documents_validated = documents.len();
///         report
///     }
/// }
/// ```
pub trait DocumentValidator: Send + Sync {
    /// Validates a single document in isolation.
    ///
    /// Sequence-level rules (uniqueness, reference resolution) are skipped.
    fn validate_document(&self, document: &SceneDocument) -> Vec<Finding>;

    /// Validates an ordered sequence of documents sharing one identifier namespace.
    fn validate_sequence(&self, documents: &[SceneDocument]) -> ValidationReport;
}

/// Cooperative cancellation flag, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for a validation run.
///
/// Options can be deserialized from a configuration file; the cancellation
/// flag is runtime-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidationOptions {
    /// Accept back-references to later scenes
    pub allow_forward_references: bool,

    /// Worker count for per-document validation (`None` uses the default pool)
    pub workers: Option<usize>,

    /// Fail the report on warnings too
    pub strict: bool,

    /// Surface natural-language restrictions as warnings
    pub include_advisories: bool,

    /// Warn when a present field's declared dependency is absent
    pub check_dependency_coverage: bool,

    /// Warn about keys that the schema does not declare
    pub report_unknown_fields: bool,

    /// Cooperative cancellation
    #[serde(skip)]
    pub cancellation: CancellationFlag,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            allow_forward_references: false,
            workers: None,
            strict: false,
            include_advisories: true,
            check_dependency_coverage: false,
            report_unknown_fields: true,
            cancellation: CancellationFlag::new(),
        }
    }
}

impl ValidationOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the forward reference policy.
    pub fn with_forward_references(mut self, allow: bool) -> Self {
        self.allow_forward_references = allow;
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enables or disables advisory restriction warnings.
    pub fn with_advisories(mut self, include: bool) -> Self {
        self.include_advisories = include;
        self
    }

    /// Enables or disables dependency coverage warnings.
    pub fn with_dependency_coverage(mut self, check: bool) -> Self {
        self.check_dependency_coverage = check;
        self
    }

    /// Enables or disables unknown field warnings.
    pub fn with_unknown_fields(mut self, report: bool) -> Self {
        self.report_unknown_fields = report;
        self
    }

    /// Shares a cancellation flag with the caller.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }
}

/// Report of a validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether validation passed overall
    pub passed: bool,

    /// Deduplicated findings in deterministic order
    pub findings: Vec<Finding>,

    /// Validation statistics
    pub stats: ValidationStats,

    /// Whether the run stopped early on request
    pub cancelled: bool,
}

/// Statistics about validation execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    /// Number of documents validated
    pub documents_validated: usize,

    /// Number of field values checked
    pub fields_checked: usize,

    /// Number of error findings
    pub errors: usize,

    /// Number of warning findings
    pub warnings: usize,

    /// Validation duration in milliseconds
    #[serde(skip)]
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Creates a new successful validation report.
    pub fn success() -> Self {
        Self {
            passed: true,
            findings: Vec::new(),
            stats: ValidationStats::default(),
            cancelled: false,
        }
    }

    /// Builds a report from aggregated findings.
    pub fn from_findings(findings: Vec<Finding>, strict: bool) -> Self {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = findings.len() - errors;
        let passed = errors == 0 && (!strict || warnings == 0);

        Self {
            passed,
            findings,
            stats: ValidationStats {
                errors,
                warnings,
                ..ValidationStats::default()
            },
            cancelled: false,
        }
    }

    /// Error findings in report order.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Warning findings in report order.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }
}
