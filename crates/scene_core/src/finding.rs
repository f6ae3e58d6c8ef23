//! Findings reported by the validation engine.
//!
//! A `Finding` is one validation or consistency issue, located by document
//! index and dotted field path. Findings are data, never faults: a partially
//! invalid document yields every independent finding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding.
///
/// Errors order before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document violates a hard rule
    Error,
    /// Advisory issue that does not fail validation on its own
    Warning,
}

impl Severity {
    /// Lowercase name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the rule that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Value has the wrong type
    TypeMismatch,
    /// Required value missing or empty
    MissingRequired,
    /// Value not in the declared option set
    OutOfEnum,
    /// Value does not match a declared pattern
    FormatViolation,
    /// Key not declared in the schema
    UnknownField,
    /// Identifier repeated within a sequence
    DuplicateIdentifier,
    /// Back-reference names no other scene in the sequence
    DanglingReference,
    /// Back-reference names a later scene while forward references are disabled
    ForwardReference,
    /// Natural-language restriction surfaced for the author
    AdvisoryRestriction,
    /// Field present while a declared dependency is absent
    UnsatisfiedDependency,
}

impl RuleId {
    /// Stable textual identifier of the rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::TypeMismatch => "TypeMismatch",
            RuleId::MissingRequired => "MissingRequired",
            RuleId::OutOfEnum => "OutOfEnum",
            RuleId::FormatViolation => "FormatViolation",
            RuleId::UnknownField => "UnknownField",
            RuleId::DuplicateIdentifier => "DuplicateIdentifier",
            RuleId::DanglingReference => "DanglingReference",
            RuleId::ForwardReference => "ForwardReference",
            RuleId::AdvisoryRestriction => "AdvisoryRestriction",
            RuleId::UnsatisfiedDependency => "UnsatisfiedDependency",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported validation or consistency issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Error or warning
    pub severity: Severity,

    /// Rule that produced the finding
    pub rule_id: RuleId,

    /// Dotted path of the affected field (list elements as `Name[i]`)
    pub field_path: String,

    /// Index of the document within its sequence, if any
    pub document_index: Option<usize>,

    /// Human-readable description
    pub message: String,

    /// Other documents involved (e.g. every holder of a duplicated identifier)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_documents: Vec<usize>,
}

impl Finding {
    /// Creates an error finding.
    pub fn error(rule_id: RuleId, field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            rule_id,
            field_path: field_path.into(),
            document_index: None,
            message: message.into(),
            related_documents: Vec::new(),
        }
    }

    /// Creates a warning finding.
    pub fn warning(
        rule_id: RuleId,
        field_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule_id, field_path, message)
        }
    }

    /// Attaches the document index.
    pub fn in_document(mut self, index: usize) -> Self {
        self.document_index = Some(index);
        self
    }

    /// Attaches the indices of related documents.
    pub fn with_related(mut self, documents: Vec<usize>) -> Self {
        self.related_documents = documents;
        self
    }

    /// Returns true for error findings.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.document_index {
            write!(f, "[scene {}] ", index)?;
        }
        write!(
            f,
            "{} {} at '{}': {}",
            self.severity, self.rule_id, self.field_path, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error < Severity::Warning);
    }

    #[test]
    fn test_display() {
        let finding = Finding::error(RuleId::MissingRequired, "SceneID", "value is required")
            .in_document(2);
        assert_eq!(
            finding.to_string(),
            "[scene 2] error MissingRequired at 'SceneID': value is required"
        );
    }

    #[test]
    fn test_serialize_camel_case() {
        let finding = Finding::warning(RuleId::OutOfEnum, "Dialogue.Tone", "not listed")
            .in_document(0);
        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["severity"], "warning");
        assert_eq!(json["ruleId"], "OutOfEnum");
        assert_eq!(json["fieldPath"], "Dialogue.Tone");
        assert_eq!(json["documentIndex"], 0);
        assert!(json.get("relatedDocuments").is_none());
    }
}
