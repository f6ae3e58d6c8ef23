//! Error types for scene schemas.
//!
//! Structural schema defects are fatal to loading: a broken schema cannot
//! meaningfully validate anything. Content problems in scene documents are
//! never errors of this kind; they are reported as `Finding`s.

use thiserror::Error;

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Structural defect in a scene schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields share the same dotted path
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Type tag is not one of string, object, boolean, array
    #[error("Unknown type '{type_tag}' for field '{field}'")]
    UnknownType {
        /// Field path
        field: String,
        /// Offending type tag
        type_tag: String,
    },

    /// Subfields are declared where they cannot apply, or a name is unusable
    #[error("Malformed subfields in field '{field}': {message}")]
    MalformedSubfields {
        /// Field path
        field: String,
        /// Description of the defect
        message: String,
    },

    /// Dependency names a path that does not exist
    #[error("Field '{field}' depends on unknown path '{reference}'")]
    DanglingDependency {
        /// Field path
        field: String,
        /// Unresolved reference
        reference: String,
    },

    /// Dependency names a leaf shared by several fields
    #[error("Field '{field}' depends on ambiguous name '{reference}' (candidates: {})", candidates.join(", "))]
    AmbiguousDependency {
        /// Field path
        field: String,
        /// Ambiguous reference
        reference: String,
        /// Every matching path
        candidates: Vec<String>,
    },

    /// Dependencies form a cycle
    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    DependencyCycle {
        /// Paths along the cycle, first path repeated at the end
        cycle: Vec<String>,
    },

    /// Declared regular expression does not compile
    #[error("Invalid pattern for field '{field}': {message}")]
    InvalidPattern {
        /// Field path
        field: String,
        /// Compiler message
        message: String,
    },

    /// Visibility condition is unusable
    #[error("Invalid visibility condition for field '{field}': {message}")]
    InvalidCondition {
        /// Field path
        field: String,
        /// Description of the defect
        message: String,
    },
}

impl SchemaError {
    /// Creates a malformed subfields error.
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSubfields {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a dangling dependency error.
    pub fn dangling(field: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::DanglingDependency {
            field: field.into(),
            reference: reference.into(),
        }
    }
}
