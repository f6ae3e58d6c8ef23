//! # Scene Schema Validator
//!
//! Validation engine for scene documents.
//!
//! This crate loads a raw scene schema into an indexed model, resolves its
//! dependency graph and validates scene documents and sequences against it:
//!
//! - **Loader**: flattens the field tree into an arena with dotted paths and
//!   classifies restrictions into structured predicates or advisories
//! - **Dependency graph**: detects cycles and orders fields after their
//!   dependencies
//! - **Field validation**: type, required-ness, options and formats, recursive
//!   over subfields
//! - **Consistency rules**: uniqueness, reference resolution, conditional
//!   requirement and advisory restrictions across a sequence
//! - **Aggregation**: deduplicated findings in deterministic order
//!
//! ## Example
//!
//! ```rust
//! use scene_core::{FieldBuilder, RuleId, SceneDocument};
//! use scene_validator::{load_schema, validate_sequence};
//!
//! let raw = vec![
//!     FieldBuilder::new("SceneID", "string").required(true).build(),
//!     FieldBuilder::new("EchoScene", "string")
//!         .restriction("Referenced SceneID must exist within the full scene dataset.")
//!         .build(),
//! ];
//! let schema = load_schema(&raw).unwrap();
//!
//! let scenes = vec![
//!     SceneDocument::new().with("SceneID", "intro"),
//!     SceneDocument::new().with("SceneID", "outro").with("EchoScene", "missing"),
//! ];
//!
//! let findings = validate_sequence(&schema, &scenes);
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].rule_id, RuleId::DanglingReference);
//! assert_eq!(findings[0].document_index, Some(1));
//! ```

pub mod consistency;
pub mod engine;
pub mod field;
pub mod graph;
pub mod loader;
pub mod model;
pub mod patterns;
pub mod report;
pub mod restrictions;

pub use consistency::{ConsistencyEngine, SequenceContext, SequencePosition, evaluate_condition};
pub use engine::{SceneValidator, validate_document, validate_sequence, validate_sequence_with};
pub use field::{FieldPass, FieldValidator};
pub use graph::DependencyGraph;
pub use loader::load_schema;
pub use model::*;
pub use patterns::{CompiledPattern, PatternRule};
pub use report::{aggregate, rule_counts};
pub use restrictions::{Predicate, Restriction, classify_restriction, pattern_from_format};
