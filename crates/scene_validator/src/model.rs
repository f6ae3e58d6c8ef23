//! Normalized schema model.
//!
//! The recursive field tree is stored as a flat arena of `FieldNode`s
//! addressed by `FieldId`, with parent/child links and a dotted-path index.
//! The model is immutable once loaded and is shared read-only by every
//! validation pass.

use crate::CompiledPattern;
use indexmap::IndexMap;
use scene_core::{Condition, SceneValue};
use std::fmt;

/// Index of a field node in the schema arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub(crate) usize);

impl FieldId {
    /// Position of the node in declaration (pre-)order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Text value
    String,
    /// Nested object matching the subfields
    Object,
    /// `true` / `false`
    Boolean,
    /// List of values
    Array,
}

impl FieldType {
    /// Parses a type tag, ignoring case and surrounding whitespace.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "object" => Some(FieldType::Object),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            _ => None,
        }
    }

    /// Lowercase type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Object => "object",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
        }
    }

    /// Whether the type may declare subfields.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Object | FieldType::Array)
    }

    /// Whether a scalar value has this type.
    pub fn accepts_scalar(&self, value: &SceneValue) -> bool {
        matches!(
            (self, value),
            (FieldType::String, SceneValue::String(_)) | (FieldType::Boolean, SceneValue::Bool(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a value outside the declared options is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionPolicy {
    /// Out-of-option values are errors
    Strict,
    /// Out-of-option values are warnings
    Advisory,
}

/// When a field is shown to authors, and therefore when it can be required.
#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    /// Always visible
    Always,
    /// Visible only when the trigger holds; `None` when the trigger is prose only
    Conditional(Option<Condition>),
    /// Free-text guidance with no effect on validation
    Descriptive(String),
}

impl Visibility {
    /// Builds the visibility from the authored label and trigger.
    pub fn from_metadata(label: Option<&str>, trigger: Option<Condition>) -> Self {
        if trigger.is_some() {
            return Visibility::Conditional(trigger);
        }
        match label.map(str::trim) {
            None => Visibility::Always,
            Some(text) if text.eq_ignore_ascii_case("always") => Visibility::Always,
            Some(text) if text.to_lowercase().starts_with("conditional") => {
                Visibility::Conditional(None)
            }
            Some(text) => Visibility::Descriptive(text.to_string()),
        }
    }

    /// Whether required-ness depends on a trigger.
    pub fn is_conditional(&self) -> bool {
        matches!(self, Visibility::Conditional(_))
    }
}

/// Authoring priority of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Priority {
    Critical,
    Essential,
    High,
    Medium,
    Low,
    Optional,
    Contextual,
    Conditional,
    /// Unrecognised label, kept verbatim
    Other(String),
    /// No priority declared
    Unspecified,
}

impl Priority {
    /// Parses a priority label by its leading word ("high if used" is `High`).
    pub fn parse(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Priority::Unspecified;
        };
        let first = label
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match first.as_str() {
            "critical" => Priority::Critical,
            "essential" => Priority::Essential,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            "optional" => Priority::Optional,
            "contextual" => Priority::Contextual,
            "conditional" => Priority::Conditional,
            _ => Priority::Other(label.to_string()),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Critical => "critical",
            Priority::Essential => "essential",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Optional => "optional",
            Priority::Contextual => "contextual",
            Priority::Conditional => "conditional",
            Priority::Other(text) => text.as_str(),
            Priority::Unspecified => "-",
        };
        f.write_str(label)
    }
}

/// One normalized field definition.
#[derive(Debug, Clone)]
pub struct FieldNode {
    /// Arena index
    pub id: FieldId,
    /// Field name
    pub name: String,
    /// Dotted path from the schema root
    pub path: String,
    /// Enclosing field, `None` for top-level fields
    pub parent: Option<FieldId>,
    /// Subfields in declaration order
    pub children: Vec<FieldId>,
    /// Declared type
    pub field_type: FieldType,
    /// Whether a non-empty value is required
    pub required: bool,
    /// Allowed literals, empty when unconstrained
    pub options: Vec<String>,
    /// Treatment of out-of-option values
    pub option_policy: OptionPolicy,
    /// Accept out-of-option values that satisfy every pattern
    pub allow_custom: bool,
    /// Value formats
    pub patterns: Vec<CompiledPattern>,
    /// Values must be unique across a sequence
    pub unique: bool,
    /// Identifier field this field refers back to
    pub references: Option<FieldId>,
    /// Natural-language restrictions surfaced as warnings
    pub advisories: Vec<String>,
    /// Resolved dependencies, in declaration order
    pub dependencies: Vec<FieldId>,
    /// Authoring priority
    pub priority: Priority,
    /// Visibility and its trigger
    pub visibility: Visibility,
    /// Human-readable label
    pub label: Option<String>,
}

/// Indexed, immutable scene schema.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    pub(crate) nodes: Vec<FieldNode>,
    pub(crate) roots: Vec<FieldId>,
    pub(crate) by_path: IndexMap<String, FieldId>,
    pub(crate) order: Vec<FieldId>,
}

impl SchemaModel {
    /// Returns a node by id.
    pub fn node(&self, id: FieldId) -> &FieldNode {
        &self.nodes[id.0]
    }

    /// Every node in declaration (pre-)order.
    pub fn nodes(&self) -> &[FieldNode] {
        &self.nodes
    }

    /// Top-level fields in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &FieldNode> {
        self.roots.iter().map(|id| self.node(*id))
    }

    /// Looks up a field by dotted path.
    pub fn lookup(&self, path: &str) -> Option<&FieldNode> {
        self.by_path.get(path).map(|id| self.node(*id))
    }

    /// Number of field nodes, subfields included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every field after all of its dependencies.
    pub fn evaluation_order(&self) -> impl Iterator<Item = &FieldNode> {
        self.order.iter().map(|id| self.node(*id))
    }

    /// Subfields of a node.
    pub fn children(&self, id: FieldId) -> impl Iterator<Item = &FieldNode> {
        self.node(id).children.iter().map(|child| self.node(*child))
    }

    /// Fields whose values must be unique across a sequence.
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes.iter().filter(|node| node.unique)
    }

    /// Fields that refer back to another scene's identifier.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes.iter().filter(|node| node.references.is_some())
    }
}
