//! Raw scene schema records.
//!
//! This module mirrors the external, versioned schema configuration exactly as
//! it is authored: an ordered list of field records with nested subfields and
//! free-form metadata. Nothing here is validated; the loader in
//! `scene_validator` turns these records into an indexed schema model.

use serde::{Deserialize, Serialize};

/// A single field record as it appears in a scene schema file.
///
/// Unrecognised keys (`example`, `roles`, `valueFormats`, `interactions`, ...)
/// are accepted and ignored so that richer authoring files load unchanged.
///
/// # Example
///
/// ```rust
/// use scene_core::RawField;
///
/// let json = r#"{
///     "name": "SceneID",
///     "type": "string",
///     "required": true,
///     "metadata": { "restrictions": ["No whitespace"], "priority": "critical" }
/// }"#;
///
/// let field: RawField = serde_json::from_str(json).unwrap();
/// assert_eq!(field.name, "SceneID");
/// assert!(field.required);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    /// Field name, unique among its siblings
    pub name: String,

    /// Type tag (`string`, `object`, `boolean`, `array`)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-text format description (e.g. "String with unit suffix")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Alternative spelling of the format description used by some records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,

    /// Format description attached directly to a subfield
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_format: Option<String>,

    /// Explicit regular expression every value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Whether a non-empty value must be supplied
    #[serde(default)]
    pub required: bool,

    /// Allowed literal values; empty means unconstrained
    #[serde(default)]
    pub options: Vec<String>,

    /// Accept values outside `options` when they satisfy the field's patterns
    #[serde(default)]
    pub allow_custom: bool,

    /// Explicit strictness of the option list, overriding restriction inference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_options: Option<bool>,

    /// Nested field records for `object` and `array` fields
    #[serde(default, alias = "fields")]
    pub subfields: Vec<RawField>,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Structured predicates declared directly by the schema author
    #[serde(default)]
    pub constraints: Vec<FieldConstraint>,

    /// Cross-field metadata
    #[serde(default)]
    pub metadata: FieldMetadata,
}

/// Cross-field metadata of a field record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Authoring notes, never interpreted
    #[serde(default)]
    pub notes: Vec<String>,

    /// Natural-language restrictions, some of which are mechanically checkable
    #[serde(default)]
    pub restrictions: Vec<String>,

    /// Field paths this field is thematically coupled with
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// What the field is used for
    #[serde(default)]
    pub used_for: Vec<String>,

    /// Priority label (e.g. "critical", "high if used")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Visibility label (e.g. "always", "conditional (only if agents are needed)")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    /// Machine-checkable trigger for conditional visibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<Condition>,
}

/// Structured predicates that can be attached to a field.
///
/// These are the hard-enforced counterparts of natural-language restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Values must be unique across a scene sequence
    Unique,

    /// Values must name the identifier of another scene in the sequence
    References {
        /// Path of the identifier field being referenced
        target: String,
    },

    /// Values must match the regular expression
    Pattern {
        /// Regular expression pattern
        regex: String,
    },

    /// Values must come from the declared option list
    StrictOptions,

    /// The named subfields must be non-empty whenever this field is present
    RequiresSubfields {
        /// Subfield names relative to this field
        fields: Vec<String>,
    },
}

/// Boolean predicate over the values of other fields in the same document.
///
/// # Example
///
/// ```rust
/// use scene_core::Condition;
///
/// let json = r#"{ "all": [ { "present": "Characters" }, { "equals": { "field": "Dialogue.Tone", "value": "Calm" } } ] }"#;
/// let condition: Condition = serde_json::from_str(json).unwrap();
/// assert_eq!(condition.referenced_paths(), vec!["Characters", "Dialogue.Tone"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The field has a non-empty value
    Present(String),

    /// The field's value equals the literal (textual comparison)
    Equals {
        /// Field path
        field: String,
        /// Expected literal
        value: String,
    },

    /// The field's value is one of the literals
    OneOf {
        /// Field path
        field: String,
        /// Accepted literals
        values: Vec<String>,
    },

    /// Every nested condition holds
    All(Vec<Condition>),

    /// At least one nested condition holds
    Any(Vec<Condition>),

    /// The nested condition does not hold
    Not(Box<Condition>),
}

impl Condition {
    /// Returns every field path the condition reads, in declaration order.
    pub fn referenced_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Present(field) => out.push(field),
            Condition::Equals { field, .. } | Condition::OneOf { field, .. } => out.push(field),
            Condition::All(items) | Condition::Any(items) => {
                for item in items {
                    item.collect_paths(out);
                }
            }
            Condition::Not(inner) => inner.collect_paths(out),
        }
    }
}

/// A complete raw schema: the ordered list of top-level field records.
pub type RawSchema = Vec<RawField>;
