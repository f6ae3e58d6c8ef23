//! Builder pattern for creating raw schema records.
//!
//! This module provides ergonomic builders for constructing field records
//! in code, mostly for tests and embedded schemas.

use crate::{Condition, FieldConstraint, FieldMetadata, RawField};

/// Builder for creating a `RawField`.
///
/// # Example
///
/// ```rust
/// use scene_core::FieldBuilder;
///
/// let field = FieldBuilder::new("Duration", "string")
///     .required(true)
///     .options(["3s", "5s", "10s"])
///     .restriction("Must be one of the predefined durations unless custom allowed")
///     .depends_on("Pacing.Tempo")
///     .build();
///
/// assert_eq!(field.options.len(), 3);
/// assert_eq!(field.metadata.dependencies, vec!["Pacing.Tempo"]);
/// ```
#[derive(Debug, Default)]
pub struct FieldBuilder {
    field: RawField,
}

impl FieldBuilder {
    /// Creates a new field builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name
    /// * `field_type` - Type tag (e.g. "string", "object")
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            field: RawField {
                name: name.into(),
                field_type: field_type.into(),
                ..Default::default()
            },
        }
    }

    /// Sets whether the field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.field.required = required;
        self
    }

    /// Sets the field description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = Some(description.into());
        self
    }

    /// Sets the free-text format description.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.field.format = Some(format.into());
        self
    }

    /// Sets an explicit regular expression.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.field.pattern = Some(pattern.into());
        self
    }

    /// Sets the allowed options.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Accepts custom values that satisfy the field's patterns.
    pub fn allow_custom(mut self, allow: bool) -> Self {
        self.field.allow_custom = allow;
        self
    }

    /// Overrides the strictness of the option list.
    pub fn strict_options(mut self, strict: bool) -> Self {
        self.field.strict_options = Some(strict);
        self
    }

    /// Adds a subfield.
    pub fn subfield(mut self, subfield: RawField) -> Self {
        self.field.subfields.push(subfield);
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.field.tags.push(tag.into());
        self
    }

    /// Adds a structured constraint.
    pub fn constraint(mut self, constraint: FieldConstraint) -> Self {
        self.field.constraints.push(constraint);
        self
    }

    /// Adds a natural-language restriction.
    pub fn restriction(mut self, restriction: impl Into<String>) -> Self {
        self.field.metadata.restrictions.push(restriction.into());
        self
    }

    /// Adds a dependency reference.
    pub fn depends_on(mut self, reference: impl Into<String>) -> Self {
        self.field.metadata.dependencies.push(reference.into());
        self
    }

    /// Sets the priority label.
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.field.metadata.priority = Some(priority.into());
        self
    }

    /// Sets the visibility label.
    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.field.metadata.visibility = Some(visibility.into());
        self
    }

    /// Sets the visibility trigger condition.
    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.field.metadata.visible_when = Some(condition);
        self
    }

    /// Replaces the whole metadata block.
    pub fn metadata(mut self, metadata: FieldMetadata) -> Self {
        self.field.metadata = metadata;
        self
    }

    /// Builds the field record.
    pub fn build(self) -> RawField {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builder() {
        let field = FieldBuilder::new("Characters", "object")
            .required(false)
            .subfield(FieldBuilder::new("Name", "string").build())
            .subfield(FieldBuilder::new("Type", "string").options(["Human"]).build())
            .visibility("conditional (only if agents are needed)")
            .visible_when(Condition::Present("Actions".to_string()))
            .constraint(FieldConstraint::RequiresSubfields {
                fields: vec!["Name".to_string()],
            })
            .build();

        assert_eq!(field.name, "Characters");
        assert_eq!(field.subfields.len(), 2);
        assert_eq!(field.subfields[1].options, vec!["Human"]);
        assert!(field.metadata.visible_when.is_some());
        assert_eq!(field.constraints.len(), 1);
    }

    #[test]
    fn test_builder_defaults() {
        let field = FieldBuilder::new("Symbolism", "string").build();
        assert!(!field.required);
        assert!(!field.allow_custom);
        assert_eq!(field.strict_options, None);
        assert!(field.metadata.restrictions.is_empty());
    }
}
