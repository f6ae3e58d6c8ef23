//! Restriction classification.
//!
//! Schema restrictions are natural language. Only a closed set of phrasings
//! maps onto a mechanical predicate (uniqueness, reference existence, option
//! membership, value format, required subfields); everything else is kept
//! verbatim as an advisory restriction. No logic is inferred from arbitrary
//! prose.

use crate::PatternRule;
use regex::Regex;
use std::sync::LazyLock;

/// A mechanically checkable predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Values must be unique across a sequence
    Unique,
    /// Values must name an identifier held by the target field in another scene
    References(String),
    /// References to later scenes are governed by the forward-reference policy
    NoForwardReference,
    /// Values must come from the declared options
    StrictOptions,
    /// Values must satisfy a format
    Pattern(PatternRule),
    /// Named subfields must be non-empty whenever the field is present
    RequiresSubfields(Vec<String>),
}

/// A classified restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    /// Hard-enforced predicate, with its source text
    Structured {
        /// Restriction as authored
        text: String,
        /// Recognised predicate
        predicate: Predicate,
    },
    /// Guideline surfaced only as a warning
    Advisory(String),
}

static UNIQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(no duplicates?\b|must be unique\b)").expect("valid regex")
});
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*referenced\s+([A-Za-z0-9_.]+)\s+must\s+exist\b").expect("valid regex")
});
static NO_FORWARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*should\s+not\s+reference\s+future\b").expect("valid regex")
});
static STRICT_OPTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*must\s+be\s+one\s+of\s+the\s+(predefined|declared|listed)\b")
        .expect("valid regex")
});
static NO_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*no\s+whitespace\s*\.?\s*$").expect("valid regex"));
static SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*suffix\s+'([^'\s]+)'\s+must\s+always\s+be\s+included\b")
        .expect("valid regex")
});
static REQUIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmust\s+include\s+at\s+least\s+(.+?)\s+when\s+declared\b")
        .expect("valid regex")
});
static IDENTIFIER_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(alphanumeric|camel\s*case|snake_case)\b").expect("valid regex")
});
static UNIT_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunit\s+suffix\b").expect("valid regex"));
static UNIT_EXAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'[0-9]+(?:\.[0-9]+)?([A-Za-z]+)'").expect("valid regex")
});

/// Classifies one natural-language restriction.
///
/// # Example
///
/// ```rust
/// use scene_validator::{classify_restriction, Predicate, Restriction};
///
/// let restriction = classify_restriction("No duplicates across timeline");
/// assert!(matches!(restriction, Restriction::Structured { predicate: Predicate::Unique, .. }));
///
/// let restriction = classify_restriction("Avoid clichés unless intentionally subverted.");
/// assert!(matches!(restriction, Restriction::Advisory(_)));
/// ```
pub fn classify_restriction(text: &str) -> Restriction {
    match recognise(text) {
        Some(predicate) => Restriction::Structured {
            text: text.to_string(),
            predicate,
        },
        None => Restriction::Advisory(text.to_string()),
    }
}

fn recognise(text: &str) -> Option<Predicate> {
    if UNIQUE.is_match(text) {
        return Some(Predicate::Unique);
    }
    if let Some(caps) = REFERENCE.captures(text) {
        return Some(Predicate::References(caps[1].to_string()));
    }
    if NO_FORWARD.is_match(text) {
        return Some(Predicate::NoForwardReference);
    }
    if STRICT_OPTIONS.is_match(text) {
        return Some(Predicate::StrictOptions);
    }
    if NO_WHITESPACE.is_match(text) {
        return Some(Predicate::Pattern(PatternRule::NoWhitespace));
    }
    if let Some(caps) = SUFFIX.captures(text) {
        return Some(Predicate::Pattern(PatternRule::UnitSuffix(caps[1].to_string())));
    }
    if let Some(caps) = REQUIRES.captures(text) {
        let names = split_names(&caps[1]);
        if !names.is_empty() {
            return Some(Predicate::RequiresSubfields(names));
        }
    }
    None
}

/// Splits "a Name and Type" / "Name, Type and Age" into bare names.
fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|part| {
            let part = part.trim();
            part.strip_prefix("a ")
                .or_else(|| part.strip_prefix("an "))
                .unwrap_or(part)
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace))
        .collect()
}

/// Recognises a value format from a free-text format description.
///
/// Returns `None` for descriptions that name no mechanical format
/// ("Natural language", "SceneID reference", ...).
pub fn pattern_from_format(text: &str) -> Option<PatternRule> {
    if IDENTIFIER_FORMAT.is_match(text) {
        return Some(PatternRule::Identifier);
    }
    if UNIT_FORMAT.is_match(text) {
        return UNIT_EXAMPLE
            .captures(text)
            .map(|caps| PatternRule::UnitSuffix(caps[1].to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn predicate(text: &str) -> Option<Predicate> {
        match classify_restriction(text) {
            Restriction::Structured { predicate, .. } => Some(predicate),
            Restriction::Advisory(_) => None,
        }
    }

    #[test]
    fn test_scene_id_restrictions() {
        assert_eq!(
            predicate("No whitespace"),
            Some(Predicate::Pattern(PatternRule::NoWhitespace))
        );
        assert_eq!(predicate("No duplicates across timeline"), Some(Predicate::Unique));
        assert_eq!(predicate("Must be unique across all scenes"), Some(Predicate::Unique));
    }

    #[test]
    fn test_duration_restrictions() {
        assert_eq!(
            predicate("Must be one of the predefined durations unless custom allowed"),
            Some(Predicate::StrictOptions)
        );
        assert_eq!(
            predicate("Suffix 's' must always be included"),
            Some(Predicate::Pattern(PatternRule::UnitSuffix("s".to_string())))
        );
    }

    #[test]
    fn test_echo_restrictions() {
        assert_eq!(
            predicate("Referenced SceneID must exist within the full scene dataset."),
            Some(Predicate::References("SceneID".to_string()))
        );
        assert_eq!(
            predicate(
                "Should not reference future scenes unless implementing flashforward logic intentionally."
            ),
            Some(Predicate::NoForwardReference)
        );
    }

    #[test]
    fn test_requires_subfields() {
        assert_eq!(
            predicate("Characters must include at least a Name and Type when declared"),
            Some(Predicate::RequiresSubfields(vec![
                "Name".to_string(),
                "Type".to_string()
            ]))
        );
        assert_eq!(
            predicate("Crew must include at least Role, Name and Age when declared"),
            Some(Predicate::RequiresSubfields(vec![
                "Role".to_string(),
                "Name".to_string(),
                "Age".to_string()
            ]))
        );
    }

    #[test]
    fn test_prose_stays_advisory() {
        for text in [
            "Subfields must use vivid, interpretable descriptions",
            "Avoid mixing Filmic and Stylised styles unless doing a deliberate transition.",
            "Tone must match the character’s context and environment.",
            "Avoid duplicating content from Actions unless interaction is reciprocal or distinct",
            "Should not conflict with Framing or Lens constraints.",
        ] {
            assert_eq!(
                classify_restriction(text),
                Restriction::Advisory(text.to_string()),
                "{text}"
            );
        }
    }

    #[test]
    fn test_format_descriptions() {
        assert_eq!(
            pattern_from_format("Alphanumeric string with optional underscores or hyphens"),
            Some(PatternRule::Identifier)
        );
        assert_eq!(
            pattern_from_format("CamelCase or snake_case string"),
            Some(PatternRule::Identifier)
        );
        assert_eq!(
            pattern_from_format("String with unit suffix (e.g., '10s' for 10 seconds)"),
            Some(PatternRule::UnitSuffix("s".to_string()))
        );
        assert_eq!(pattern_from_format("String with unit suffix"), None);
        assert_eq!(pattern_from_format("Natural language"), None);
        assert_eq!(pattern_from_format("SceneID reference"), None);
    }
}
