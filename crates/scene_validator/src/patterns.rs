//! Value patterns for format-constrained fields.
//!
//! A field's patterns come from its explicit `pattern`, from recognised format
//! descriptions and from structured restrictions. Every pattern is compiled
//! once at load time.

use regex::Regex;
use std::fmt;

/// A mechanically checkable value format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternRule {
    /// Letters, digits, underscores and hyphens only
    Identifier,
    /// No whitespace anywhere in the value
    NoWhitespace,
    /// A number followed by a fixed unit suffix (e.g. `10s`)
    UnitSuffix(String),
    /// Author-supplied regular expression
    Regex(String),
}

impl PatternRule {
    /// Regular expression implementing the rule.
    pub fn regex_source(&self) -> String {
        match self {
            PatternRule::Identifier => r"^[A-Za-z0-9_-]+$".to_string(),
            PatternRule::NoWhitespace => r"^\S+$".to_string(),
            PatternRule::UnitSuffix(unit) => {
                format!(r"^[0-9]+(\.[0-9]+)?{}$", regex::escape(unit))
            }
            PatternRule::Regex(source) => source.clone(),
        }
    }
}

impl fmt::Display for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternRule::Identifier => {
                f.write_str("identifier (letters, digits, '_' or '-' only)")
            }
            PatternRule::NoWhitespace => f.write_str("no whitespace"),
            PatternRule::UnitSuffix(unit) => write!(f, "number with '{}' suffix", unit),
            PatternRule::Regex(source) => write!(f, "pattern '{}'", source),
        }
    }
}

/// A pattern rule with its compiled regular expression.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    rule: PatternRule,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a rule.
    pub fn compile(rule: PatternRule) -> Result<Self, regex::Error> {
        let regex = Regex::new(&rule.regex_source())?;
        Ok(Self { rule, regex })
    }

    /// The rule this pattern implements.
    pub fn rule(&self) -> &PatternRule {
        &self.rule
    }

    /// Returns true if the value satisfies the pattern.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let pattern = CompiledPattern::compile(PatternRule::Identifier).unwrap();
        assert!(pattern.is_match("desert_intro01"));
        assert!(pattern.is_match("chase-02"));
        assert!(!pattern.is_match("desert intro"));
        assert!(!pattern.is_match("scene#1"));
        assert!(!pattern.is_match(""));
    }

    #[test]
    fn test_unit_suffix() {
        let pattern =
            CompiledPattern::compile(PatternRule::UnitSuffix("s".to_string())).unwrap();
        assert!(pattern.is_match("10s"));
        assert!(pattern.is_match("2.5s"));
        assert!(!pattern.is_match("10"));
        assert!(!pattern.is_match("10 s"));
        assert!(!pattern.is_match("s"));
        assert!(!pattern.is_match("10ms"));
    }

    #[test]
    fn test_unit_suffix_escaped() {
        let pattern =
            CompiledPattern::compile(PatternRule::UnitSuffix("+".to_string())).unwrap();
        assert!(pattern.is_match("3+"));
        assert!(!pattern.is_match("3"));
    }

    #[test]
    fn test_no_whitespace() {
        let pattern = CompiledPattern::compile(PatternRule::NoWhitespace).unwrap();
        assert!(pattern.is_match("intro01"));
        assert!(!pattern.is_match("intro 01"));
        assert!(!pattern.is_match("intro01\t"));
    }

    #[test]
    fn test_invalid_regex() {
        let result = CompiledPattern::compile(PatternRule::Regex("[invalid(regex".to_string()));
        assert!(result.is_err());
    }
}
