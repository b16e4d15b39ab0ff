//! Single-value constraints and their compiled matcher.
//!
//! A value constraint is either an exact literal or a regular expression, and
//! may be negated. Method, path, URL, multimap names/values and the exact and
//! regex body variants all go through `CompiledValueMatcher`.

use super::matcher::{compile_full_match, CachedValue};
use crate::error::MatcherError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// String comparison operator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum StringMatcher {
    /// Exact string equality
    #[serde(rename = "equals")]
    Equals(String),

    /// Regex pattern, matched against the whole value
    #[serde(rename = "matches")]
    Matches(String),
}

/// A constraint on a single string value.
///
/// Accepts either a bare string (exact match) or an operator object:
/// `"GET"`, `{"equals": "GET"}`, `{"matches": "/api/.*", "not": true}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ValueConstraint {
    /// Bare string, exact match
    Literal(String),

    /// Operator with optional negation
    Full {
        #[serde(flatten)]
        matcher: StringMatcher,
        #[serde(default, skip_serializing_if = "is_false")]
        not: bool,
    },
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ValueConstraint {
    pub fn exact(value: impl Into<String>) -> Self {
        ValueConstraint::Literal(value.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        ValueConstraint::Full {
            matcher: StringMatcher::Matches(pattern.into()),
            not: false,
        }
    }

    /// Return the negated form of this constraint.
    pub fn negated(self) -> Self {
        match self {
            ValueConstraint::Literal(value) => ValueConstraint::Full {
                matcher: StringMatcher::Equals(value),
                not: true,
            },
            ValueConstraint::Full { matcher, not } => ValueConstraint::Full { matcher, not: !not },
        }
    }

    /// Split into the comparison operator and its polarity.
    fn operator(&self) -> (StringMatcher, bool) {
        match self {
            ValueConstraint::Literal(value) => (StringMatcher::Equals(value.clone()), false),
            ValueConstraint::Full { matcher, not } => (matcher.clone(), *not),
        }
    }
}

impl From<&str> for ValueConstraint {
    fn from(value: &str) -> Self {
        ValueConstraint::Literal(value.to_string())
    }
}

impl From<String> for ValueConstraint {
    fn from(value: String) -> Self {
        ValueConstraint::Literal(value)
    }
}

/// Compiled comparison without polarity.
#[derive(Debug, Clone)]
pub enum CompiledStringMatcher {
    /// Wildcard: no constraint
    Any,
    Equals {
        value: CachedValue,
        case_sensitive: bool,
    },
    Matches {
        regex: Arc<Regex>,
        pattern: String,
    },
}

impl CompiledStringMatcher {
    fn matches(&self, actual: &str) -> bool {
        match self {
            CompiledStringMatcher::Any => true,
            CompiledStringMatcher::Equals {
                value,
                case_sensitive,
            } => value.equals(actual, *case_sensitive),
            CompiledStringMatcher::Matches { regex, .. } => regex.is_match(actual),
        }
    }
}

/// Compiled value matcher: a comparison plus an optional negation.
#[derive(Debug, Clone)]
pub struct CompiledValueMatcher {
    pub matcher: CompiledStringMatcher,
    pub not: bool,
}

impl CompiledValueMatcher {
    /// Wildcard matcher.
    pub fn any() -> Self {
        CompiledValueMatcher {
            matcher: CompiledStringMatcher::Any,
            not: false,
        }
    }

    /// Compile an optional constraint.
    ///
    /// `None` and non-negated empty constraints become the wildcard. A negated
    /// empty constraint keeps its literal meaning ("anything but empty").
    pub fn compile(
        constraint: Option<&ValueConstraint>,
        case_sensitive: bool,
        field: &str,
    ) -> Result<Self, MatcherError> {
        let Some(constraint) = constraint else {
            return Ok(Self::any());
        };

        let (matcher, not) = constraint.operator();

        let compiled = match matcher {
            StringMatcher::Equals(value) | StringMatcher::Matches(value)
                if value.is_empty() && !not =>
            {
                CompiledStringMatcher::Any
            }
            StringMatcher::Equals(value) => CompiledStringMatcher::Equals {
                value: CachedValue::new(value),
                case_sensitive,
            },
            StringMatcher::Matches(pattern) => CompiledStringMatcher::Matches {
                regex: compile_full_match(&pattern, case_sensitive, field)?,
                pattern,
            },
        };

        Ok(CompiledValueMatcher {
            matcher: compiled,
            not,
        })
    }

    /// True when this matcher accepts every value.
    pub fn is_any(&self) -> bool {
        matches!(self.matcher, CompiledStringMatcher::Any) && !self.not
    }

    pub fn matches(&self, actual: &str) -> bool {
        self.matcher.matches(actual) != self.not
    }
}

impl fmt::Display for CompiledValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            f.write_str("not ")?;
        }
        match &self.matcher {
            CompiledStringMatcher::Any => f.write_str("anything"),
            CompiledStringMatcher::Equals { value, .. } => write!(f, "{:?}", value.value),
            CompiledStringMatcher::Matches { pattern, .. } => write!(f, "/{pattern}/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(constraint: ValueConstraint, case_sensitive: bool) -> CompiledValueMatcher {
        CompiledValueMatcher::compile(Some(&constraint), case_sensitive, "test").unwrap()
    }

    #[test]
    fn test_absent_constraint_is_wildcard() {
        let matcher = CompiledValueMatcher::compile(None, true, "method").unwrap();
        assert!(matcher.is_any());
        assert!(matcher.matches(""));
        assert!(matcher.matches("anything at all"));
    }

    #[test]
    fn test_empty_literal_is_wildcard() {
        let matcher = compile(ValueConstraint::exact(""), true);
        assert!(matcher.is_any());
        assert!(matcher.matches("GET"));
    }

    #[test]
    fn test_negated_empty_requires_non_empty() {
        let matcher = compile(ValueConstraint::exact("").negated(), true);
        assert!(!matcher.is_any());
        assert!(matcher.matches("GET"));
        assert!(!matcher.matches(""));
    }

    #[test]
    fn test_literal_equals() {
        let matcher = compile(ValueConstraint::exact("GET"), true);
        assert!(matcher.matches("GET"));
        assert!(!matcher.matches("get"));
        assert!(!matcher.matches("POST"));
        assert!(!matcher.matches("GETX"));

        let matcher = compile(ValueConstraint::exact("GET"), false);
        assert!(matcher.matches("get"));
    }

    #[test]
    fn test_regex_full_match() {
        let matcher = compile(ValueConstraint::regex(r"/api/v\d+/.*"), true);
        assert!(matcher.matches("/api/v1/users"));
        assert!(!matcher.matches("/prefix/api/v1/users"));
        assert!(!matcher.matches("/api/users"));
    }

    #[test]
    fn test_negated_literal() {
        let matcher = compile(ValueConstraint::exact("DELETE").negated(), true);
        assert!(!matcher.matches("DELETE"));
        assert!(matcher.matches("GET"));
    }

    #[test]
    fn test_negated_regex() {
        let matcher = compile(ValueConstraint::regex("/admin/.*").negated(), true);
        assert!(!matcher.matches("/admin/users"));
        assert!(matcher.matches("/public/users"));
    }

    #[test]
    fn test_double_negation() {
        let constraint = ValueConstraint::exact("GET").negated().negated();
        let matcher = compile(constraint, true);
        assert!(matcher.matches("GET"));
        assert!(!matcher.matches("POST"));
    }

    #[test]
    fn test_invalid_regex_fails_at_compile() {
        let result = CompiledValueMatcher::compile(
            Some(&ValueConstraint::regex("[unclosed")),
            true,
            "path",
        );
        assert!(matches!(result, Err(MatcherError::InvalidRegex { .. })));
    }

    #[test]
    fn test_value_constraint_serde() {
        let constraint: ValueConstraint = serde_json::from_str(r#""GET""#).unwrap();
        assert_eq!(constraint, ValueConstraint::exact("GET"));

        let constraint: ValueConstraint = serde_json::from_str(r#"{"equals": "GET"}"#).unwrap();
        assert_eq!(
            constraint,
            ValueConstraint::Full {
                matcher: StringMatcher::Equals("GET".to_string()),
                not: false,
            }
        );

        let constraint: ValueConstraint =
            serde_json::from_str(r#"{"matches": "^/api/v\\d+", "not": true}"#).unwrap();
        assert_eq!(constraint, ValueConstraint::regex(r"^/api/v\d+").negated());
    }

    #[test]
    fn test_display() {
        assert_eq!(compile(ValueConstraint::exact("GET"), true).to_string(), "\"GET\"");
        assert_eq!(
            compile(ValueConstraint::regex("a.*").negated(), true).to_string(),
            "not /a.*/"
        );
        assert_eq!(CompiledValueMatcher::any().to_string(), "anything");
    }
}
