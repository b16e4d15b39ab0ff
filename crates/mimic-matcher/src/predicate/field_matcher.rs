//! Multimap matching for headers, cookies, query parameters and form bodies.
//!
//! Every constraint must be satisfied by at least one actual entry. Actual
//! entries may be reused by several constraints and extra entries are ignored.

use super::string_matcher::{CompiledValueMatcher, ValueConstraint};
use crate::error::MatcherError;
use crate::request::Multimap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A name/value constraint on a multimap entry.
///
/// `{"name": "X-Api-Key", "value": "secret"}`; omitting `value` only requires
/// the name to be present.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NameValueConstraint {
    pub name: ValueConstraint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConstraint>,
}

impl NameValueConstraint {
    pub fn new(name: impl Into<ValueConstraint>, value: impl Into<ValueConstraint>) -> Self {
        NameValueConstraint {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Require the name to be present with any value.
    pub fn present(name: impl Into<ValueConstraint>) -> Self {
        NameValueConstraint {
            name: name.into(),
            value: None,
        }
    }
}

/// Compiled matcher for a single multimap entry.
#[derive(Debug, Clone)]
pub struct CompiledFieldMatcher {
    pub name: CompiledValueMatcher,
    pub value: CompiledValueMatcher,
}

impl CompiledFieldMatcher {
    pub fn matches(&self, name: &str, value: &str) -> bool {
        self.name.matches(name) && self.value.matches(value)
    }
}

impl fmt::Display for CompiledFieldMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Compiled matcher over a whole multimap.
#[derive(Debug, Clone, Default)]
pub struct CompiledMultimapMatcher {
    pub entries: Vec<CompiledFieldMatcher>,
}

impl CompiledMultimapMatcher {
    /// Compile a list of constraints.
    ///
    /// # Arguments
    /// * `constraints` - Name/value constraints from the template
    /// * `name_case_sensitive` - Case policy for names (false for headers)
    /// * `value_case_sensitive` - Case policy for values
    /// * `field` - Field label used in error messages ("header", "cookie", ...)
    pub fn compile(
        constraints: &[NameValueConstraint],
        name_case_sensitive: bool,
        value_case_sensitive: bool,
        field: &str,
    ) -> Result<Self, MatcherError> {
        let mut entries = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let compiled = CompiledFieldMatcher {
                name: CompiledValueMatcher::compile(
                    Some(&constraint.name),
                    name_case_sensitive,
                    &format!("{field} name"),
                )?,
                value: CompiledValueMatcher::compile(
                    constraint.value.as_ref(),
                    value_case_sensitive,
                    &format!("{field} value"),
                )?,
            };
            // A constraint with neither name nor value carries no information
            if compiled.name.is_any() && compiled.value.is_any() {
                continue;
            }
            entries.push(compiled);
        }
        Ok(CompiledMultimapMatcher { entries })
    }

    pub fn is_any(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first constraint no actual entry satisfies.
    pub fn first_unmatched(&self, actual: &Multimap) -> Option<&CompiledFieldMatcher> {
        self.entries
            .iter()
            .find(|entry| !actual.iter().any(|(n, v)| entry.matches(n, v)))
    }

    pub fn matches(&self, actual: &Multimap) -> bool {
        self.first_unmatched(actual).is_none()
    }
}
