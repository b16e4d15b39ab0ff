//! Core helpers shared by every matcher kind.
//!
//! This module provides:
//! - `CachedValue` - A literal with pre-computed lowercase for case-insensitive equality
//! - `compile_full_match` - The single regex policy used by values and bodies

use crate::error::MatcherError;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// A literal value with pre-computed lowercase for efficient case-insensitive matching.
///
/// The lowercase form is computed once when the expectation is compiled rather
/// than on every incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    /// Original value (for case-sensitive matching)
    pub value: String,
    /// Pre-computed lowercase (for case-insensitive matching)
    pub lower: String,
}

impl CachedValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let lower = value.to_lowercase();
        Self { value, lower }
    }

    /// Check equality against an actual value.
    #[inline]
    pub fn equals(&self, actual: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            actual == self.value
        } else if actual.is_ascii() && self.value.is_ascii() {
            actual.eq_ignore_ascii_case(&self.value)
        } else {
            actual.to_lowercase() == self.lower
        }
    }
}

impl From<&str> for CachedValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Compile a pattern that must match the *entire* actual value.
///
/// The pattern is wrapped as `^(?:pattern)$` so that `"abc"` does not match
/// `"xabcx"`. Case-insensitive fields set the `i` flag on the whole pattern.
pub fn compile_full_match(
    pattern: &str,
    case_sensitive: bool,
    field: &str,
) -> Result<Arc<Regex>, MatcherError> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(!case_sensitive)
        .build()
        .map(Arc::new)
        .map_err(|source| MatcherError::InvalidRegex {
            field: field.to_string(),
            source,
        })
}
