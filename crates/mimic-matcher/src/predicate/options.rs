//! Matcher options controlling case sensitivity per field kind.

use crate::error::MatcherError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Case-sensitivity policy applied when compiling a template.
///
/// Every flag reads "compare case-sensitively". Regex constraints honour the
/// same flag: a case-insensitive field compiles its pattern with `(?i)`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MatcherOptions {
    /// HTTP method
    pub method: bool,
    /// Request path
    pub path: bool,
    /// Full request URL
    pub url: bool,
    /// Header names (false by default, per HTTP)
    pub header_names: bool,
    /// Query-string, cookie and form parameter names
    pub parameter_names: bool,
    /// Header, cookie, query and form values
    pub values: bool,
    /// Exact and regex body constraints
    pub body: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            method: true,
            path: true,
            url: true,
            header_names: false,
            parameter_names: true,
            values: true,
            body: true,
        }
    }
}

impl MatcherOptions {
    /// Options that ignore case everywhere.
    pub fn case_insensitive() -> Self {
        Self {
            method: false,
            path: false,
            url: false,
            header_names: false,
            parameter_names: false,
            values: false,
            body: false,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, MatcherError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MatcherError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| MatcherError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }
}
