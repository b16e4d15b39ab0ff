//! Construction errors raised while decoding or compiling an expectation.
//!
//! Evaluating a compiled matcher never fails; a request that cannot be
//! interpreted simply does not match.

/// Errors raised while building a matcher.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid regex for {field}: {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid JSON body constraint: {0}")]
    InvalidJsonConstraint(#[source] serde_json::Error),

    #[error("Invalid XML body constraint: {0}")]
    InvalidXmlConstraint(String),

    #[error("Invalid XPath expression '{expression}': {reason}")]
    InvalidXPath { expression: String, reason: String },

    #[error("Malformed expectation template: {0}")]
    MalformedTemplate(#[from] serde_json::Error),

    #[error("Malformed matcher options: {0}")]
    Options(#[from] serde_yaml::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
