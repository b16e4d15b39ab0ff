//! Request templates and the compiled request matcher.

use super::body_matcher::{BodyTemplate, CompiledBodyMatcher};
use super::field_matcher::{CompiledMultimapMatcher, NameValueConstraint};
use super::string_matcher::{CompiledValueMatcher, ValueConstraint};
use crate::error::MatcherError;
use crate::request::{IncomingRequest, Multimap};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The request side of an expectation.
///
/// Every field is optional: `None` scalars, empty collections and a `None`
/// body match any request.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ValueConstraint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ValueConstraint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<ValueConstraint>,

    /// Query-string parameters (all must be present)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_string_parameters: Vec<NameValueConstraint>,

    /// Headers (all must be present)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<NameValueConstraint>,

    /// Cookies (all must be present)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<NameValueConstraint>,

    #[serde(default, skip_serializing_if = "BodyTemplate::is_none")]
    pub body: BodyTemplate,
}

impl HttpRequestTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a template from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, MatcherError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_method(self, method: impl Into<ValueConstraint>) -> Self {
        Self {
            method: Some(method.into()),
            ..self
        }
    }

    pub fn with_path(self, path: impl Into<ValueConstraint>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }

    pub fn with_url(self, url: impl Into<ValueConstraint>) -> Self {
        Self {
            url: Some(url.into()),
            ..self
        }
    }

    pub fn with_query_string_parameters(self, parameters: Vec<NameValueConstraint>) -> Self {
        Self {
            query_string_parameters: parameters,
            ..self
        }
    }

    pub fn with_headers(self, headers: Vec<NameValueConstraint>) -> Self {
        Self { headers, ..self }
    }

    pub fn with_cookies(self, cookies: Vec<NameValueConstraint>) -> Self {
        Self { cookies, ..self }
    }

    pub fn with_body(self, body: BodyTemplate) -> Self {
        Self { body, ..self }
    }
}

/// Request field checked by a matcher component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestField {
    Method,
    Path,
    Url,
    QueryString,
    Headers,
    Cookies,
    Body,
}

impl RequestField {
    pub const ALL: [RequestField; 7] = [
        RequestField::Method,
        RequestField::Path,
        RequestField::Url,
        RequestField::QueryString,
        RequestField::Headers,
        RequestField::Cookies,
        RequestField::Body,
    ];
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestField::Method => "method",
            RequestField::Path => "path",
            RequestField::Url => "url",
            RequestField::QueryString => "query string",
            RequestField::Headers => "headers",
            RequestField::Cookies => "cookies",
            RequestField::Body => "body",
        })
    }
}

/// Why a request did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: RequestField,
    pub reason: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Compiled, immutable predicate over incoming requests.
///
/// Built once per expectation by [`crate::MatcherBuilder`] and shared across
/// threads; matching is a pure function of the matcher and the request.
#[derive(Debug, Clone)]
pub struct RequestMatcher {
    pub(crate) method: CompiledValueMatcher,
    pub(crate) path: CompiledValueMatcher,
    pub(crate) url: CompiledValueMatcher,
    pub(crate) query: CompiledMultimapMatcher,
    pub(crate) headers: CompiledMultimapMatcher,
    pub(crate) cookies: CompiledMultimapMatcher,
    pub(crate) body: CompiledBodyMatcher,
}

impl RequestMatcher {
    /// True iff every field matcher accepts the request.
    pub fn matches(&self, request: &IncomingRequest) -> bool {
        for field in RequestField::ALL {
            if let Some(mismatch) = self.check(field, request) {
                debug!("Request did not match expectation: {}", mismatch);
                return false;
            }
        }
        true
    }

    /// Every field that rejects the request, in field order.
    pub fn mismatches(&self, request: &IncomingRequest) -> Vec<Mismatch> {
        RequestField::ALL
            .into_iter()
            .filter_map(|field| self.check(field, request))
            .collect()
    }

    /// Fields this matcher actually constrains.
    pub fn constrained_fields(&self) -> Vec<RequestField> {
        RequestField::ALL
            .into_iter()
            .filter(|field| !self.is_wildcard(*field))
            .collect()
    }

    fn is_wildcard(&self, field: RequestField) -> bool {
        match field {
            RequestField::Method => self.method.is_any(),
            RequestField::Path => self.path.is_any(),
            RequestField::Url => self.url.is_any(),
            RequestField::QueryString => self.query.is_any(),
            RequestField::Headers => self.headers.is_any(),
            RequestField::Cookies => self.cookies.is_any(),
            RequestField::Body => self.body.is_any(),
        }
    }

    fn check(&self, field: RequestField, request: &IncomingRequest) -> Option<Mismatch> {
        let reason = match field {
            RequestField::Method => check_value(&self.method, &request.method),
            RequestField::Path => check_value(&self.path, &request.path),
            RequestField::Url => check_value(&self.url, &request.url),
            RequestField::QueryString => check_multimap(&self.query, &request.query),
            RequestField::Headers => check_multimap(&self.headers, &request.headers),
            RequestField::Cookies => check_multimap(&self.cookies, &request.cookies),
            RequestField::Body => {
                if self.body.is_any() || self.body.matches(&request.body_text()) {
                    None
                } else {
                    Some(format!("expected {}", self.body.describe()))
                }
            }
        }?;
        Some(Mismatch { field, reason })
    }
}

fn check_value(matcher: &CompiledValueMatcher, actual: &str) -> Option<String> {
    if matcher.matches(actual) {
        None
    } else {
        Some(format!("expected {matcher}, got {actual:?}"))
    }
}

fn check_multimap(matcher: &CompiledMultimapMatcher, actual: &Multimap) -> Option<String> {
    matcher
        .first_unmatched(actual)
        .map(|missing| format!("no entry matched {missing}"))
}
