//! Body constraints and their compiled matchers.
//!
//! Supports exact text, regex, structural JSON and XML, XPath and
//! form-parameter bodies. The variant is fixed when the expectation is
//! compiled; an unparseable actual body is a non-match, never an error.

use super::deep_equals::{json_matches, xml_matches, MatchType};
use super::field_matcher::{CompiledMultimapMatcher, NameValueConstraint};
use super::options::MatcherOptions;
use super::string_matcher::{CompiledValueMatcher, ValueConstraint};
use super::xml::{exceeds_max_depth, XmlElement, MAX_DEPTH};
use crate::error::MatcherError;
use crate::request::parse_form_body;
use serde::{Deserialize, Serialize};
use sxd_document::parser;
use sxd_xpath::{evaluate_xpath, Value};
use tracing::debug;

/// Body constraint declared on an expectation.
///
/// Tagged by `type` on the wire:
/// `{"type": "JSON", "json": "{\"id\": 1}", "matchType": "STRICT"}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyTemplate {
    /// No body constraint
    #[default]
    None,

    /// Exact text equality
    Exact { string: String },

    /// Regex matched against the whole body text
    Regex { regex: String },

    /// Structural JSON comparison
    Json {
        json: String,
        #[serde(default, rename = "matchType")]
        match_type: MatchType,
    },

    /// Structural XML comparison
    Xml {
        xml: String,
        #[serde(default, rename = "matchType")]
        match_type: MatchType,
    },

    /// XPath expression that must select something in the XML body
    #[serde(rename = "XPATH")]
    XPath { xpath: String },

    /// Form-encoded parameters
    Parameters {
        #[serde(default)]
        parameters: Vec<NameValueConstraint>,
    },
}

impl BodyTemplate {
    pub fn exact(string: impl Into<String>) -> Self {
        BodyTemplate::Exact {
            string: string.into(),
        }
    }

    pub fn regex(regex: impl Into<String>) -> Self {
        BodyTemplate::Regex {
            regex: regex.into(),
        }
    }

    pub fn json(json: impl Into<String>, match_type: MatchType) -> Self {
        BodyTemplate::Json {
            json: json.into(),
            match_type,
        }
    }

    pub fn xml(xml: impl Into<String>, match_type: MatchType) -> Self {
        BodyTemplate::Xml {
            xml: xml.into(),
            match_type,
        }
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        BodyTemplate::XPath {
            xpath: xpath.into(),
        }
    }

    pub fn parameters(parameters: Vec<NameValueConstraint>) -> Self {
        BodyTemplate::Parameters { parameters }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BodyTemplate::None)
    }

    /// Wire name of the body type.
    pub fn kind(&self) -> &'static str {
        match self {
            BodyTemplate::None => "NONE",
            BodyTemplate::Exact { .. } => "EXACT",
            BodyTemplate::Regex { .. } => "REGEX",
            BodyTemplate::Json { .. } => "JSON",
            BodyTemplate::Xml { .. } => "XML",
            BodyTemplate::XPath { .. } => "XPATH",
            BodyTemplate::Parameters { .. } => "PARAMETERS",
        }
    }
}

/// Compiled body matcher for efficient runtime evaluation.
#[derive(Debug, Clone)]
pub enum CompiledBodyMatcher {
    Any,
    Exact(CompiledValueMatcher),
    Regex(CompiledValueMatcher),
    Json {
        expected: serde_json::Value,
        match_type: MatchType,
    },
    Xml {
        expected: XmlElement,
        match_type: MatchType,
    },

    /// Holds the source text: a parsed `sxd_xpath::XPath` boxes a trait
    /// object without `Send`/`Sync` bounds, so it is re-parsed per request.
    XPath {
        expression: String,
    },
    Parameters(CompiledMultimapMatcher),
}

impl CompiledBodyMatcher {
    /// Compile a body template.
    ///
    /// Empty exact strings, empty regexes, empty XPath expressions and
    /// parameter bodies without parameters all compile to the wildcard.
    pub fn compile(
        template: &BodyTemplate,
        options: &MatcherOptions,
    ) -> Result<Self, MatcherError> {
        let compiled = match template {
            BodyTemplate::None => CompiledBodyMatcher::Any,
            BodyTemplate::Exact { string } => {
                let constraint = ValueConstraint::exact(string.as_str());
                CompiledBodyMatcher::Exact(CompiledValueMatcher::compile(
                    Some(&constraint),
                    options.body,
                    "body",
                )?)
            }
            BodyTemplate::Regex { regex } => {
                let constraint = ValueConstraint::regex(regex.as_str());
                CompiledBodyMatcher::Regex(CompiledValueMatcher::compile(
                    Some(&constraint),
                    options.body,
                    "body",
                )?)
            }
            BodyTemplate::Json { json, match_type } => CompiledBodyMatcher::Json {
                expected: serde_json::from_str(json)
                    .map_err(MatcherError::InvalidJsonConstraint)?,
                match_type: *match_type,
            },
            BodyTemplate::Xml { xml, match_type } => CompiledBodyMatcher::Xml {
                expected: XmlElement::parse(xml).map_err(MatcherError::InvalidXmlConstraint)?,
                match_type: *match_type,
            },
            BodyTemplate::XPath { xpath } if xpath.trim().is_empty() => CompiledBodyMatcher::Any,
            BodyTemplate::XPath { xpath } => {
                validate_xpath(xpath)?;
                CompiledBodyMatcher::XPath {
                    expression: xpath.clone(),
                }
            }
            BodyTemplate::Parameters { parameters } => {
                CompiledBodyMatcher::Parameters(CompiledMultimapMatcher::compile(
                    parameters,
                    options.parameter_names,
                    options.values,
                    "body parameter",
                )?)
            }
        };

        Ok(if compiled.is_wildcard() {
            CompiledBodyMatcher::Any
        } else {
            compiled
        })
    }

    fn is_wildcard(&self) -> bool {
        match self {
            CompiledBodyMatcher::Any => true,
            CompiledBodyMatcher::Exact(m) | CompiledBodyMatcher::Regex(m) => m.is_any(),
            CompiledBodyMatcher::Parameters(m) => m.is_any(),
            _ => false,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, CompiledBodyMatcher::Any)
    }

    /// Check if a decoded body matches.
    pub fn matches(&self, body: &str) -> bool {
        match self {
            CompiledBodyMatcher::Any => true,
            CompiledBodyMatcher::Exact(m) | CompiledBodyMatcher::Regex(m) => m.matches(body),
            CompiledBodyMatcher::Json {
                expected,
                match_type,
            } => match serde_json::from_str::<serde_json::Value>(body) {
                Ok(actual) => json_matches(expected, &actual, *match_type),
                Err(e) => {
                    debug!("Body is not valid JSON: {}", e);
                    false
                }
            },
            CompiledBodyMatcher::Xml {
                expected,
                match_type,
            } => match XmlElement::parse(body) {
                Ok(actual) => xml_matches(expected, &actual, *match_type),
                Err(e) => {
                    debug!("Body is not valid XML: {}", e);
                    false
                }
            },
            CompiledBodyMatcher::XPath { expression } => xpath_selects(body, expression),
            CompiledBodyMatcher::Parameters(m) => m.matches(&parse_form_body(body)),
        }
    }

    /// Short description used in mismatch reports.
    pub fn describe(&self) -> String {
        match self {
            CompiledBodyMatcher::Any => "any body".to_string(),
            CompiledBodyMatcher::Exact(m) => format!("exact body {m}"),
            CompiledBodyMatcher::Regex(m) => format!("body matching {m}"),
            CompiledBodyMatcher::Json { match_type, .. } => format!("JSON body ({match_type:?})"),
            CompiledBodyMatcher::Xml { match_type, .. } => format!("XML body ({match_type:?})"),
            CompiledBodyMatcher::XPath { expression } => format!("XML body selecting {expression}"),
            CompiledBodyMatcher::Parameters(m) => {
                format!("form body with {} parameter(s)", m.entries.len())
            }
        }
    }
}

/// Reject expressions that fail to parse by evaluating them against an empty document.
fn validate_xpath(expression: &str) -> Result<(), MatcherError> {
    let package = sxd_document::Package::new();
    let document = package.as_document();
    evaluate_xpath(&document, expression)
        .map(|_| ())
        .map_err(|e| MatcherError::InvalidXPath {
            expression: expression.to_string(),
            reason: format!("{e:?}"),
        })
}

/// Evaluate an XPath expression and interpret the result as a boolean.
fn xpath_selects(body: &str, expression: &str) -> bool {
    let Ok(package) = parser::parse(body) else {
        debug!("Body is not valid XML for XPath {}", expression);
        return false;
    };
    let document = package.as_document();
    if exceeds_max_depth(&document) {
        debug!("Body nests XML deeper than {} levels", MAX_DEPTH);
        return false;
    }

    match evaluate_xpath(&document, expression) {
        Ok(Value::Boolean(b)) => b,
        Ok(Value::Nodeset(nodes)) => nodes.size() > 0,
        Ok(Value::String(s)) => !s.is_empty(),
        Ok(Value::Number(n)) => n != 0.0 && !n.is_nan(),
        Err(e) => {
            debug!("XPath {} failed: {:?}", expression, e);
            false
        }
    }
}
