//! Expectation templates and the compiled matchers built from them.
//!
//! Every template type has a compiled counterpart: regexes are compiled and
//! structural constraint documents parsed once, when the expectation is
//! registered, so evaluating a request never fails and never recompiles.
//!
//! # Module Structure
//!
//! - `matcher` - Shared helpers (CachedValue, full-match regex policy)
//! - `options` - Case-sensitivity policy
//! - `string_matcher` - Single value constraints (exact, regex, negation)
//! - `field_matcher` - Multimap constraints for headers, cookies and parameters
//! - `xml` - Owned XML element tree
//! - `deep_equals` - Structural JSON/XML comparison
//! - `body_matcher` - Body constraints
//! - `request` - Request template and composite matcher

mod body_matcher;
mod deep_equals;
mod field_matcher;
mod matcher;
mod options;
mod request;
mod string_matcher;
mod xml;

pub use body_matcher::{BodyTemplate, CompiledBodyMatcher};
pub use deep_equals::{json_matches, xml_matches, MatchType};
pub use field_matcher::{CompiledFieldMatcher, CompiledMultimapMatcher, NameValueConstraint};
pub use matcher::{compile_full_match, CachedValue};
pub use options::MatcherOptions;
pub use request::{HttpRequestTemplate, Mismatch, RequestField, RequestMatcher};
pub use string_matcher::{
    CompiledStringMatcher, CompiledValueMatcher, StringMatcher, ValueConstraint,
};
pub use xml::XmlElement;
