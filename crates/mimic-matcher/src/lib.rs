//! Request matching for HTTP mock servers.
//!
//! An expectation's request side is described by an [`HttpRequestTemplate`].
//! [`MatcherBuilder`] compiles it once into a [`RequestMatcher`], which the
//! host server then evaluates against every [`IncomingRequest`]:
//!
//! ```
//! use mimic_matcher::{HttpRequestTemplate, IncomingRequest, MatcherBuilder, NameValueConstraint};
//!
//! let template = HttpRequestTemplate::new()
//!     .with_method("GET")
//!     .with_path("/users")
//!     .with_headers(vec![NameValueConstraint::new("Accept", "application/json")]);
//!
//! let matcher = MatcherBuilder::default().build(&template)?;
//!
//! let request = IncomingRequest::new("GET", "/users")
//!     .with_header("accept", "application/json")
//!     .with_header("user-agent", "curl/8.0");
//! assert!(matcher.matches(&request));
//! # Ok::<(), mimic_matcher::MatcherError>(())
//! ```

pub mod builder;
pub mod error;
pub mod predicate;
pub mod request;

pub use builder::MatcherBuilder;
pub use error::MatcherError;
pub use predicate::{
    BodyTemplate, HttpRequestTemplate, MatchType, MatcherOptions, Mismatch, NameValueConstraint,
    RequestField, RequestMatcher, ValueConstraint,
};
pub use request::{IncomingRequest, Multimap};
