//! Compiles expectation templates into request matchers.

use crate::error::MatcherError;
use crate::predicate::{
    CompiledBodyMatcher, CompiledMultimapMatcher, CompiledValueMatcher, HttpRequestTemplate,
    MatcherOptions, RequestMatcher,
};
use tracing::debug;

/// Factory turning an [`HttpRequestTemplate`] into a [`RequestMatcher`].
///
/// Holds only the case-sensitivity policy. Building is deterministic and
/// performs no I/O; the same template always yields an equivalent matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatcherBuilder {
    options: MatcherOptions,
}

impl MatcherBuilder {
    pub fn new(options: MatcherOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Compile a template.
    ///
    /// Fails on invalid regexes, invalid XPath expressions and malformed
    /// JSON/XML body constraints.
    pub fn build(&self, template: &HttpRequestTemplate) -> Result<RequestMatcher, MatcherError> {
        let options = &self.options;

        let matcher = RequestMatcher {
            method: CompiledValueMatcher::compile(
                template.method.as_ref(),
                options.method,
                "method",
            )?,
            path: CompiledValueMatcher::compile(template.path.as_ref(), options.path, "path")?,
            url: CompiledValueMatcher::compile(template.url.as_ref(), options.url, "url")?,
            query: CompiledMultimapMatcher::compile(
                &template.query_string_parameters,
                options.parameter_names,
                options.values,
                "query parameter",
            )?,
            headers: CompiledMultimapMatcher::compile(
                &template.headers,
                options.header_names,
                options.values,
                "header",
            )?,
            cookies: CompiledMultimapMatcher::compile(
                &template.cookies,
                options.parameter_names,
                options.values,
                "cookie",
            )?,
            body: CompiledBodyMatcher::compile(&template.body, options)?,
        };

        debug!(
            "Built matcher: body={}, constrained fields={:?}",
            template.body.kind(),
            matcher.constrained_fields()
        );
        Ok(matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{BodyTemplate, NameValueConstraint, ValueConstraint};
    use crate::request::IncomingRequest;

    #[test]
    fn test_default_template_matches_everything() {
        let matcher = MatcherBuilder::default()
            .build(&HttpRequestTemplate::default())
            .unwrap();
        assert!(matcher.constrained_fields().is_empty());
        assert!(matcher.matches(&IncomingRequest::default()));
        assert!(matcher.matches(
            &IncomingRequest::new("PATCH", "/anything")
                .with_header("X-Any", "1")
                .with_body("{}")
        ));
    }

    #[test]
    fn test_invalid_path_regex_rejected() {
        let template = HttpRequestTemplate::new().with_path(ValueConstraint::regex("/users/(\\d+"));
        let err = MatcherBuilder::default().build(&template).unwrap_err();
        assert!(err.to_string().starts_with("Invalid regex for path"));
    }

    #[test]
    fn test_invalid_header_regex_rejected() {
        let template = HttpRequestTemplate::new().with_headers(vec![NameValueConstraint::new(
            "Accept",
            ValueConstraint::regex("*json"),
        )]);
        let err = MatcherBuilder::default().build(&template).unwrap_err();
        assert!(matches!(
            err,
            MatcherError::InvalidRegex { ref field, .. } if field == "header value"
        ));
    }

    #[test]
    fn test_invalid_json_body_rejected() {
        let template = HttpRequestTemplate::new().with_body(BodyTemplate::json(
            "{\"id\": ",
            Default::default(),
        ));
        assert!(matches!(
            MatcherBuilder::default().build(&template),
            Err(MatcherError::InvalidJsonConstraint(_))
        ));
    }

    #[test]
    fn test_options_are_applied() {
        let template = HttpRequestTemplate::new()
            .with_method("get")
            .with_path("/Users");

        let strict = MatcherBuilder::default().build(&template).unwrap();
        let relaxed = MatcherBuilder::new(MatcherOptions::case_insensitive())
            .build(&template)
            .unwrap();

        let request = IncomingRequest::new("GET", "/users");
        assert!(!strict.matches(&request));
        assert!(relaxed.matches(&request));
    }

    #[test]
    fn test_build_is_deterministic() {
        let template = HttpRequestTemplate::new()
            .with_method("POST")
            .with_body(BodyTemplate::regex("id=\\d+"));
        let builder = MatcherBuilder::default();
        let first = builder.build(&template).unwrap();
        let second = builder.build(&template).unwrap();

        for request in [
            IncomingRequest::new("POST", "/").with_body("id=42"),
            IncomingRequest::new("POST", "/").with_body("id=x"),
            IncomingRequest::new("GET", "/").with_body("id=42"),
        ] {
            assert_eq!(first.matches(&request), second.matches(&request));
        }
    }

    #[test]
    fn test_matcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequestMatcher>();
        assert_send_sync::<MatcherBuilder>();
    }
}
