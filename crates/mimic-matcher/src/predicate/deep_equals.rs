//! Structural equality for JSON and XML documents.
//!
//! Two modes:
//! - `Strict`: documents must be deeply equal, including array order and
//!   with no extra object keys, attributes or child elements.
//! - `OnlyMatchingFields`: the expected document must be contained in the
//!   actual one. Objects and attributes are compared as subsets; arrays and
//!   child elements are compared position by position up to the expected
//!   length.

use super::xml::XmlElement;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Strictness mode for structural body matching.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Strict,
    #[default]
    OnlyMatchingFields,
}

/// Compare two JSON values.
pub fn json_matches(expected: &Value, actual: &Value, match_type: MatchType) -> bool {
    match (expected, actual) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(expected), Value::Array(actual)) => {
            let length_ok = match match_type {
                MatchType::Strict => expected.len() == actual.len(),
                MatchType::OnlyMatchingFields => expected.len() <= actual.len(),
            };
            length_ok
                && expected
                    .iter()
                    .zip(actual)
                    .all(|(e, a)| json_matches(e, a, match_type))
        }
        (Value::Object(expected), Value::Object(actual)) => {
            if match_type == MatchType::Strict && expected.len() != actual.len() {
                return false;
            }
            expected.iter().all(|(key, e)| {
                actual
                    .get(key)
                    .is_some_and(|a| json_matches(e, a, match_type))
            })
        }
        _ => false,
    }
}

/// Integers compare exactly; 1 and 1.0 are the same number.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.as_u64() == b.as_u64(),
        _ => false,
    }
}

/// Compare two XML element trees.
pub fn xml_matches(expected: &XmlElement, actual: &XmlElement, match_type: MatchType) -> bool {
    if expected.name != actual.name {
        return false;
    }

    let element_ok = match match_type {
        MatchType::Strict => {
            expected.attributes == actual.attributes
                && expected.text == actual.text
                && expected.children.len() == actual.children.len()
        }
        MatchType::OnlyMatchingFields => {
            expected
                .attributes
                .iter()
                .all(|(name, value)| actual.attributes.get(name) == Some(value))
                && (expected.text.is_empty() || expected.text == actual.text)
                && expected.children.len() <= actual.children.len()
        }
    };

    element_ok
        && expected
            .children
            .iter()
            .zip(&actual.children)
            .all(|(e, a)| xml_matches(e, a, match_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn xml(s: &str) -> XmlElement {
        XmlElement::parse(s).unwrap()
    }

    #[test]
    fn test_json_strict_requires_equality() {
        let expected = json!({"name": "John", "tags": ["a", "b"]});

        assert!(json_matches(
            &expected,
            &json!({"tags": ["a", "b"], "name": "John"}),
            MatchType::Strict
        ));
        assert!(!json_matches(
            &expected,
            &json!({"name": "John", "tags": ["a", "b"], "age": 30}),
            MatchType::Strict
        ));
        assert!(!json_matches(
            &expected,
            &json!({"name": "John", "tags": ["b", "a"]}),
            MatchType::Strict
        ));
        assert!(!json_matches(
            &expected,
            &json!({"name": "John", "tags": ["a", "b", "c"]}),
            MatchType::Strict
        ));
    }

    #[test]
    fn test_json_subset_allows_extra_fields() {
        let expected = json!({"user": {"name": "John"}, "items": [1, 2]});

        assert!(json_matches(
            &expected,
            &json!({"user": {"name": "John", "age": 30}, "items": [1, 2, 3], "extra": true}),
            MatchType::OnlyMatchingFields
        ));
        // Missing key
        assert!(!json_matches(
            &expected,
            &json!({"items": [1, 2]}),
            MatchType::OnlyMatchingFields
        ));
        // Array shorter than expected
        assert!(!json_matches(
            &expected,
            &json!({"user": {"name": "John"}, "items": [1]}),
            MatchType::OnlyMatchingFields
        ));
        // Array order still matters
        assert!(!json_matches(
            &expected,
            &json!({"user": {"name": "John"}, "items": [2, 1]}),
            MatchType::OnlyMatchingFields
        ));
    }

    #[test]
    fn test_json_numbers_compare_by_value() {
        assert!(json_matches(&json!(1), &json!(1.0), MatchType::Strict));
        assert!(!json_matches(&json!(1), &json!(2), MatchType::Strict));
        assert!(!json_matches(&json!(1), &json!("1"), MatchType::Strict));
    }

    #[test]
    fn test_json_large_integers_compare_exactly() {
        let expected: Value = serde_json::from_str(r#"{"id": 9007199254740993}"#).unwrap();
        let neighbour: Value = serde_json::from_str(r#"{"id": 9007199254740992}"#).unwrap();
        assert!(!json_matches(&expected, &neighbour, MatchType::Strict));
        assert!(!json_matches(&expected, &neighbour, MatchType::OnlyMatchingFields));
        assert!(json_matches(&expected, &expected.clone(), MatchType::Strict));

        assert!(json_matches(&json!(u64::MAX), &json!(u64::MAX), MatchType::Strict));
        assert!(!json_matches(&json!(u64::MAX), &json!(-1), MatchType::Strict));
        assert!(json_matches(&json!(-3), &json!(-3.0), MatchType::Strict));
    }

    #[test]
    fn test_json_null_is_not_missing() {
        assert!(!json_matches(
            &json!({"a": null}),
            &json!({}),
            MatchType::OnlyMatchingFields
        ));
        assert!(json_matches(
            &json!({"a": null}),
            &json!({"a": null, "b": 1}),
            MatchType::OnlyMatchingFields
        ));
    }

    #[test]
    fn test_xml_strict() {
        let expected = xml(r#"<order id="1"><item>A</item></order>"#);

        assert!(xml_matches(
            &expected,
            &xml(r#"<order id="1"><item>A</item></order>"#),
            MatchType::Strict
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<order id="1" status="new"><item>A</item></order>"#),
            MatchType::Strict
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<order id="1"><item>A</item><item>B</item></order>"#),
            MatchType::Strict
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<order id="1"><item>B</item></order>"#),
            MatchType::Strict
        ));
    }

    #[test]
    fn test_xml_subset() {
        let expected = xml(r#"<order id="1"><item/></order>"#);

        assert!(xml_matches(
            &expected,
            &xml(r#"<order id="1" status="new"><item sku="x">A</item><item>B</item></order>"#),
            MatchType::OnlyMatchingFields
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<order id="2"><item/></order>"#),
            MatchType::OnlyMatchingFields
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<order id="1"/>"#),
            MatchType::OnlyMatchingFields
        ));
        assert!(!xml_matches(
            &expected,
            &xml(r#"<invoice id="1"><item/></invoice>"#),
            MatchType::OnlyMatchingFields
        ));
    }

    #[test]
    fn test_match_type_serde() {
        let strict: MatchType = serde_json::from_str(r#""STRICT""#).unwrap();
        assert_eq!(strict, MatchType::Strict);
        let subset: MatchType = serde_json::from_str(r#""ONLY_MATCHING_FIELDS""#).unwrap();
        assert_eq!(subset, MatchType::OnlyMatchingFields);
        assert_eq!(MatchType::default(), MatchType::OnlyMatchingFields);
    }
}
