//! Unit tests for the coercion table and union handling.

use rstest::rstest;
use serde_json::{Value, json};

use super::{CoercionError, ValueKind, coerce, coerce_value};

fn typed(name: &str) -> Value {
    json!({ "type": name })
}

#[rstest]
#[case(json!("42"), "integer", json!(42))]
#[case(json!(" 7 "), "integer", json!(7))]
#[case(json!("18446744073709551615"), "integer", json!(18_446_744_073_709_551_615_u64))]
#[case(json!("42"), "number", json!(42))]
#[case(json!("4.0"), "number", json!(4))]
#[case(json!("4.5"), "number", json!(4.5))]
#[case(json!("plain"), "string", json!("plain"))]
#[case(json!(12), "string", json!("12"))]
#[case(json!(1.5), "string", json!("1.5"))]
#[case(json!(true), "string", json!("true"))]
#[case(json!(3.0), "integer", json!(3))]
#[case(json!(3), "number", json!(3))]
#[case(json!(0), "boolean", json!(false))]
#[case(json!(5), "boolean", json!(true))]
#[case(json!(5), "array", json!([5]))]
#[case(json!(["a", 1, true]), "string", json!("a,1,true"))]
#[case(json!([]), "boolean", json!(false))]
#[case(json!("{\"k\": 1}"), "object", json!({"k": 1}))]
#[case(json!({"k": [1]}), "object", json!({"k": [1]}))]
#[case(json!("null"), "null", Value::Null)]
fn converts_supported_pairs(#[case] raw: Value, #[case] target: &str, #[case] expected: Value) {
    let coerced = coerce_value(&raw, &typed(target)).expect("coercion succeeds");
    assert_eq!(coerced, expected);
}

#[rstest]
#[case("true")]
#[case("yes")]
#[case("1")]
#[case("On")]
#[case("Y")]
#[case("TRUE")]
fn truthy_text_becomes_true(#[case] raw: &str) {
    assert_eq!(coerce_value(&json!(raw), &typed("boolean")).ok(), Some(json!(true)));
}

#[rstest]
#[case("false")]
#[case("no")]
#[case("0")]
#[case("off")]
#[case("")]
fn falsy_text_becomes_false(#[case] raw: &str) {
    assert_eq!(coerce_value(&json!(raw), &typed("boolean")).ok(), Some(json!(false)));
}

#[rstest]
#[case("a, b, c", json!(["a", "b", "c"]))]
#[case("a,b,", json!(["a", "b", ""]))]
#[case("single", json!(["single"]))]
#[case("", json!([]))]
#[case("[\"x,y\", \"z\"]", json!(["x,y", "z"]))]
fn text_splits_into_arrays(#[case] raw: &str, #[case] expected: Value) {
    assert_eq!(coerce_value(&json!(raw), &typed("array")).ok(), Some(expected));
}

#[test]
fn array_items_are_coerced_with_the_items_schema() {
    let leaf = json!({"type": "array", "items": {"type": "integer"}});
    assert_eq!(coerce_value(&json!("1, 2, 3"), &leaf).ok(), Some(json!([1, 2, 3])));
    assert!(coerce_value(&json!("1, two"), &leaf).is_err());
}

#[test]
fn malformed_integer_names_value_kind_and_target() {
    let err = coerce_value(&json!("not-a-number"), &typed("integer")).expect_err("must fail");
    match err {
        CoercionError::Malformed {
            value,
            kind,
            target,
            ..
        } => {
            assert_eq!(value, json!("not-a-number"));
            assert_eq!(kind, ValueKind::String);
            assert_eq!(target, "integer");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[rstest]
#[case(json!({"a": 1}), "string")]
#[case(json!(true), "integer")]
#[case(json!([1]), "number")]
#[case(Value::Null, "string")]
#[case(json!(1.5), "boolean")]
#[case(json!(2), "object")]
fn unmapped_pairs_fail_closed(#[case] raw: Value, #[case] target: &str) {
    let err = coerce_value(&raw, &typed(target)).expect_err("no rule exists");
    assert!(matches!(err, CoercionError::Unsupported { .. }), "got {err:?}");
}

#[rstest]
#[case(json!("1.5"), "integer")]
#[case(json!(1.5), "integer")]
#[case(json!("maybe"), "boolean")]
#[case(json!("[1, 2"), "array")]
#[case(json!("[1, 2]"), "object")]
#[case(json!("nothing"), "null")]
fn unparseable_text_is_malformed(#[case] raw: Value, #[case] target: &str) {
    let err = coerce_value(&raw, &typed(target)).expect_err("parse fails");
    assert!(matches!(err, CoercionError::Malformed { .. }), "got {err:?}");
}

#[test]
fn constraints_apply_after_conversion() {
    let leaf = json!({"type": "integer", "minimum": 1, "maximum": 65534});
    assert_eq!(coerce_value(&json!("8080"), &leaf).ok(), Some(json!(8080)));
    let err = coerce_value(&json!("70000"), &leaf).expect_err("out of range");
    assert!(matches!(err, CoercionError::Constraint { .. }), "got {err:?}");
}

#[test]
fn enum_constraint_rejects_unknown_members() {
    let leaf = json!({"type": "string", "enum": ["DEBUG", "INFO"]});
    assert!(coerce_value(&json!("INFO"), &leaf).is_ok());
    assert!(matches!(
        coerce_value(&json!("LOUD"), &leaf),
        Err(CoercionError::Constraint { .. })
    ));
}

#[test]
fn absent_values_skip_coercion() {
    assert_eq!(coerce(None, &typed("integer")).ok(), Some(None));
    assert_eq!(
        coerce(Some(&json!("3")), &typed("integer")).ok(),
        Some(Some(json!(3)))
    );
}

#[test]
fn type_list_tries_candidates_in_order() {
    let leaf = json!({"type": ["integer", "string"]});
    assert_eq!(coerce_value(&json!("12"), &leaf).ok(), Some(json!(12)));
    assert_eq!(coerce_value(&json!("twelve"), &leaf).ok(), Some(json!("twelve")));
}

#[test]
fn nullable_string_keeps_text_and_accepts_null() {
    let leaf = json!({"type": ["string", "null"]});
    assert_eq!(coerce_value(&json!("/my/log"), &leaf).ok(), Some(json!("/my/log")));
    assert_eq!(coerce_value(&Value::Null, &leaf).ok(), Some(Value::Null));
}

#[test]
fn any_of_returns_first_alternative_that_validates() {
    let leaf = json!({"anyOf": [
        {"type": "integer", "minimum": 100},
        {"type": "string"}
    ]});
    assert_eq!(coerce_value(&json!("150"), &leaf).ok(), Some(json!(150)));
    assert_eq!(coerce_value(&json!("15"), &leaf).ok(), Some(json!("15")));
}

#[test]
fn one_of_uses_first_viable_alternative() {
    let leaf = json!({"oneOf": [{"type": "boolean"}, {"type": "array"}]});
    assert_eq!(coerce_value(&json!("yes"), &leaf).ok(), Some(json!(true)));
    assert_eq!(coerce_value(&json!("a,b"), &leaf).ok(), Some(json!(["a", "b"])));
}

#[test]
fn all_of_refines_through_every_alternative() {
    let leaf = json!({"allOf": [{"type": "number"}, {"type": "integer"}, {"minimum": 1}]});
    assert_eq!(coerce_value(&json!("5.0"), &leaf).ok(), Some(json!(5)));
    assert!(coerce_value(&json!("0"), &leaf).is_err());
    assert!(coerce_value(&json!("5.5"), &leaf).is_err());
}

#[test]
fn exhausted_union_reports_no_alternative() {
    let leaf = json!({"anyOf": [{"type": "integer"}, {"type": "boolean"}]});
    let err = coerce_value(&json!("neither"), &leaf).expect_err("nothing matches");
    match err {
        CoercionError::NoAlternative { target, .. } => {
            assert_eq!(target, "anyOf[integer, boolean]");
        }
        other => panic!("expected NoAlternative, got {other:?}"),
    }
}

#[test]
fn untyped_leaves_pass_values_through() {
    let leaf = json!({"description": "anything goes"});
    assert_eq!(coerce_value(&json!("raw"), &leaf).ok(), Some(json!("raw")));
}

#[test]
fn unknown_type_names_are_rejected() {
    let err = coerce_value(&json!("x"), &typed("text")).expect_err("bad leaf");
    assert!(matches!(err, CoercionError::InvalidLeaf { .. }), "got {err:?}");
}
