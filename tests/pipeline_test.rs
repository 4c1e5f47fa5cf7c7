//! Integration tests for whole chain runs through the pipeline.

use dragnet::{body, check, validation_result, Location, Message, Request};
use serde_json::{json, Value};

fn as_i64(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

#[test]
fn test_sanitizers_fold_left_to_right() {
    // double, then add one: 3 -> 7
    let mut req = Request::new().with_body(json!({ "n": 3 }));
    body("n")
        .custom_sanitizer(|value, _| as_i64(value).map(|n| json!(n * 2)))
        .custom_sanitizer(|value, _| as_i64(value).map(|n| json!(n + 1)))
        .run(&mut req)
        .unwrap();

    assert_eq!(req.location(Location::Body), &json!({ "n": 7 }));
}

#[test]
fn test_sanitized_value_persists_back() {
    let mut req = Request::new().with_body(json!({ "name": "  Alice  " }));
    body("name")
        .custom_sanitizer(|value, _| {
            value.and_then(Value::as_str).map(|s| json!(s.trim()))
        })
        .run(&mut req)
        .unwrap();
    assert_eq!(req.location(Location::Body), &json!({ "name": "Alice" }));
}

#[test]
fn test_absent_field_not_created_by_persist() {
    let mut req = Request::new().with_body(json!({ "a": 1 }));
    body("ghost").custom(|_, _| Ok(true)).run(&mut req).unwrap();
    assert_eq!(req.location(Location::Body), &json!({ "a": 1 }));
}

#[test]
fn test_validation_after_sanitization_sees_new_value() {
    let mut req = Request::new().with_body(json!({ "n": "41" }));
    body("n")
        .custom_sanitizer(|value, _| {
            value
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .map(|n| json!(n + 1))
        })
        .custom(|value, _| Ok(as_i64(value) == Some(42)))
        .run(&mut req)
        .unwrap();
    assert!(validation_result(&req).is_empty());
}

#[test]
fn test_thrown_cause_message() {
    // No item message, no chain message: the cause's rendering wins.
    let mut req = Request::new().with_body(json!({ "f": 1 }));
    body("f")
        .custom(|_, _| Err("boom".into()))
        .run(&mut req)
        .unwrap();
    assert_eq!(validation_result(&req).array()[0].message(), "boom");
}

#[test]
fn test_item_message_beats_thrown_cause() {
    let mut req = Request::new().with_body(json!({ "f": 1 }));
    body("f")
        .custom(|_, _| Err("boom".into()))
        .error("nope")
        .run(&mut req)
        .unwrap();
    assert_eq!(validation_result(&req).array()[0].message(), "nope");
}

#[test]
fn test_fallback_message() {
    let mut req = Request::new().with_body(json!({ "f": 1 }));
    body("f").custom(|_, _| Ok(false)).run(&mut req).unwrap();
    assert_eq!(validation_result(&req).array()[0].message(), "Invalid value");
}

#[test]
fn test_dynamic_message() {
    let mut req = Request::new().with_body(json!({ "age": -3 }));
    body("age")
        .custom(|value, _| Ok(as_i64(value).is_some_and(|n| n >= 0)))
        .error(Message::dynamic(|value, meta| {
            format!(
                "{} is not a valid {}",
                value.map(|v| v.to_string()).unwrap_or_default(),
                meta.path
            )
        }))
        .run(&mut req)
        .unwrap();
    assert_eq!(
        validation_result(&req).array()[0].message(),
        "-3 is not a valid age"
    );
}

#[test]
fn test_error_reports_original_value_after_sanitization() {
    let mut req = Request::new().with_body(json!({ "n": "5" }));
    body("n")
        .custom_sanitizer(|_, _| Some(json!(99)))
        .custom(|_, _| Ok(false))
        .run(&mut req)
        .unwrap();

    let errors = validation_result(&req);
    match &errors.errors()[0] {
        dragnet::ValidationError::Field { value, .. } => {
            assert_eq!(value, &Some(json!("5")));
        }
        other => panic!("expected field error, got {:?}", other),
    }
}

#[test]
fn test_negated_validator() {
    // Negated: fails iff the underlying predicate returns truthy.
    let is_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::is_empty)
            .unwrap_or(true)
    };

    let mut req = Request::new().with_body(json!({ "f": "" }));
    body("f")
        .not()
        .custom(move |value, _| Ok(is_empty(value)))
        .error("must not be empty")
        .run(&mut req)
        .unwrap();
    assert_eq!(
        validation_result(&req).array()[0].message(),
        "must not be empty"
    );

    let mut req = Request::new().with_body(json!({ "f": "full" }));
    body("f")
        .not()
        .custom(move |value, _| Ok(is_empty(value)))
        .run(&mut req)
        .unwrap();
    assert!(validation_result(&req).is_empty());
}

#[test]
fn test_bail_stops_instance_after_error() {
    let mut req = Request::new().with_body(json!({ "f": "x" }));
    body("f")
        .custom(|_, _| Ok(false))
        .error("first")
        .bail()
        .custom(|_, _| Ok(false))
        .error("unreached")
        .run(&mut req)
        .unwrap();

    let messages: Vec<String> = validation_result(&req)
        .array()
        .iter()
        .map(|e| e.message().to_string())
        .collect();
    assert_eq!(messages, vec!["first"]);
}

#[test]
fn test_bail_is_per_instance() {
    // One failing element must not halt the other's validation.
    let mut req = Request::new().with_body(json!({ "xs": ["bad", "ok"] }));
    body("xs.*")
        .custom(|value, _| Ok(value.and_then(Value::as_str) != Some("bad")))
        .error("rejected")
        .bail()
        .custom(|value, _| Ok(value.and_then(Value::as_str) != Some("ok")))
        .error("second stage")
        .run(&mut req)
        .unwrap();

    let result = validation_result(&req);
    let summary: Vec<(Option<String>, String)> = result
        .errors()
        .iter()
        .map(|e| (e.path(), e.message().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some("xs[0]".to_string()), "rejected".to_string()),
            (Some("xs[1]".to_string()), "second stage".to_string()),
        ]
    );
}

#[test]
fn test_condition_halts_one_instance_only() {
    let mut req = Request::new().with_body(json!({ "a": 1, "b": 2 }));
    check(["a", "b"], &[Location::Body])
        .when(|value, _| Ok(as_i64(value) == Some(2)))
        .custom(|_, _| Ok(false))
        .error("validated")
        .run(&mut req)
        .unwrap();

    // Only `b` passed the condition, so only `b` reached validation.
    let errors = validation_result(&req);
    assert_eq!(errors.array().len(), 1);
    assert_eq!(errors.errors()[0].path(), Some("b".to_string()));
}

#[test]
fn test_chain_condition_gates_on_other_field() {
    let gate = body("mode").custom(|value, _| Ok(value.and_then(Value::as_str) == Some("strict")));

    // Gate fails: the chain is skipped silently.
    let mut relaxed = Request::new().with_body(json!({ "mode": "loose", "f": "" }));
    body("f")
        .when_chain(gate.clone())
        .custom(|value, _| Ok(value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())))
        .run(&mut relaxed)
        .unwrap();
    assert!(validation_result(&relaxed).is_empty());

    // Gate passes: validation applies.
    let mut strict = Request::new().with_body(json!({ "mode": "strict", "f": "" }));
    body("f")
        .when_chain(gate)
        .custom(|value, _| Ok(value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())))
        .run(&mut strict)
        .unwrap();
    assert_eq!(validation_result(&strict).array().len(), 1);
}

#[test]
fn test_multi_location_narrowing() {
    let mut req = Request::new()
        .with_body(json!({}))
        .with_query(json!({ "token": "abc" }));
    check("token", &[Location::Body, Location::Query])
        .custom(|value, _| Ok(value.is_some()))
        .run(&mut req)
        .unwrap();

    // The defined query instance wins the group; no error for the body.
    assert!(validation_result(&req).is_empty());
}

#[test]
fn test_multi_location_all_missing_reports_once() {
    let mut req = Request::new();
    check("token", &[Location::Body, Location::Query])
        .custom(|value, _| Ok(value.is_some()))
        .error("token required")
        .run(&mut req)
        .unwrap();

    let errors = validation_result(&req);
    assert_eq!(errors.array().len(), 1);
    assert_eq!(errors.errors()[0].message(), "token required");
}

#[test]
fn test_whole_location_selector() {
    let mut req = Request::new().with_body(json!([1, 2, 3]));
    body("")
        .custom(|value, _| Ok(value.map(|v| v.is_array()).unwrap_or(false)))
        .run(&mut req)
        .unwrap();
    assert!(validation_result(&req).is_empty());
}

#[test]
fn test_standard_validator_per_sequence_element() {
    let mut req = Request::new().with_body(json!({ "tags": ["ok", ""] }));
    body("tags")
        .validate_with("notEmpty", |value, _| !value.is_empty(), Vec::new())
        .error("empty tag")
        .run(&mut req)
        .unwrap();

    let errors = validation_result(&req);
    assert_eq!(errors.array().len(), 1);
    assert_eq!(errors.errors()[0].message(), "empty tag");
}

#[test]
fn test_standard_validator_options() {
    let mut req = Request::new().with_body(json!({ "pin": "12" }));
    body("pin")
        .validate_with(
            "isLength",
            |value, options| {
                let min = options.first().and_then(Value::as_u64).unwrap_or(0) as usize;
                value.chars().count() >= min
            },
            vec![json!(4)],
        )
        .error("too short")
        .run(&mut req)
        .unwrap();
    assert_eq!(validation_result(&req).array()[0].message(), "too short");
}
