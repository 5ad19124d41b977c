//! Report equality as seen from outside the crate.

use report_throttle::{
    Breadcrumb, EqualityKey, ErrorReport, HandledState, KeyError, Severity, StackFrame,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

fn full_report() -> ErrorReport {
    ErrorReport::new("ReferenceError", "foo is not defined")
        .with_api_key("0123456789abcdef")
        .with_context("/checkout")
        .with_grouping_hash("checkout-foo")
        .with_meta_data(json!({ "cart": { "items": 3, "total": 42.5 } }))
        .with_handled_state(HandledState::unhandled())
        .with_stacktrace(vec![StackFrame::new("checkout.js", "submit", 88)])
        .with_user(json!({ "id": "u-1" }))
        .with_app(json!({ "releaseStage": "production", "version": "1.2.3" }))
}

#[test]
fn test_key_is_stable_across_extractions() {
    let report = full_report();
    let first = EqualityKey::extract(&report).unwrap();
    let second = EqualityKey::extract(&report).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.as_str(), second.as_str());
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_every_equality_field_matters() {
    let base = EqualityKey::extract(&full_report()).unwrap();

    let mut variants: Vec<ErrorReport> = Vec::new();
    let mut r = full_report();
    r.api_key = Some("other".into());
    variants.push(r);
    let mut r = full_report();
    r.error_class = Some("TypeError".into());
    variants.push(r);
    let mut r = full_report();
    r.error_message = Some("bar is not defined".into());
    variants.push(r);
    let mut r = full_report();
    r.stacktrace = Some(vec![StackFrame::new("checkout.js", "submit", 89)]);
    variants.push(r);
    let mut r = full_report();
    r.context = Some(json!("/cart"));
    variants.push(r);
    let mut r = full_report();
    r.grouping_hash = None;
    variants.push(r);
    let mut r = full_report();
    r.meta_data = Some(json!({ "cart": { "items": 4, "total": 42.5 } }));
    variants.push(r);
    let mut r = full_report();
    r.handled_state = Some(HandledState::handled());
    variants.push(r);
    let mut r = full_report();
    r.user = Some(json!({ "id": "u-2" }));
    variants.push(r);
    let mut r = full_report();
    r.app = Some(json!({ "releaseStage": "staging", "version": "1.2.3" }));
    variants.push(r);

    for (i, variant) in variants.iter().enumerate() {
        let key = EqualityKey::extract(variant).unwrap();
        assert_ne!(key, base, "variant {} should not match", i);
    }
}

#[test]
fn test_breadcrumbs_and_device_are_ignored() {
    let base = EqualityKey::extract(&full_report()).unwrap();

    let noisy = full_report()
        .with_breadcrumb(Breadcrumb::new("fetch /api/cart", "request", "2026-03-01T10:00:00Z"))
        .with_breadcrumb(Breadcrumb::new("click", "user", "2026-03-01T10:00:01Z"))
        .with_device(json!({ "time": "2026-03-01T10:00:02Z", "locale": "en-GB" }));

    assert_eq!(EqualityKey::extract(&noisy).unwrap(), base);
}

#[test]
fn test_ignored_flag_is_not_part_of_key() {
    let mut report = full_report();
    let before = EqualityKey::extract(&report).unwrap();
    report.ignore();
    assert_eq!(EqualityKey::extract(&report).unwrap(), before);
}

#[test]
fn test_absent_differs_from_null() {
    let absent: ErrorReport = ErrorReport::new("Error", "boom");
    let null_context: ErrorReport = ErrorReport::new("Error", "boom").with_context(Value::Null);

    assert_ne!(
        EqualityKey::extract(&absent).unwrap(),
        EqualityKey::extract(&null_context).unwrap()
    );
}

#[test]
fn test_array_order_matters() {
    let a = ErrorReport::new("Error", "boom").with_meta_data(json!({ "tags": ["x", "y"] }));
    let b = ErrorReport::new("Error", "boom").with_meta_data(json!({ "tags": ["y", "x"] }));

    assert_ne!(
        EqualityKey::extract(&a).unwrap(),
        EqualityKey::extract(&b).unwrap()
    );
}

#[derive(Serialize)]
struct Checkout {
    cart_id: u32,
    coupons: BTreeMap<String, u32>,
}

#[test]
fn test_typed_metadata_matches_equivalent_json() {
    let mut coupons = BTreeMap::new();
    coupons.insert("SPRING".to_string(), 10);

    let typed = ErrorReport::new("Error", "boom").with_meta_data(Checkout {
        cart_id: 7,
        coupons,
    });
    let untyped: ErrorReport = ErrorReport::new("Error", "boom")
        .with_meta_data(json!({ "coupons": { "SPRING": 10 }, "cart_id": 7 }));

    assert_eq!(
        EqualityKey::extract(&typed).unwrap(),
        EqualityKey::extract(&untyped).unwrap()
    );
}

#[test]
fn test_unrepresentable_metadata_is_an_error() {
    let mut meta = HashMap::new();
    meta.insert((1u8, 2u8), "tuple keys cannot become JSON object keys");

    let report = ErrorReport::new("Error", "boom").with_meta_data(meta);
    let err = EqualityKey::extract(&report).unwrap_err();

    assert!(matches!(err, KeyError::Serialize(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_severity_serializes_lowercase() {
    let state = HandledState::handled();
    assert_eq!(state.severity, Severity::Warning);

    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["severity"], json!("warning"));
    assert_eq!(value["unhandled"], json!(false));
}

#[test]
fn test_payload_frames_differing_in_extra_field_are_distinct() {
    let payload = |source: &str| {
        json!({
            "errorClass": "Error",
            "errorMessage": "boom",
            "stacktrace": [{ "file": "a.js", "lineNumber": 1, "source": source }]
        })
    };

    let r1: ErrorReport = serde_json::from_value(payload("x()")).unwrap();
    let r2: ErrorReport = serde_json::from_value(payload("y()")).unwrap();
    let again: ErrorReport = serde_json::from_value(payload("x()")).unwrap();

    let key = EqualityKey::extract(&r1).unwrap();
    assert_ne!(key, EqualityKey::extract(&r2).unwrap());
    assert_eq!(key, EqualityKey::extract(&again).unwrap());

    // Unknown fields survive a round trip through the typed model
    let stacktrace = r1.stacktrace.as_ref().unwrap();
    assert_eq!(stacktrace[0].extra.get("source"), Some(&json!("x()")));
}

#[test]
fn test_integer_and_integral_float_metadata_match() {
    let int: ErrorReport = serde_json::from_str(r#"{"metaData":{"n":1}}"#).unwrap();
    let float: ErrorReport = serde_json::from_str(r#"{"metaData":{"n":1.0}}"#).unwrap();

    assert_eq!(
        EqualityKey::extract(&int).unwrap(),
        EqualityKey::extract(&float).unwrap()
    );
}
