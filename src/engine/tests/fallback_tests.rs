//! Tests for the mask and record-and-substitute fallback policies and the
//! operation supply forms

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use super::helpers::{delayed_op, failing_op, num, ready_op};
use crate::engine::run_with_fallback;
use crate::ops::{OpSpec, Recovery};
use crate::types::Status;

#[tokio::test]
async fn mask_hides_the_failure_behind_a_constant() {
    let specs = vec![OpSpec::masked(
        failing_op("flaky", "io", "connection reset"),
        Recovery::value(json!(1)),
    )];

    let (value, records) = run_with_fallback(|px| px.call(0, vec![]), specs)
        .await
        .unwrap();

    assert_eq!(value, json!(1));
    assert_eq!(records[0].status, Status::Fulfilled);
    assert_eq!(records[0].value, Some(json!(1)));
}

#[tokio::test]
async fn mask_computes_the_substitute_from_the_error() {
    let specs = vec![OpSpec::masked(
        failing_op("flaky", "timeout", "gave up"),
        Recovery::compute(|err| json!(format!("fallback:{}", err.code))),
    )];

    let (value, records) = run_with_fallback(|px| px.call(0, vec![]), specs)
        .await
        .unwrap();

    assert_eq!(value, json!("fallback:timeout"));
    assert_eq!(records[0].status, Status::Fulfilled);
}

#[tokio::test]
async fn record_and_substitute_keeps_the_failure_visible() {
    let specs = vec![OpSpec::with_handler(
        failing_op("avatar", "http_500", "upstream failed"),
        Recovery::compute(|_err| json!(2)),
    )];

    let (value, records) = run_with_fallback(|px| px.call(0, vec![]), specs)
        .await
        .unwrap();

    // The body proceeds with the substitute...
    assert_eq!(value, json!(2));
    // ...while diagnostics retain the real error.
    assert_eq!(records[0].status, Status::Rejected);
    assert_eq!(
        records[0].value,
        Some(json!({ "code": "http_500", "message": "upstream failed" }))
    );
}

#[tokio::test]
async fn mixed_policies_resolve_independently() {
    let specs = vec![
        OpSpec::masked(failing_op("op1", "io", "a"), Recovery::value(json!(1))),
        OpSpec::with_handler(
            failing_op("op2", "io", "b"),
            Recovery::compute(|_err| json!(2)),
        ),
    ];

    let (total, records) = run_with_fallback(
        |px| {
            let a = num(&px.call(0, vec![])?);
            let b = num(&px.call(1, vec![])?);
            Ok(a + b)
        },
        specs,
    )
    .await
    .unwrap();

    assert_eq!(total, 3.0);
    assert_eq!(records[0].status, Status::Fulfilled);
    assert_eq!(records[0].value, Some(json!(1)));
    assert_eq!(records[1].status, Status::Rejected);
    assert_eq!(
        records[1].value,
        Some(json!({ "code": "io", "message": "b" }))
    );
}

#[tokio::test]
async fn pair_supply_form_maps_to_mask() {
    let ops = vec![
        (
            failing_op("primary", "io", "down"),
            Recovery::value(json!("cached")),
        ),
        (delayed_op("secondary", json!("live"), 5), Recovery::value(json!("unused"))),
    ];

    let (value, records) = run_with_fallback(
        |px| Ok(json!([px.call(0, vec![])?, px.call(1, vec![])?])),
        ops,
    )
    .await
    .unwrap();

    assert_eq!(value, json!(["cached", "live"]));
    assert_eq!(records[0].status, Status::Fulfilled);
    assert_eq!(records[0].value, Some(json!("cached")));
    // A successful op never consults its mask.
    assert_eq!(records[1].value, Some(json!("live")));
}

#[tokio::test]
async fn bare_supply_form_re_raises_rejections() {
    let ops = vec![failing_op("flaky", "io", "boom")];

    let err = run_with_fallback::<JsonValue, _, _>(|px| px.call(0, vec![]), ops)
        .await
        .unwrap_err();

    assert_eq!(err.error.code, "io");
    assert_eq!(err.records[0].status, Status::Rejected);
}

#[tokio::test]
async fn substitute_is_computed_once_and_cached() {
    let computes = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&computes);
    let specs = vec![OpSpec::with_handler(
        failing_op("flaky", "io", "x"),
        Recovery::compute(move |_err| {
            c.fetch_add(1, Ordering::SeqCst);
            json!(5)
        }),
    )];

    let (total, _records) = run_with_fallback(
        |px| {
            let a = num(&px.call(0, vec![])?);
            let b = num(&px.call(0, vec![])?);
            Ok(a + b)
        },
        specs,
    )
    .await
    .unwrap();

    assert_eq!(total, 10.0);
    assert_eq!(computes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn masking_does_not_leak_into_successful_ops() {
    let specs = vec![OpSpec::masked(
        ready_op("stable", json!(9)),
        Recovery::value(json!(0)),
    )];

    let (value, records) = run_with_fallback(|px| px.call(0, vec![]), specs)
        .await
        .unwrap();

    assert_eq!(value, json!(9));
    assert_eq!(records[0].status, Status::Fulfilled);
    assert_eq!(records[0].value, Some(json!(9)));
}
