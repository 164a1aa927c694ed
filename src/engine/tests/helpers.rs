//! Shared operation builders for engine tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};

use crate::errors::OpError;
use crate::ops::{op, TrackedOp};

/// Operation resolving immediately.
pub fn ready_op(name: &str, value: JsonValue) -> TrackedOp {
    op(name, move |_args| async move { Ok(value) })
}

/// Operation resolving after a real timer delay.
pub fn delayed_op(name: &str, value: JsonValue, delay_ms: u64) -> TrackedOp {
    op(name, move |_args| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(value)
    })
}

/// Operation rejecting with the given error.
pub fn failing_op(name: &str, code: &str, message: &str) -> TrackedOp {
    let error = OpError::new(code, message);
    op(name, move |_args| async move { Err(error) })
}

/// Like `delayed_op`, but counts how many times the underlying action is
/// actually started.
pub fn counted_op(
    name: &str,
    value: JsonValue,
    delay_ms: u64,
    starts: &Arc<AtomicUsize>,
) -> TrackedOp {
    let starts = Arc::clone(starts);
    op(name, move |_args| {
        starts.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(value)
        }
    })
}

/// Operation summing its numeric arguments.
pub fn sum_args_op(name: &str) -> TrackedOp {
    op(name, |args| async move {
        let total: f64 = args.iter().filter_map(|v| v.as_f64()).sum();
        Ok(json!(total))
    })
}

/// Numeric payload accessor for test bodies.
pub fn num(v: &JsonValue) -> f64 {
    v.as_f64().expect("numeric payload")
}
