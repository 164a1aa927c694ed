//! Error codes and error types
//!
//! `OpError` is the currency for operation and body failures. Engine-originated
//! failures use the code constants below; callers pick their own codes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::types::OpRecord;

/// A spawned operation task panicked before settling.
pub const OP_PANICKED: &str = "op_panicked";

/// The body called a proxy index outside the registered operations.
pub const UNKNOWN_OPERATION: &str = "unknown_operation";

/// A suspension was raised with nothing in flight; re-running the body could
/// never make progress.
pub const SUSPENDED_WITHOUT_PENDING: &str = "suspended_without_pending";

/// Failure payload with a machine-readable code and human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct OpError {
    pub code: String,
    pub message: String,
}

impl OpError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        OpError {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The JSON payload stored in a rejected record's `value`.
    pub fn to_value(&self) -> JsonValue {
        json!({ "code": self.code, "message": self.message })
    }
}

/// Whole-run failure: the first body logic failure or unhandled operation
/// rejection, together with the registry snapshot as it stood at failure time.
#[derive(Debug, Error)]
#[error("run failed: {error}")]
pub struct RunError {
    pub error: OpError,
    pub records: Vec<OpRecord>,
}
