//! Operation registration and supply-form normalization
//!
//! Callers hand the engine asynchronous operations in one of three forms: a
//! bare operation (failures re-raise in the body), an operation paired with a
//! mask substitute (failures become ordinary fulfilled values), or an
//! operation with an `on_error` handler (failures stay visible in diagnostics
//! while the body receives a substitute). Everything normalizes to `OpSpec`
//! before a run starts.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value as JsonValue;

use crate::errors::OpError;

/// Boxed in-flight operation.
pub type OpFuture = Pin<Box<dyn Future<Output = Result<JsonValue, OpError>> + Send>>;

/// The underlying asynchronous action. Invoked at most once per run, with the
/// arguments of the proxy call that first observed the operation.
pub type OpFn = Box<dyn FnOnce(Vec<JsonValue>) -> OpFuture + Send>;

type RecoverFn = Box<dyn Fn(&OpError) -> JsonValue + Send>;

/// An asynchronous operation registered with a run.
pub struct TrackedOp {
    pub(crate) name: String,
    pub(crate) action: OpFn,
}

impl TrackedOp {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(Vec<JsonValue>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<JsonValue, OpError>> + Send + 'static,
    {
        TrackedOp {
            name: name.into(),
            action: Box::new(move |args: Vec<JsonValue>| -> OpFuture { Box::pin(f(args)) }),
        }
    }

    /// Register without a diagnostic name; the registry assigns a positional
    /// one (`op1`, `op2`, ...).
    pub fn anonymous<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Vec<JsonValue>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<JsonValue, OpError>> + Send + 'static,
    {
        TrackedOp::new("", f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TrackedOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedOp").field("name", &self.name).finish()
    }
}

/// Shorthand for [`TrackedOp::new`].
pub fn op<F, Fut>(name: impl Into<String>, f: F) -> TrackedOp
where
    F: FnOnce(Vec<JsonValue>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<JsonValue, OpError>> + Send + 'static,
{
    TrackedOp::new(name, f)
}

/// How a substitute value is produced from a rejection.
pub enum Recovery {
    Constant(JsonValue),
    Compute(RecoverFn),
}

impl Recovery {
    pub fn value(v: impl Into<JsonValue>) -> Self {
        Recovery::Constant(v.into())
    }

    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&OpError) -> JsonValue + Send + 'static,
    {
        Recovery::Compute(Box::new(f))
    }

    pub(crate) fn resolve(&self, error: &OpError) -> JsonValue {
        match self {
            Recovery::Constant(v) => v.clone(),
            Recovery::Compute(f) => f(error),
        }
    }
}

impl std::fmt::Debug for Recovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recovery::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Recovery::Compute(_) => f.debug_tuple("Compute").field(&"<fn>").finish(),
        }
    }
}

/// Behavior applied when an operation's underlying action fails.
#[derive(Debug)]
pub enum FallbackPolicy {
    /// Store the rejection; every proxy call re-raises it.
    None,
    /// Store a substitute as a fulfillment; the failure leaves no diagnostic
    /// trace.
    Mask(Recovery),
    /// Store the rejection for diagnostics but hand the body a substitute.
    RecordAndSubstitute(Recovery),
}

/// A tracked operation with its fallback policy attached.
#[derive(Debug)]
pub struct OpSpec {
    pub(crate) op: TrackedOp,
    pub(crate) fallback: FallbackPolicy,
}

impl OpSpec {
    pub fn bare(op: TrackedOp) -> Self {
        OpSpec {
            op,
            fallback: FallbackPolicy::None,
        }
    }

    pub fn masked(op: TrackedOp, recovery: Recovery) -> Self {
        OpSpec {
            op,
            fallback: FallbackPolicy::Mask(recovery),
        }
    }

    /// The `{ operation, on_error }` supply form.
    pub fn with_handler(op: TrackedOp, recovery: Recovery) -> Self {
        OpSpec {
            op,
            fallback: FallbackPolicy::RecordAndSubstitute(recovery),
        }
    }
}

impl From<TrackedOp> for OpSpec {
    fn from(op: TrackedOp) -> Self {
        OpSpec::bare(op)
    }
}

/// The `(operation, substitute)` pair supply form maps to `Mask`.
impl From<(TrackedOp, Recovery)> for OpSpec {
    fn from((op, recovery): (TrackedOp, Recovery)) -> Self {
        OpSpec::masked(op, recovery)
    }
}
