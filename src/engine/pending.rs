//! Suspension controller
//!
//! Accumulates the in-flight handles registered during one pass and joins
//! them settle-all: every handle is awaited to its terminal state regardless
//! of how the others fare. One failing operation never short-circuits the
//! wait for its siblings. The set is drained for each join, leaving it empty
//! for the next pass.

use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::errors::{self, OpError};
use crate::types::OpId;

type InFlight = JoinHandle<Result<JsonValue, OpError>>;

pub(crate) struct PendingSet {
    handles: Vec<(OpId, InFlight)>,
}

impl PendingSet {
    pub(crate) fn new() -> Self {
        PendingSet { handles: Vec::new() }
    }

    pub(crate) fn register(&mut self, id: OpId, handle: InFlight) {
        self.handles.push((id, handle));
    }

    pub(crate) fn drain(&mut self) -> Vec<(OpId, InFlight)> {
        std::mem::take(&mut self.handles)
    }
}

/// Wait for every handle to settle and return the outcomes in registration
/// order.
///
/// The tasks are already running on the runtime, so awaiting the handles in
/// sequence still lets them all make progress concurrently; the order here
/// only fixes the order settlements are applied to the registry. A panicking
/// task settles as a rejection rather than tearing down the run.
pub(crate) async fn join_settled(
    handles: Vec<(OpId, InFlight)>,
) -> Vec<(OpId, Result<JsonValue, OpError>)> {
    let mut settlements = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(OpError::new(errors::OP_PANICKED, join_error.to_string())),
        };
        trace!(op = id, ok = outcome.is_ok(), "handle settled");
        settlements.push((id, outcome));
    }
    settlements
}
