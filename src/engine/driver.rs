//! Execution driver
//!
//! Repeatedly invokes the body from its start, memoizing tracked-operation
//! outcomes between passes, until one pass runs to completion without
//! suspending. This is restart-based suspension, not coroutine capture: a
//! pass that hits a pending operation is abandoned and the whole body runs
//! again once the pending set has settled. Non-tracked side effects in the
//! body therefore repeat on every pass and must be idempotent.

use std::cell::RefCell;

use tracing::debug;

use crate::engine::interrupt::Interrupt;
use crate::engine::pending::{join_settled, PendingSet};
use crate::engine::proxy::Proxies;
use crate::engine::registry::Registry;
use crate::errors::{self, OpError, RunError};
use crate::ops::{OpSpec, TrackedOp};
use crate::types::OpRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Running,
    Suspended,
    Completed,
    Failed,
}

fn enter(phase: &mut RunPhase, next: RunPhase, pass: u64) {
    debug!(pass, from = ?*phase, to = ?next, "run phase");
    *phase = next;
}

/// Run `body` against plain tracked operations.
///
/// Rejections carry no fallback: each proxy call for a rejected operation
/// re-raises the cached error, and an uncaught one fails the run.
pub async fn run<T, F>(body: F, ops: Vec<TrackedOp>) -> Result<(T, Vec<OpRecord>), RunError>
where
    F: FnMut(&Proxies<'_>) -> Result<T, Interrupt>,
{
    execute(body, ops.into_iter().map(OpSpec::bare).collect()).await
}

/// Run `body` with per-operation fallback policies.
///
/// Each element is supplied as a bare operation, an `(operation, substitute)`
/// pair, or [`OpSpec::with_handler`]; see [`crate::ops`] for the
/// normalization.
pub async fn run_with_fallback<T, F, S>(
    body: F,
    ops: Vec<S>,
) -> Result<(T, Vec<OpRecord>), RunError>
where
    F: FnMut(&Proxies<'_>) -> Result<T, Interrupt>,
    S: Into<OpSpec>,
{
    execute(body, ops.into_iter().map(Into::into).collect()).await
}

/// The pass loop shared by both entry points.
async fn execute<T, F>(mut body: F, specs: Vec<OpSpec>) -> Result<(T, Vec<OpRecord>), RunError>
where
    F: FnMut(&Proxies<'_>) -> Result<T, Interrupt>,
{
    let registry = RefCell::new(Registry::new(specs));
    let pending = RefCell::new(PendingSet::new());
    let mut phase = RunPhase::Running;
    let mut pass: u64 = 0;

    loop {
        pass += 1;
        let outcome = {
            let proxies = Proxies::new(&registry, &pending);
            body(&proxies)
        };

        match outcome {
            Ok(value) => {
                enter(&mut phase, RunPhase::Completed, pass);
                return Ok((value, registry.into_inner().into_records()));
            }
            Err(Interrupt::Suspend(op)) => {
                enter(&mut phase, RunPhase::Suspended, pass);
                let in_flight = pending.borrow_mut().drain();
                if in_flight.is_empty() {
                    // Nothing to wait for: re-running the body would suspend
                    // on the same settled state forever.
                    enter(&mut phase, RunPhase::Failed, pass);
                    return Err(RunError {
                        error: OpError::new(
                            errors::SUSPENDED_WITHOUT_PENDING,
                            format!("suspended on operation {} with nothing in flight", op),
                        ),
                        records: registry.borrow().snapshot(),
                    });
                }
                debug!(pass, suspended_on = op, in_flight = in_flight.len(), "joining");
                let settlements = join_settled(in_flight).await;
                {
                    let mut registry = registry.borrow_mut();
                    for (id, outcome) in settlements {
                        registry.settle(id, outcome);
                    }
                }
                enter(&mut phase, RunPhase::Running, pass);
            }
            Err(Interrupt::Fault(error)) => {
                enter(&mut phase, RunPhase::Failed, pass);
                debug!(pass, code = %error.code, "body faulted");
                return Err(RunError {
                    error,
                    records: registry.borrow().snapshot(),
                });
            }
        }
    }
}
