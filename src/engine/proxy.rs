//! Tracked-call proxies
//!
//! The body never touches an underlying operation directly; it calls through
//! `Proxies`, which serves cached settlements synchronously and turns the
//! first observation of a not-yet-started operation into a spawn plus a
//! suspension signal. Starting the action is the only externally visible
//! effect, and it happens at most once per run.

use std::cell::RefCell;

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::engine::interrupt::Interrupt;
use crate::engine::pending::PendingSet;
use crate::engine::registry::{Registry, Reply};
use crate::errors::{self, OpError};
use crate::types::OpId;

/// The tracked-operation call surface handed to the body on every pass.
///
/// Operations are addressed by their position in the caller-supplied list;
/// diagnostic names are informational only and never used as identity keys.
pub struct Proxies<'run> {
    registry: &'run RefCell<Registry>,
    pending: &'run RefCell<PendingSet>,
}

impl<'run> Proxies<'run> {
    pub(crate) fn new(
        registry: &'run RefCell<Registry>,
        pending: &'run RefCell<PendingSet>,
    ) -> Self {
        Proxies { registry, pending }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke tracked operation `id` as if it returned its value directly.
    ///
    /// Settled operations reply synchronously from cache: fulfilled (or
    /// masked) values as `Ok`, unhandled rejections as `Err(Fault)`, and
    /// recorded-and-substituted rejections as `Ok` with the substitute. The
    /// arguments only matter on the call that first starts the operation;
    /// later calls ignore them.
    ///
    /// A pending operation raises `Err(Suspend)`, starting the underlying
    /// action first if this is its first observation.
    pub fn call(&self, id: OpId, args: Vec<JsonValue>) -> Result<JsonValue, Interrupt> {
        let mut registry = self.registry.borrow_mut();

        let slot = match registry.slot(id) {
            Some(slot) => slot,
            None => {
                return Err(Interrupt::Fault(OpError::new(
                    errors::UNKNOWN_OPERATION,
                    format!("no tracked operation at index {}", id),
                )));
            }
        };

        if let Some(reply) = &slot.reply {
            trace!(op = %slot.record.name, "cache hit");
            return match reply {
                Reply::Value(value) => Ok(value.clone()),
                Reply::Fault(error) => Err(Interrupt::Fault(error.clone())),
            };
        }

        // Pending. Start the action on first observation; an already-started
        // operation registers nothing new but still suspends the pass.
        if let Some(future) = registry.start(id, args) {
            let handle = tokio::spawn(future);
            self.pending.borrow_mut().register(id, handle);
            trace!(op = id, "operation started");
        }
        Err(Interrupt::Suspend(id))
    }
}
