//! Operation registry
//!
//! One slot per tracked operation, in caller-supplied order. A slot owns the
//! diagnostic record, the not-yet-started action, and the settled reply the
//! proxy serves on later calls. Settlement applies the fallback policy and
//! happens exactly once; terminal states never change afterwards.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::errors::OpError;
use crate::ops::{FallbackPolicy, OpFn, OpFuture, OpSpec};
use crate::types::{OpId, OpRecord, Status};

/// What a proxy call yields once the operation has settled.
#[derive(Debug)]
pub(crate) enum Reply {
    Value(JsonValue),
    Fault(OpError),
}

pub(crate) struct Slot {
    pub(crate) record: OpRecord,
    pub(crate) action: Option<OpFn>,
    pub(crate) fallback: FallbackPolicy,
    pub(crate) reply: Option<Reply>,
}

pub(crate) struct Registry {
    slots: Vec<Slot>,
}

impl Registry {
    pub(crate) fn new(specs: Vec<OpSpec>) -> Self {
        let slots = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                let name = if spec.op.name.is_empty() {
                    format!("op{}", i + 1)
                } else {
                    spec.op.name
                };
                Slot {
                    record: OpRecord::pending(name),
                    action: Some(spec.op.action),
                    fallback: spec.fallback,
                    reply: None,
                }
            })
            .collect();
        Registry { slots }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, id: OpId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// Take the action out of the slot and invoke it with the proxy call's
    /// arguments. Returns `None` if the operation was already started.
    pub(crate) fn start(&mut self, id: OpId, args: Vec<JsonValue>) -> Option<OpFuture> {
        self.slots[id].action.take().map(|action| action(args))
    }

    /// Write the terminal state for one operation per its fallback policy.
    ///
    /// A second settlement for the same slot is ignored; records are
    /// immutable once they leave `Pending`.
    pub(crate) fn settle(&mut self, id: OpId, outcome: Result<JsonValue, OpError>) {
        let slot = &mut self.slots[id];
        if slot.record.is_settled() {
            return;
        }
        match outcome {
            Ok(value) => {
                slot.record.status = Status::Fulfilled;
                slot.record.value = Some(value.clone());
                slot.reply = Some(Reply::Value(value));
            }
            Err(error) => match &slot.fallback {
                FallbackPolicy::None => {
                    slot.record.status = Status::Rejected;
                    slot.record.value = Some(error.to_value());
                    slot.reply = Some(Reply::Fault(error));
                }
                FallbackPolicy::Mask(recovery) => {
                    let substitute = recovery.resolve(&error);
                    slot.record.status = Status::Fulfilled;
                    slot.record.value = Some(substitute.clone());
                    slot.reply = Some(Reply::Value(substitute));
                }
                FallbackPolicy::RecordAndSubstitute(recovery) => {
                    let substitute = recovery.resolve(&error);
                    slot.record.status = Status::Rejected;
                    slot.record.value = Some(error.to_value());
                    slot.reply = Some(Reply::Value(substitute));
                }
            },
        }
        debug!(
            op = %self.slots[id].record.name,
            status = ?self.slots[id].record.status,
            "operation settled"
        );
    }

    /// Clone the current records, including any still pending.
    pub(crate) fn snapshot(&self) -> Vec<OpRecord> {
        self.slots.iter().map(|s| s.record.clone()).collect()
    }

    pub(crate) fn into_records(self) -> Vec<OpRecord> {
        self.slots.into_iter().map(|s| s.record).collect()
    }
}
