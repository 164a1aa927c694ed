//! Pass-level control flow
//!
//! A pass ends in one of two ways besides a normal return: it suspends
//! because a tracked operation is still in flight, or it faults. Both travel
//! on the body's `Err` channel so `?` behaves as "rethrow", but only `Fault`
//! is a real error; `Suspend` is a control-flow marker the driver consumes
//! and never surfaces to the caller.

use crate::errors::OpError;
use crate::types::OpId;

#[derive(Debug)]
pub enum Interrupt {
    /// The referenced operation is in flight; the pass unwinds and the driver
    /// joins the pending set before re-invoking the body.
    Suspend(OpId),
    /// The body failed, or an unhandled operation rejection was re-raised.
    Fault(OpError),
}

impl Interrupt {
    pub fn fault(code: impl Into<String>, message: impl Into<String>) -> Self {
        Interrupt::Fault(OpError::new(code, message))
    }

    pub fn is_suspend(&self) -> bool {
        matches!(self, Interrupt::Suspend(_))
    }
}

impl From<OpError> for Interrupt {
    fn from(error: OpError) -> Self {
        Interrupt::Fault(error)
    }
}
