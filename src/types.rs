use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Index of a tracked operation, in caller-supplied order.
pub type OpId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Fulfilled,
    Rejected,
}

/// Diagnostic record for one tracked operation.
///
/// Records are returned in the same order the operations were supplied.
/// `value` is absent while the operation is pending, the result payload once
/// fulfilled, and the error payload once rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpRecord {
    pub name: String,
    pub status: Status,
    pub value: Option<JsonValue>,
}

impl OpRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        OpRecord {
            name: name.into(),
            status: Status::Pending,
            value: None,
        }
    }

    /// True once the record has left `Pending`.
    pub fn is_settled(&self) -> bool {
        self.status != Status::Pending
    }
}
