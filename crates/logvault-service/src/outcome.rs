//! Result shape returned by manually triggered operations.

use serde::{Deserialize, Serialize};

/// Success flag plus a human-readable message.
///
/// Manual triggers never propagate errors past their boundary; failures
/// are folded into `success = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Whether the operation completed.
    pub success: bool,
    /// Summary or failure reason.
    pub message: String,
}

impl OperationOutcome {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
