use thiserror::Error;

use super::version_guard::GuardError;
use crate::store::StoreError;

/// Reasons a hearing update is rejected. All are retryable from the
/// transport's point of view; none advance the version guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Malformed hearing message: {message}")]
    MalformedMessage { message: String },

    #[error("Hearing {hearing_id} is listed but the message lacks {field}")]
    MissingListingDetails { hearing_id: String, field: String },

    #[error("Message for case {message_case_id} applied to case {snapshot_case_id}")]
    CaseMismatch {
        message_case_id: String,
        snapshot_case_id: String,
    },
}

impl ReconcileError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
        }
    }

    pub fn missing_listing_details(hearing_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingListingDetails {
            hearing_id: hearing_id.into(),
            field: field.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedMessage { .. })
    }
}

/// Failures while ingesting one queued message; the message is nacked
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Case store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Version guard rejected commit: {0}")]
    Guard(#[from] GuardError),

    #[error("Reconciliation of hearing message did not complete within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Reconciliation panicked: {message}")]
    Panicked { message: String },
}

impl IngestError {
    /// Short label used for nack reasons and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reconcile(ReconcileError::MalformedMessage { .. }) => "malformed_message",
            Self::Reconcile(_) => "reconcile_rejected",
            Self::Store(_) => "store_failure",
            Self::Guard(_) => "guard_rejected",
            Self::Timeout { .. } => "timeout",
            Self::Panicked { .. } => "panicked",
        }
    }
}
