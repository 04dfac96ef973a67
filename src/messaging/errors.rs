//! # Messaging Error Types
//!
//! Structured errors for the hearing-update transport.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    QueueOperation {
        queue_name: String,
        operation: String,
        message: String,
    },

    #[error("Unknown message receipt {receipt} on queue {queue_name}")]
    UnknownReceipt { queue_name: String, receipt: i64 },

    #[error("Message too large: {size_bytes} bytes exceeds limit of {limit_bytes} bytes")]
    MessageTooLarge { size_bytes: usize, limit_bytes: usize },
}

impl MessagingError {
    pub fn queue_operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn unknown_receipt(queue_name: impl Into<String>, receipt: i64) -> Self {
        Self::UnknownReceipt {
            queue_name: queue_name.into(),
            receipt,
        }
    }
}

/// Result type for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;
