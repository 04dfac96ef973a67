//! Transport-neutral view of a queue carrying hearing updates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::errors::MessagingResult;

/// Handle used to acknowledge or release a received message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageReceipt(pub i64);

impl std::fmt::Display for MessageReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message claimed from the queue for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub receipt: MessageReceipt,
    pub body: Vec<u8>,
    /// Application properties, e.g. `hmctsDeploymentId`
    pub properties: HashMap<String, String>,
    /// 1 on first delivery
    pub delivery_count: u32,
}

impl QueuedMessage {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// At-least-once message source.
///
/// Received messages stay invisible for the visibility timeout. `ack` removes
/// a message for good; `nack` makes it available for redelivery (or
/// dead-letters it, at the transport's discretion).
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn receive(&self, limit: usize, visibility_timeout: Duration) -> MessagingResult<Vec<QueuedMessage>>;

    async fn ack(&self, receipt: MessageReceipt) -> MessagingResult<()>;

    async fn nack(&self, receipt: MessageReceipt, reason: &str) -> MessagingResult<()>;
}
