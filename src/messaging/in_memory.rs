//! # In-Memory Message Queue
//!
//! In-process queue for local runs and tests, with the delivery semantics the
//! ingestor relies on from a real broker.
//!
//! ## Key Features
//!
//! - **Visibility timeout**: received messages are hidden until acked, nacked
//!   or the timeout lapses (the crash-recovery path)
//! - **Redelivery**: `nack` makes a message immediately visible again
//! - **Dead-lettering**: after `max_deliveries` failed deliveries a nacked
//!   message moves to the dead-letter list with its last failure reason

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::{MessagingError, MessagingResult};
use super::source::{MessageReceipt, MessageSource, QueuedMessage};

const DEFAULT_MAX_MESSAGE_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
struct StoredMessage {
    id: i64,
    body: Vec<u8>,
    properties: HashMap<String, String>,
    enqueued_at: DateTime<Utc>,
    visible_at: Option<DateTime<Utc>>,
    delivery_count: u32,
}

/// Message removed from circulation after exhausting its deliveries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub receipt: MessageReceipt,
    pub body: Vec<u8>,
    pub properties: HashMap<String, String>,
    pub delivery_count: u32,
    pub reason: String,
    pub dead_lettered_at: DateTime<Utc>,
}

/// Queue depth snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueMetrics {
    pub queue_name: String,
    pub pending: usize,
    pub in_flight: usize,
    pub dead_lettered: usize,
    pub acknowledged: u64,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<StoredMessage>,
    dead_letters: Vec<DeadLetter>,
    next_id: i64,
    acknowledged: u64,
}

#[derive(Debug)]
pub struct InMemoryMessageQueue {
    name: String,
    max_deliveries: u32,
    max_message_bytes: usize,
    state: tokio::sync::Mutex<QueueState>,
}

impl InMemoryMessageQueue {
    pub fn new(name: impl Into<String>, max_deliveries: u32) -> Self {
        Self {
            name: name.into(),
            max_deliveries: max_deliveries.max(1),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            state: tokio::sync::Mutex::new(QueueState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a raw body with application properties
    pub async fn send(
        &self,
        body: Vec<u8>,
        properties: HashMap<String, String>,
    ) -> MessagingResult<MessageReceipt> {
        if body.len() > self.max_message_bytes {
            return Err(MessagingError::MessageTooLarge {
                size_bytes: body.len(),
                limit_bytes: self.max_message_bytes,
            });
        }

        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;
        state.messages.push_back(StoredMessage {
            id,
            body,
            properties,
            enqueued_at: Utc::now(),
            visible_at: None,
            delivery_count: 0,
        });

        debug!(queue = %self.name, message_id = id, "Message enqueued");
        Ok(MessageReceipt(id))
    }

    /// Serialize and enqueue a JSON value
    pub async fn send_json(
        &self,
        body: &serde_json::Value,
        properties: HashMap<String, String>,
    ) -> MessagingResult<MessageReceipt> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            MessagingError::queue_operation(&self.name, "send", format!("serialization failed: {e}"))
        })?;
        self.send(bytes, properties).await
    }

    pub async fn metrics(&self) -> QueueMetrics {
        let state = self.state.lock().await;
        let now = Utc::now();
        let in_flight = state
            .messages
            .iter()
            .filter(|m| m.visible_at.is_some_and(|at| at > now))
            .count();
        QueueMetrics {
            queue_name: self.name.clone(),
            pending: state.messages.len() - in_flight,
            in_flight,
            dead_lettered: state.dead_letters.len(),
            acknowledged: state.acknowledged,
            oldest_enqueued_at: state.messages.iter().map(|m| m.enqueued_at).min(),
        }
    }

    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.state.lock().await.dead_letters.clone()
    }

    /// Messages not yet acknowledged or dead-lettered
    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageSource for InMemoryMessageQueue {
    async fn receive(&self, limit: usize, visibility_timeout: Duration) -> MessagingResult<Vec<QueuedMessage>> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let visibility = chrono::Duration::from_std(visibility_timeout).map_err(|e| {
            MessagingError::queue_operation(&self.name, "receive", format!("invalid visibility timeout: {e}"))
        })?;
        let hidden_until = now + visibility;

        let mut claimed = Vec::new();
        for message in state.messages.iter_mut() {
            if claimed.len() >= limit {
                break;
            }
            let available = message.visible_at.map_or(true, |at| at <= now);
            if !available {
                continue;
            }
            message.visible_at = Some(hidden_until);
            message.delivery_count += 1;
            claimed.push(QueuedMessage {
                receipt: MessageReceipt(message.id),
                body: message.body.clone(),
                properties: message.properties.clone(),
                delivery_count: message.delivery_count,
            });
        }
        Ok(claimed)
    }

    async fn ack(&self, receipt: MessageReceipt) -> MessagingResult<()> {
        let mut state = self.state.lock().await;
        let index = state
            .messages
            .iter()
            .position(|m| m.id == receipt.0)
            .ok_or_else(|| MessagingError::unknown_receipt(&self.name, receipt.0))?;
        state.messages.remove(index);
        state.acknowledged += 1;
        Ok(())
    }

    async fn nack(&self, receipt: MessageReceipt, reason: &str) -> MessagingResult<()> {
        let mut state = self.state.lock().await;
        let index = state
            .messages
            .iter()
            .position(|m| m.id == receipt.0)
            .ok_or_else(|| MessagingError::unknown_receipt(&self.name, receipt.0))?;

        if state.messages[index].delivery_count >= self.max_deliveries {
            if let Some(message) = state.messages.remove(index) {
                warn!(
                    queue = %self.name,
                    message_id = message.id,
                    delivery_count = message.delivery_count,
                    reason = %reason,
                    "Message dead-lettered"
                );
                state.dead_letters.push(DeadLetter {
                    receipt,
                    body: message.body,
                    properties: message.properties,
                    delivery_count: message.delivery_count,
                    reason: reason.to_string(),
                    dead_lettered_at: Utc::now(),
                });
            }
        } else {
            state.messages[index].visible_at = None;
            debug!(queue = %self.name, message_id = receipt.0, reason = %reason, "Message released for redelivery");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VT: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn test_received_messages_are_hidden_until_released() {
        let queue = InMemoryMessageQueue::new("hearings", 3);
        queue.send(b"one".to_vec(), HashMap::new()).await.unwrap();

        let first = queue.receive(10, VT).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].delivery_count, 1);
        assert!(queue.receive(10, VT).await.unwrap().is_empty());

        queue.nack(first[0].receipt, "retry").await.unwrap();
        let second = queue.receive(10, VT).await.unwrap();
        assert_eq!(second[0].delivery_count, 2);
    }

    #[tokio::test]
    async fn test_ack_removes_message() {
        let queue = InMemoryMessageQueue::new("hearings", 3);
        queue.send(b"one".to_vec(), HashMap::new()).await.unwrap();
        let received = queue.receive(1, VT).await.unwrap();
        queue.ack(received[0].receipt).await.unwrap();

        assert!(queue.is_empty().await);
        assert_eq!(queue.metrics().await.acknowledged, 1);
        assert!(queue.ack(received[0].receipt).await.is_err());
    }

    #[tokio::test]
    async fn test_dead_letter_after_max_deliveries() {
        let queue = InMemoryMessageQueue::new("hearings", 2);
        queue.send(b"poison".to_vec(), HashMap::new()).await.unwrap();

        for _ in 0..2 {
            let received = queue.receive(1, VT).await.unwrap();
            queue.nack(received[0].receipt, "malformed").await.unwrap();
        }

        assert!(queue.is_empty().await);
        let dead = queue.dead_letters().await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].reason, "malformed");
        assert_eq!(dead[0].delivery_count, 2);
    }

    #[tokio::test]
    async fn test_expired_visibility_redelivers() {
        let queue = InMemoryMessageQueue::new("hearings", 3);
        queue.send(b"one".to_vec(), HashMap::new()).await.unwrap();
        queue.receive(1, Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(queue.receive(1, VT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let queue = InMemoryMessageQueue::new("hearings", 3);
        let err = queue
            .send(vec![0u8; DEFAULT_MAX_MESSAGE_BYTES + 1], HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::MessageTooLarge { .. }));
    }
}
