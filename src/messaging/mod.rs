//! # Messaging Module
//!
//! Queue abstractions for hearing-update ingestion and an in-memory
//! implementation with visibility-timeout, redelivery and dead-letter
//! semantics.

pub mod errors;
pub mod in_memory;
pub mod source;

pub use errors::{MessagingError, MessagingResult};
pub use in_memory::{DeadLetter, InMemoryMessageQueue, QueueMetrics};
pub use source::{MessageReceipt, MessageSource, QueuedMessage};
