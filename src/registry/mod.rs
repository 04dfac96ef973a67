//! # Handler Registry
//!
//! The callback handler contract and the frozen, ordered table of handlers
//! the dispatcher consults for every inbound callback.

pub mod handler;
pub mod handler_registry;

pub use handler::{CallbackHandler, DispatchPriority, FnHandler, HandlerDescriptor, HandlerError};
pub use handler_registry::{HandlerRegistry, HandlerRegistryBuilder, RegistryError, RegistryStats};
