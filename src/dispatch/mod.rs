//! # Callback Dispatch
//!
//! Selects, orders and runs the handlers for one callback.

pub mod dispatcher;
pub mod errors;

pub use dispatcher::Dispatcher;
pub use errors::DispatchError;
