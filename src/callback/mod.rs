//! # Callback Model
//!
//! Request-scoped types describing one inbound case-lifecycle callback and
//! the result a handler chain produces for it.

pub mod case_data;
pub mod context;
pub mod phase;
pub mod response;

pub use case_data::CaseData;
pub use context::{CallbackContext, CallerToken, EventKind};
pub use phase::CallbackPhase;
pub use response::HandlerResult;
