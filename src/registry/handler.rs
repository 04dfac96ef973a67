//! # Callback Handler Contract
//!
//! A handler pairs an applicability predicate with a pure transformation from
//! [`CallbackContext`] to [`HandlerResult`]. Business-rule violations are
//! returned in `HandlerResult::errors`; [`HandlerError`] is reserved for
//! unexpected faults and aborts the whole dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::callback::{CallbackContext, CallbackPhase, CaseData, EventKind, HandlerResult};

/// Ordering band for handlers matching the same callback.
///
/// Handlers run band by band; within a band, registration order decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchPriority {
    Earliest,
    Early,
    #[default]
    Late,
    Latest,
}

impl fmt::Display for DispatchPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earliest => write!(f, "earliest"),
            Self::Early => write!(f, "early"),
            Self::Late => write!(f, "late"),
            Self::Latest => write!(f, "latest"),
        }
    }
}

/// Unexpected handler fault
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Required case data missing: {field}")]
    MissingCaseData { field: String },

    #[error("Handler invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Handler fault: {message}")]
    Fault { message: String },
}

impl HandlerError {
    pub fn missing_case_data(field: impl Into<String>) -> Self {
        Self::MissingCaseData {
            field: field.into(),
        }
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }
}

/// Business logic bound to one or more (phase, event kind) combinations
pub trait CallbackHandler: Send + Sync {
    /// Unique name used in logs and registration checks
    fn name(&self) -> &str;

    fn priority(&self) -> DispatchPriority {
        DispatchPriority::default()
    }

    /// Whether this handler applies. May inspect case data, not just phase and event.
    fn can_handle(&self, phase: CallbackPhase, event_kind: &EventKind, snapshot: &CaseData) -> bool;

    /// Produce the handler's result. Must not perform I/O inline.
    fn handle(&self, context: &CallbackContext) -> Result<HandlerResult, HandlerError>;
}

type Predicate = dyn Fn(CallbackPhase, &EventKind, &CaseData) -> bool + Send + Sync;
type Apply = dyn Fn(&CallbackContext) -> Result<HandlerResult, HandlerError> + Send + Sync;

/// Closure-backed handler, for registering a (predicate, apply) row without a new type
pub struct FnHandler {
    name: String,
    priority: DispatchPriority,
    predicate: Box<Predicate>,
    apply: Box<Apply>,
}

impl FnHandler {
    pub fn new<P, A>(name: impl Into<String>, predicate: P, apply: A) -> Self
    where
        P: Fn(CallbackPhase, &EventKind, &CaseData) -> bool + Send + Sync + 'static,
        A: Fn(&CallbackContext) -> Result<HandlerResult, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority: DispatchPriority::default(),
            predicate: Box::new(predicate),
            apply: Box::new(apply),
        }
    }

    /// Handler matching exactly one (phase, event kind) pair
    pub fn for_event<A>(
        name: impl Into<String>,
        phase: CallbackPhase,
        event_kind: impl Into<EventKind>,
        apply: A,
    ) -> Self
    where
        A: Fn(&CallbackContext) -> Result<HandlerResult, HandlerError> + Send + Sync + 'static,
    {
        let event_kind = event_kind.into();
        Self::new(
            name,
            move |p, e, _| p == phase && *e == event_kind,
            apply,
        )
    }

    pub fn with_priority(mut self, priority: DispatchPriority) -> Self {
        self.priority = priority;
        self
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl CallbackHandler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> DispatchPriority {
        self.priority
    }

    fn can_handle(&self, phase: CallbackPhase, event_kind: &EventKind, snapshot: &CaseData) -> bool {
        (self.predicate)(phase, event_kind, snapshot)
    }

    fn handle(&self, context: &CallbackContext) -> Result<HandlerResult, HandlerError> {
        (self.apply)(context)
    }
}

/// A registered handler plus its position in the registry
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub(crate) sequence: usize,
    pub(crate) priority: DispatchPriority,
    pub(crate) handler: Arc<dyn CallbackHandler>,
}

impl HandlerDescriptor {
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn priority(&self) -> DispatchPriority {
        self.priority
    }

    /// Registration position, the tie-break within a priority band
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn matches(&self, phase: CallbackPhase, event_kind: &EventKind, snapshot: &CaseData) -> bool {
        self.handler.can_handle(phase, event_kind, snapshot)
    }

    pub fn handler(&self) -> &Arc<dyn CallbackHandler> {
        &self.handler
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(DispatchPriority::Earliest < DispatchPriority::Early);
        assert!(DispatchPriority::Early < DispatchPriority::Late);
        assert!(DispatchPriority::Late < DispatchPriority::Latest);
        assert_eq!(DispatchPriority::default(), DispatchPriority::Late);
    }

    #[test]
    fn test_fn_handler_for_event_predicate() {
        let handler = FnHandler::for_event("h", CallbackPhase::AboutToSubmit, "readyToList", |ctx| {
            Ok(HandlerResult::new(ctx.current().clone()))
        });
        let empty = CaseData::new();
        assert!(handler.can_handle(CallbackPhase::AboutToSubmit, &"readyToList".into(), &empty));
        assert!(!handler.can_handle(CallbackPhase::MidEvent, &"readyToList".into(), &empty));
        assert!(!handler.can_handle(CallbackPhase::AboutToSubmit, &"other".into(), &empty));
    }

    #[test]
    fn test_handler_error_messages() {
        assert_eq!(
            HandlerError::missing_case_data("appeal").to_string(),
            "Required case data missing: appeal"
        );
        assert_eq!(HandlerError::fault("boom").to_string(), "Handler fault: boom");
    }
}
