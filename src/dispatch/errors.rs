use thiserror::Error;

use crate::callback::{CallbackPhase, EventKind};
use crate::registry::HandlerError;

/// Fatal dispatch outcomes. Validation failures are not errors; they travel in
/// `HandlerResult::errors`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No handler claims the callback: the event catalogue and the registry disagree
    #[error("No handler registered for event '{event_kind}' in phase {phase}")]
    Unhandled {
        phase: CallbackPhase,
        event_kind: EventKind,
    },

    #[error("Handler '{handler}' failed: {source}")]
    HandlerFault {
        handler: String,
        #[source]
        source: HandlerError,
    },

    #[error("Handler '{handler}' panicked: {message}")]
    HandlerPanicked { handler: String, message: String },

    #[error("Dispatch did not complete within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Dispatch task aborted: {message}")]
    Aborted { message: String },
}

impl DispatchError {
    pub fn unhandled(phase: CallbackPhase, event_kind: EventKind) -> Self {
        Self::Unhandled { phase, event_kind }
    }

    pub fn handler_fault(handler: impl Into<String>, source: HandlerError) -> Self {
        Self::HandlerFault {
            handler: handler.into(),
            source,
        }
    }

    pub fn handler_panicked(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Deployment mismatch rather than a runtime fault
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Unhandled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unhandled = DispatchError::unhandled(CallbackPhase::MidEvent, "x".into());
        assert!(unhandled.is_configuration_error());
        assert_eq!(
            unhandled.to_string(),
            "No handler registered for event 'x' in phase mid_event"
        );

        let fault = DispatchError::handler_fault("h", HandlerError::fault("boom"));
        assert!(!fault.is_configuration_error());
        assert_eq!(fault.to_string(), "Handler 'h' failed: Handler fault: boom");

        assert!(DispatchError::Timeout { timeout_ms: 5 }.is_timeout());
    }
}
