//! # Callback Dispatcher
//!
//! Routes one [`CallbackContext`] through every matching handler and folds the
//! results into a single [`HandlerResult`].
//!
//! ## Semantics
//!
//! - Matches are resolved once, against the inbound snapshot.
//! - Each handler sees the case data produced by its predecessor.
//! - Errors and warnings are concatenated in dispatch order.
//! - A handler fault or panic aborts the chain; no partial data is returned.
//! - An empty match set is [`DispatchError::Unhandled`].
//!
//! The dispatcher never inspects `errors` itself. Rejecting the event when
//! errors are present is the platform's job.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info_span, warn};

use super::errors::DispatchError;
use crate::callback::{CallbackContext, HandlerResult};
use crate::logging::log_dispatch_operation;
use crate::registry::{HandlerDescriptor, HandlerRegistry};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Run the handler chain for one callback
    pub fn dispatch(&self, context: CallbackContext) -> Result<HandlerResult, DispatchError> {
        let span = info_span!(
            "dispatch",
            case_id = %context.case_id(),
            phase = %context.phase(),
            event_kind = %context.event_kind(),
        );
        let _entered = span.enter();

        let matches = self
            .registry
            .lookup(context.phase(), context.event_kind(), context.current());

        if matches.is_empty() {
            warn!("No handler claims callback");
            log_dispatch_operation(
                "dispatch",
                context.case_id(),
                &context.phase().to_string(),
                context.event_kind().as_str(),
                "unhandled",
                None,
            );
            return Err(DispatchError::unhandled(
                context.phase(),
                context.event_kind().clone(),
            ));
        }

        let started = Instant::now();
        let handler_count = matches.len();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut current = context;

        for descriptor in matches {
            let result = invoke(descriptor, &current)?;
            debug!(
                handler = descriptor.name(),
                errors = result.errors.len(),
                warnings = result.warnings.len(),
                "Handler completed"
            );
            errors.extend(result.errors);
            warnings.extend(result.warnings);
            current = current.with_current(result.data);
        }

        log_dispatch_operation(
            "dispatch",
            current.case_id(),
            &current.phase().to_string(),
            current.event_kind().as_str(),
            if errors.is_empty() { "applied" } else { "rejected" },
            Some(&format!(
                "handlers={handler_count} errors={} warnings={} duration_ms={}",
                errors.len(),
                warnings.len(),
                started.elapsed().as_millis()
            )),
        );

        Ok(HandlerResult {
            data: current.into_current(),
            errors,
            warnings,
        })
    }

    /// Run the handler chain on the blocking pool, failing if it exceeds `timeout`.
    ///
    /// On expiry the chain's eventual result is discarded, so nothing partial
    /// reaches the caller.
    pub async fn dispatch_with_timeout(
        self: &Arc<Self>,
        context: CallbackContext,
        timeout: Duration,
    ) -> Result<HandlerResult, DispatchError> {
        let dispatcher = Arc::clone(self);
        let case_id = context.case_id().to_string();
        let task = tokio::task::spawn_blocking(move || dispatcher.dispatch(context));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(case_id = %case_id, error = %join_error, "Dispatch task failed to complete");
                Err(DispatchError::Aborted {
                    message: join_error.to_string(),
                })
            }
            Err(_) => {
                error!(
                    case_id = %case_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Dispatch timed out, discarding result"
                );
                Err(DispatchError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

fn invoke(
    descriptor: &HandlerDescriptor,
    context: &CallbackContext,
) -> Result<HandlerResult, DispatchError> {
    let handler = descriptor.handler();
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(context))) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(handler_error)) => {
            error!(
                handler = descriptor.name(),
                error = %handler_error,
                "Handler returned error, aborting chain"
            );
            Err(DispatchError::handler_fault(descriptor.name(), handler_error))
        }
        Err(panic_payload) => {
            let message = panic_message(panic_payload.as_ref());
            error!(
                handler = descriptor.name(),
                panic_msg = %message,
                "Handler panicked, aborting chain"
            );
            Err(DispatchError::handler_panicked(descriptor.name(), message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
