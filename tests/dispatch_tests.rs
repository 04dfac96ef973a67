//! Dispatcher behaviour through the public API: ordering, threading,
//! aggregation and failure classification.

mod common;

use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use tribunal_core::callback::{CallbackContext, CallbackPhase, HandlerResult};
use tribunal_core::config::FeatureFlags;
use tribunal_core::dispatch::{DispatchError, Dispatcher};
use tribunal_core::handlers::register_builtin;
use tribunal_core::registry::{DispatchPriority, FnHandler, HandlerError, HandlerRegistry};

fn append(
    name: &'static str,
) -> impl Fn(&CallbackContext) -> Result<HandlerResult, HandlerError> + Send + Sync + 'static {
    move |ctx: &CallbackContext| {
        let mut data = ctx.current().clone();
        let trail = data
            .entry("trail")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = trail {
            items.push(json!(name));
        }
        Ok(HandlerResult::new(data))
    }
}

fn context(phase: CallbackPhase, event: &str) -> CallbackContext {
    CallbackContext::new(phase, event, CASE_ID, case_data(json!({})))
}

#[test]
fn test_priority_bands_then_registration_order() {
    let mut builder = HandlerRegistry::builder();
    builder
        .register(
            FnHandler::for_event("late_a", CallbackPhase::AboutToSubmit, "appealCreated", append("late_a")),
        )
        .unwrap()
        .register(
            FnHandler::for_event("earliest", CallbackPhase::AboutToSubmit, "appealCreated", append("earliest"))
                .with_priority(DispatchPriority::Earliest),
        )
        .unwrap()
        .register(
            FnHandler::for_event("late_b", CallbackPhase::AboutToSubmit, "appealCreated", append("late_b")),
        )
        .unwrap()
        .register(
            FnHandler::for_event("latest", CallbackPhase::AboutToSubmit, "appealCreated", append("latest"))
                .with_priority(DispatchPriority::Latest),
        )
        .unwrap();

    let dispatcher = Dispatcher::new(Arc::new(builder.build()));
    let result = dispatcher
        .dispatch(context(CallbackPhase::AboutToSubmit, "appealCreated"))
        .unwrap();

    assert_eq!(result.data["trail"], json!(["earliest", "late_a", "late_b", "latest"]));
}

#[test]
fn test_errors_and_warnings_aggregate_in_order() {
    let mut builder = HandlerRegistry::builder();
    builder
        .register(FnHandler::for_event("first", CallbackPhase::MidEvent, "validate", |ctx| {
            Ok(HandlerResult::new(ctx.current().clone())
                .with_error("first error")
                .with_warning("first warning"))
        }))
        .unwrap()
        .register(FnHandler::for_event("second", CallbackPhase::MidEvent, "validate", |ctx| {
            Ok(HandlerResult::new(ctx.current().clone())
                .with_error("second error")
                .with_warning("second warning"))
        }))
        .unwrap();

    let result = Dispatcher::new(Arc::new(builder.build()))
        .dispatch(context(CallbackPhase::MidEvent, "validate"))
        .unwrap();

    assert_eq!(result.errors, vec!["first error", "second error"]);
    assert_eq!(result.warnings, vec!["first warning", "second warning"]);
    assert!(result.is_rejected());
}

#[test]
fn test_unmatched_event_is_unhandled() {
    let mut builder = HandlerRegistry::builder();
    register_builtin(&mut builder, &FeatureFlags::default()).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(builder.build()));

    let err = dispatcher
        .dispatch(context(CallbackPhase::AboutToStart, "readyToList"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::Unhandled { .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn test_fault_discards_partial_result() {
    let mut builder = HandlerRegistry::builder();
    builder
        .register(FnHandler::for_event("writer", CallbackPhase::AboutToSubmit, "x", append("writer")))
        .unwrap()
        .register(FnHandler::for_event("broken", CallbackPhase::AboutToSubmit, "x", |_| {
            Err(HandlerError::missing_case_data("appeal"))
        }))
        .unwrap();

    let err = Dispatcher::new(Arc::new(builder.build()))
        .dispatch(context(CallbackPhase::AboutToSubmit, "x"))
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::handler_fault("broken", HandlerError::missing_case_data("appeal"))
    );
}

#[test]
fn test_built_in_ready_to_list_defaults_route() {
    let mut builder = HandlerRegistry::builder();
    register_builtin(&mut builder, &FeatureFlags::default()).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(builder.build()));

    let result = dispatcher
        .dispatch(context(CallbackPhase::AboutToSubmit, "readyToList"))
        .unwrap();
    assert_eq!(
        result.data["schedulingAndListingFields"]["hearingRoute"],
        json!("listAssist")
    );
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_built_in_ready_to_list_warns_for_gaps() {
    let features = FeatureFlags {
        list_assist_enabled: false,
        ..FeatureFlags::default()
    };
    let mut builder = HandlerRegistry::builder();
    register_builtin(&mut builder, &features).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(builder.build()));

    let result = dispatcher
        .dispatch(context(CallbackPhase::AboutToSubmit, "readyToList"))
        .unwrap();
    assert_eq!(result.data["schedulingAndListingFields"]["hearingRoute"], json!("gaps"));
    assert_eq!(result.warnings, vec!["GAPS_CASE_WARNING"]);

    let acknowledged = context(CallbackPhase::AboutToSubmit, "readyToList").with_ignore_warnings(true);
    assert!(dispatcher.dispatch(acknowledged).unwrap().warnings.is_empty());
}

#[test]
fn test_rejection_leaves_input_snapshot_untouched() {
    let mut builder = HandlerRegistry::builder();
    register_builtin(&mut builder, &FeatureFlags::default()).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(builder.build()));

    let input = case_data(json!({"adjournment": {"signedInUser": "judge"}}));
    let ctx = CallbackContext::new(CallbackPhase::AboutToSubmit, "issueAdjournmentNotice", CASE_ID, input.clone());
    let result = dispatcher.dispatch(ctx.clone()).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(ctx.current(), &input);
}

#[tokio::test]
async fn test_slow_chain_times_out() {
    let mut builder = HandlerRegistry::builder();
    builder
        .register(FnHandler::for_event("slow", CallbackPhase::Submitted, "x", |ctx| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(HandlerResult::new(ctx.current().clone()))
        }))
        .unwrap();
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(builder.build())));

    let err = dispatcher
        .dispatch_with_timeout(context(CallbackPhase::Submitted, "x"), Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}
