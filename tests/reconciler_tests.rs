//! Hearing reconciliation scenarios against the reconciler and version guard.

mod common;

use common::*;
use std::sync::Arc;

use tribunal_core::hearings::{
    HearingState, HearingStatusReconciler, HearingUpdateMessage, Reconciliation, VersionGuard,
};
use tribunal_core::store::CaseRecord;

fn parse(builder: &HearingMessageBuilder) -> HearingUpdateMessage {
    HearingUpdateMessage::parse(&builder.bytes()).expect("valid message")
}

fn case() -> CaseRecord {
    CaseRecord::new(CASE_ID, "readyToList", Default::default())
}

async fn apply(reconciler: &HearingStatusReconciler, builder: &HearingMessageBuilder) -> Reconciliation {
    reconciler.reconcile(&parse(builder), &case()).await.expect("reconciles")
}

#[tokio::test]
async fn test_accept_then_stale() {
    let guard = Arc::new(VersionGuard::new());
    let reconciler = HearingStatusReconciler::new(guard.clone());

    let Reconciliation::Apply(pending) = apply(&reconciler, &HearingMessageBuilder::listed(2)).await else {
        panic!("listed message should produce a mutation");
    };
    pending.commit().unwrap();

    let outcome = apply(&reconciler, &HearingMessageBuilder::new("CANCELLED").version(1)).await;
    assert!(matches!(
        outcome,
        Reconciliation::Stale { request_version: 1, last_applied: 2, .. }
    ));

    let state = guard.state(HEARING_ID).await.unwrap();
    assert_eq!(state.current_status, HearingState::Listed);
    assert_eq!(state.last_applied_version, 2);
}

#[tokio::test]
async fn test_non_fixed_listing_passes_through() {
    let guard = Arc::new(VersionGuard::new());
    let reconciler = HearingStatusReconciler::new(guard.clone());

    let outcome = apply(
        &reconciler,
        &HearingMessageBuilder::new("AWAITING_LISTING")
            .listing_status("PROVISIONAL")
            .version(3),
    )
    .await;
    let Reconciliation::NotHandled(pending) = outcome else {
        panic!("expected pass-through");
    };
    assert!(pending.mutation().is_none());
    pending.commit().unwrap();

    let state = guard.state(HEARING_ID).await.unwrap();
    assert_eq!(state.last_applied_version, 3);
    assert_eq!(state.current_status, HearingState::AwaitingListing);
}

#[tokio::test]
async fn test_exception_outranks_cancellation_codes() {
    let reconciler = HearingStatusReconciler::new(Arc::new(VersionGuard::new()));
    let outcome = apply(
        &reconciler,
        &HearingMessageBuilder::new("EXCEPTION")
            .listing_status("CNCL")
            .reason("withdraw")
            .version(1),
    )
    .await;

    let Reconciliation::Apply(pending) = outcome else {
        panic!("exception should produce a mutation");
    };
    let mutation = pending.mutation().unwrap();
    assert_eq!(mutation.new_status, HearingState::Exception);
    assert_eq!(mutation.event.id, "listingError");
}

#[tokio::test]
async fn test_redelivery_is_duplicate_without_mutation() {
    let reconciler = HearingStatusReconciler::new(Arc::new(VersionGuard::new()));
    let message = HearingMessageBuilder::new("CANCELLED").reason("struck").version(4);

    let Reconciliation::Apply(pending) = apply(&reconciler, &message).await else {
        panic!("first delivery should apply");
    };
    assert_eq!(pending.mutation().unwrap().case_state.as_deref(), Some("dormantAppealState"));
    pending.commit().unwrap();

    assert!(matches!(
        apply(&reconciler, &message).await,
        Reconciliation::Duplicate { request_version: 4, .. }
    ));
    assert_eq!(reconciler.guard().stats().duplicates, 1);
}

#[tokio::test]
async fn test_uncommitted_update_can_be_retried() {
    let reconciler = HearingStatusReconciler::new(Arc::new(VersionGuard::new()));
    let message = HearingMessageBuilder::listed(1);

    // Dropped without commit, as when persistence fails.
    let first = apply(&reconciler, &message).await;
    assert!(matches!(first, Reconciliation::Apply(_)));
    drop(first);

    assert!(matches!(apply(&reconciler, &message).await, Reconciliation::Apply(_)));
}

#[tokio::test]
async fn test_independent_hearings_do_not_interfere() {
    let reconciler = HearingStatusReconciler::new(Arc::new(VersionGuard::new()));

    let Reconciliation::Apply(pending) = apply(&reconciler, &HearingMessageBuilder::listed(9)).await else {
        panic!("expected apply");
    };
    pending.commit().unwrap();

    let other = HearingMessageBuilder::listed(1).hearing_id("2000000002");
    assert!(matches!(apply(&reconciler, &other).await, Reconciliation::Apply(_)));
}

#[test]
fn test_message_without_version_is_malformed() {
    let err = HearingUpdateMessage::parse(&HearingMessageBuilder::listed(1).without_version().bytes())
        .unwrap_err();
    assert!(err.is_malformed());
}
