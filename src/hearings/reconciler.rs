//! # Hearing Status Reconciler
//!
//! Merges hearing-update messages into case state.
//!
//! ## Transition rules
//!
//! First matching rule wins:
//!
//! 1. `HMCStatus == EXCEPTION` → `Exception`
//! 2. `HMCStatus == CANCELLED`, any cancellation reason, or listing status `CNCL` → `Cancelled`
//! 3. `HMCStatus ∈ {LISTED, AWAITING_LISTING, UPDATE_SUBMITTED}` with listing status `FIXED` → `Listed`
//! 4. anything else → not handled; acknowledged without a mutation
//!
//! ## Flow
//!
//! ```text
//! acquire hearing lease ─ fetch case while holding it
//!   └─ reconcile_with_lease(lease, message, case) ─ hydrate from case if untracked
//!        └─ admit(version) ── Duplicate / Stale → return, nothing to do
//!             └─ Accept → resolve transition → build CaseMutation
//!                  └─ PendingCommit (lease still held)
//!                       └─ caller persists mutation, then PendingCommit::commit()
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::errors::ReconcileError;
use super::message::HearingUpdateMessage;
use super::mutation::{
    format_date_issued, format_hearing_date, recorded_tracking_state, CaseEvent, CaseMutation, HearingUpdate,
    WorkBasketUpdate,
};
use super::states::{HearingState, HmcStatus};
use super::version_guard::{Admission, GuardError, HearingLease, HearingTrackingState, VersionGuard};
use crate::callback::case_data;
use crate::constants::{case_states, dwp_states, events, fields};
use crate::logging::log_hearing_operation;
use crate::store::CaseRecord;

/// Compute the next hearing state for a message, or `None` for rule 4
pub fn resolve_transition(message: &HearingUpdateMessage) -> Option<HearingState> {
    if message.status == HmcStatus::Exception {
        return Some(HearingState::Exception);
    }

    let cancelled_listing = message
        .listing_status
        .is_some_and(|listing| listing.is_cancellation());
    if message.status == HmcStatus::Cancelled || message.has_cancellation_reasons() || cancelled_listing {
        return Some(HearingState::Cancelled);
    }

    let fixed = message.listing_status.is_some_and(|listing| listing.is_fixed());
    if message.status.is_listable() && fixed {
        return Some(HearingState::Listed);
    }

    None
}

/// Result of reconciling one message
#[derive(Debug)]
pub enum Reconciliation {
    /// A mutation must be persisted before committing
    Apply(PendingCommit),
    /// Benign intermediate status; commit records the version without a mutation
    NotHandled(PendingCommit),
    /// Already applied under at-least-once delivery
    Duplicate { hearing_id: String, request_version: u64 },
    /// Superseded by a newer version
    Stale {
        hearing_id: String,
        request_version: u64,
        last_applied: u64,
    },
}

/// Accepted update awaiting durable application; holds the hearing's lease
#[derive(Debug)]
pub struct PendingCommit {
    lease: HearingLease,
    request_version: u64,
    new_status: Option<HearingState>,
    mutation: Option<CaseMutation>,
}

impl PendingCommit {
    pub fn mutation(&self) -> Option<&CaseMutation> {
        self.mutation.as_ref()
    }

    pub fn request_version(&self) -> u64 {
        self.request_version
    }

    pub fn new_status(&self) -> Option<HearingState> {
        self.new_status
    }

    pub fn hearing_id(&self) -> &str {
        self.lease.hearing_id()
    }

    /// Advance the guard. Call only once the mutation (if any) is durable.
    pub fn commit(self) -> Result<HearingTrackingState, GuardError> {
        self.lease.commit(self.request_version, self.new_status)
    }
}

/// Stateless apart from the shared [`VersionGuard`]
#[derive(Debug, Clone)]
pub struct HearingStatusReconciler {
    guard: Arc<VersionGuard>,
}

impl HearingStatusReconciler {
    pub fn new(guard: Arc<VersionGuard>) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &Arc<VersionGuard> {
        &self.guard
    }

    /// Take the hearing's lease. Read the case snapshot only after this returns,
    /// so it reflects every mutation committed under earlier leases.
    pub async fn acquire(&self, hearing_id: &str) -> HearingLease {
        self.guard.acquire(hearing_id).await
    }

    /// Reconcile against a snapshot the caller already holds
    pub async fn reconcile(
        &self,
        message: &HearingUpdateMessage,
        case: &CaseRecord,
    ) -> Result<Reconciliation, ReconcileError> {
        let lease = self.acquire(&message.hearing_id).await;
        self.reconcile_with_lease(lease, message, case)
    }

    /// Reconcile while holding `lease`, which must belong to the message's hearing
    pub fn reconcile_with_lease(
        &self,
        mut lease: HearingLease,
        message: &HearingUpdateMessage,
        case: &CaseRecord,
    ) -> Result<Reconciliation, ReconcileError> {
        if message.case_id != case.case_id {
            return Err(ReconcileError::CaseMismatch {
                message_case_id: message.case_id.clone(),
                snapshot_case_id: case.case_id.clone(),
            });
        }
        if lease.hearing_id() != message.hearing_id {
            return Err(ReconcileError::malformed(format!(
                "lease for hearing {} used for hearing {}",
                lease.hearing_id(),
                message.hearing_id
            )));
        }

        if lease.state().is_none() {
            if let Some(recorded) = recorded_tracking_state(&case.data, &message.hearing_id) {
                debug!(
                    hearing_id = %message.hearing_id,
                    last_applied = recorded.last_applied_version,
                    "Hydrated hearing tracking state from case"
                );
                lease.advance_to(recorded);
            }
        }

        match lease.admit(message.request_version) {
            Admission::Duplicate => {
                return Ok(Reconciliation::Duplicate {
                    hearing_id: message.hearing_id.clone(),
                    request_version: message.request_version,
                })
            }
            Admission::Stale { last_applied } => {
                return Ok(Reconciliation::Stale {
                    hearing_id: message.hearing_id.clone(),
                    request_version: message.request_version,
                    last_applied,
                })
            }
            Admission::Accept => {}
        }

        let Some(new_status) = resolve_transition(message) else {
            log_hearing_operation(
                "reconcile",
                &message.case_id,
                &message.hearing_id,
                Some(message.request_version),
                "not_handled",
                Some(&format!(
                    "status={} listing_status={}",
                    message.status,
                    message
                        .listing_status
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "none".to_string())
                )),
            );
            return Ok(Reconciliation::NotHandled(PendingCommit {
                lease,
                request_version: message.request_version,
                new_status: None,
                mutation: None,
            }));
        };

        let mutation = build_mutation(message, case, new_status)?;
        info!(
            case_id = %message.case_id,
            hearing_id = %message.hearing_id,
            request_version = message.request_version,
            from = %lease.current_status(),
            to = %new_status,
            event = %mutation.event.id,
            "Hearing transition resolved"
        );

        Ok(Reconciliation::Apply(PendingCommit {
            lease,
            request_version: message.request_version,
            new_status: Some(new_status),
            mutation: Some(mutation),
        }))
    }
}

/// Build the case mutation for a resolved transition
pub fn build_mutation(
    message: &HearingUpdateMessage,
    case: &CaseRecord,
    new_status: HearingState,
) -> Result<CaseMutation, ReconcileError> {
    let hearing_id = &message.hearing_id;

    let (event, hearing, work_basket, dwp_state, case_state) = match new_status {
        HearingState::Listed => {
            let epims_id = message
                .listing
                .venue_epims_id
                .clone()
                .ok_or_else(|| ReconcileError::missing_listing_details(hearing_id, "hearingVenueId"))?;

            let already_issued = case_data::str_at(
                &case.data,
                &[fields::WORK_BASKET, fields::WORK_BASKET_HEARING_DATE_ISSUED],
            )
            .is_some();
            let hearing_date = message.listing.start.map(format_hearing_date);

            let description = match &hearing_date {
                Some(date) => format!("Hearing {hearing_id} listed for {date} at venue {epims_id}"),
                None => format!("Hearing {hearing_id} listed at venue {epims_id}"),
            };

            (
                CaseEvent {
                    id: events::HEARING_BOOKED.to_string(),
                    summary: "Hearing booked".to_string(),
                    description,
                },
                HearingUpdate::Listed(message.listing.clone()),
                WorkBasketUpdate::Set {
                    hearing_date,
                    hearing_epims_id: epims_id,
                    hearing_date_issued: (!already_issued).then(|| format_date_issued(Utc::now())),
                },
                Some(dwp_states::HEARING_DATE_ISSUED.to_string()),
                None,
            )
        }
        HearingState::Cancelled => {
            let dormant = message
                .cancellation_reasons
                .iter()
                .any(|reason| reason.makes_case_dormant());
            let reasons = message
                .cancellation_reasons
                .iter()
                .map(|r| r.code())
                .collect::<Vec<_>>()
                .join(", ");
            let description = if reasons.is_empty() {
                format!("Hearing {hearing_id} cancelled")
            } else {
                format!("Hearing {hearing_id} cancelled, reasons: {reasons}")
            };

            let (event_id, case_state) = if dormant {
                (events::DORMANT, Some(case_states::DORMANT_APPEAL.to_string()))
            } else {
                (events::UPDATE_CASE_ONLY, None)
            };

            (
                CaseEvent {
                    id: event_id.to_string(),
                    summary: "Hearing cancelled".to_string(),
                    description,
                },
                HearingUpdate::Flagged,
                WorkBasketUpdate::Clear,
                None,
                case_state,
            )
        }
        HearingState::Exception => (
            CaseEvent {
                id: events::LISTING_ERROR.to_string(),
                summary: "Listing exception".to_string(),
                description: format!(
                    "Hearing {hearing_id} reported an exception by the listing system"
                ),
            },
            HearingUpdate::Flagged,
            WorkBasketUpdate::Clear,
            None,
            Some(case_states::LISTING_ERROR.to_string()),
        ),
        HearingState::AwaitingListing | HearingState::UpdateSubmitted => {
            return Err(ReconcileError::malformed(format!(
                "no case mutation defined for hearing state {new_status}"
            )))
        }
    };

    Ok(CaseMutation {
        case_id: message.case_id.clone(),
        hearing_id: hearing_id.clone(),
        request_version: message.request_version,
        new_status,
        event,
        hearing,
        work_basket,
        dwp_state,
        case_state,
    })
}
