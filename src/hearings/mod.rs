//! # Hearing Status Reconciliation
//!
//! Ingests asynchronous, possibly out-of-order, at-least-once hearing-update
//! messages and merges them into case state. Per-hearing ordering is enforced
//! by the [`VersionGuard`]; the [`HearingStatusReconciler`] decides the
//! transition and the case mutation; the [`MessageIngestor`] is the transport
//! boundary that persists mutations and settles messages.

pub mod errors;
pub mod ingestor;
pub mod message;
pub mod mutation;
pub mod reconciler;
pub mod states;
pub mod version_guard;

pub use errors::{IngestError, ReconcileError};
pub use ingestor::{FilterReason, IngestOutcome, MessageIngestor};
pub use message::{HearingUpdateMessage, HmcHearingUpdate, HmcMessage, ListingDetails};
pub use mutation::{CaseEvent, CaseMutation, HearingUpdate, WorkBasketUpdate};
pub use reconciler::{build_mutation, resolve_transition, HearingStatusReconciler, PendingCommit, Reconciliation};
pub use states::{CancellationReason, HearingState, HmcStatus, ListingStatus};
pub use version_guard::{Admission, GuardError, GuardStats, HearingLease, HearingTrackingState, VersionGuard};
