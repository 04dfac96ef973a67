//! # Version Guard
//!
//! Per-hearing monotonic admission of hearing updates.
//!
//! ## Overview
//!
//! Each hearing id owns one async mutex around its [`HearingTrackingState`].
//! A [`HearingLease`] holds that mutex, so `admit → apply → commit` runs as
//! one critical section per hearing while different hearings proceed in
//! parallel. Dropping a lease without committing leaves the state untouched;
//! redelivery then starts again from `Accept`.
//!
//! ```text
//! version >  last_applied  → Accept     (apply, then commit)
//! version == last_applied  → Duplicate  (already applied; acknowledge)
//! version <  last_applied  → Stale      (superseded; discard)
//! ```

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::states::HearingState;

/// Outcome of checking a request version against the last applied one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Duplicate,
    Stale { last_applied: u64 },
}

/// Last applied version and resolved status for one hearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HearingTrackingState {
    pub last_applied_version: u64,
    pub current_status: HearingState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Commit of version {version} for hearing {hearing_id} does not advance past {last_applied}")]
    NonMonotonicCommit {
        hearing_id: String,
        version: u64,
        last_applied: u64,
    },
}

#[derive(Debug, Default)]
struct GuardCounters {
    accepted: AtomicU64,
    duplicates: AtomicU64,
    stale: AtomicU64,
    committed: AtomicU64,
}

/// Point-in-time guard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuardStats {
    pub tracked_hearings: usize,
    pub accepted: u64,
    pub duplicates: u64,
    pub stale: u64,
    pub committed: u64,
}

type Slot = Arc<Mutex<Option<HearingTrackingState>>>;

/// Shared per-hearing tracking index
#[derive(Debug, Default)]
pub struct VersionGuard {
    slots: DashMap<String, Slot>,
    counters: Arc<GuardCounters>,
}

impl VersionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, hearing_id: &str) -> Slot {
        // Clone the Arc out so no shard lock is held across the await below.
        Arc::clone(self.slots.entry(hearing_id.to_string()).or_default().value())
    }

    /// Take exclusive ownership of a hearing's tracking state
    pub async fn acquire(&self, hearing_id: &str) -> HearingLease {
        let slot = self.slot(hearing_id);
        let guard = slot.lock_owned().await;
        HearingLease {
            hearing_id: hearing_id.to_string(),
            guard,
            counters: Arc::clone(&self.counters),
        }
    }

    pub async fn admit(&self, hearing_id: &str, request_version: u64) -> Admission {
        self.acquire(hearing_id).await.admit(request_version)
    }

    /// Record a durably applied version. `status: None` keeps the current status.
    pub async fn commit(
        &self,
        hearing_id: &str,
        request_version: u64,
        status: Option<HearingState>,
    ) -> Result<HearingTrackingState, GuardError> {
        self.acquire(hearing_id).await.commit(request_version, status)
    }

    pub async fn state(&self, hearing_id: &str) -> Option<HearingTrackingState> {
        let slot = self.slots.get(hearing_id).map(|entry| Arc::clone(entry.value()))?;
        let state = *slot.lock().await;
        state
    }

    /// Hydrate tracking state recovered from the case store.
    ///
    /// Only moves a hearing forward; an older seed never overwrites newer state.
    pub async fn seed(&self, hearing_id: &str, state: HearingTrackingState) {
        self.acquire(hearing_id).await.advance_to(state);
    }

    pub fn stats(&self) -> GuardStats {
        GuardStats {
            tracked_hearings: self.slots.len(),
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            duplicates: self.counters.duplicates.load(Ordering::Relaxed),
            stale: self.counters.stale.load(Ordering::Relaxed),
            committed: self.counters.committed.load(Ordering::Relaxed),
        }
    }
}

/// Exclusive hold on one hearing's tracking state
#[derive(Debug)]
pub struct HearingLease {
    hearing_id: String,
    guard: OwnedMutexGuard<Option<HearingTrackingState>>,
    counters: Arc<GuardCounters>,
}

impl HearingLease {
    pub fn hearing_id(&self) -> &str {
        &self.hearing_id
    }

    pub fn state(&self) -> Option<HearingTrackingState> {
        *self.guard
    }

    /// Current status, or the initial state for an untracked hearing
    pub fn current_status(&self) -> HearingState {
        (*self.guard).map(|s| s.current_status).unwrap_or_default()
    }

    /// Adopt recovered state if it is newer than what the guard holds
    pub fn advance_to(&mut self, state: HearingTrackingState) -> bool {
        let newer = (*self.guard)
            .map_or(true, |current| state.last_applied_version > current.last_applied_version);
        if newer {
            *self.guard = Some(state);
        }
        newer
    }

    pub fn admit(&self, request_version: u64) -> Admission {
        let admission = match *self.guard {
            None => Admission::Accept,
            Some(state) if request_version > state.last_applied_version => Admission::Accept,
            Some(state) if request_version == state.last_applied_version => Admission::Duplicate,
            Some(state) => Admission::Stale {
                last_applied: state.last_applied_version,
            },
        };

        match admission {
            Admission::Accept => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Admission::Duplicate => {
                self.counters.duplicates.fetch_add(1, Ordering::Relaxed);
                debug!(
                    hearing_id = %self.hearing_id,
                    request_version,
                    "Duplicate hearing update, already applied"
                );
            }
            Admission::Stale { last_applied } => {
                self.counters.stale.fetch_add(1, Ordering::Relaxed);
                warn!(
                    hearing_id = %self.hearing_id,
                    request_version,
                    last_applied,
                    "Stale hearing update discarded"
                );
            }
        }
        admission
    }

    /// Record the applied version and release the hearing
    pub fn commit(
        mut self,
        request_version: u64,
        status: Option<HearingState>,
    ) -> Result<HearingTrackingState, GuardError> {
        if let Some(state) = *self.guard {
            if request_version <= state.last_applied_version {
                return Err(GuardError::NonMonotonicCommit {
                    hearing_id: self.hearing_id.clone(),
                    version: request_version,
                    last_applied: state.last_applied_version,
                });
            }
        }

        let previous = self.current_status();
        let next = HearingTrackingState {
            last_applied_version: request_version,
            current_status: status.unwrap_or(previous),
        };
        if previous.is_absorbing() && next.current_status != previous {
            warn!(
                hearing_id = %self.hearing_id,
                from = %previous,
                to = %next.current_status,
                request_version,
                "Hearing left an absorbing state on a newer version"
            );
        }

        *self.guard = Some(next);
        self.counters.committed.fetch_add(1, Ordering::Relaxed);
        Ok(next)
    }
}
