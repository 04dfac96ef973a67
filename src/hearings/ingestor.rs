//! # Message Ingestor
//!
//! Pulls hearing-update messages from a [`MessageSource`], filters them for
//! this service and deployment, and drives each through the reconciler.
//!
//! ## Delivery contract
//!
//! | Outcome                      | Transport action |
//! |------------------------------|------------------|
//! | applied / not handled        | ack              |
//! | duplicate / stale / filtered | ack              |
//! | any [`IngestError`]          | nack             |
//!
//! The version guard is only committed after the case store has durably
//! applied the mutation, so a nacked message can always be retried.

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::errors::IngestError;
use super::message::HearingUpdateMessage;
use super::reconciler::{HearingStatusReconciler, Reconciliation};
use super::states::HearingState;
use crate::config::HearingsConfig;
use crate::constants::message_properties;
use crate::logging::{log_error, log_hearing_operation};
use crate::messaging::{MessageSource, QueuedMessage};
use crate::store::CaseStore;

/// Why a message was acknowledged without reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum FilterReason {
    ServiceCode { expected: String, actual: String },
    Deployment { expected: Option<String>, actual: Option<String> },
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceCode { expected, actual } => {
                write!(f, "service code {actual} is not {expected}")
            }
            Self::Deployment { expected, actual } => write!(
                f,
                "deployment {} does not match {}",
                actual.as_deref().unwrap_or("<none>"),
                expected.as_deref().unwrap_or("<none>")
            ),
        }
    }
}

/// Terminal, acknowledgeable result of ingesting one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied {
        case_id: String,
        hearing_id: String,
        request_version: u64,
        new_status: HearingState,
        revision: u64,
    },
    NotHandled {
        hearing_id: String,
        request_version: u64,
    },
    Duplicate {
        hearing_id: String,
        request_version: u64,
    },
    Stale {
        hearing_id: String,
        request_version: u64,
        last_applied: u64,
    },
    Filtered(FilterReason),
}

impl IngestOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::NotHandled { .. } => "not_handled",
            Self::Duplicate { .. } => "duplicate",
            Self::Stale { .. } => "stale",
            Self::Filtered(_) => "filtered",
        }
    }
}

pub struct MessageIngestor {
    reconciler: HearingStatusReconciler,
    store: Arc<dyn CaseStore>,
    config: HearingsConfig,
}

impl std::fmt::Debug for MessageIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageIngestor")
            .field("service_code", &self.config.service_code)
            .field("worker_count", &self.config.worker_count)
            .finish()
    }
}

impl MessageIngestor {
    pub fn new(
        reconciler: HearingStatusReconciler,
        store: Arc<dyn CaseStore>,
        config: HearingsConfig,
    ) -> Self {
        Self {
            reconciler,
            store,
            config,
        }
    }

    pub fn reconciler(&self) -> &HearingStatusReconciler {
        &self.reconciler
    }

    /// Check service code and deployment before any reconciliation work
    pub fn filter(
        &self,
        message: &HearingUpdateMessage,
        deployment_id: Option<&str>,
    ) -> Option<FilterReason> {
        if message.service_code != self.config.service_code {
            return Some(FilterReason::ServiceCode {
                expected: self.config.service_code.clone(),
                actual: message.service_code.clone(),
            });
        }

        if self.config.deployment_filter_enabled {
            let expected = self.config.deployment_id.as_deref().filter(|id| !id.is_empty());
            if expected != deployment_id {
                return Some(FilterReason::Deployment {
                    expected: expected.map(str::to_string),
                    actual: deployment_id.map(str::to_string),
                });
            }
        }

        None
    }

    /// Parse, filter, reconcile and persist one queued message
    pub async fn handle_message(&self, queued: &QueuedMessage) -> Result<IngestOutcome, IngestError> {
        let message = HearingUpdateMessage::parse(&queued.body)?;
        let deployment_id = queued.property(message_properties::DEPLOYMENT_ID);

        if let Some(reason) = self.filter(&message, deployment_id) {
            debug!(
                hearing_id = %message.hearing_id,
                reason = %reason,
                "Hearing message filtered"
            );
            return Ok(IngestOutcome::Filtered(reason));
        }

        let lease = self.reconciler.acquire(&message.hearing_id).await;
        let case = self.store.fetch_case(&message.case_id).await?;

        match self.reconciler.reconcile_with_lease(lease, &message, &case)? {
            Reconciliation::Duplicate {
                hearing_id,
                request_version,
            } => Ok(IngestOutcome::Duplicate {
                hearing_id,
                request_version,
            }),
            Reconciliation::Stale {
                hearing_id,
                request_version,
                last_applied,
            } => Ok(IngestOutcome::Stale {
                hearing_id,
                request_version,
                last_applied,
            }),
            Reconciliation::NotHandled(pending) => {
                let hearing_id = pending.hearing_id().to_string();
                let request_version = pending.request_version();
                pending.commit()?;
                Ok(IngestOutcome::NotHandled {
                    hearing_id,
                    request_version,
                })
            }
            Reconciliation::Apply(pending) => {
                let Some(mutation) = pending.mutation() else {
                    return Err(super::ReconcileError::malformed("accepted transition without a mutation").into());
                };
                // Lease is still held; a failure here drops it without committing.
                let updated = self.store.apply_mutation(mutation).await?;
                let hearing_id = pending.hearing_id().to_string();
                let request_version = pending.request_version();
                let tracked = pending.commit()?;

                Ok(IngestOutcome::Applied {
                    case_id: updated.case_id,
                    hearing_id,
                    request_version,
                    new_status: tracked.current_status,
                    revision: updated.revision,
                })
            }
        }
    }

    /// [`handle_message`](Self::handle_message) bounded by the reconcile timeout, with panics contained
    pub async fn process(&self, queued: &QueuedMessage) -> Result<IngestOutcome, IngestError> {
        let timeout = self.config.reconcile_timeout();
        let result = tokio::time::timeout(
            timeout,
            AssertUnwindSafe(self.handle_message(queued)).catch_unwind(),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(IngestError::Panicked { message })
            }
            Err(_) => Err(IngestError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Process a message and settle it with the source
    pub async fn process_and_settle(&self, source: &dyn MessageSource, queued: QueuedMessage) {
        let receipt = queued.receipt;
        match self.process(&queued).await {
            Ok(outcome) => {
                let (case_id, hearing_id, version) = outcome_fields(&outcome);
                log_hearing_operation(
                    "ingest",
                    case_id,
                    hearing_id,
                    version,
                    outcome.label(),
                    Some(&format!("receipt={receipt} delivery={}", queued.delivery_count)),
                );
                if let Err(e) = source.ack(receipt).await {
                    log_error("MessageIngestor", "ack", &e.to_string(), Some(&receipt.to_string()));
                }
            }
            Err(e) => {
                warn!(
                    receipt = %receipt,
                    delivery_count = queued.delivery_count,
                    kind = e.kind(),
                    error = %e,
                    "Hearing message failed, releasing for retry"
                );
                if let Err(nack_err) = source.nack(receipt, &e.to_string()).await {
                    log_error("MessageIngestor", "nack", &nack_err.to_string(), Some(&receipt.to_string()));
                }
            }
        }
    }

    /// Poll the source until `shutdown` flips to `true`, then drain in-flight work
    pub async fn run(self: Arc<Self>, source: Arc<dyn MessageSource>, mut shutdown: watch::Receiver<bool>) {
        let workers = self.config.worker_count.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut in_flight = JoinSet::new();

        info!(
            service_code = %self.config.service_code,
            workers,
            "Hearing message ingestor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let available = semaphore.available_permits().min(self.config.batch_size.max(1));
            let batch = if available == 0 {
                Vec::new()
            } else {
                match source.receive(available, self.config.visibility_timeout()).await {
                    Ok(batch) => batch,
                    Err(e) => {
                        log_error("MessageIngestor", "receive", &e.to_string(), None);
                        Vec::new()
                    }
                }
            };

            let idle = batch.is_empty();
            for queued in batch {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        error!("Ingestor semaphore closed - stopping");
                        return;
                    }
                };
                let ingestor = Arc::clone(&self);
                let source = Arc::clone(&source);
                in_flight.spawn(async move {
                    ingestor.process_and_settle(source.as_ref(), queued).await;
                    drop(permit);
                });
            }

            while in_flight.try_join_next().is_some() {}

            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval()) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!(in_flight = in_flight.len(), "Hearing message ingestor draining");
        while in_flight.join_next().await.is_some() {}
        info!("Hearing message ingestor stopped");
    }
}

fn outcome_fields(outcome: &IngestOutcome) -> (&str, &str, Option<u64>) {
    match outcome {
        IngestOutcome::Applied {
            case_id,
            hearing_id,
            request_version,
            ..
        } => (case_id, hearing_id, Some(*request_version)),
        IngestOutcome::NotHandled {
            hearing_id,
            request_version,
        }
        | IngestOutcome::Duplicate {
            hearing_id,
            request_version,
        } => ("-", hearing_id, Some(*request_version)),
        IngestOutcome::Stale {
            hearing_id,
            request_version,
            ..
        } => ("-", hearing_id, Some(*request_version)),
        IngestOutcome::Filtered(_) => ("-", "-", None),
    }
}
