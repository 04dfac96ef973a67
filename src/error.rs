use thiserror::Error;

use crate::config::ConfigurationError;
use crate::dispatch::DispatchError;
use crate::hearings::{IngestError, ReconcileError};
use crate::messaging::MessagingError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// Crate-level error for bootstrap and embedding code
#[derive(Error, Debug)]
pub enum TribunalError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Case store error: {0}")]
    Store(#[from] StoreError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),
}

pub type Result<T> = std::result::Result<T, TribunalError>;
