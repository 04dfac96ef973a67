//! # Case Store
//!
//! Boundary to the external system of record for case data. The reconciler
//! only ever reads a [`CaseRecord`] and hands back a
//! [`CaseMutation`](crate::hearings::CaseMutation); applying it durably is the
//! store's job.

pub mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::callback::CaseData;
use crate::hearings::CaseMutation;

pub use in_memory::InMemoryCaseStore;

/// Case as held by the system of record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub state: String,
    pub data: CaseData,
    /// Incremented on every applied mutation
    pub revision: u64,
}

impl CaseRecord {
    pub fn new(case_id: impl Into<String>, state: impl Into<String>, data: CaseData) -> Self {
        Self {
            case_id: case_id.into(),
            state: state.into(),
            data,
            revision: 0,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Case not found: {case_id}")]
    CaseNotFound { case_id: String },

    #[error("Case store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn case_not_found(case_id: impl Into<String>) -> Self {
        Self::CaseNotFound {
            case_id: case_id.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Durable case persistence used by hearing ingestion
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord, StoreError>;

    /// Apply a mutation atomically; returns the updated record
    async fn apply_mutation(&self, mutation: &CaseMutation) -> Result<CaseRecord, StoreError>;
}
