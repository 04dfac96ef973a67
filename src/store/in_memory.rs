//! In-process case store for local runs and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use super::{CaseRecord, CaseStore, StoreError};
use crate::callback::CaseData;
use crate::hearings::CaseMutation;

#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<HashMap<String, CaseRecord>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_case(&self, case_id: impl Into<String>, state: impl Into<String>, data: CaseData) {
        let record = CaseRecord::new(case_id, state, data);
        self.cases.write().insert(record.case_id.clone(), record);
    }

    pub fn case(&self, case_id: &str) -> Option<CaseRecord> {
        self.cases.read().get(case_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.cases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.read().is_empty()
    }
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord, StoreError> {
        self.case(case_id)
            .ok_or_else(|| StoreError::case_not_found(case_id))
    }

    async fn apply_mutation(&self, mutation: &CaseMutation) -> Result<CaseRecord, StoreError> {
        let mut cases = self.cases.write();
        let record = cases
            .get_mut(&mutation.case_id)
            .ok_or_else(|| StoreError::case_not_found(&mutation.case_id))?;

        record.data = mutation.apply_to(&record.data);
        if let Some(state) = &mutation.case_state {
            record.state = state.clone();
        }
        record.revision += 1;

        debug!(
            case_id = %record.case_id,
            event = %mutation.event.id,
            revision = record.revision,
            "Case mutation applied"
        );
        Ok(record.clone())
    }
}
