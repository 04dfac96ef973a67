//! Builders for hearing messages, callback bodies and wired test systems.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use tribunal_core::bootstrap::TribunalSystem;
use tribunal_core::callback::CaseData;
use tribunal_core::config::{ConfigManager, TribunalConfig};
use tribunal_core::store::{CaseStore, InMemoryCaseStore};

pub const CASE_ID: &str = "1625080769409918";
pub const HEARING_ID: &str = "2000000001";
pub const SERVICE_TOKEN: &str = "Bearer s2s-token";

pub fn case_data(value: Value) -> CaseData {
    value.as_object().cloned().unwrap_or_default()
}

/// Configuration tuned for fast, deterministic tests
pub fn test_config() -> TribunalConfig {
    let mut config = TribunalConfig::default();
    config.dispatch.timeout_ms = 2_000;
    config.hearings.worker_count = 2;
    config.hearings.poll_interval_ms = 5;
    config.hearings.reconcile_timeout_ms = 2_000;
    config.hearings.max_deliveries = 3;
    config
}

pub fn config_manager(config: TribunalConfig) -> Arc<ConfigManager> {
    ConfigManager::from_config(config, "test").expect("test config is valid")
}

/// Wired system plus direct access to its in-memory store
pub fn test_system(config: TribunalConfig) -> (TribunalSystem, Arc<InMemoryCaseStore>) {
    let store = Arc::new(InMemoryCaseStore::new());
    store.insert_case(CASE_ID, "readyToList", CaseData::new());
    let system = TribunalSystem::bootstrap_with(
        config_manager(config),
        store.clone() as Arc<dyn CaseStore>,
        |_| Ok(()),
    )
    .expect("bootstrap succeeds");
    (system, store)
}

/// Poll until `condition` holds, failing the test after two seconds
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..400 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

/// Wire-format hearing update
#[derive(Debug, Clone)]
pub struct HearingMessageBuilder {
    service_code: String,
    case_ref: String,
    hearing_id: String,
    status: String,
    listing_status: Option<String>,
    version: Option<u64>,
    venue: Option<String>,
    next_hearing_date: Option<String>,
    reasons: Vec<String>,
}

impl HearingMessageBuilder {
    pub fn new(status: &str) -> Self {
        Self {
            service_code: "BBA3".to_string(),
            case_ref: CASE_ID.to_string(),
            hearing_id: HEARING_ID.to_string(),
            status: status.to_string(),
            listing_status: None,
            version: Some(1),
            venue: Some("372653".to_string()),
            next_hearing_date: Some("2026-11-04T10:30:00".to_string()),
            reasons: Vec::new(),
        }
    }

    /// LISTED + FIXED at the given version
    pub fn listed(version: u64) -> Self {
        Self::new("LISTED").listing_status("FIXED").version(version)
    }

    pub fn service_code(mut self, code: &str) -> Self {
        self.service_code = code.to_string();
        self
    }

    pub fn case_ref(mut self, case_ref: &str) -> Self {
        self.case_ref = case_ref.to_string();
        self
    }

    pub fn hearing_id(mut self, hearing_id: &str) -> Self {
        self.hearing_id = hearing_id.to_string();
        self
    }

    pub fn listing_status(mut self, status: &str) -> Self {
        self.listing_status = Some(status.to_string());
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn without_venue(mut self) -> Self {
        self.venue = None;
        self
    }

    pub fn reason(mut self, code: &str) -> Self {
        self.reasons.push(code.to_string());
        self
    }

    pub fn build(&self) -> Value {
        let mut update = json!({ "HMCStatus": self.status });
        if let Some(listing) = &self.listing_status {
            update["hearingListingStatus"] = json!(listing);
        }
        if let Some(version) = self.version {
            update["requestVersion"] = json!(version);
        }
        if let Some(venue) = &self.venue {
            update["hearingVenueId"] = json!(venue);
        }
        if let Some(date) = &self.next_hearing_date {
            update["nextHearingDate"] = json!(date);
        }
        if !self.reasons.is_empty() {
            update["cancellationReasonCodes"] = json!(self.reasons);
        }
        json!({
            "hmctsServiceCode": self.service_code,
            "caseRef": self.case_ref,
            "hearingID": self.hearing_id,
            "hearingUpdate": update
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).expect("serializable")
    }
}

/// Callback request body as sent by the case-data platform
pub fn callback_body(event_id: &str, data: Value, before: Option<Value>) -> Value {
    let mut body = json!({
        "event_id": event_id,
        "case_details": {
            "id": CASE_ID.parse::<u64>().unwrap_or_default(),
            "state": "readyToList",
            "case_data": data
        }
    });
    if let Some(before) = before {
        body["case_details_before"] = json!({
            "id": CASE_ID.parse::<u64>().unwrap_or_default(),
            "state": "readyToList",
            "case_data": before
        });
    }
    body
}
