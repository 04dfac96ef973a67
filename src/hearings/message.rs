//! Hearing-update message model.
//!
//! [`HmcMessage`] mirrors the queued JSON exactly; [`HearingUpdateMessage`] is
//! the validated form the reconciler works with.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::ReconcileError;
use super::states::{CancellationReason, HmcStatus, ListingStatus};

/// Queued message as produced by the listing subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmcMessage {
    pub hmcts_service_code: String,
    pub case_ref: String,
    #[serde(rename = "hearingID")]
    pub hearing_id: String,
    pub hearing_update: HmcHearingUpdate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason_codes: Option<Vec<String>>,
}

/// Nested update object of [`HmcMessage`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmcHearingUpdate {
    #[serde(rename = "HMCStatus")]
    pub hmc_status: Option<HmcStatus>,
    pub hearing_listing_status: Option<ListingStatus>,
    #[serde(rename = "ListAssistCaseStatus")]
    pub list_assist_case_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_datetime")]
    pub next_hearing_date: Option<DateTime<Utc>>,
    pub hearing_venue_id: Option<String>,
    pub hearing_room_id: Option<String>,
    pub hearing_judge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason_codes: Option<Vec<String>>,
}

/// Accepts RFC 3339 or a zone-less local date-time, which upstream treats as UTC
fn deserialize_lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| D::Error::custom(format!("invalid hearing date-time '{raw}': {e}")))
}

/// Venue, room, judge and start of a listed hearing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub venue_epims_id: Option<String>,
    pub room_id: Option<String>,
    pub judge_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
}

/// Validated hearing update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HearingUpdateMessage {
    pub service_code: String,
    pub case_id: String,
    pub hearing_id: String,
    pub status: HmcStatus,
    pub listing_status: Option<ListingStatus>,
    pub list_assist_case_status: Option<String>,
    pub request_version: u64,
    pub cancellation_reasons: Vec<CancellationReason>,
    pub listing: ListingDetails,
}

impl HearingUpdateMessage {
    /// Parse and validate a raw queued body
    pub fn parse(body: &[u8]) -> Result<Self, ReconcileError> {
        let wire: HmcMessage = serde_json::from_slice(body)
            .map_err(|e| ReconcileError::malformed(format!("invalid hearing message JSON: {e}")))?;
        Self::try_from(wire)
    }

    pub fn has_cancellation_reasons(&self) -> bool {
        !self.cancellation_reasons.is_empty()
    }
}

impl TryFrom<HmcMessage> for HearingUpdateMessage {
    type Error = ReconcileError;

    fn try_from(wire: HmcMessage) -> Result<Self, Self::Error> {
        if wire.case_ref.trim().is_empty() {
            return Err(ReconcileError::malformed("caseRef is empty"));
        }
        if wire.hearing_id.trim().is_empty() {
            return Err(ReconcileError::malformed("hearingID is empty"));
        }

        let update = wire.hearing_update;
        let status = update
            .hmc_status
            .ok_or_else(|| ReconcileError::malformed("hearingUpdate.HMCStatus is missing"))?;
        let request_version = update
            .request_version
            .or(wire.request_version)
            .ok_or_else(|| ReconcileError::malformed("requestVersion is missing"))?;

        let cancellation_reasons = update
            .cancellation_reason_codes
            .or(wire.cancellation_reason_codes)
            .unwrap_or_default()
            .into_iter()
            .filter(|code| !code.trim().is_empty())
            .map(CancellationReason::new)
            .collect();

        Ok(Self {
            service_code: wire.hmcts_service_code,
            case_id: wire.case_ref,
            hearing_id: wire.hearing_id,
            status,
            listing_status: update.hearing_listing_status,
            list_assist_case_status: update.list_assist_case_status,
            request_version,
            cancellation_reasons,
            listing: ListingDetails {
                venue_epims_id: update.hearing_venue_id.filter(|s| !s.is_empty()),
                room_id: update.hearing_room_id.filter(|s| !s.is_empty()),
                judge_id: update.hearing_judge_id.filter(|s| !s.is_empty()),
                start: update.next_hearing_date,
            },
        })
    }
}
