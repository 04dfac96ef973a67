//! Case mutations produced by hearing reconciliation.
//!
//! A [`CaseMutation`] is a command, not an effect: the reconciler builds it and
//! the case store applies it. [`CaseMutation::apply_to`] is the single
//! definition of how a mutation changes case data.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Europe::London;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::message::ListingDetails;
use super::states::HearingState;
use super::version_guard::HearingTrackingState;
use crate::callback::case_data::{self, CaseData};
use crate::constants::{fields, HEARING_DATE_FORMAT, HEARING_DATE_ISSUED_FORMAT, HEARING_START_FORMAT, HEARING_TIME_FORMAT};

/// Case event recorded alongside the mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
}

/// Change to the case's hearing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HearingUpdate {
    /// Write confirmed listing details
    Listed(ListingDetails),
    /// Keep existing details, only record the new status
    Flagged,
}

/// Change to the caseworker work-basket fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkBasketUpdate {
    Set {
        hearing_date: Option<String>,
        hearing_epims_id: String,
        /// Only present when the case had no issue date yet
        hearing_date_issued: Option<String>,
    },
    Clear,
}

/// Mutation instruction for one reconciled hearing update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseMutation {
    pub case_id: String,
    pub hearing_id: String,
    pub request_version: u64,
    pub new_status: HearingState,
    pub event: CaseEvent,
    pub hearing: HearingUpdate,
    pub work_basket: WorkBasketUpdate,
    pub dwp_state: Option<String>,
    pub case_state: Option<String>,
}

impl CaseMutation {
    /// Case data after this mutation. The input snapshot is left untouched.
    pub fn apply_to(&self, data: &CaseData) -> CaseData {
        let mut next = data.clone();
        self.apply_hearing_entry(&mut next);
        self.apply_work_basket(&mut next);
        if let Some(dwp_state) = &self.dwp_state {
            next.insert(fields::DWP_STATE.to_string(), Value::String(dwp_state.clone()));
        }
        next
    }

    fn apply_hearing_entry(&self, data: &mut CaseData) {
        let hearings = data
            .entry(fields::HEARINGS.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !hearings.is_array() {
            *hearings = Value::Array(Vec::new());
        }
        let Some(entries) = hearings.as_array_mut() else {
            return;
        };

        let position = entries.iter().position(|entry| {
            entry
                .pointer("/value/hearingId")
                .and_then(Value::as_str)
                .is_some_and(|id| id == self.hearing_id)
        });
        let index = match position {
            Some(index) => index,
            None => {
                entries.push(json!({
                    "id": Uuid::new_v4().to_string(),
                    "value": { "hearingId": self.hearing_id },
                }));
                entries.len() - 1
            }
        };

        let Some(value) = entries[index]
            .as_object_mut()
            .and_then(|entry| entry.get_mut("value"))
            .and_then(Value::as_object_mut)
        else {
            return;
        };

        if let HearingUpdate::Listed(listing) = &self.hearing {
            write_listing(value, listing);
        }
        value.insert(
            "hearingStatus".to_string(),
            Value::String(self.new_status.case_hearing_status().to_string()),
        );
        value.insert("versionNumber".to_string(), json!(self.request_version));
    }

    fn apply_work_basket(&self, data: &mut CaseData) {
        match &self.work_basket {
            WorkBasketUpdate::Set {
                hearing_date,
                hearing_epims_id,
                hearing_date_issued,
            } => {
                let date_path = [fields::WORK_BASKET, fields::WORK_BASKET_HEARING_DATE];
                match hearing_date {
                    Some(date) => case_data::set_path(data, &date_path, json!(date)),
                    None => {
                        case_data::remove_path(data, &date_path);
                    }
                }
                case_data::set_path(
                    data,
                    &[fields::WORK_BASKET, fields::WORK_BASKET_HEARING_EPIMS_ID],
                    json!(hearing_epims_id),
                );
                if let Some(issued) = hearing_date_issued {
                    case_data::set_path(
                        data,
                        &[fields::WORK_BASKET, fields::WORK_BASKET_HEARING_DATE_ISSUED],
                        json!(issued),
                    );
                }
            }
            WorkBasketUpdate::Clear => {
                for field in [
                    fields::WORK_BASKET_HEARING_DATE,
                    fields::WORK_BASKET_HEARING_DATE_ISSUED,
                    fields::WORK_BASKET_HEARING_EPIMS_ID,
                ] {
                    case_data::remove_path(data, &[fields::WORK_BASKET, field]);
                }
            }
        }
    }
}

fn write_listing(value: &mut Map<String, Value>, listing: &ListingDetails) {
    let mut put = |key: &str, field: &Option<String>| match field {
        Some(v) => {
            value.insert(key.to_string(), Value::String(v.clone()));
        }
        None => {
            value.remove(key);
        }
    };
    put("epimsId", &listing.venue_epims_id);
    put("hearingRoom", &listing.room_id);
    put("judgeId", &listing.judge_id);

    let local_start = listing.start.map(to_uk_local);
    put("start", &local_start.map(|s| s.format(HEARING_START_FORMAT).to_string()));
    put("hearingDate", &local_start.map(|s| s.format(HEARING_DATE_FORMAT).to_string()));
    put("time", &local_start.map(|s| s.format(HEARING_TIME_FORMAT).to_string()));
}

/// Wall-clock time in the UK for an instant reported in UTC
pub fn to_uk_local(at: DateTime<Utc>) -> NaiveDateTime {
    at.with_timezone(&London).naive_local()
}

/// UK calendar date of a hearing start
pub fn format_hearing_date(start: DateTime<Utc>) -> String {
    to_uk_local(start).format(HEARING_DATE_FORMAT).to_string()
}

/// Tracking state recorded on the case's hearing entry by an earlier mutation
pub fn recorded_tracking_state(data: &CaseData, hearing_id: &str) -> Option<HearingTrackingState> {
    let entries = data.get(fields::HEARINGS)?.as_array()?;
    let value = entries.iter().find_map(|entry| {
        let value = entry.get("value")?;
        (value.get("hearingId")?.as_str()? == hearing_id).then_some(value)
    })?;

    let last_applied_version = value.get("versionNumber")?.as_u64()?;
    let current_status = match value.get("hearingStatus")?.as_str()? {
        "awaitingListing" => HearingState::AwaitingListing,
        "listed" => HearingState::Listed,
        "updateSubmitted" => HearingState::UpdateSubmitted,
        "cancelled" => HearingState::Cancelled,
        "exception" => HearingState::Exception,
        _ => return None,
    };
    Some(HearingTrackingState {
        last_applied_version,
        current_status,
    })
}

/// Format an issue timestamp for the work basket, in UK time
pub fn format_date_issued(at: DateTime<Utc>) -> String {
    to_uk_local(at).format(HEARING_DATE_ISSUED_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listed_mutation() -> CaseMutation {
        CaseMutation {
            case_id: "1".into(),
            hearing_id: "H1".into(),
            request_version: 2,
            new_status: HearingState::Listed,
            event: CaseEvent {
                id: "hearingBooked".into(),
                summary: "Hearing booked".into(),
                description: "Hearing H1 listed".into(),
            },
            hearing: HearingUpdate::Listed(ListingDetails {
                venue_epims_id: Some("372653".into()),
                room_id: Some("Room 1".into()),
                judge_id: None,
                start: Some(Utc.with_ymd_and_hms(2026, 11, 4, 10, 30, 0).unwrap()),
            }),
            work_basket: WorkBasketUpdate::Set {
                hearing_date: Some("2026-11-04".into()),
                hearing_epims_id: "372653".into(),
                hearing_date_issued: Some("2026-10-19 09:00".into()),
            },
            dwp_state: Some("hearingDateIssued".into()),
            case_state: None,
        }
    }

    #[test]
    fn test_listed_mutation_writes_listing_fields() {
        let data = listed_mutation().apply_to(&CaseData::new());

        let hearing = &data["hearings"][0]["value"];
        assert_eq!(hearing["hearingId"], json!("H1"));
        assert_eq!(hearing["epimsId"], json!("372653"));
        assert_eq!(hearing["hearingDate"], json!("2026-11-04"));
        assert_eq!(hearing["time"], json!("10:30:00.000"));
        assert_eq!(hearing["start"], json!("2026-11-04T10:30:00.000"));
        assert_eq!(hearing["hearingStatus"], json!("listed"));
        assert!(hearing.get("judgeId").is_none());
        assert_eq!(data["workBasketFields"]["hearingEpimsId"], json!("372653"));
        assert_eq!(data["workBasketFields"]["hearingDateIssued"], json!("2026-10-19 09:00"));
        assert_eq!(data["dwpState"], json!("hearingDateIssued"));
    }

    #[test]
    fn test_existing_hearing_entry_is_updated_in_place() {
        let first = listed_mutation().apply_to(&CaseData::new());
        let mut cancel = listed_mutation();
        cancel.request_version = 3;
        cancel.new_status = HearingState::Cancelled;
        cancel.hearing = HearingUpdate::Flagged;
        cancel.work_basket = WorkBasketUpdate::Clear;
        cancel.dwp_state = None;

        let data = cancel.apply_to(&first);
        let entries = data["hearings"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["value"]["hearingStatus"], json!("cancelled"));
        assert_eq!(entries[0]["value"]["epimsId"], json!("372653"));
        assert!(data["workBasketFields"].get("hearingDate").is_none());
        assert!(data["workBasketFields"].get("hearingDateIssued").is_none());
        assert_eq!(data["dwpState"], json!("hearingDateIssued"));
    }

    #[test]
    fn test_recorded_tracking_state_round_trip() {
        let data = listed_mutation().apply_to(&CaseData::new());
        assert_eq!(
            recorded_tracking_state(&data, "H1"),
            Some(HearingTrackingState {
                last_applied_version: 2,
                current_status: HearingState::Listed,
            })
        );
        assert_eq!(recorded_tracking_state(&data, "H2"), None);
    }

    #[test]
    fn test_late_summer_start_lands_on_next_uk_day() {
        let mut mutation = listed_mutation();
        mutation.hearing = HearingUpdate::Listed(ListingDetails {
            venue_epims_id: Some("372653".into()),
            room_id: None,
            judge_id: None,
            start: Some(Utc.with_ymd_and_hms(2026, 6, 1, 23, 30, 0).unwrap()),
        });
        let data = mutation.apply_to(&CaseData::new());

        let hearing = &data["hearings"][0]["value"];
        assert_eq!(hearing["start"], json!("2026-06-02T00:30:00.000"));
        assert_eq!(hearing["hearingDate"], json!("2026-06-02"));
        assert_eq!(hearing["time"], json!("00:30:00.000"));
    }

    #[test]
    fn test_winter_start_is_unchanged() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(format_hearing_date(start), "2026-01-15");
    }

    #[test]
    fn test_date_issued_format() {
        // 2026-10-19 is still British Summer Time.
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 59).unwrap();
        assert_eq!(format_date_issued(at), "2026-10-19 09:05");
        let winter = Utc.with_ymd_and_hms(2026, 12, 1, 8, 5, 0).unwrap();
        assert_eq!(format_date_issued(winter), "2026-12-01 08:05");
    }
}
