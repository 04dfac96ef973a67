//! Hearing status vocabularies.
//!
//! [`HmcStatus`] and [`ListingStatus`] are the listing subsystem's wire
//! vocabulary. [`HearingState`] is the much smaller set of states the
//! reconciler tracks per hearing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DORMANT_CANCELLATION_REASONS;

/// Hearing management status as broadcast by the listing subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HmcStatus {
    HearingRequested,
    AwaitingListing,
    Listed,
    UpdateRequested,
    UpdateSubmitted,
    Exception,
    CancellationRequested,
    CancellationSubmitted,
    Cancelled,
    AwaitingActuals,
    Completed,
    Adjourned,
    Closed,
}

impl HmcStatus {
    /// Statuses that become LISTED once the listing is fixed
    pub fn is_listable(&self) -> bool {
        matches!(
            self,
            Self::Listed | Self::AwaitingListing | Self::UpdateSubmitted
        )
    }
}

impl fmt::Display for HmcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HearingRequested => "HEARING_REQUESTED",
            Self::AwaitingListing => "AWAITING_LISTING",
            Self::Listed => "LISTED",
            Self::UpdateRequested => "UPDATE_REQUESTED",
            Self::UpdateSubmitted => "UPDATE_SUBMITTED",
            Self::Exception => "EXCEPTION",
            Self::CancellationRequested => "CANCELLATION_REQUESTED",
            Self::CancellationSubmitted => "CANCELLATION_SUBMITTED",
            Self::Cancelled => "CANCELLED",
            Self::AwaitingActuals => "AWAITING_ACTUALS",
            Self::Completed => "COMPLETED",
            Self::Adjourned => "ADJOURNED",
            Self::Closed => "CLOSED",
        };
        f.write_str(label)
    }
}

/// Sub-status narrowing LISTED / UPDATE_SUBMITTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Draft,
    Provisional,
    Fixed,
    #[serde(rename = "CNCL")]
    Cancelled,
}

impl ListingStatus {
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed)
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Provisional => write!(f, "PROVISIONAL"),
            Self::Fixed => write!(f, "FIXED"),
            Self::Cancelled => write!(f, "CNCL"),
        }
    }
}

/// Per-hearing state tracked by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingState {
    /// Initial state; no listing confirmed yet
    #[default]
    AwaitingListing,
    Listed,
    UpdateSubmitted,
    /// Absorbing for further updates to this hearing
    Cancelled,
    /// Absorbing for further updates to this hearing
    Exception,
}

impl HearingState {
    /// Value written to the case's hearing entry
    pub fn case_hearing_status(&self) -> &'static str {
        match self {
            Self::AwaitingListing => "awaitingListing",
            Self::Listed => "listed",
            Self::UpdateSubmitted => "updateSubmitted",
            Self::Cancelled => "cancelled",
            Self::Exception => "exception",
        }
    }

    pub fn is_absorbing(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Exception)
    }
}

impl fmt::Display for HearingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingListing => write!(f, "awaiting_listing"),
            Self::Listed => write!(f, "listed"),
            Self::UpdateSubmitted => write!(f, "update_submitted"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Exception => write!(f, "exception"),
        }
    }
}

impl std::str::FromStr for HearingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_listing" => Ok(Self::AwaitingListing),
            "listed" => Ok(Self::Listed),
            "update_submitted" => Ok(Self::UpdateSubmitted),
            "cancelled" => Ok(Self::Cancelled),
            "exception" => Ok(Self::Exception),
            _ => Err(format!("Invalid hearing state: {s}")),
        }
    }
}

/// Cancellation reason code, e.g. `withdraw` or `listerr`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancellationReason(String);

impl CancellationReason {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Reasons after which the appeal itself goes dormant
    pub fn makes_case_dormant(&self) -> bool {
        DORMANT_CANCELLATION_REASONS
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&self.0))
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let status: HmcStatus = serde_json::from_str("\"UPDATE_SUBMITTED\"").unwrap();
        assert_eq!(status, HmcStatus::UpdateSubmitted);
        assert_eq!(status.to_string(), "UPDATE_SUBMITTED");

        let listing: ListingStatus = serde_json::from_str("\"CNCL\"").unwrap();
        assert!(listing.is_cancellation());
        assert_eq!(serde_json::to_string(&ListingStatus::Fixed).unwrap(), "\"FIXED\"");
        assert!(serde_json::from_str::<HmcStatus>("\"NOT_A_STATUS\"").is_err());
    }

    #[test]
    fn test_listable_statuses() {
        assert!(HmcStatus::Listed.is_listable());
        assert!(HmcStatus::AwaitingListing.is_listable());
        assert!(HmcStatus::UpdateSubmitted.is_listable());
        assert!(!HmcStatus::UpdateRequested.is_listable());
        assert!(!HmcStatus::Cancelled.is_listable());
    }

    #[test]
    fn test_hearing_state_round_trip_and_default() {
        assert_eq!(HearingState::default(), HearingState::AwaitingListing);
        for state in [
            HearingState::AwaitingListing,
            HearingState::Listed,
            HearingState::UpdateSubmitted,
            HearingState::Cancelled,
            HearingState::Exception,
        ] {
            assert_eq!(state.to_string().parse::<HearingState>().unwrap(), state);
        }
        assert!(HearingState::Cancelled.is_absorbing());
        assert!(!HearingState::Listed.is_absorbing());
    }

    #[test]
    fn test_dormant_reasons() {
        assert!(CancellationReason::new("withdraw").makes_case_dormant());
        assert!(CancellationReason::new("STRUCK").makes_case_dormant());
        assert!(CancellationReason::new("lapsed").makes_case_dormant());
        assert!(!CancellationReason::new("listerr").makes_case_dormant());
    }
}
