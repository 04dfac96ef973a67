use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::endpoints;

/// Point in the case-event lifecycle at which the platform calls the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackPhase {
    /// Before the event form is shown; no prior snapshot exists
    AboutToStart,
    /// Between pages of a multi-page event
    MidEvent,
    /// Before the event is committed; errors here reject the event
    AboutToSubmit,
    /// After the event has been committed
    Submitted,
}

impl CallbackPhase {
    pub const ALL: [CallbackPhase; 4] = [
        Self::AboutToStart,
        Self::MidEvent,
        Self::AboutToSubmit,
        Self::Submitted,
    ];

    /// Whether the platform supplies a prior snapshot for this phase
    pub fn carries_prior(&self) -> bool {
        !matches!(self, Self::AboutToStart)
    }

    /// Whether errors returned in this phase block the event
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::Submitted)
    }

    /// Endpoint path on which the platform delivers this phase
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Self::AboutToStart => endpoints::ABOUT_TO_START,
            Self::MidEvent => endpoints::MID_EVENT,
            Self::AboutToSubmit => endpoints::ABOUT_TO_SUBMIT,
            Self::Submitted => endpoints::SUBMITTED,
        }
    }

    pub fn from_endpoint_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.endpoint_path() == path)
    }
}

impl fmt::Display for CallbackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboutToStart => write!(f, "about_to_start"),
            Self::MidEvent => write!(f, "mid_event"),
            Self::AboutToSubmit => write!(f, "about_to_submit"),
            Self::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for CallbackPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "about_to_start" => Ok(Self::AboutToStart),
            "mid_event" => Ok(Self::MidEvent),
            "about_to_submit" => Ok(Self::AboutToSubmit),
            "submitted" => Ok(Self::Submitted),
            _ => Err(format!("Invalid callback phase: {s}")),
        }
    }
}
