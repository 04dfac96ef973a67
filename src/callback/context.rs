use serde::{Deserialize, Serialize};
use std::fmt;

use super::case_data::{self, CaseData};
use super::phase::CallbackPhase;
use crate::constants::fields;

/// Identifier naming a business event on a case (open set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKind(String);

impl EventKind {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventKind {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for EventKind {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque caller credential, passed through to handlers and never logged
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CallerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "CallerToken([EMPTY])")
        } else {
            write!(f, "CallerToken([MASKED])")
        }
    }
}

/// Immutable snapshot of a single inbound callback.
///
/// The dispatcher threads case data through a handler chain by deriving a
/// fresh context per handler with [`CallbackContext::with_current`]; no
/// context is ever mutated in place.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    phase: CallbackPhase,
    event_kind: EventKind,
    case_id: String,
    current: CaseData,
    prior: Option<CaseData>,
    caller_token: CallerToken,
    ignore_warnings: bool,
}

impl CallbackContext {
    pub fn new(
        phase: CallbackPhase,
        event_kind: impl Into<EventKind>,
        case_id: impl Into<String>,
        current: CaseData,
    ) -> Self {
        Self {
            phase,
            event_kind: event_kind.into(),
            case_id: case_id.into(),
            current,
            prior: None,
            caller_token: CallerToken::default(),
            ignore_warnings: false,
        }
    }

    /// Attach the pre-event snapshot. Ignored for about-to-start, which never has one.
    pub fn with_prior(mut self, prior: Option<CaseData>) -> Self {
        self.prior = if self.phase.carries_prior() { prior } else { None };
        self
    }

    pub fn with_caller_token(mut self, token: CallerToken) -> Self {
        self.caller_token = token;
        self
    }

    pub fn with_ignore_warnings(mut self, ignore_warnings: bool) -> Self {
        self.ignore_warnings = ignore_warnings;
        self
    }

    /// Derive the context the next handler in a chain sees
    pub fn with_current(&self, current: CaseData) -> Self {
        Self {
            phase: self.phase,
            event_kind: self.event_kind.clone(),
            case_id: self.case_id.clone(),
            current,
            prior: self.prior.clone(),
            caller_token: self.caller_token.clone(),
            ignore_warnings: self.ignore_warnings,
        }
    }

    pub fn phase(&self) -> CallbackPhase {
        self.phase
    }

    pub fn event_kind(&self) -> &EventKind {
        &self.event_kind
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn current(&self) -> &CaseData {
        &self.current
    }

    pub fn into_current(self) -> CaseData {
        self.current
    }

    pub fn prior(&self) -> Option<&CaseData> {
        self.prior.as_ref()
    }

    pub fn caller_token(&self) -> &CallerToken {
        &self.caller_token
    }

    /// Whether the caller asked for warnings to be acknowledged, either on the
    /// request itself or through the case-data flag
    pub fn ignore_warnings(&self) -> bool {
        self.ignore_warnings
            || case_data::is_yes(&self.current, &[fields::IGNORE_CALLBACK_WARNINGS])
    }

    /// Whether a field differs between the prior and current snapshots
    pub fn field_changed(&self, path: &[&str]) -> bool {
        let before = self.prior.as_ref().and_then(|p| case_data::get_path(p, path));
        let after = case_data::get_path(&self.current, path);
        before != after
    }
}
