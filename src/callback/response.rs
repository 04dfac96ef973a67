use serde::{Deserialize, Serialize};

use super::case_data::CaseData;

/// Output of a single handler, and of a whole dispatch once aggregated.
///
/// Serializes directly as the callback response body:
/// `{"data": {...}, "errors": [...], "warnings": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerResult {
    pub data: CaseData,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl HandlerResult {
    pub fn new(data: CaseData) -> Self {
        Self {
            data,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.add_error(error);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.add_warning(warning);
        self
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Non-empty errors mean the platform rejects the event and discards `data`
    pub fn is_rejected(&self) -> bool {
        !self.errors.is_empty()
    }
}
