//! # Tribunal Core Configuration System
//!
//! Typed, validated configuration layered from optional YAML files and
//! environment variables.
//!
//! ## Architecture
//!
//! - **Layering**: `config/tribunal.yaml` → `config/tribunal.{env}.yaml` →
//!   `TRIBUNAL__SECTION__FIELD` environment variables
//! - **Defaults everywhere**: every field has a serde default, so the service
//!   boots with no files present
//! - **Explicit Validation**: invalid values fail loading instead of being clamped
//! - **Feature flags**: one immutable [`FeatureFlags`] struct is handed to
//!   handler construction; handlers never read flags from anywhere else
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tribunal_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let service_code = &manager.config().hearings.service_code;
//! let timeout = manager.config().dispatch.timeout();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{hearing_routes, DEFAULT_SERVICE_CODE};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TribunalConfig {
    pub web: WebConfig,
    pub dispatch: DispatchConfig,
    pub hearings: HearingsConfig,
    pub features: FeatureFlags,
    pub logging: LoggingConfig,
}

/// HTTP callback surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    /// When set, `ServiceAuthorization` must carry exactly this value
    pub trusted_service_token: Option<String>,
    /// Whole-request limit enforced by the HTTP layer; answers 408 on expiry
    pub request_timeout_ms: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trusted_service_token: None,
            request_timeout_ms: 30_000,
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Callback dispatch limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Hearing-update ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HearingsConfig {
    /// Only messages for this service are reconciled
    pub service_code: String,
    /// Deployment this instance serves, matched against `hmctsDeploymentId`
    pub deployment_id: Option<String>,
    pub deployment_filter_enabled: bool,
    pub worker_count: usize,
    pub reconcile_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub batch_size: usize,
    pub visibility_timeout_seconds: u64,
    /// Deliveries after which the local queue dead-letters a message
    pub max_deliveries: u32,
}

impl Default for HearingsConfig {
    fn default() -> Self {
        Self {
            service_code: DEFAULT_SERVICE_CODE.to_string(),
            deployment_id: None,
            deployment_filter_enabled: false,
            worker_count: 4,
            reconcile_timeout_ms: 30_000,
            poll_interval_ms: 250,
            batch_size: 10,
            visibility_timeout_seconds: 30,
            max_deliveries: 5,
        }
    }
}

impl HearingsConfig {
    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_millis(self.reconcile_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_seconds)
    }
}

/// Feature flags consumed by handler predicates and reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub list_assist_enabled: bool,
    pub adjournment_enabled: bool,
    /// Route assigned to cases with none; ignored unless List Assist is enabled
    pub default_hearing_route: String,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            list_assist_enabled: true,
            adjournment_enabled: true,
            default_hearing_route: hearing_routes::LIST_ASSIST.to_string(),
        }
    }
}

impl FeatureFlags {
    /// Route given to a case that has none yet
    pub fn effective_default_route(&self) -> &str {
        if self.list_assist_enabled {
            &self.default_hearing_route
        } else {
            hearing_routes::GAPS
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write JSON lines under `log/`
    pub json_file: bool,
}

impl TribunalConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.web.bind_address.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "web.bind_address",
                "web configuration",
            ));
        }

        if self.web.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "web.request_timeout_ms",
                "0",
                "request timeout must be greater than 0",
            ));
        }

        if self.dispatch.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatch.timeout_ms",
                "0",
                "dispatch timeout must be greater than 0",
            ));
        }

        if self.hearings.service_code.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "hearings.service_code",
                "hearings configuration",
            ));
        }

        if self.hearings.worker_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "hearings.worker_count",
                "0",
                "at least one worker is required",
            ));
        }

        if self.hearings.batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "hearings.batch_size",
                "0",
                "batch size must be greater than 0",
            ));
        }

        if self.hearings.reconcile_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "hearings.reconcile_timeout_ms",
                "0",
                "reconcile timeout must be greater than 0",
            ));
        }

        if self.hearings.max_deliveries == 0 {
            return Err(ConfigurationError::invalid_value(
                "hearings.max_deliveries",
                "0",
                "messages must be deliverable at least once",
            ));
        }

        let route = self.features.default_hearing_route.as_str();
        if route != hearing_routes::LIST_ASSIST && route != hearing_routes::GAPS {
            return Err(ConfigurationError::invalid_value(
                "features.default_hearing_route",
                route,
                "expected 'listAssist' or 'gaps'",
            ));
        }

        Ok(())
    }
}
