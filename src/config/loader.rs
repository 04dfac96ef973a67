//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles environment detection,
//! layering of YAML files and environment variables, validation, and masked
//! logging of the effective configuration.

use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::TribunalConfig;

const BASE_FILE_STEM: &str = "tribunal";
const ENV_PREFIX: &str = "TRIBUNAL";
const ENV_SEPARATOR: &str = "__";

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: TribunalConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_overrides(config_dir, environment, None)
    }

    /// Load with an explicit variable map standing in for the process environment.
    ///
    /// Keys use the same `TRIBUNAL__SECTION__FIELD` shape as real variables.
    pub fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment, overrides)?;
        config.validate()?;

        let sanitized = Self::sanitize_config_for_logging(&config);
        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&sanitized)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %environment,
            service_code = %config.hearings.service_code,
            deployment_filter_enabled = config.hearings.deployment_filter_enabled,
            worker_count = config.hearings.worker_count,
            bind_address = %config.web.bind_address,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it
    pub fn from_config(config: TribunalConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: PathBuf::from("config"),
        }))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<TribunalConfig> {
        let base_path = config_directory.join(format!("{BASE_FILE_STEM}.yaml"));
        let env_path = config_directory.join(format!("{BASE_FILE_STEM}.{environment}.yaml"));

        debug!(
            base = %base_path.display(),
            base_exists = base_path.exists(),
            overlay = %env_path.display(),
            overlay_exists = env_path.exists(),
            "Resolving configuration layers"
        );

        let env_source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(overrides);

        Config::builder()
            .add_source(File::from(base_path).required(false))
            .add_source(File::from(env_path).required(false))
            .add_source(env_source)
            .build()
            .and_then(|settings| settings.try_deserialize::<TribunalConfig>())
            .map_err(|e| ConfigurationError::load_error(environment, e))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &TribunalConfig {
        &self.config
    }

    /// Configuration as JSON with sensitive fields masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn sanitize_config_for_logging(config: &TribunalConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential", "auth"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if !is_sensitive {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                        continue;
                    }

                    *val = match val {
                        serde_json::Value::Null => serde_json::Value::Null,
                        serde_json::Value::String(s) if s.is_empty() => {
                            serde_json::Value::String("[EMPTY]".to_string())
                        }
                        serde_json::Value::String(s) => {
                            let chars: Vec<char> = s.chars().collect();
                            let masked = if chars.len() > 4 {
                                let head: String = chars[..2].iter().collect();
                                let tail: String = chars[chars.len() - 2..].iter().collect();
                                format!("{head}***{tail}")
                            } else {
                                "***".to_string()
                            };
                            serde_json::Value::String(format!("[MASKED: {masked}]"))
                        }
                        _ => serde_json::Value::String("[MASKED]".to_string()),
                    };
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("TRIBUNAL_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Some(HashMap::new()),
        )
        .unwrap();
        assert_eq!(manager.config(), &TribunalConfig::default());
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn test_environment_file_overlays_base() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "tribunal.yaml",
            "hearings:\n  service_code: BBA3\n  worker_count: 2\ndispatch:\n  timeout_ms: 500\n",
        );
        write(&dir, "tribunal.test.yaml", "hearings:\n  worker_count: 8\n");

        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Some(HashMap::new()),
        )
        .unwrap();
        let config = manager.config();
        assert_eq!(config.hearings.worker_count, 8);
        assert_eq!(config.dispatch.timeout_ms, 500);
        assert_eq!(config.hearings.service_code, "BBA3");
    }

    #[test]
    fn test_environment_variables_override_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tribunal.yaml", "hearings:\n  deployment_filter_enabled: false\n");

        let overrides = HashMap::from([
            (
                "TRIBUNAL__HEARINGS__DEPLOYMENT_FILTER_ENABLED".to_string(),
                "true".to_string(),
            ),
            (
                "TRIBUNAL__HEARINGS__DEPLOYMENT_ID".to_string(),
                "staging".to_string(),
            ),
        ]);
        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "development",
            Some(overrides),
        )
        .unwrap();
        assert!(manager.config().hearings.deployment_filter_enabled);
        assert_eq!(
            manager.config().hearings.deployment_id.as_deref(),
            Some("staging")
        );
    }

    #[test]
    fn test_invalid_values_fail_loading() {
        let dir = TempDir::new().unwrap();
        write(&dir, "tribunal.yaml", "hearings:\n  batch_size: 0\n");
        let err = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Some(HashMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref field, .. } if field == "hearings.batch_size"));
    }

    #[test]
    fn test_sensitive_fields_masked() {
        let mut config = TribunalConfig::default();
        config.web.trusted_service_token = Some("Bearer s2s-secret".to_string());
        let manager = ConfigManager::from_config(config, "test").unwrap();
        let debug = manager.debug_config();
        assert_eq!(
            debug["web"]["trusted_service_token"],
            serde_json::json!("[MASKED: Be***et]")
        );
        assert_eq!(debug["hearings"]["service_code"], serde_json::json!("BBA3"));
    }
}
