//! # Structured Logging Module
//!
//! Environment-aware structured logging that writes human-readable output to
//! the console and, optionally, JSON lines to a log file for correlating
//! callback dispatches with hearing reconciliation.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with console output only
pub fn init_structured_logging() {
    init_logging(false);
}

/// Initialize structured logging, optionally adding a JSON file layer under `log/`
pub fn init_logging(json_file: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(env_filter(&log_level));

        let file_target = if json_file { prepare_log_file(&environment) } else { None };

        let init_result = match &file_target {
            Some((dir, file_name)) => {
                let file_appender = tracing_appender::rolling::never(dir, file_name);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let result = tracing_subscriber::registry()
                    .with(console_layer)
                    .with(
                        fmt::layer()
                            .with_writer(file_writer)
                            .with_target(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(env_filter(&log_level)),
                    )
                    .try_init();
                // The writer flushes on drop; keep it alive for the process lifetime.
                std::mem::forget(guard);
                result
            }
            None => tracing_subscriber::registry().with(console_layer).try_init(),
        };

        if init_result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            log_file = file_target
                .as_ref()
                .map(|(dir, name)| dir.join(name).display().to_string()),
            "Structured logging initialized"
        );
    });
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn prepare_log_file(environment: &str) -> Option<(PathBuf, String)> {
    let log_dir = PathBuf::from("log");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory {}: {e}", log_dir.display());
        return None;
    }
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    Some((log_dir, format!("{environment}.{}.{timestamp}.log", process::id())))
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    std::env::var("TRIBUNAL_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for callback dispatches
pub fn log_dispatch_operation(
    operation: &str,
    case_id: &str,
    phase: &str,
    event_kind: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        case_id = %case_id,
        phase = %phase,
        event_kind = %event_kind,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "DISPATCH_OPERATION"
    );
}

/// Log structured data for registry operations
pub fn log_registry_operation(
    operation: &str,
    name: Option<&str>,
    priority: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        name = name,
        priority = priority,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}

/// Log structured data for hearing reconciliation
pub fn log_hearing_operation(
    operation: &str,
    case_id: &str,
    hearing_id: &str,
    request_version: Option<u64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        case_id = %case_id,
        hearing_id = %hearing_id,
        request_version = request_version,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "HEARING_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
