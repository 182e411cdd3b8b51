//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, when the log
//! directory is writable, to a JSON file per process.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(env_filter(&log_level));

        let log_dir = PathBuf::from("log");
        let file_name = format!(
            "{}.{}.{}.log",
            environment,
            process::id(),
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        let file_layer = match fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::never(&log_dir, &file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(env_filter(&log_level)),
                )
            }
            Err(_) => None,
        };
        let has_file = file_layer.is_some();

        // Another subscriber (e.g. a test harness) may already be installed
        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            log_file = has_file.then(|| log_dir.join(&file_name).display().to_string()),
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// `RUST_LOG` wins over the environment default
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn get_environment() -> String {
    std::env::var("CROPMIND_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        "test" => "warn".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for lifecycle mutations
pub fn log_lifecycle_operation(
    operation: &str,
    farmer: &str,
    instance_id: Option<i64>,
    stage_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        farmer = %farmer,
        instance_id = instance_id,
        stage_id = stage_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🌱 LIFECYCLE_OPERATION"
    );
}

/// Log the outcome of one dashboard aggregation
pub fn log_aggregation_outcome(
    farmer: &str,
    available: &[&str],
    unavailable: &[&str],
    duration_ms: u64,
) {
    if unavailable.is_empty() {
        tracing::info!(
            farmer = %farmer,
            sections = ?available,
            duration_ms = duration_ms,
            "📊 DASHBOARD_AGGREGATION"
        );
    } else {
        tracing::warn!(
            farmer = %farmer,
            sections = ?available,
            unavailable = ?unavailable,
            duration_ms = duration_ms,
            "📊 DASHBOARD_AGGREGATION: partial result"
        );
    }
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
