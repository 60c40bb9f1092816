//! Structured logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! Two modes:
//! - **File** ([`init_production`]): JSON file layer (daily rotation) + console layer
//! - **CLI** ([`init_cli`]): console-only
//!
//! Both honour `RUST_LOG` and fall back to the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log file prefix; the appender adds a `.YYYY-MM-DD` suffix.
pub const LOG_FILE_NAME: &str = "masquerade.log";

/// Holds the non-blocking writer guard for file logging.
///
/// The [`WorkerGuard`] must be kept alive for the duration of the process.
/// Dropping it flushes pending log entries and closes the file.
#[derive(Debug)]
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

fn env_filter(fallback_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialise logging with a JSON file in `logs_dir`.
///
/// Writes JSON logs to `{logs_dir}/masquerade.log.YYYY-MM-DD` with daily
/// rotation, plus human-readable output on stderr.
///
/// Returns a [`LoggingGuard`] that must be kept alive for log flushing.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created or a global
/// subscriber is already installed.
pub fn init_production(logs_dir: &Path, fallback_level: &str) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(fallback_level))
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(LoggingGuard { _guard: guard })
}

/// Initialise console logging for one-shot subcommands.
///
/// Emits human-readable output to stderr only. A second call is a no-op.
pub fn init_cli(fallback_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback_level))
        .with_writer(std::io::stderr)
        .try_init();
}
