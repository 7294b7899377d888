//! Logging initialization.
//!
//! Server with `logging.to_file`: `<state>/logs/medjourney-{datetime}.log`
//! Everything else: stderr

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Keeps the file writer alive; buffered logs are flushed on drop.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file when file logging is active
    pub log_file_path: Option<PathBuf>,
}

/// Level filter honouring `RUST_LOG`, then `--debug`, then config
fn filter_directive(config: &Config, debug_override: bool) -> String {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        return directive;
    }
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Log file name for a server started now
fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("medjourney-{}.log", timestamp)
}

fn log_file_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(log_file_name())
}

/// Install the global subscriber.
///
/// `file_mode` is set by long-running commands; file output also needs
/// `logging.to_file` in config. The returned handle must outlive the program.
pub fn init_logging(
    config: &Config,
    file_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = tracing_subscriber::EnvFilter::new(filter_directive(config, debug_override));

    if file_mode && config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;

        let log_file_path = log_file_path(&logs_dir);
        let file_name = log_file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(log_file_name);

        let file_appender = tracing_appender::rolling::never(&logs_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}
