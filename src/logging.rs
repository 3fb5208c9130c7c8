//! Logging initialization.
//!
//! Interactive mode: logs to `<data-local-dir>/checkout/logs/checkout-{datetime}.log`
//! so output never lands on the alternate screen. Headless commands log to stderr.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;
use crate::settings::Settings;

/// Keep alive for the whole run; dropping it flushes buffered log lines.
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    pub log_file_path: Option<PathBuf>,
}

pub fn logs_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("checkout")
        .join("logs")
}

fn filter(settings: &Settings, debug_override: bool) -> EnvFilter {
    let level = if debug_override {
        "debug".to_string()
    } else {
        settings.log_level.clone()
    };
    EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(level))
}

pub fn init_logging(settings: &Settings, interactive: bool, debug_override: bool) -> Result<LoggingHandle> {
    let filter = filter(settings, debug_override);

    if interactive {
        let dir = logs_dir();
        std::fs::create_dir_all(&dir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let log_filename = format!("checkout-{timestamp}.log");
        let log_file_path = dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&dir, &log_filename);
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
