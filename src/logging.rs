use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "REPASO_LOG";
pub const LOG_FILE: &str = "repaso.log";

/// Keeps the background writer alive; dropping it flushes pending lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repaso")
}

/// `REPASO_LOG` wins over the configured level; unparsable filters fall back to `info`.
pub fn build_filter(configured: &str) -> EnvFilter {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| configured.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Route tracing output to `<log_dir>/repaso.log`. The terminal belongs to the
/// TUI, so nothing is written to stdout or stderr once this returns.
pub fn init_tracing(log_level: &str, log_dir: &Path) -> Option<FileLogGuard> {
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(file_layer)
        .init();

    Some(FileLogGuard { _guard: guard })
}
