//! Log writer module
//!
//! Installs the global `tracing` subscriber, writing either to the console
//! or to a log file through a non-blocking appender.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("invalid log level directive {directive:?}: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to prepare log file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Keeps the background log writer alive; drop it last
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Build the level filter from a directive such as `info` or `form_playground=debug`
pub fn build_filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|source| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

/// Install the global subscriber
///
/// This should be called once at application startup.
pub fn init(level: &str, log_file: Option<&str>) -> Result<LogGuard, LoggerError> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let Some(path) = log_file else {
        builder
            .try_init()
            .map_err(|e| LoggerError::Init(e.to_string()))?;
        return Ok(LogGuard { _worker: None });
    };

    let (dir, file_name) = split_log_path(path);
    std::fs::create_dir_all(dir).map_err(|source| LoggerError::Io {
        path: path.to_string(),
        source,
    })?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    builder
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    Ok(LogGuard {
        _worker: Some(guard),
    })
}

/// Split a log path into its directory and file name parts
fn split_log_path(path: &str) -> (&Path, &str) {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("form_playground.log");
    (dir, file)
}
