//! Logger module
//!
//! Thin facade over `tracing` used by the rest of the server: lifecycle
//! messages, connection errors and access log lines.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::{LogGuard, LoggerError};

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize logging from configuration
///
/// Should be called once at application startup. Keep the guard alive
/// for the lifetime of the process.
pub fn init(config: &Config) -> Result<LogGuard, LoggerError> {
    writer::init(&config.logging.level, config.logging.log_file.as_deref())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Form playground started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("Images stored in: {}", config.storage.images_dir);
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    tracing::info!("Shutting down: {reason}");
}
