//! Logger module
//!
//! Provides logging utilities for the proxy:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Upstream failure diagnostics (status, identifier, body)
//! - Error, warning and debug logging
//!
//! Before `init` runs (and in tests) lines go straight to stdout/stderr.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.is_debug(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn debug_enabled() -> bool {
    writer::get().is_some_and(writer::LogWriter::debug_enabled)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Link page proxy started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Upstream: {}", config.upstream.lookup_url()));
    if config.upstream.accept_invalid_certs {
        write_info("Upstream TLS certificate validation: DISABLED");
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    if debug_enabled() {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

/// Upstream call did not complete
pub fn log_upstream_failure(bis: &str, reason: &str) {
    write_error(&upstream_failure_line(bis, reason));
}

/// Upstream answered with an unexpected status or body
pub fn log_upstream_error(bis: &str, status: u16, body: &str) {
    write_error(&upstream_error_line(bis, status, body));
}

/// 401 from upstream: our side is misconfigured
pub fn log_upstream_unauthorized(bis: &str, endpoint: &str, body: &str) {
    write_error(&format!(
        "[UPSTREAM] BIS={bis:?} 401 Unauthorized from {endpoint}; check upstream configuration: {body:?}"
    ));
}

// Identifier and body come from outside; `{:?}` keeps them on one line
fn upstream_failure_line(bis: &str, reason: &str) -> String {
    format!("[UPSTREAM] BIS={bis:?} transport failure: {reason:?}")
}

fn upstream_error_line(bis: &str, status: u16, body: &str) -> String {
    format!("[UPSTREAM] BIS={bis:?} unexpected response {status}: {body:?}")
}

pub fn log_shutdown_started(active: usize) {
    write_info(&format!(
        "[Shutdown] Stopped accepting connections, {active} still active"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "Shutdown grace period elapsed with {remaining} connection(s) still open"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_lines_escape_control_characters() {
        let line = upstream_failure_line("1\n[ERROR] forged", "connect: refused");
        assert!(!line.contains('\n'));
        assert!(line.contains(r#"BIS="1\n[ERROR] forged""#));

        let line = upstream_error_line("1\r\n2", 502, "bad\ngateway");
        assert!(!line.contains('\n') && !line.contains('\r'));
        assert!(line.contains("unexpected response 502"));
    }
}
