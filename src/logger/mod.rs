//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats, written off the request path
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::middleware::access_log::AccessSink;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info log
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

/// Start the background task that drains access log lines.
///
/// Must be called from within a tokio runtime. The task ends once every
/// sender has been dropped.
pub fn spawn_access_writer() -> AccessSink {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            write_access(&line);
        }
    });
    tx
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, asset_source: &str) {
    write_info("======================================");
    write_info("WebDAV server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "WebDAV: {} -> {}",
        config.webdav.prefix, config.webdav.dir
    ));
    write_info(&format!("Web UI: {asset_source}"));
    write_info(&format!("CORS origins: {}", config.cors.origins));
    write_info(&format!(
        "Request logging: {}",
        if config.logging.enabled {
            config.logging.format.as_str()
        } else {
            "disabled"
        }
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.server.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Error sink handed to the WebDAV engine wrapper
pub fn log_webdav_error(method: &str, path: &str, status: u16) {
    write_error(&format!("[WEBDAV ERROR] {method} {path} -> {status}"));
}
