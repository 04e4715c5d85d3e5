//! Error types surfaced at startup.
//!
//! Per-request failures (bad credentials, asset misses, engine errors) are
//! expressed as HTTP responses, never as these errors.

use std::io;
use std::net::AddrParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unloadable startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid basic-auth entry {0:?}, expected username:password")]
    InvalidCredential(String),

    #[error("invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid WebDAV prefix {0:?}, expected a path such as /webdav/")]
    InvalidPrefix(String),

    #[error("worker thread count must be at least 1")]
    InvalidWorkers,

    #[error("failed to load assets from {}: {source}", path.display())]
    Assets {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal server error.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
