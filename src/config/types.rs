// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub webdav: WebDavConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Listener and runtime configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker thread count, defaults to CPU cores
    pub workers: Option<usize>,
    /// Maximum concurrent connections (None = unlimited)
    pub max_connections: Option<u64>,
}

/// WebDAV mount configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebDavConfig {
    /// URL prefix, normalised to `/name/` on load
    pub prefix: String,
    /// Directory served by the engine
    pub dir: String,
}

/// CORS configuration, lists are comma-separated
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub origins: String,
    pub methods: String,
    pub headers: String,
    pub credentials: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Request (access) logging
    pub enabled: bool,
    /// combined, common, json, or a custom `$variable` template
    pub format: String,
    /// Access log file path (None = stdout)
    pub access_log_file: Option<String>,
    /// Error log file path (None = stderr)
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// `user:pass[,user:pass...]`; empty disables authentication
    #[serde(default)]
    pub basic: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AssetsConfig {
    /// Web UI build directory; None serves the embedded bundle
    pub dir: Option<String>,
}
