// Command line flags
// Every flag is optional so that only values given on the command line
// override the file and environment layers.

use crate::middleware::CredentialSet;
use clap::Parser;
use std::path::PathBuf;

/// WebDAV file server with an embedded web UI
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "delve-server", version, about)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML by extension)
    #[arg(long, env = "DELVE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// WebDAV prefix [default: /webdav/]
    #[arg(long)]
    pub prefix: Option<String>,

    /// WebDAV directory [default: .]
    #[arg(long)]
    pub dir: Option<String>,

    /// Allowed origins (comma-separated) [default: *]
    #[arg(long)]
    pub origins: Option<String>,

    /// Allowed methods (comma-separated)
    #[arg(long)]
    pub methods: Option<String>,

    /// Allowed headers (comma-separated)
    #[arg(long)]
    pub headers: Option<String>,

    /// Allow credentials [default: true]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub credentials: Option<bool>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(long)]
    pub port: Option<u16>,

    /// Runtime worker threads [default: CPU cores]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Reject connections beyond this many concurrent ones
    #[arg(long)]
    pub max_connections: Option<u64>,

    /// Enable request logging [default: false]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub logger: Option<bool>,

    /// Access log format: combined, common, json, or a custom template
    #[arg(long)]
    pub log_format: Option<String>,

    /// Append access log lines to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub access_log_file: Option<String>,

    /// Append error log lines to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub error_log_file: Option<String>,

    /// Basic auth credentials, username:password (comma-separated for multiple users)
    #[arg(long, value_parser = parse_basic_auth)]
    pub basic_auth: Option<String>,

    /// Serve the web UI from this directory instead of the embedded bundle
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<String>,
}

/// Reject malformed credential lists while parsing arguments.
fn parse_basic_auth(value: &str) -> Result<String, String> {
    CredentialSet::parse(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}
