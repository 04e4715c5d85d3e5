// Configuration module entry point
// Layers defaults, an optional file, DELVE_* environment variables and
// command line flags into one immutable Config.

mod cli;
mod types;

use crate::error::ConfigError;
use crate::handler::normalize_prefix;
use crate::middleware::{CorsPolicy, CredentialSet};
use std::net::SocketAddr;

// Re-export public types
pub use cli::Cli;
pub use types::Config;

/// File consulted when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "delve";

const DEFAULT_METHODS: &str =
    "GET,POST,PUT,DELETE,OPTIONS,PROPFIND,PROPPATCH,MKCOL,COPY,MOVE,LOCK,UNLOCK";

const DEFAULT_HEADERS: &str = "Content-Type,Content-Length,Accept-Encoding,X-CSRF-Token,\
Authorization,accept,origin,Cache-Control,X-Requested-With,Depth,Destination,Overwrite,\
Timeout,If,Lock-Token,If-Match,If-None-Match,If-Modified-Since,If-Unmodified-Since,DAV,\
Brief,Prefer,Access-Control-Request-Method,Access-Control-Request-Headers";

impl Config {
    /// Load configuration: defaults < file < environment < flags
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("webdav.prefix", "/webdav/")?
            .set_default("webdav.dir", ".")?
            .set_default("cors.origins", "*")?
            .set_default("cors.methods", DEFAULT_METHODS)?
            .set_default("cors.headers", DEFAULT_HEADERS)?
            .set_default("cors.credentials", true)?
            .set_default("logging.enabled", false)?
            .set_default("logging.format", "combined")?
            .set_default("auth.basic", "")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DELVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("webdav.prefix", cli.prefix.clone())?
            .set_override_option("webdav.dir", cli.dir.clone())?
            .set_override_option("cors.origins", cli.origins.clone())?
            .set_override_option("cors.methods", cli.methods.clone())?
            .set_override_option("cors.headers", cli.headers.clone())?
            .set_override_option("cors.credentials", cli.credentials)?
            .set_override_option("server.host", cli.host.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option(
                "server.workers",
                cli.workers.and_then(|w| u64::try_from(w).ok()),
            )?
            .set_override_option("server.max_connections", cli.max_connections)?
            .set_override_option("logging.enabled", cli.logger)?
            .set_override_option("logging.format", cli.log_format.clone())?
            .set_override_option("logging.access_log_file", cli.access_log_file.clone())?
            .set_override_option("logging.error_log_file", cli.error_log_file.clone())?
            .set_override_option("auth.basic", cli.basic_auth.clone())?
            .set_override_option("assets.dir", cli.assets_dir.clone())?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.webdav.prefix = validate_prefix(&cfg.webdav.prefix)?;
        // The runtime builder panics on zero worker threads
        if cfg.server.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }

    pub fn cors_policy(&self) -> CorsPolicy {
        CorsPolicy::from_lists(
            &self.cors.origins,
            &self.cors.methods,
            &self.cors.headers,
            self.cors.credentials,
        )
    }

    pub fn credentials(&self) -> Result<CredentialSet, ConfigError> {
        CredentialSet::parse(&self.auth.basic)
    }
}

/// Normalise the prefix; `/` alone would hide the web UI.
fn validate_prefix(prefix: &str) -> Result<String, ConfigError> {
    if prefix.contains(|c: char| c == '?' || c == '#' || c.is_whitespace()) {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }
    let normalized = normalize_prefix(prefix);
    if normalized == "/" {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let cfg = Config::load(&Cli::default()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.webdav.prefix, "/webdav/");
        assert_eq!(cfg.webdav.dir, ".");
        assert!(cfg.cors.credentials);
        assert!(!cfg.logging.enabled);
        assert_eq!(cfg.logging.format, "combined");
        assert!(cfg.credentials().unwrap().is_empty());
        assert!(cfg.assets.dir.is_none());
        assert!(cfg.cors_policy().allows_any_origin());
        assert!(cfg.cors.headers.ends_with("Access-Control-Request-Headers"));
    }

    #[test]
    fn test_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delve.toml");
        fs::write(
            &path,
            "[server]\nport = 9000\nhost = \"127.0.0.1\"\n\n[webdav]\nprefix = \"files\"\n\n[auth]\nbasic = \"alice:secret\"\n",
        )
        .unwrap();

        let cli = Cli {
            config: Some(path.clone()),
            ..Cli::default()
        };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.webdav.prefix, "/files/");
        assert_eq!(cfg.credentials().unwrap().len(), 1);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:9000".parse().unwrap()
        );

        let cli = Cli {
            config: Some(path),
            port: Some(9100),
            logger: Some(true),
            ..Cli::default()
        };
        let cfg = Config::load(&cli).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert!(cfg.logging.enabled);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            config: Some(dir.path().join("absent.toml")),
            ..Cli::default()
        };
        assert!(matches!(Config::load(&cli), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_bad_credentials_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delve.toml");
        fs::write(&path, "[auth]\nbasic = \"alice\"\n").unwrap();
        let cli = Cli {
            config: Some(path),
            ..Cli::default()
        };
        let cfg = Config::load(&cli).unwrap();
        assert!(matches!(
            cfg.credentials(),
            Err(ConfigError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_invalid_prefix_and_address() {
        let cli = Cli {
            prefix: Some("/".to_string()),
            ..Cli::default()
        };
        assert!(matches!(
            Config::load(&cli),
            Err(ConfigError::InvalidPrefix(_))
        ));

        let cli = Cli {
            host: Some("not a host".to_string()),
            ..Cli::default()
        };
        let cfg = Config::load(&cli).unwrap();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cli = Cli {
            workers: Some(0),
            ..Cli::default()
        };
        assert!(matches!(
            Config::load(&cli),
            Err(ConfigError::InvalidWorkers)
        ));

        let cli = Cli {
            workers: Some(2),
            ..Cli::default()
        };
        assert_eq!(Config::load(&cli).unwrap().server.workers, Some(2));
    }
}
