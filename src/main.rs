use clap::{CommandFactory, Parser};
use std::path::Path;
use std::sync::Arc;

mod assets;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod middleware;
mod server;

use assets::{EmbeddedBundle, MemoryBundle, SharedBundle};
use error::{ConfigError, ServerError};
use handler::{ProtocolRouter, StaticAssets, WebDav};
use middleware::{AccessLog, BasicAuth, Chain, Cors, CredentialSet, RequestTagger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = config::Cli::parse();
    let cfg = config::Config::load(&cli)?;

    // Credentials from the file or environment get the same usage error as a bad flag
    let credentials = match cfg.credentials() {
        Ok(credentials) => credentials,
        Err(e) => config::Cli::command()
            .error(clap::error::ErrorKind::ValueValidation, e)
            .exit(),
    };

    logger::init(&cfg)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, credentials))?;
    Ok(())
}

async fn async_main(cfg: config::Config, credentials: CredentialSet) -> Result<(), ServerError> {
    let addr = cfg.get_socket_addr()?;
    let bundle = load_bundle(&cfg)?;
    let asset_source = bundle.describe();

    let chain = build_chain(&cfg, credentials);
    let dav = WebDav::new(&cfg.webdav.prefix, Path::new(&cfg.webdav.dir));
    let router = ProtocolRouter::new(
        &cfg.webdav.prefix,
        &chain,
        Arc::new(dav),
        StaticAssets::new(bundle),
    );

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg, &asset_source);

    server::serve(
        listener,
        router,
        cfg.server.max_connections,
        server::shutdown_signal(),
    )
    .await;
    Ok(())
}

/// Web UI from `assets.dir` when set, otherwise the embedded build.
fn load_bundle(cfg: &config::Config) -> Result<SharedBundle, ConfigError> {
    match &cfg.assets.dir {
        Some(dir) => Ok(Arc::new(MemoryBundle::load_dir(Path::new(dir))?)),
        None => Ok(Arc::new(EmbeddedBundle)),
    }
}

/// Registration order is innermost first, so requests pass through
/// CORS, request tagging, access logging and authentication in that order.
fn build_chain(cfg: &config::Config, credentials: CredentialSet) -> Chain {
    let mut chain = Chain::default();
    if !credentials.is_empty() {
        chain = chain.with(BasicAuth::new(credentials));
    }
    if cfg.logging.enabled {
        chain = chain.with(AccessLog::new(
            &cfg.logging.format,
            logger::spawn_access_writer(),
        ));
    }
    chain.with(RequestTagger).with(Cors::new(cfg.cors_policy()))
}
