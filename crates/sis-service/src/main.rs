//! Stored identity validation service — entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sis_did::{HttpDidDocumentSource, KeyResolver, SignatureVerifier};
use sis_service::audit::TracingAuditSink;
use sis_service::config::ServiceConfig;
use sis_service::providers::{EnvSecretsProvider, FileConfigurationProvider};
use sis_service::{api, Auditor, HttpCredentialStore, ValidationPipeline};

/// Stored identity validation service
#[derive(Parser, Debug)]
#[command(name = "sis-service", version, about = "Stored identity validation service")]
struct Args {
    /// Path to the service configuration file (TOML).
    #[arg(short, long, default_value = "sis.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(&args.config)?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!("stored identity service v{}", env!("CARGO_PKG_VERSION"));

    let configuration = Arc::new(FileConfigurationProvider::new(
        config.configuration.document_path.clone(),
    ));
    let secrets = Arc::new(EnvSecretsProvider::new(
        config.configuration.api_key_variable.clone(),
    ));
    let store = Arc::new(HttpCredentialStore::new(
        configuration.clone(),
        secrets.clone(),
    ));
    let resolver = Arc::new(KeyResolver::new(Arc::new(HttpDidDocumentSource::new())));
    let verifier = SignatureVerifier::new(resolver);
    let auditor = Auditor::new(Arc::new(TracingAuditSink));

    let pipeline = Arc::new(ValidationPipeline::new(
        configuration,
        store,
        verifier,
        auditor,
    ));

    let listen_addr: SocketAddr =
        format!("{}:{}", config.api.listen_addr, config.api.port).parse()?;
    api::serve(listen_addr, pipeline).await?;

    tracing::info!("stored identity service exited cleanly");
    Ok(())
}
