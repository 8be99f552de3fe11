//! Fairdice HTTP server binary

use clap::Parser;
use fairdice::{
    api::ApiServer,
    config::{self, StorageBackend},
    logging, ConfigLoader, ServiceBuilder,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fairdice")]
#[command(about = "Provably fair dice game server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Listen host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Keep outcomes in memory instead of RocksDB
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match args.config {
        Some(ref path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut app_config = loader.load()?;

    if let Some(host) = args.host {
        app_config.http.host = host;
    }
    if let Some(port) = args.port {
        app_config.http.port = port;
    }
    if args.memory {
        app_config.storage.backend = StorageBackend::Memory;
    }
    config::validate(&app_config)?;

    logging::init_tracing(&app_config.log);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?app_config.storage.backend,
        data_dir = %app_config.storage.data_dir,
        "Starting fairdice"
    );

    let service = Arc::new(ServiceBuilder::new(app_config.clone()).build()?);
    ApiServer::new(app_config.http, service).run().await
}
