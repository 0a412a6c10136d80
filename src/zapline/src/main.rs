//! Zapline — WhatsApp business-messaging dashboard backend.
//!
//! Main entry point that wires configuration, stores, the dispatch
//! simulator and the REST API.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use zapline_api::{ApiServer, AppState};
use zapline_campaigns::{CampaignDispatcher, CampaignStore};
use zapline_core::config::AppConfig;
use zapline_core::event_bus::noop_sink;
use zapline_directory::DirectoryStore;

mod seed;

#[derive(Parser, Debug)]
#[command(name = "zapline")]
#[command(about = "WhatsApp business-messaging dashboard backend")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "ZAPLINE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Dispatch simulator tick in milliseconds (overrides config)
    #[arg(long, env = "ZAPLINE__DISPATCH__TICK_MS")]
    dispatch_tick_ms: Option<u64>,

    /// Start with empty stores instead of demo data
    #[arg(long, default_value_t = false)]
    no_demo_data: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zapline=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Zapline starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(tick_ms) = cli.dispatch_tick_ms {
        config.dispatch.tick_ms = tick_ms;
    }
    if cli.no_demo_data {
        config.demo_data = false;
    }

    info!(
        instance = %config.instance_name,
        http_port = config.api.http_port,
        tick_ms = config.dispatch.tick_ms,
        demo_data = config.demo_data,
        "Configuration loaded"
    );

    let sink = noop_sink();
    let directory = Arc::new(DirectoryStore::new(sink.clone()));
    let campaigns = Arc::new(CampaignStore::new(sink));

    if config.demo_data {
        directory.seed_demo_data();
        seed::seed_demo_campaign(&directory, &campaigns).await?;
    }

    let dispatcher = Arc::new(CampaignDispatcher::new(
        campaigns.clone(),
        config.dispatch.clone(),
    ));
    dispatcher.spawn();

    let state = AppState {
        directory,
        campaigns,
    };
    let api_server = ApiServer::new(config, state);

    info!("Zapline is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
