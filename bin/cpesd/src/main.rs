//! ---
//! cpes_section: "00-meta"
//! cpes_subsection: "binary"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Binary entrypoint for the CPES daemon."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cpes_api::{spawn_api_server, ApiServer, ApiState};
use cpes_core::config::AppConfig;
use cpes_logging::{log_system_event, SystemEventOutcome};
use cpes_persistence::SeriesStore;
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(author, version, about = "CPES daemon", long_about = None)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    /// Rated chiller capacity in kW, enabling staging advice
    #[arg(long)]
    rated_capacity_kw: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/cpes.toml"));
    candidates.push(PathBuf::from("configs/cpes.dev.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let config = loaded.config;
    cpes_logging::init_with_filter(&config.logging.filter);
    info!(config_path = %loaded.source.display(), "configuration loaded");

    let store = Arc::new(SeriesStore::open(&config.store.path)?);
    info!(store_path = %store.path().display(), entries = store.entry_count(), "series store opened");

    let mut api_server: Option<ApiServer> = None;
    if config.api.enabled {
        let mut state = ApiState::new(&config, Arc::clone(&store));
        if let Some(rated) = cli.rated_capacity_kw {
            state = state.with_rated_capacity(rated);
        }
        match spawn_api_server(Arc::new(state), config.api.listen) {
            Ok(server) => {
                info!(address = %server.addr(), "api server listening");
                api_server = Some(server);
            }
            Err(err) => {
                warn!(error = %err, "failed to start api server");
                log_system_event(
                    None,
                    "api.start",
                    "api server failed to bind",
                    SystemEventOutcome::Fault,
                );
            }
        }
    } else {
        info!("api server disabled by configuration");
    }

    log_system_event(None, "daemon.start", "daemon running", SystemEventOutcome::Success);
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");

    if let Some(server) = api_server {
        server.shutdown().await?;
    }
    log_system_event(None, "daemon.stop", "daemon stopped", SystemEventOutcome::Success);

    Ok(())
}
