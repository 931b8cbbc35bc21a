//! Pick/ban draft server.
//!
//! Loads the champion catalog, builds the draft manager and serves the REST
//! API until interrupted.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Error, bail};
use draft_engine::{AttributeCatalog, DraftManager};
use draft_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use pico_args::Arguments;
use tracing::{error, info};

const HELP: &str = "\
Run a pick/ban draft server

USAGE:
  draft_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --catalog    PATH        Champion catalog JSON file  [default: env CHAMPION_CATALOG or bundled sample]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  CHAMPION_CATALOG         Champion catalog JSON file
  METRICS_BIND             Prometheus exporter address, disabled when unset
  SESSION_LOCK_TIMEOUT_MS  Wait for exclusive session access  [default: 2000]
  SUBSCRIBER_CAPACITY      Queued events per subscriber  [default: 64]
  MAX_SUGGESTIONS          Suggestions returned per request  [default: 5]
  RUST_LOG                 Log filter  [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        catalog: pargs.opt_value_from_str("--catalog")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {remaining:?}");
    }

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.catalog)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);
    }

    let catalog = Arc::new(config.load_catalog()?);
    info!(
        "Loaded {} champions from {}",
        catalog.len(),
        config
            .catalog_path
            .as_ref()
            .map_or_else(|| "bundled sample".to_string(), |p| p.display().to_string())
    );

    let manager = DraftManager::with_catalog(
        config.manager.clone(),
        catalog as Arc<dyn AttributeCatalog>,
    )
    .with_broadcaster(Arc::new(metrics::MetricsBroadcaster));

    let app = api::create_router(AppState {
        manager: Arc::new(manager),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Draft server listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C. Sessions are in-memory and are dropped on exit.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
