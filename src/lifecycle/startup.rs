//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, then apply CLI overrides
//! - Initialize logging and metrics
//! - Build the route table and bind the listener
//!
//! # Design Decisions
//! - Fail fast: any configuration or controller load error is fatal
//! - The listener binds last, so traffic only arrives once routes exist

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use crate::config::loader::{active_env, load_config, parse_config, DEFAULT_CONFIG_FILE, DEFAULT_ENV};
use crate::config::{ConfigError, Settings};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::mock::MockStore;
use crate::observability::{logging, metrics};
use crate::routing::{ControllerLoadError, ControllerRegistry};

/// Port used when neither the settings nor `PORT` name one.
pub const DEFAULT_PORT: u16 = 3000;

/// Command-line arguments shared by every application binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(about = "Serve a convention-routed application", long_about = None)]
pub struct LaunchArgs {
    /// Settings file (defaults to `app-settings.toml`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Settings environment (defaults to `APP_ENV`, then `default`)
    #[arg(short, long)]
    pub env: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Controller root directory
    #[arg(long)]
    pub routes_dir: Option<String>,

    /// Print the route table and exit
    #[arg(long)]
    pub print_routes: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Controllers(#[from] ControllerLoadError),

    #[error("Cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Configured port, else `PORT`, else [`DEFAULT_PORT`].
pub fn resolve_port(configured: u16, env_port: Option<&str>) -> u16 {
    if configured != 0 {
        return configured;
    }
    env_port
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT)
}

/// Read settings for `args`, falling back to defaults when the default
/// settings file is absent.
pub fn load_settings(args: &LaunchArgs) -> Result<Settings, StartupError> {
    let env = active_env(args.env.as_deref());
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut settings = if args.config.is_none() && !path.exists() {
        parse_config(&format!("[{DEFAULT_ENV}]"), &env)?
    } else {
        load_config(&path, &env)?
    };

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(routes_dir) = &args.routes_dir {
        settings.routes_dir = routes_dir.clone();
    }
    settings.port = resolve_port(settings.port, std::env::var("PORT").ok().as_deref());

    Ok(settings)
}

/// Start an application: load settings, build routes, serve until Ctrl+C.
pub async fn launch(args: LaunchArgs, registry: ControllerRegistry) -> Result<(), StartupError> {
    let settings = load_settings(&args)?;
    logging::init(&settings.logging);

    tracing::info!(
        env = %active_env(args.env.as_deref()),
        host = %settings.host,
        port = settings.port,
        routes_dir = %settings.routes_dir,
        "Configuration loaded"
    );

    let settings = Arc::new(settings);
    let server = HttpServer::new(settings.clone(), &registry, Arc::new(MockStore::new()))?;

    if args.print_routes {
        for entry in server.routes() {
            println!("{entry}");
        }
        return Ok(());
    }

    if settings.metrics.enabled {
        match settings.metrics.address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(err) = metrics::init_metrics(addr) {
                    tracing::error!(error = %err, "Failed to start metrics exporter");
                }
            }
            Err(err) => tracing::error!(
                metrics_address = %settings.metrics.address,
                error = %err,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
