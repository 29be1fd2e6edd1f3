//! IDP configuration manager HTTP server.
//!
//! Serves the configuration API, optionally restoring the store from a JSON
//! snapshot at startup and writing it back on shutdown.

use std::path::PathBuf;

use clap::Parser;
use idp_config_api::AppState;
use idp_config_api::config::ApiConfig;
use idp_config_core::config::snapshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// CLI arguments. Anything not given here is read by `ApiConfig::from_env`.
#[derive(Parser, Debug)]
#[command(name = "idp_config_server", about = "IDP configuration manager server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3200")]
    bind_addr: String,

    /// Directory of extra YAML templates.
    #[arg(long, env = "TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    /// JSON snapshot restored at startup and written on shutdown.
    #[arg(long, env = "STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Identity recorded for requests without an `X-Author` header.
    #[arg(long, env = "DEFAULT_AUTHOR", default_value = "api")]
    default_author: String,

    /// Upper bound on waiting for store locks, in milliseconds (0 = none).
    #[arg(long, env = "LOCK_TIMEOUT_MS", default_value_t = 5000)]
    lock_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,idp_config_api=debug,idp_config_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        templates_dir: args.templates_dir,
        state_file: args.state_file,
        default_author: args.default_author,
        lock_timeout_ms: args.lock_timeout_ms,
        ..ApiConfig::from_env()
    };
    info!(
        bind_addr = %config.bind_addr,
        max_replicas = config.policy.max_replicas,
        production = ?config.policy.production_environments,
        "starting idp_config_server"
    );

    let state = AppState::from_config(config.clone())?;
    if let Some(path) = &config.state_file {
        let restored = snapshot::load_from_file(&state.store, path)?;
        info!(path = %path.display(), records = restored, "state loaded");
    }

    let signal = shutdown_signal()?;
    let app = idp_config_api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signal.await;
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    if let Some(path) = &config.state_file {
        snapshot::save_to_file(&state.store, path).await?;
    }

    serve_result?;
    Ok(())
}

/// Installs the termination handlers and returns a future that resolves on
/// Ctrl-C or, on Unix, SIGTERM.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {}
            () = terminate => {}
        }
    })
}
