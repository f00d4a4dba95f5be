/// Development HTTP harness around a single entrypoint.
///
/// Run with:
///   cargo run --bin serve -- --config service.json
///
/// Routes:
///   POST /process     payload JSON in, result JSON out (422 on failure)
///   POST /parameters  runtime parameters for the entrypoint
///   GET  /health      entrypoint name and request counters

mod handlers;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tiny_http::Server;
use tracing::info;

use edge_inference::config::ConfigOverrides;
use edge_inference::logging::init_logging;
use edge_inference::{load_entrypoint, EntrypointKind, ServiceConfig};

use state::ServeState;

#[derive(Parser)]
#[command(name = "serve", version, about = "Serve one entrypoint over HTTP")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    entrypoint: Option<EntrypointKind>,

    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Address to bind, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    listen: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

fn resolve_config(args: Args) -> Result<ServiceConfig> {
    let overrides = ConfigOverrides {
        entrypoint: args.entrypoint,
        model_path: args.model,
        listen_addr: args.listen,
        log_level: args.log_level,
    };
    ServiceConfig::resolve(args.config.as_deref(), overrides).context("cannot resolve service config")
}

fn main() -> Result<()> {
    let config = resolve_config(Args::parse())?;
    init_logging(&config.log_level);

    let mut entrypoint = load_entrypoint(config.entrypoint, config.model_path.as_deref())
        .with_context(|| format!("cannot build entrypoint '{}'", config.entrypoint))?;
    if let Some(params) = &config.parameters {
        entrypoint.update_parameters(params).context("invalid initial parameters")?;
    }

    let server = Server::http(&config.listen_addr)
        .map_err(|e| anyhow!("failed to bind {}: {}", config.listen_addr, e))?;
    info!(addr = %config.listen_addr, entrypoint = %config.entrypoint, "serving");

    let shared_state = Arc::new(Mutex::new(ServeState::new(entrypoint)));

    // One thread per request; the entrypoint itself is serialized by the lock.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
