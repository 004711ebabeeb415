//! Genesis Daemon - hosts the evolution simulator
//!
//! The daemon owns one simulator for its whole lifetime:
//! - Ticks the population every 2 s while armed
//! - Serves line-delimited JSON control requests on TCP
//! - Stops the tick timer on every exit path (Shutdown request, Ctrl-C)
//!
//! Configuration is read from `genesisd.json` in the user config directory:
//! - Linux: ~/.config/genesis/
//! - Windows: %APPDATA%\genesis\
//! - MacOS: ~/Library/Application Support/genesis/

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use genesis::observer::PopulationAdapter;
use tokio::net::TcpListener;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

mod config;
mod error;
mod paths;
mod server;
mod simulator;

use config::DaemonConfig;
use error::DaemonError;
use paths::AppPaths;
use simulator::Simulator;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    addr: Option<String>,
}

fn parse_args() -> Result<Args, DaemonError> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--config" => {
                let path = it
                    .next()
                    .ok_or_else(|| DaemonError::Usage("--config needs a path".to_string()))?;
                args.config = Some(PathBuf::from(path));
            }
            "--addr" => {
                let addr = it
                    .next()
                    .ok_or_else(|| DaemonError::Usage("--addr needs host:port".to_string()))?;
                args.addr = Some(addr);
            }
            other => {
                return Err(DaemonError::Usage(format!(
                    "unknown argument {other}; usage: genesisd [--config path] [--addr host:port]"
                )))
            }
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<DaemonConfig, DaemonError> {
    match &args.config {
        Some(path) => {
            info!("Config file: {:?}", path);
            DaemonConfig::load(path)
        }
        None => {
            let paths = AppPaths::new()?;
            info!("Config directory: {:?}", paths.config_dir());
            DaemonConfig::load_or_default(&paths.config_file())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = parse_args()?;
    let config = load_config(&args)?;
    let addr = args.addr.clone().unwrap_or_else(|| config.listen_addr.clone());
    let seed = config.seed.unwrap_or_else(genesis::time::now_millis);
    info!(seed, autostart = config.autostart, "Simulator configured");

    let simulator = Arc::new(Simulator::new(seed));
    if config.autostart {
        simulator.start().await;
    }

    // Log every published population, the way a dashboard would re-render.
    {
        let mut feed = simulator.subscribe();
        tokio::spawn(async move {
            while feed.changed().await.is_ok() {
                let view = feed.borrow_and_update().clone();
                let summary = PopulationAdapter::new(&view.nodes).summary();
                debug!(
                    running = view.running,
                    models = summary.size,
                    generations = summary.max_generation,
                    best_accuracy = summary.best_accuracy,
                    "Population published"
                );
            }
        });
    }

    let shutdown = CancellationToken::new();

    // Ctrl-C takes the same exit path as a Shutdown request.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
                shutdown.cancel();
            }
        });
    }

    let listener = TcpListener::bind(&addr).await?;
    info!("Genesis daemon listening on {}", addr);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                info!("Client connected: {}", peer);
                let simulator = Arc::clone(&simulator);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = server::handle_client(stream, simulator, shutdown).await {
                        error!("Client handler error: {}", e);
                    }
                });
            }
        }
    }

    simulator.stop().await;
    // Give in-flight responses a moment to flush before the runtime drops.
    time::sleep(Duration::from_millis(50)).await;
    info!("Genesis daemon stopped");
    Ok(())
}
