// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

use std::sync::Arc;

use genesis::observer::PopulationAdapter;
use genesis::protocol::{Request, Response, StateSnapshot};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::DaemonError;
use crate::simulator::Simulator;

pub async fn handle_client(
    stream: TcpStream,
    simulator: Arc<Simulator>,
    shutdown: CancellationToken,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.cancelled() => break,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(request, &simulator, &shutdown).await,
            Err(e) => {
                warn!("Rejected request line: {}", e);
                Response::error(format!("Invalid request: {}", e))
            }
        };

        writer
            .write_all(serde_json::to_string(&response)?.as_bytes())
            .await?;
        writer.write_all(b"\n").await?;
    }

    Ok(())
}

/// Maps one request onto the simulator. Failed lookups answer with an error
/// and leave the population untouched.
pub async fn dispatch(
    request: Request,
    simulator: &Simulator,
    shutdown: &CancellationToken,
) -> Response {
    match request {
        Request::GetState => {
            let view = simulator.snapshot();
            Response::State(StateSnapshot {
                running: view.running,
                summary: PopulationAdapter::new(&view.nodes).summary(),
                nodes: view.nodes.to_vec(),
            })
        }
        Request::GetSummary => {
            let view = simulator.snapshot();
            Response::Summary(PopulationAdapter::new(&view.nodes).summary())
        }
        Request::GetNode { id } => {
            let view = simulator.snapshot();
            match view.nodes.iter().find(|n| n.id == id) {
                Some(node) => Response::Node(node.clone()),
                None => Response::error(format!("Unknown node {} (never created or pruned)", id)),
            }
        }
        Request::GetLineage { id } => {
            let view = simulator.snapshot();
            let chain = PopulationAdapter::new(&view.nodes).lineage(&id);
            if chain.is_empty() {
                Response::error(format!("Unknown node {} (never created or pruned)", id))
            } else {
                Response::Lineage {
                    nodes: chain.into_iter().cloned().collect(),
                }
            }
        }
        Request::Start => {
            let was_running = simulator.start().await;
            Response::success(if was_running { "Restarted" } else { "Started" })
        }
        Request::Stop => {
            if simulator.stop().await {
                Response::success("Stopped")
            } else {
                Response::success("Already stopped")
            }
        }
        Request::Reset => {
            simulator.reset().await;
            Response::success("Reset to a single seed node")
        }
        Request::Shutdown => {
            info!("Shutdown requested by client");
            shutdown.cancel();
            Response::success("Shutting down")
        }
    }
}
