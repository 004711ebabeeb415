//! CLI client for the `genesisd` daemon.
//!
//! Examples:
//!   genesis-cli status
//!   genesis-cli start
//!   genesis-cli node gen4-node12
//!   genesis-cli lineage gen4-node12
//!   genesis-cli reset
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use genesis::node::ArchitectureNode;
use genesis::observer::PopulationSummary;
use genesis::protocol::{Request, Response, StateSnapshot, DEFAULT_ADDR};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

fn usage() -> ! {
    eprintln!("genesis-cli (talks to genesisd @ {DEFAULT_ADDR} by default)");
    eprintln!("Usage: genesis-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                      Show run flag, summary and every node");
    eprintln!("  summary                     Show population summary only");
    eprintln!("  node <id>                   Show one node in full");
    eprintln!("  lineage <id>                Show a node and its surviving ancestors");
    eprintln!("  start | stop                Arm or disarm the tick timer");
    eprintln!("  reset                       Stop and reseed the population");
    eprintln!("  shutdown                    Stop the simulation and exit the daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = DEFAULT_ADDR.to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_summary(s: &PopulationSummary) {
    println!(
        "models={} generations={} best={} ({:.2}%) mean_acc={:.2}% min_loss={:.4} latest={}",
        s.size,
        s.max_generation,
        s.best_id.as_deref().unwrap_or("-"),
        s.best_accuracy * 100.0,
        s.mean_accuracy * 100.0,
        s.min_loss,
        s.latest_id.as_deref().unwrap_or("-"),
    );
}

fn print_row(n: &ArchitectureNode) {
    println!(
        "{:<16} gen={:<4} parent={:<16} acc={:>6.2}% loss={:.4} energy={:>5.1} layers={}",
        n.id,
        n.generation,
        n.parent_id.as_deref().unwrap_or("-"),
        n.accuracy * 100.0,
        n.loss,
        n.energy_score,
        n.depth(),
    );
}

fn print_node(n: &ArchitectureNode) {
    print_row(n);
    println!("  model: {}", n.model_type);
    for (i, layer) in n.layers.iter().enumerate() {
        println!("  layer {i}: {layer:?}");
    }
    let h = &n.hyperparameters;
    println!(
        "  hyperparameters: lr={:.6} optimizer={:?} epochs={} batch={} dropout={}",
        h.learning_rate, h.optimizer, h.epochs, h.batch_size, h.dropout
    );
    println!("  created: {} ms", n.timestamp);
}

fn print_state(s: &StateSnapshot) {
    println!("running={}", s.running);
    print_summary(&s.summary);
    for n in &s.nodes {
        print_row(n);
    }
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let node_id = || -> String {
        match args.get(1) {
            Some(id) => id.clone(),
            None => usage(),
        }
    };

    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "summary" => Request::GetSummary,
        "node" => Request::GetNode { id: node_id() },
        "lineage" => Request::GetLineage { id: node_id() },
        "start" => Request::Start,
        "stop" => Request::Stop,
        "reset" => Request::Reset,
        "shutdown" => Request::Shutdown,
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::State(s)) => print_state(&s),
        Ok(Response::Summary(s)) => print_summary(&s),
        Ok(Response::Node(n)) => print_node(&n),
        Ok(Response::Lineage { nodes }) => {
            for n in &nodes {
                print_row(n);
            }
        }
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
