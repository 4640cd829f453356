use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::io::{self, Write};
use std::path::PathBuf;

use netsim::config_loader::{self, CliOverrides};
use netsim::export;
use netsim::menu::{ConsoleProgress, Menu};
use netsim::network::Network;
use netsim::transfer::{CancelToken, TransferEngine, TransferStatus};

/// Simulated computer network with shortest-path routing and packet-paced file transfer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the network file and the computer files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Delay between packets in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Content bytes per packet
    #[arg(long)]
    packet_size: Option<usize>,

    /// Maximum number of computers in the network
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Interactive menu (default)
    Menu,

    /// Add a computer
    AddNode,

    /// Remove a computer; higher ids shift down by one
    RemoveNode { id: usize },

    /// Add a route between two computers
    AddRoute {
        u: usize,
        v: usize,
        /// Latency in milliseconds
        #[arg(allow_hyphen_values = true)]
        weight: i64,
    },

    /// Transfer the data file of one computer to another
    Transfer { from: usize, to: usize },

    /// Print the shortest route between two computers
    Route { from: usize, to: usize },

    /// Export the network as a GraphViz DOT file
    Export {
        /// Output path (defaults to the configured dot_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show computers, counters and routes
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = config_loader::load_or_default(args.config.as_deref())?;
    let overrides = CliOverrides {
        data_dir: args.data_dir.clone(),
        packet_delay_ms: args.delay_ms,
        packet_size: args.packet_size,
        max_nodes: args.max_nodes,
        log_level: args.log_level.clone(),
    };
    config_loader::apply_cli_overrides(&mut config, &overrides)?;

    let log_level = config.general.log_level.clone().unwrap_or_else(|| "warn".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("Data directory: {:?}", config.storage.data_dir);

    let mut network = Network::open(&config)
        .wrap_err_with(|| format!("Failed to open network in '{}'", config.storage.data_dir.display()))?;
    let mut engine = TransferEngine::new(config.simulation.packet_size, config.simulation.packet_delay);
    install_interrupt_handler(engine.cancel_token())?;

    match args.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            let mut menu = Menu::new(stdin.lock(), io::stdout());
            menu.run(&mut network, &mut engine, &config.dot_path())
                .wrap_err("Menu I/O failed")?;
        }
        Command::AddNode => {
            let id = network.add_node()?;
            println!("Computer {} added.", id);
        }
        Command::RemoveNode { id } => {
            network.remove_node(id)?;
            println!("Computer {} removed.", id);
        }
        Command::AddRoute { u, v, weight } => {
            let edge = network.add_edge(u, v, weight)?;
            println!("Route added: {} <--> {} ({}ms)", u, v, edge.weight);
        }
        Command::Transfer { from, to } => {
            let stdout = io::stdout();
            let mut progress = ConsoleProgress::new(stdout.lock());
            let report = network.transfer(&mut engine, from, to, &mut progress)?;
            drop(progress);
            match report.status {
                TransferStatus::Completed => println!("Data transfer complete."),
                TransferStatus::Cancelled => {
                    println!("Data transfer cancelled after {} packets.", report.packets)
                }
            }
        }
        Command::Route { from, to } => {
            let route = network.route(from, to)?;
            println!("Shortest path: {} ({}ms)", route, route.total_weight);
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| config.dot_path());
            export::write_dot(network.topology(), &path)
                .wrap_err_with(|| format!("Failed to export network to '{}'", path.display()))?;
            println!("Network exported to {}", path.display());
        }
        Command::Show { json } => {
            let summary = network.summary();
            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &summary)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{} computers, {} routes", summary.nodes.len(), summary.edges.len())?;
                for node in &summary.nodes {
                    writeln!(
                        out,
                        "  Computer {}: {} links, {} packets sent, {} packets received",
                        node.id, node.degree, node.sent, node.received
                    )?;
                }
                for edge in &summary.edges {
                    writeln!(out, "  {} <--> {} ({}ms)", edge.u, edge.v, edge.weight)?;
                }
            }
        }
    }

    network.save()?;
    Ok(())
}

/// Ctrl-C / SIGTERM stop a running transfer at the next packet boundary.
///
/// With no transfer running the process exits; every topology change has
/// already been saved by then.
fn install_interrupt_handler(token: CancelToken) -> Result<()> {
    ctrlc::set_handler(move || {
        if token.cancel_running() {
            warn!("Interrupt received, stopping transfer");
        } else {
            std::process::exit(130);
        }
    })
    .wrap_err("Failed to install interrupt handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_menu() {
        let args = Args::parse_from(["netsim"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from([
            "netsim",
            "--config", "netsim.yaml",
            "--data-dir", "sim",
            "--delay-ms", "0",
            "transfer", "0", "2",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("netsim.yaml")));
        assert_eq!(args.data_dir, Some(PathBuf::from("sim")));
        assert_eq!(args.delay_ms, Some(0));
        assert_eq!(args.command, Some(Command::Transfer { from: 0, to: 2 }));
    }

    #[test]
    fn test_add_route_accepts_negative_weight_for_validation() {
        let args = Args::parse_from(["netsim", "add-route", "0", "1", "-5"]);
        assert_eq!(args.command, Some(Command::AddRoute { u: 0, v: 1, weight: -5 }));
    }

    #[test]
    fn test_export_output() {
        let args = Args::parse_from(["netsim", "export", "--output", "out.dot"]);
        assert_eq!(
            args.command,
            Some(Command::Export { output: Some(PathBuf::from("out.dot")) })
        );
    }
}
