//! # NetSim - Simulated computer network with packet-paced file transfer
//!
//! This library models a small, dynamic network of computers connected by
//! weighted links, computes shortest routes between them, and simulates
//! moving a computer's data file across the network one packet at a time
//! while keeping per-computer send/receive counters.
//!
//! ## Overview
//!
//! Nothing leaves the machine: a "transfer" appends the source computer's
//! content to the destination computer's content, paced by a fixed delay
//! per packet and preceded by a Dijkstra route lookup. The simulation is
//! deterministic and runs one transfer at a time.
//!
//! ## Architecture
//!
//! - `topology`: dense node ids, symmetric weighted adjacency, counters
//! - `routing`: Dijkstra shortest paths with lowest-id tie break
//! - `content`: per-computer content stores and packet framing
//! - `transfer`: the packet transfer engine, pacing and cancellation
//! - `network`: facade keeping topology, content and snapshot in sync
//! - `persistence`: plain-text network snapshot
//! - `export`: GraphViz DOT rendering
//! - `config` / `config_loader`: YAML configuration and CLI overrides
//! - `menu`: the interactive menu driver
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Duration;
//! use netsim::content::MemoryContentStore;
//! use netsim::network::Network;
//! use netsim::topology::Topology;
//! use netsim::transfer::{NoDelay, SilentProgress, TransferEngine};
//!
//! let mut network = Network::new(Topology::new(), MemoryContentStore::new());
//! for _ in 0..3 {
//!     network.add_node()?;
//! }
//! network.add_edge(0, 1, 4)?;
//! network.add_edge(1, 2, 1)?;
//! network.add_edge(0, 2, 10)?;
//!
//! let mut engine = TransferEngine::with_pacer(9, Duration::ZERO, NoDelay);
//! let report = network.transfer(&mut engine, 0, 2, &mut SilentProgress)?;
//!
//! assert_eq!(report.route.to_string(), "0 -> 1 -> 2");
//! assert_eq!(report.route.total_weight, 5);
//! assert_eq!(network.topology().counters().received(2), report.packets);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   log_level: info
//! simulation:
//!   max_nodes: 100
//!   packet_size: 9
//!   packet_delay: 100ms
//! storage:
//!   data_dir: .
//!   network_file: network.txt
//!   dot_file: network.dot
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed `thiserror` errors; the `netsim` binary
//! reports them through `color_eyre`.

pub mod config;
pub mod config_loader;

pub mod topology;
pub mod routing;
pub mod content;
pub mod transfer;

pub mod network;
pub mod persistence;
pub mod export;
pub mod menu;
