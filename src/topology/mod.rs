//! Network topology module.
//!
//! This module contains the topology store: dense node ids, weighted
//! undirected edges kept as symmetric adjacency entries, and the per-node
//! packet counters that are renumbered together with the nodes.

pub mod types;
pub mod counters;
pub mod graph;

// Re-export key types for easier access
pub use types::{Edge, Link, NodeId, TopologyError, Weight, DEFAULT_MAX_NODES};
pub use counters::{NodeCounters, PacketCounters};
pub use graph::Topology;
