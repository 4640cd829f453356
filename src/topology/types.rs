//! Topology type definitions.
//!
//! This file contains the value types shared by the topology store, the
//! path finder and the persistence/export collaborators, plus the error
//! type returned by topology mutations.

use serde::{Deserialize, Serialize};

/// Dense node identifier in `[0, node_count)`.
pub type NodeId = usize;

/// Link weight in milliseconds of simulated latency
pub type Weight = u32;

/// Default maximum number of nodes a topology accepts
pub const DEFAULT_MAX_NODES: usize = 100;

/// One directed adjacency entry: the far end of an edge and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub destination: NodeId,
    pub weight: Weight,
}

/// An undirected edge as enumerated by `Topology::all_edges_once`.
///
/// Always reported with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub weight: Weight,
}

impl Edge {
    /// Returns true if either endpoint is `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.u == node || self.v == node
    }
}

/// Errors that can occur while mutating a topology
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid computer index: {id} (network has {node_count} computers)")]
    InvalidNode { id: NodeId, node_count: usize },

    #[error("Cannot link computer {id} to itself")]
    SelfLoop { id: NodeId },

    #[error("Invalid route weight: {weight} (must be a positive number of milliseconds)")]
    InvalidWeight { weight: i64 },

    #[error("Network is full ({max_nodes} computers)")]
    CapacityExceeded { max_nodes: usize },
}
