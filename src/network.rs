//! Network facade.
//!
//! This module couples the topology store with a content store so that
//! adding and removing computers keeps the per-node content in step with
//! node renumbering, and saves the network snapshot after every successful
//! topology change.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::content::{ContentError, ContentStore, FileContentStore};
use crate::persistence::{self, PersistenceError};
use crate::routing::{self, Route, RoutingError};
use crate::topology::{Edge, NodeId, Topology, TopologyError};
use crate::transfer::{Pacer, TransferEngine, TransferError, TransferProgress, TransferReport};

/// Errors surfaced by network operations
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Failed to open data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-node line of a network summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub degree: usize,
    pub sent: u64,
    pub received: u64,
}

/// Snapshot of the whole network for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<Edge>,
}

/// A topology together with the content of its computers
pub struct Network<S = FileContentStore> {
    topology: Topology,
    store: S,
    snapshot_path: Option<PathBuf>,
}

impl Network<FileContentStore> {
    /// Open the file-backed network described by `config`.
    ///
    /// Loads the snapshot if it exists and saves back to it after every
    /// topology change.
    pub fn open(config: &Config) -> Result<Self, NetworkError> {
        let data_dir = &config.storage.data_dir;
        let store = FileContentStore::new(data_dir).map_err(|source| NetworkError::DataDir {
            path: data_dir.clone(),
            source,
        })?;
        let snapshot_path = config.network_path();
        let topology = persistence::load(&snapshot_path, config.simulation.max_nodes)?;
        Ok(Self::new(topology, store).with_snapshot(snapshot_path))
    }
}

impl<S: ContentStore> Network<S> {
    pub fn new(topology: Topology, store: S) -> Self {
        Self {
            topology,
            store,
            snapshot_path: None,
        }
    }

    /// Save the snapshot to `path` after every topology change
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn into_parts(self) -> (Topology, S) {
        (self.topology, self.store)
    }

    /// Write the snapshot now, if one is configured
    pub fn save(&self) -> Result<(), NetworkError> {
        if let Some(path) = &self.snapshot_path {
            persistence::save(&self.topology, path)?;
        }
        Ok(())
    }

    /// Add a computer and seed its content
    pub fn add_node(&mut self) -> Result<NodeId, NetworkError> {
        let id = self.topology.add_node()?;
        if let Err(e) = self.store.create(id) {
            warn!("Could not create content for computer {}: {}", id, e);
            self.topology.remove_node(id)?;
            return Err(e.into());
        }
        info!("Computer {} added", id);
        self.save()?;
        Ok(id)
    }

    /// Remove a computer, its routes and its content.
    ///
    /// Every higher id shifts down by one, in the topology, the counters and
    /// the content store alike. An invalid id changes nothing.
    ///
    /// The store is shifted first: the removed node's content is parked
    /// under the first unused id, the higher ids move down, and only then is
    /// the topology changed. If the store fails midway the completed moves
    /// are undone and the topology is left as it was.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<Edge>, NetworkError> {
        self.topology.check_node(id)?;
        let old_count = self.topology.node_count();
        let parked = old_count;

        self.store.renumber(id, parked)?;
        for old in id + 1..old_count {
            if let Err(e) = self.store.renumber(old, old - 1) {
                warn!("Could not renumber content of computer {}: {}", old, e);
                self.restore_store(id, old, parked);
                return Err(e.into());
            }
        }

        let removed = self.topology.remove_node(id)?;
        if let Err(e) = self.store.remove(parked) {
            // The slot is overwritten by the next added computer
            warn!("Could not delete content of removed computer {}: {}", id, e);
        }

        info!("Computer {} removed along with {} routes", id, removed.len());
        self.save()?;
        Ok(removed)
    }

    /// Undo the moves of an interrupted removal of `id`, where every id
    /// below `failed` has already been shifted down
    fn restore_store(&mut self, id: NodeId, failed: NodeId, parked: NodeId) {
        for old in (id + 1..failed).rev() {
            if let Err(e) = self.store.renumber(old - 1, old) {
                warn!("Could not restore content of computer {}: {}", old, e);
            }
        }
        if let Err(e) = self.store.renumber(parked, id) {
            warn!("Could not restore content of computer {}: {}", id, e);
        }
    }

    /// Add a route between two computers
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: i64) -> Result<Edge, NetworkError> {
        let edge = self.topology.add_edge(u, v, weight)?;
        info!("Route added: {} <--> {} ({}ms)", edge.u, edge.v, edge.weight);
        self.save()?;
        Ok(edge)
    }

    /// Shortest route between two computers
    pub fn route(&self, from: NodeId, to: NodeId) -> Result<Route, RoutingError> {
        routing::shortest_path(&self.topology, from, to)
    }

    /// Transfer the content of `from` to `to` using `engine`
    pub fn transfer<P: Pacer>(
        &mut self,
        engine: &mut TransferEngine<P>,
        from: NodeId,
        to: NodeId,
        progress: &mut dyn TransferProgress,
    ) -> Result<TransferReport, NetworkError> {
        let report = engine.transfer(&mut self.topology, &mut self.store, from, to, progress)?;
        Ok(report)
    }

    /// Per-node degree and counters plus every route
    pub fn summary(&self) -> NetworkSummary {
        let nodes = self
            .topology
            .counters()
            .iter()
            .map(|(id, counters)| NodeSummary {
                id,
                degree: self.topology.degree(id),
                sent: counters.sent,
                received: counters.received,
            })
            .collect();
        NetworkSummary {
            nodes,
            edges: self.topology.all_edges_once().collect(),
        }
    }
}
