//! Network snapshot persistence.
//!
//! The snapshot is a plain-text file: the node count on the first line,
//! then one `u v weight` line per undirected edge (`u < v`). Packet counters
//! are not part of the snapshot.
//!
//! ```text
//! 3
//! 0 1 4
//! 0 2 10
//! 1 2 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::topology::{Topology, TopologyError};

/// Errors that can occur while loading or saving a snapshot
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on network file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed network file at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Invalid network file at line {line}: {source}")]
    Topology {
        line: usize,
        #[source]
        source: TopologyError,
    },
}

/// Render `topology` in snapshot format
pub fn render_snapshot(topology: &Topology) -> String {
    let mut out = format!("{}\n", topology.node_count());
    for edge in topology.all_edges_once() {
        out.push_str(&format!("{} {} {}\n", edge.u, edge.v, edge.weight));
    }
    out
}

/// Rebuild a topology from snapshot text
pub fn parse_snapshot(content: &str, max_nodes: usize) -> Result<Topology, PersistenceError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((count_line, count)) = lines.next() else {
        return Ok(Topology::with_capacity(max_nodes));
    };
    let node_count: usize = count.parse().map_err(|_| PersistenceError::Malformed {
        line: count_line,
        message: format!("expected node count, found '{}'", count),
    })?;
    let mut topology = Topology::with_nodes(node_count, max_nodes)
        .map_err(|source| PersistenceError::Topology { line: count_line, source })?;

    for (line, text) in lines {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [u, v, w] = fields.as_slice() else {
            return Err(PersistenceError::Malformed {
                line,
                message: format!("expected 'u v weight', found '{}'", text),
            });
        };
        let malformed = |what: &str| PersistenceError::Malformed {
            line,
            message: format!("invalid {} in '{}'", what, text),
        };
        let u: usize = u.parse().map_err(|_| malformed("source"))?;
        let v: usize = v.parse().map_err(|_| malformed("target"))?;
        let w: i64 = w.parse().map_err(|_| malformed("weight"))?;
        topology
            .add_edge(u, v, w)
            .map_err(|source| PersistenceError::Topology { line, source })?;
    }

    Ok(topology)
}

/// Write `topology` to `path`
pub fn save(topology: &Topology, path: &Path) -> Result<(), PersistenceError> {
    fs::write(path, render_snapshot(topology)).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Saved network ({} computers, {} routes) to {:?}",
        topology.node_count(),
        topology.edge_count(),
        path
    );
    Ok(())
}

/// Load a topology from `path`; a missing file yields an empty network
pub fn load(path: &Path, max_nodes: usize) -> Result<Topology, PersistenceError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No network file at {:?}, starting with an empty network", path);
            return Ok(Topology::with_capacity(max_nodes));
        }
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let topology = parse_snapshot(&content, max_nodes)?;
    info!(
        "Loaded network from {:?}: {} computers, {} routes",
        path,
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}
