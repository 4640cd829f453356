//! Single-source shortest paths.
//!
//! Dijkstra's algorithm over the topology's non-negative integer weights.
//! The next node to settle is picked by a linear scan in id order, so among
//! equally distant candidates the lowest id always wins and results are
//! deterministic for a given topology.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::topology::{NodeId, Topology};

/// Errors that can occur during route computation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("Invalid computer index: {id} (network has {node_count} computers)")]
    InvalidNode { id: NodeId, node_count: usize },

    #[error("No path exists between {from} and {to}")]
    NoPath { from: NodeId, to: NodeId },
}

/// A path through the topology together with its total weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Node ids from source to target, inclusive
    pub nodes: Vec<NodeId>,
    /// Sum of the traversed edge weights in milliseconds
    pub total_weight: u64,
}

impl Route {
    /// First node of the route, `None` for an empty node list
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node of the route, `None` for an empty node list
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Returns true for the one-node route from a node to itself
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Distance and predecessor table produced by one Dijkstra run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: NodeId,
    distance: Vec<Option<u64>>,
    previous: Vec<Option<NodeId>>,
}

impl ShortestPaths {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Distance from the source to `node`, or `None` when unreachable
    pub fn distance(&self, node: NodeId) -> Option<u64> {
        self.distance.get(node).copied().flatten()
    }

    /// Predecessor of `node` on its shortest path from the source
    pub fn previous(&self, node: NodeId) -> Option<NodeId> {
        self.previous.get(node).copied().flatten()
    }

    /// Reconstruct the route from the source to `target`
    pub fn path_to(&self, target: NodeId) -> Result<Route, RoutingError> {
        if target >= self.distance.len() {
            return Err(RoutingError::InvalidNode {
                id: target,
                node_count: self.distance.len(),
            });
        }
        let no_path = RoutingError::NoPath {
            from: self.source,
            to: target,
        };
        if target != self.source && self.previous[target].is_none() {
            return Err(no_path);
        }
        let total_weight = self.distance[target].ok_or_else(|| no_path.clone())?;

        let mut nodes = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.previous[current].ok_or_else(|| no_path.clone())?;
            nodes.push(current);
        }
        nodes.reverse();

        Ok(Route { nodes, total_weight })
    }
}

/// Compute shortest distances from `source` to every reachable node
pub fn shortest_paths_from(topology: &Topology, source: NodeId) -> Result<ShortestPaths, RoutingError> {
    let node_count = topology.node_count();
    if source >= node_count {
        return Err(RoutingError::InvalidNode {
            id: source,
            node_count,
        });
    }

    let mut distance: Vec<Option<u64>> = vec![None; node_count];
    let mut previous: Vec<Option<NodeId>> = vec![None; node_count];
    let mut visited = vec![false; node_count];
    distance[source] = Some(0);

    loop {
        // First minimum in id order, so ties go to the lowest id
        let mut next: Option<(NodeId, u64)> = None;
        for node in 0..node_count {
            if visited[node] {
                continue;
            }
            if let Some(d) = distance[node] {
                if next.map_or(true, |(_, best)| d < best) {
                    next = Some((node, d));
                }
            }
        }
        let Some((u, du)) = next else {
            break;
        };
        visited[u] = true;

        for (v, weight) in topology.neighbors(u) {
            if visited[v] {
                continue;
            }
            let candidate = du + u64::from(weight);
            if distance[v].map_or(true, |dv| candidate < dv) {
                distance[v] = Some(candidate);
                previous[v] = Some(u);
            }
        }
    }

    debug!(
        "Dijkstra from {} reached {} of {} nodes",
        source,
        distance.iter().filter(|d| d.is_some()).count(),
        node_count
    );

    Ok(ShortestPaths {
        source,
        distance,
        previous,
    })
}

/// Compute the shortest route from `source` to `target`.
///
/// Both ids are validated before the search runs. A node routes to itself
/// over the one-node path of weight 0.
pub fn shortest_path(topology: &Topology, source: NodeId, target: NodeId) -> Result<Route, RoutingError> {
    let node_count = topology.node_count();
    for id in [source, target] {
        if id >= node_count {
            return Err(RoutingError::InvalidNode { id, node_count });
        }
    }
    shortest_paths_from(topology, source)?.path_to(target)
}
