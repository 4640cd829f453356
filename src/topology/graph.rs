//! Topology store.
//!
//! Nodes are dense indices into an array of adjacency lists. Every
//! undirected edge is stored twice (u→v and v→u) with the same weight, and
//! node removal renumbers all higher ids in a single pass so ids always form
//! `[0, node_count)`.

use log::debug;

use super::counters::PacketCounters;
use super::types::{Edge, Link, NodeId, TopologyError, Weight, DEFAULT_MAX_NODES};

/// The simulated network: nodes, weighted undirected edges and packet counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    adjacency: Vec<Vec<Link>>,
    counters: PacketCounters,
    max_nodes: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    /// Create an empty topology holding at most `DEFAULT_MAX_NODES` nodes
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_NODES)
    }

    /// Create an empty topology holding at most `max_nodes` nodes
    pub fn with_capacity(max_nodes: usize) -> Self {
        Self {
            adjacency: Vec::new(),
            counters: PacketCounters::new(),
            max_nodes,
        }
    }

    /// Create a topology pre-populated with `node_count` isolated nodes.
    ///
    /// Used when restoring a snapshot, before its edges are replayed.
    pub fn with_nodes(node_count: usize, max_nodes: usize) -> Result<Self, TopologyError> {
        if node_count > max_nodes {
            return Err(TopologyError::CapacityExceeded { max_nodes });
        }
        let mut topology = Self::with_capacity(max_nodes);
        topology.adjacency.resize_with(node_count, Vec::new);
        topology.counters.resize(node_count);
        Ok(topology)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Returns true if `id` names an existing node
    pub fn contains(&self, id: NodeId) -> bool {
        id < self.node_count()
    }

    /// Fail with `InvalidNode` unless `id` names an existing node
    pub fn check_node(&self, id: NodeId) -> Result<(), TopologyError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TopologyError::InvalidNode {
                id,
                node_count: self.node_count(),
            })
        }
    }

    /// Number of undirected edges (each stored pair counts once)
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn counters(&self) -> &PacketCounters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut PacketCounters {
        &mut self.counters
    }

    /// Append a new isolated node and return its id
    pub fn add_node(&mut self) -> Result<NodeId, TopologyError> {
        if self.node_count() >= self.max_nodes {
            return Err(TopologyError::CapacityExceeded {
                max_nodes: self.max_nodes,
            });
        }
        let id = self.node_count();
        self.adjacency.push(Vec::new());
        self.counters.push_node();
        debug!("Added node {}", id);
        Ok(id)
    }

    /// Remove node `id` and renumber every higher id down by one.
    ///
    /// Drops all edges incident to `id`, rewrites the destinations of the
    /// remaining adjacency entries and shifts the counters. Nothing is touched
    /// if `id` is out of range. Returns the removed edges, in their original
    /// numbering.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<Edge>, TopologyError> {
        self.check_node(id)?;

        let removed: Vec<Edge> = self
            .neighbors(id)
            .map(|(other, weight)| Edge {
                u: id.min(other),
                v: id.max(other),
                weight,
            })
            .collect();

        self.adjacency.remove(id);
        for links in &mut self.adjacency {
            links.retain(|link| link.destination != id);
            for link in links.iter_mut() {
                if link.destination > id {
                    link.destination -= 1;
                }
            }
        }
        self.counters.remove_node(id);

        debug!(
            "Removed node {} with {} incident edges; {} nodes remain",
            id,
            removed.len(),
            self.node_count()
        );
        Ok(removed)
    }

    /// Add an undirected edge between `u` and `v`.
    ///
    /// Parallel edges are kept as separate entries.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: i64) -> Result<Edge, TopologyError> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(TopologyError::SelfLoop { id: u });
        }
        let weight = Weight::try_from(weight)
            .ok()
            .filter(|w| *w > 0)
            .ok_or(TopologyError::InvalidWeight { weight })?;

        self.adjacency[u].push(Link { destination: v, weight });
        self.adjacency[v].push(Link { destination: u, weight });
        debug!("Added edge {} <--> {} ({}ms)", u, v, weight);
        Ok(Edge {
            u: u.min(v),
            v: u.max(v),
            weight,
        })
    }

    /// Enumerate `(destination, weight)` for every adjacency entry of `u`,
    /// most recently added first.
    ///
    /// An unknown node has no neighbours.
    pub fn neighbors(&self, u: NodeId) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        self.adjacency
            .get(u)
            .into_iter()
            .flat_map(|links| links.iter().rev())
            .map(|link| (link.destination, link.weight))
    }

    /// Number of adjacency entries of `u`
    pub fn degree(&self, u: NodeId) -> usize {
        self.adjacency.get(u).map_or(0, Vec::len)
    }

    /// Enumerate every undirected edge exactly once, with `u < v`
    pub fn all_edges_once(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.node_count()).flat_map(move |u| {
            self.neighbors(u)
                .filter(move |(v, _)| u < *v)
                .map(move |(v, weight)| Edge { u, v, weight })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology_with(nodes: usize, edges: &[(NodeId, NodeId, i64)]) -> Topology {
        let mut topology = Topology::new();
        for _ in 0..nodes {
            topology.add_node().unwrap();
        }
        for &(u, v, w) in edges {
            topology.add_edge(u, v, w).unwrap();
        }
        topology
    }

    fn assert_symmetric(topology: &Topology) {
        for u in 0..topology.node_count() {
            for (v, w) in topology.neighbors(u) {
                assert!(topology.contains(v), "dangling entry {} -> {}", u, v);
                let forward = topology.neighbors(u).filter(|&(d, x)| d == v && x == w).count();
                let backward = topology.neighbors(v).filter(|&(d, x)| d == u && x == w).count();
                assert_eq!(forward, backward, "asymmetric edge {} <-> {} ({})", u, v, w);
            }
        }
        assert_eq!(topology.counters().len(), topology.node_count());
    }

    fn edge_set(topology: &Topology) -> Vec<(NodeId, NodeId, Weight)> {
        let mut edges: Vec<_> = topology.all_edges_once().map(|e| (e.u, e.v, e.weight)).collect();
        edges.sort();
        edges
    }

    #[test]
    fn test_add_node_assigns_dense_ids() {
        let mut topology = Topology::new();
        assert_eq!(topology.add_node().unwrap(), 0);
        assert_eq!(topology.add_node().unwrap(), 1);
        assert_eq!(topology.add_node().unwrap(), 2);
        assert_eq!(topology.node_count(), 3);
        assert_eq!(topology.counters().len(), 3);
    }

    #[test]
    fn test_add_node_capacity() {
        let mut topology = Topology::with_capacity(2);
        topology.add_node().unwrap();
        topology.add_node().unwrap();
        assert_eq!(
            topology.add_node(),
            Err(TopologyError::CapacityExceeded { max_nodes: 2 })
        );
        assert_eq!(topology.node_count(), 2);
    }

    #[test]
    fn test_with_nodes() {
        let topology = Topology::with_nodes(4, 10).unwrap();
        assert_eq!(topology.node_count(), 4);
        assert_eq!(topology.edge_count(), 0);
        assert!(Topology::with_nodes(11, 10).is_err());
    }

    #[test]
    fn test_add_edge_is_symmetric() {
        let topology = topology_with(3, &[(0, 1, 4), (1, 2, 1)]);
        assert_eq!(topology.neighbors(0).collect::<Vec<_>>(), vec![(1, 4)]);
        assert_eq!(topology.neighbors(1).collect::<Vec<_>>(), vec![(2, 1), (0, 4)]);
        assert_eq!(topology.neighbors(2).collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(topology.edge_count(), 2);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_add_edge_validation() {
        let mut topology = topology_with(2, &[]);
        assert_eq!(
            topology.add_edge(0, 2, 5),
            Err(TopologyError::InvalidNode { id: 2, node_count: 2 })
        );
        assert_eq!(topology.add_edge(1, 1, 5), Err(TopologyError::SelfLoop { id: 1 }));
        assert_eq!(topology.add_edge(0, 1, 0), Err(TopologyError::InvalidWeight { weight: 0 }));
        assert_eq!(topology.add_edge(0, 1, -3), Err(TopologyError::InvalidWeight { weight: -3 }));
        assert!(topology.add_edge(0, 1, i64::from(u32::MAX) + 1).is_err());
        assert_eq!(topology.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let topology = topology_with(2, &[(0, 1, 3), (1, 0, 7)]);
        assert_eq!(topology.edge_count(), 2);
        assert_eq!(edge_set(&topology), vec![(0, 1, 3), (0, 1, 7)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_neighbors_unknown_node_is_empty() {
        let topology = topology_with(1, &[]);
        assert_eq!(topology.neighbors(5).count(), 0);
        assert_eq!(topology.degree(5), 0);
    }

    #[test]
    fn test_neighbors_is_restartable() {
        let topology = topology_with(3, &[(0, 1, 2), (0, 2, 3)]);
        let first: Vec<_> = topology.neighbors(0).collect();
        let second: Vec<_> = topology.neighbors(0).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_edges_once_orders_endpoints() {
        let topology = topology_with(4, &[(3, 0, 2), (2, 1, 5), (1, 3, 9)]);
        for edge in topology.all_edges_once() {
            assert!(edge.u < edge.v);
        }
        assert_eq!(edge_set(&topology), vec![(0, 3, 2), (1, 2, 5), (1, 3, 9)]);
    }

    #[test]
    fn test_remove_invalid_node_changes_nothing() {
        let mut topology = topology_with(3, &[(0, 1, 1), (1, 2, 2)]);
        let before = topology.clone();
        assert_eq!(
            topology.remove_node(3),
            Err(TopologyError::InvalidNode { id: 3, node_count: 3 })
        );
        assert_eq!(topology, before);
    }

    #[test]
    fn test_remove_from_empty_topology() {
        let mut topology = Topology::new();
        assert!(topology.remove_node(0).is_err());
    }

    #[test]
    fn test_remove_first_node() {
        let mut topology = topology_with(4, &[(0, 1, 1), (1, 2, 2), (2, 3, 3), (0, 3, 4)]);
        let removed = topology.remove_node(0).unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(topology.node_count(), 3);
        assert_eq!(edge_set(&topology), vec![(0, 1, 2), (1, 2, 3)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_last_node() {
        let mut topology = topology_with(4, &[(0, 1, 1), (1, 2, 2), (2, 3, 3), (0, 3, 4)]);
        topology.remove_node(3).unwrap();

        assert_eq!(topology.node_count(), 3);
        assert_eq!(edge_set(&topology), vec![(0, 1, 1), (1, 2, 2)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_middle_node() {
        let mut topology = topology_with(5, &[(0, 1, 1), (1, 2, 2), (2, 3, 3), (3, 4, 4), (0, 4, 5)]);
        let removed = topology.remove_node(2).unwrap();

        let mut removed: Vec<_> = removed.iter().map(|e| (e.u, e.v, e.weight)).collect();
        removed.sort();
        assert_eq!(removed, vec![(1, 2, 2), (2, 3, 3)]);
        assert_eq!(edge_set(&topology), vec![(0, 1, 1), (0, 3, 5), (2, 3, 4)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_node_with_parallel_edges() {
        let mut topology = topology_with(3, &[(0, 1, 3), (1, 0, 7), (1, 0, 3), (1, 2, 2), (0, 2, 9)]);
        let removed = topology.remove_node(1).unwrap();

        let mut removed: Vec<_> = removed.iter().map(|e| (e.u, e.v, e.weight)).collect();
        removed.sort();
        assert_eq!(removed, vec![(0, 1, 3), (0, 1, 3), (0, 1, 7), (1, 2, 2)]);
        assert_eq!(edge_set(&topology), vec![(0, 1, 9)]);
        assert_eq!(topology.degree(0), 1);
        assert_eq!(topology.degree(1), 1);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_isolated_node() {
        let mut topology = topology_with(4, &[(0, 3, 7), (2, 3, 1)]);
        let removed = topology.remove_node(1).unwrap();

        assert!(removed.is_empty());
        assert_eq!(edge_set(&topology), vec![(0, 2, 7), (1, 2, 1)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut topology = topology_with(4, &[(3, 0, 1), (3, 2, 2), (3, 1, 3)]);
        topology.remove_node(1).unwrap();

        // node 3 became 2; its remaining entries keep newest-first order
        assert_eq!(topology.neighbors(2).collect::<Vec<_>>(), vec![(1, 2), (0, 1)]);
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_shifts_counters() {
        let mut topology = topology_with(3, &[]);
        topology.counters_mut().record_packet(0, 1);
        topology.counters_mut().record_packet(2, 2);

        topology.remove_node(1).unwrap();

        assert_eq!(topology.counters().sent(0), 1);
        assert_eq!(topology.counters().received(0), 0);
        assert_eq!(topology.counters().sent(1), 1);
        assert_eq!(topology.counters().received(1), 1);
    }

    #[test]
    fn test_ids_stay_contiguous_after_mixed_operations() {
        let mut topology = topology_with(6, &[(0, 5, 1), (1, 4, 2), (2, 3, 3), (0, 2, 4)]);
        topology.remove_node(4).unwrap();
        topology.add_node().unwrap();
        topology.remove_node(0).unwrap();
        topology.remove_node(topology.node_count() - 1).unwrap();
        let id = topology.add_node().unwrap();

        assert_eq!(id, topology.node_count() - 1);
        for edge in topology.all_edges_once() {
            assert!(topology.contains(edge.u) && topology.contains(edge.v));
        }
        assert_symmetric(&topology);
    }

    #[test]
    fn test_remove_every_position_exhaustively() {
        let edges = [(0, 1, 1), (0, 2, 2), (1, 2, 3), (2, 3, 4), (3, 4, 5), (1, 4, 6)];
        for removed in 0..5 {
            let mut topology = topology_with(5, &edges);
            topology.remove_node(removed).unwrap();

            let shift = |n: NodeId| if n > removed { n - 1 } else { n };
            let mut expected: Vec<_> = edges
                .iter()
                .filter(|&&(u, v, _)| u != removed && v != removed)
                .map(|&(u, v, w)| (shift(u), shift(v), w as Weight))
                .collect();
            expected.sort();

            assert_eq!(topology.node_count(), 4);
            assert_eq!(edge_set(&topology), expected, "removing node {}", removed);
            assert_symmetric(&topology);
        }
    }
}
