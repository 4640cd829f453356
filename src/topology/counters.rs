//! Per-node packet counters.
//!
//! `sent[node]` and `received[node]` are bumped once per packet by the
//! transfer engine. The topology store appends a zeroed slot for every new
//! node and shifts the slots down when a node is removed.

use serde::Serialize;

use super::types::NodeId;

/// Sent/received tallies for a single node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounters {
    pub sent: u64,
    pub received: u64,
}

/// Packet tallies for every node, indexed by dense node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketCounters {
    sent: Vec<u64>,
    received: Vec<u64>,
}

impl PacketCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes tracked
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    /// Packets sent by `node`, or 0 for an unknown node
    pub fn sent(&self, node: NodeId) -> u64 {
        self.sent.get(node).copied().unwrap_or(0)
    }

    /// Packets received by `node`, or 0 for an unknown node
    pub fn received(&self, node: NodeId) -> u64 {
        self.received.get(node).copied().unwrap_or(0)
    }

    /// Both tallies for `node`
    pub fn get(&self, node: NodeId) -> NodeCounters {
        NodeCounters {
            sent: self.sent(node),
            received: self.received(node),
        }
    }

    /// Iterate `(node, counters)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeCounters)> + '_ {
        (0..self.len()).map(move |node| (node, self.get(node)))
    }

    /// Record one packet moving from `from` to `to`.
    ///
    /// Both ids must already be tracked; the topology guarantees this because
    /// routing validates ids before any packet is counted.
    pub(crate) fn record_packet(&mut self, from: NodeId, to: NodeId) {
        self.sent[from] += 1;
        self.received[to] += 1;
    }

    pub(crate) fn push_node(&mut self) {
        self.sent.push(0);
        self.received.push(0);
    }

    /// Drop the slot of `node`, shifting every higher slot down by one
    pub(crate) fn remove_node(&mut self, node: NodeId) {
        self.sent.remove(node);
        self.received.remove(node);
    }

    pub(crate) fn resize(&mut self, node_count: usize) {
        self.sent.resize(node_count, 0);
        self.received.resize(node_count, 0);
    }
}
