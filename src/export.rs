//! Graphviz export of the network topology.

use std::fs;
use std::path::Path;

use log::info;

use crate::topology::Topology;

/// Generate an undirected GraphViz DOT graph, one line per route
pub fn to_dot(topology: &Topology) -> String {
    let mut dot = String::new();
    dot.push_str("graph Network {\n");
    for edge in topology.all_edges_once() {
        dot.push_str(&format!(
            "    {} -- {} [label=\"{}ms\"];\n",
            edge.u, edge.v, edge.weight
        ));
    }
    dot.push_str("}\n");
    dot
}

/// Write the DOT rendering of `topology` to `path`
pub fn write_dot(topology: &Topology, path: &Path) -> std::io::Result<()> {
    fs::write(path, to_dot(topology))?;
    info!("Network exported to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_network() {
        assert_eq!(to_dot(&Topology::new()), "graph Network {\n}\n");
    }

    #[test]
    fn test_edges_are_labelled_with_latency() {
        let mut topology = Topology::new();
        for _ in 0..3 {
            topology.add_node().unwrap();
        }
        topology.add_edge(1, 0, 4).unwrap();
        topology.add_edge(1, 2, 12).unwrap();

        assert_eq!(
            to_dot(&topology),
            "graph Network {\n    0 -- 1 [label=\"4ms\"];\n    1 -- 2 [label=\"12ms\"];\n}\n"
        );
    }

    #[test]
    fn test_write_dot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network.dot");
        let mut topology = Topology::new();
        topology.add_node().unwrap();

        write_dot(&topology, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "graph Network {\n}\n");
    }
}
