//! Route selection.
//!
//! Shortest-path search over the topology store, used to pick the route
//! before any transfer starts.

pub mod dijkstra;

pub use dijkstra::{shortest_path, shortest_paths_from, Route, RoutingError, ShortestPaths};
