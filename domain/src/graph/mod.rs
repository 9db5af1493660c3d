//! Resource relationship graph
//!
//! A [`ResourceGraph`] is built from the payload of a graph-producing tool by
//! [`parse_graph`]. The graph may be partial: edges can reference ids that
//! are not in the node set, and malformed entries are dropped with a warning.

pub mod entities;
pub mod parser;
pub mod query;

pub use entities::{Adjacent, Direction, GraphEdge, GraphNode, ResourceGraph, kind, node_id, relation};
pub use parser::parse_graph;
