//! drugscope-kg: interaction network graph built from aggregated interaction records.

pub mod graph;

pub use graph::{
    build_interaction_graph, GraphBuilder, GraphEdge, GraphNode, InteractionGraph, NodeRole,
};
