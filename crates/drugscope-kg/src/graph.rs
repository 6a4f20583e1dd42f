//! Interaction graph construction.
//!
//! Turns an ordered interaction set into nodes and edges ready for a
//! network view. Node identity is the normalized drug name, so "Aspirin" and
//! "ASPIRIN " collapse into one node. The queried drug is the root; every
//! other node is colored by the first mechanism it was seen under.
//!
//! Building is pure: no backend access, no randomness, and the same input
//! always yields the same node and edge sets.

use std::collections::{BTreeSet, HashSet};

use drugscope_common::{normalize_name, InteractionRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The drug the interactions were queried for.
    Root,
    Partner,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    /// Normalized name.
    pub id: String,
    /// Name as first encountered.
    pub label: String,
    /// Mechanism of action this node is colored by. `None` for the root.
    pub group: Option<String>,
    pub role: NodeRole,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Mechanism of action shared by both ends.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionGraph {
    /// Id of the root node, when there is one.
    pub root: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Distinct mechanisms in first-seen order; a renderer cycles its palette over these.
    pub groups: Vec<String>,
}

impl InteractionGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Palette slot for a group, cycling over `palette_len` colors.
    pub fn palette_index(&self, group: &str, palette_len: usize) -> Option<usize> {
        if palette_len == 0 {
            return None;
        }
        self.groups.iter().position(|g| g == group).map(|i| i % palette_len)
    }

    pub fn node_set(&self) -> BTreeSet<&GraphNode> {
        self.nodes.iter().collect()
    }

    pub fn edge_set(&self) -> BTreeSet<&GraphEdge> {
        self.edges.iter().collect()
    }

    /// Order-insensitive equality of node and edge sets.
    pub fn same_shape(&self, other: &InteractionGraph) -> bool {
        self.root == other.root
            && self.node_set() == other.node_set()
            && self.edge_set() == other.edge_set()
    }
}

/// Builds an [`InteractionGraph`], optionally around an explicit root.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    root: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `name` as the root even if no record mentions it. Blank names are ignored.
    pub fn with_root(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.root = (!name.trim().is_empty()).then_some(name);
        self
    }

    pub fn build(&self, records: &[InteractionRecord]) -> InteractionGraph {
        build_interaction_graph(self.root.as_deref(), records)
    }
}

/// Build the graph for `records`.
///
/// The root is `root` when given, otherwise the source drug of the first record.
/// One edge per distinct (source, target, mechanism) triple, in record order.
pub fn build_interaction_graph(root: Option<&str>, records: &[InteractionRecord]) -> InteractionGraph {
    let root_label = root
        .filter(|r| !r.trim().is_empty())
        .map(|r| r.trim().to_string())
        .or_else(|| records.first().map(|r| r.source_drug.trim().to_string()));
    let root_id = root_label.as_deref().map(normalize_name);

    let mut graph = InteractionGraph { root: root_id.clone(), ..Default::default() };
    let mut seen_nodes: HashSet<String> = HashSet::new();
    let mut seen_edges: BTreeSet<GraphEdge> = BTreeSet::new();

    if let (Some(id), Some(label)) = (root_id.as_ref(), root_label) {
        seen_nodes.insert(id.clone());
        graph.nodes.push(GraphNode { id: id.clone(), label, group: None, role: NodeRole::Root });
    }

    for record in records {
        let mechanism = record.mechanism_of_action.trim();
        if !graph.groups.iter().any(|g| g == mechanism) {
            graph.groups.push(mechanism.to_string());
        }

        let root = root_id.as_deref();
        let source = add_node(&mut graph, &mut seen_nodes, root, &record.source_drug, mechanism);
        let target = add_node(&mut graph, &mut seen_nodes, root, &record.target, mechanism);

        let edge = GraphEdge { source, target, label: mechanism.to_string() };
        if seen_edges.insert(edge.clone()) {
            graph.edges.push(edge);
        }
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        groups = graph.groups.len(),
        "built interaction graph"
    );
    graph
}

/// Insert a node if absent and return its id. Existing nodes keep their first group.
fn add_node(
    graph: &mut InteractionGraph,
    seen: &mut HashSet<String>,
    root_id: Option<&str>,
    name: &str,
    mechanism: &str,
) -> String {
    let id = normalize_name(name);
    if seen.insert(id.clone()) {
        let is_root = root_id == Some(id.as_str());
        graph.nodes.push(GraphNode {
            id: id.clone(),
            label: name.trim().to_string(),
            group: (!is_root).then(|| mechanism.to_string()),
            role: if is_root { NodeRole::Root } else { NodeRole::Partner },
        });
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(source: &str, target: &str, mechanism: &str) -> InteractionRecord {
        InteractionRecord {
            source_drug: source.into(),
            target: target.into(),
            mechanism_of_action: mechanism.into(),
            relationship_type: None,
            molecular_target: None,
        }
    }

    fn sample() -> Vec<InteractionRecord> {
        vec![
            record("ASPIRIN", "IBUPROFEN", "Cyclooxygenase inhibitor"),
            record("ASPIRIN", "NAPROXEN", "Cyclooxygenase inhibitor"),
            record("ASPIRIN", "CLOPIDOGREL", "Platelet aggregation inhibitor"),
            record("ASPIRIN", "IBUPROFEN", "Platelet aggregation inhibitor"),
        ]
    }

    #[test]
    fn test_empty_input_without_root_is_empty() {
        let graph = build_interaction_graph(None, &[]);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(graph.root, None);
    }

    #[test]
    fn test_empty_input_with_root_has_only_root() {
        let graph = GraphBuilder::new().with_root("Aspirin").build(&[]);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].role, NodeRole::Root);
        assert_eq!(graph.nodes[0].id, "aspirin");
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_blank_root_falls_back_to_records() {
        let graph = GraphBuilder::new().with_root("  ").build(&sample());
        assert_eq!(graph.root.as_deref(), Some("aspirin"));
    }

    #[test]
    fn test_one_node_per_identity_and_one_edge_per_record() {
        let graph = build_interaction_graph(Some("aspirin"), &sample());

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["aspirin", "ibuprofen", "naproxen", "clopidogrel"]);
        assert_eq!(graph.edges.len(), 4);
        assert!(graph.edges.iter().all(|e| e.source == "aspirin"));
    }

    #[test]
    fn test_root_label_is_supplied_name() {
        let graph = build_interaction_graph(Some(" Aspirin "), &sample());
        let root = graph.node("aspirin").unwrap();
        assert_eq!(root.label, "Aspirin");
        assert_eq!(root.group, None);
    }

    #[test]
    fn test_first_encountered_group_wins() {
        let graph = build_interaction_graph(None, &sample());
        let ibuprofen = graph.node("ibuprofen").unwrap();
        assert_eq!(ibuprofen.group.as_deref(), Some("Cyclooxygenase inhibitor"));
        assert_eq!(
            graph.groups,
            vec!["Cyclooxygenase inhibitor".to_string(), "Platelet aggregation inhibitor".to_string()]
        );
    }

    #[test]
    fn test_case_variants_collapse_into_one_node() {
        let records = vec![
            record("ASPIRIN", "Ibuprofen", "Cyclooxygenase inhibitor"),
            record("aspirin", "IBUPROFEN ", "Cyclooxygenase inhibitor"),
        ];
        let graph = build_interaction_graph(None, &records);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.node("ibuprofen").unwrap().label, "Ibuprofen");
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = GraphBuilder::new().with_root("ASPIRIN");
        let first = builder.build(&sample());
        let second = builder.build(&sample());
        assert!(first.same_shape(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_shape_ignores_order() {
        let mut reversed = sample();
        reversed.reverse();
        let a = build_interaction_graph(Some("aspirin"), &sample());
        let b = build_interaction_graph(Some("aspirin"), &reversed);
        assert_eq!(a.edge_set(), b.edge_set());
        // Groups follow first-seen order, so node groups can differ with input order.
        assert_ne!(a.groups, b.groups);
    }

    #[test]
    fn test_palette_cycles_over_groups() {
        let graph = build_interaction_graph(None, &sample());
        assert_eq!(graph.palette_index("Cyclooxygenase inhibitor", 8), Some(0));
        assert_eq!(graph.palette_index("Platelet aggregation inhibitor", 1), Some(0));
        assert_eq!(graph.palette_index("Unknown", 8), None);
        assert_eq!(graph.palette_index("Cyclooxygenase inhibitor", 0), None);
    }

    #[test]
    fn test_serializes_roles_snake_case() {
        let graph = build_interaction_graph(Some("aspirin"), &[]);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["role"], "root");
        assert_eq!(json["root"], "aspirin");
    }
}
