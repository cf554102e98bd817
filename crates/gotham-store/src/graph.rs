//! Graph aggregation: the working set of entities and relationships built
//! up from successive searches, expansions and case loads.

use std::collections::{HashMap, HashSet};

use gotham_core::{Entity, GraphData, Relationship};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Deduplicating, insertion-ordered store of graph elements.
///
/// Node ids and edge ids are each unique. Merging skips elements whose id is
/// already present, so the first copy of an element wins.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Entity>,
    edges: Vec<Relationship>,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

/// How many elements a merge actually added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub added_nodes: usize,
    pub added_edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Entity] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Relationship] {
        &self.edges
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        if !self.node_ids.contains(id) {
            return None;
        }
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
        }
    }

    /// Replace all nodes. Repeated ids in `nodes` keep their first copy.
    pub fn replace_nodes(&mut self, nodes: Vec<Entity>) {
        self.nodes.clear();
        self.node_ids.clear();
        for node in nodes {
            if self.node_ids.insert(node.id.clone()) {
                self.nodes.push(node);
            }
        }
    }

    /// Replace all edges. Repeated ids in `edges` keep their first copy.
    pub fn replace_edges(&mut self, edges: Vec<Relationship>) {
        self.edges.clear();
        self.edge_ids.clear();
        for edge in edges {
            if self.edge_ids.insert(edge.id.clone()) {
                self.edges.push(edge);
            }
        }
    }

    /// Append every node and edge of `batch` whose id is not yet present,
    /// in batch order.
    pub fn merge(&mut self, batch: GraphData) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for node in batch.nodes {
            if self.node_ids.insert(node.id.clone()) {
                self.nodes.push(node);
                outcome.added_nodes += 1;
            }
        }
        for edge in batch.edges {
            if self.edge_ids.insert(edge.id.clone()) {
                self.edges.push(edge);
                outcome.added_edges += 1;
            }
        }

        debug!(
            "Merged batch: +{} nodes, +{} edges (total {} / {})",
            outcome.added_nodes,
            outcome.added_edges,
            self.nodes.len(),
            self.edges.len()
        );
        outcome
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_ids.clear();
        self.edge_ids.clear();
    }

    /// Entities directly connected to `id` in either direction, in edge
    /// order and without repeats.
    pub fn neighbors(&self, id: &str) -> Vec<&Entity> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter_map(|e| {
                if e.source == id {
                    Some(e.target.as_str())
                } else if e.target == id {
                    Some(e.source.as_str())
                } else {
                    None
                }
            })
            .filter(|other| seen.insert(*other))
            .filter_map(|other| self.get(other))
            .collect()
    }

    /// Directed graph view of the working set for renderers. Edges with an
    /// endpoint outside the working set are left out.
    pub fn to_digraph(&self) -> DiGraph<&Entity, &Relationship> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            index.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            {
                graph.add_edge(from, to, edge);
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, name: &str) -> Entity {
        Entity::new(id, "Person").with_property("full_name", name)
    }

    fn ids(store: &GraphStore) -> Vec<&str> {
        store.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_merge_skips_existing_ids() {
        let mut store = GraphStore::new();
        store.merge(GraphData::from_nodes(vec![person("P1", "first")]));
        let outcome = store.merge(GraphData::from_nodes(vec![
            person("P1", "second"),
            person("P2", "other"),
        ]));

        assert_eq!(outcome.added_nodes, 1);
        assert_eq!(ids(&store), vec!["P1", "P2"]);
        assert_eq!(store.get("P1").unwrap().display_name(), "first");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = GraphData {
            nodes: vec![person("P1", "a"), person("P2", "b")],
            edges: vec![Relationship::new("R1", "P1", "P2", "KNOWS")],
        };

        let mut once = GraphStore::new();
        once.merge(batch.clone());

        let mut twice = GraphStore::new();
        twice.merge(batch.clone());
        let second = twice.merge(batch);

        assert_eq!(second, MergeOutcome::default());
        assert_eq!(once.nodes(), twice.nodes());
        assert_eq!(once.edges(), twice.edges());
    }

    #[test]
    fn test_merge_sequence_yields_union_of_ids() {
        let batches = vec![
            vec!["A", "B"],
            vec!["B", "C", "A"],
            vec![],
            vec!["D", "D", "C"],
        ];

        let mut store = GraphStore::new();
        for batch in &batches {
            store.merge(GraphData::from_nodes(
                batch.iter().map(|id| person(id, id)).collect(),
            ));
        }

        assert_eq!(ids(&store), vec!["A", "B", "C", "D"]);
        let unique: HashSet<&str> = ids(&store).into_iter().collect();
        assert_eq!(unique.len(), store.nodes().len());
    }

    #[test]
    fn test_edges_deduplicated_independently() {
        let mut store = GraphStore::new();
        store.merge(GraphData {
            nodes: vec![],
            edges: vec![Relationship::new("R1", "P1", "P2", "CALLED")],
        });
        let outcome = store.merge(GraphData {
            nodes: vec![person("R1", "node sharing an edge id")],
            edges: vec![
                Relationship::new("R1", "P9", "P8", "CALLED"),
                Relationship::new("R2", "P2", "P3", "CALLED"),
            ],
        });

        assert_eq!(outcome, MergeOutcome { added_nodes: 1, added_edges: 1 });
        assert_eq!(store.edges()[0].source, "P1");
    }

    #[test]
    fn test_replace_and_clear() {
        let mut store = GraphStore::new();
        store.replace_nodes(vec![person("A", "a"), person("A", "dup"), person("B", "b")]);
        assert_eq!(ids(&store), vec!["A", "B"]);

        store.replace_nodes(vec![person("C", "c")]);
        assert!(!store.contains_node("A"));
        assert_eq!(store.merge(GraphData::from_nodes(vec![person("A", "a")])).added_nodes, 1);

        store.replace_edges(vec![Relationship::new("R1", "A", "C", "KNOWS")]);
        assert_eq!(store.stats(), GraphStats { node_count: 2, edge_count: 1 });

        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains_edge("R1"));
    }

    #[test]
    fn test_neighbors_and_digraph_projection() {
        let mut store = GraphStore::new();
        store.merge(GraphData {
            nodes: vec![person("P1", "a"), person("P2", "b"), person("P3", "c")],
            edges: vec![
                Relationship::new("R1", "P1", "P2", "KNOWS"),
                Relationship::new("R2", "P3", "P1", "CALLED"),
                Relationship::new("R3", "P1", "P2", "MET"),
                Relationship::new("R4", "P1", "GHOST", "OWNS"),
            ],
        });

        let around: Vec<&str> = store.neighbors("P1").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(around, vec!["P2", "P3"]);

        let graph = store.to_digraph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }
}
