//! Precomputed traversal view over a workflow graph.

use std::collections::HashMap;

use cloakflow_models::{Graph, GraphNode};

/// Adjacency and in-edge maps for one graph instance. Input node order is
/// preserved; edges referencing unknown node ids are dropped.
pub struct ExecutionGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    in_edges: HashMap<String, Vec<String>>,
    successors: HashMap<String, Vec<String>>,
}

impl ExecutionGraph {
    pub fn new(graph: &Graph) -> Self {
        let mut index = HashMap::new();
        let mut in_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut successors: HashMap<String, Vec<String>> = HashMap::new();

        for (position, node) in graph.nodes.iter().enumerate() {
            index.insert(node.id.clone(), position);
            in_edges.insert(node.id.clone(), Vec::new());
            successors.insert(node.id.clone(), Vec::new());
        }

        for edge in &graph.edges {
            if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
                continue;
            }
            successors
                .get_mut(&edge.source)
                .expect("source present")
                .push(edge.target.clone());
            in_edges
                .get_mut(&edge.target)
                .expect("target present")
                .push(edge.source.clone());
        }

        Self {
            nodes: graph.nodes.clone(),
            index,
            in_edges,
            successors,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.index.get(node_id).map(|&i| &self.nodes[i])
    }

    pub fn predecessors(&self, node_id: &str) -> &[String] {
        self.in_edges.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors(&self, node_id: &str) -> &[String] {
        self.successors
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes with zero in-edges, in input order. These seed the ready queue.
    pub fn entry_nodes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| self.predecessors(&node.id).is_empty())
            .map(|node| node.id.clone())
            .collect()
    }

    /// All node ids in input order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }
}
