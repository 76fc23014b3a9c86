// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

use crate::{Edge, Node};

/// Error conditions which may occur when accessing or extending a [GeoGraph].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    NodeNotFound(i64),

    #[error("unknown edge: {0}")]
    EdgeNotFound(i64),

    #[error("edge {edge} references unknown node {node}")]
    EndpointMissing { edge: i64, node: i64 },

    #[error("edge {edge} has invalid importance {value} (must be finite and non-negative)")]
    InvalidImportance { edge: i64, value: f64 },
}

/// Represents a street network as a set of [Nodes](Node) and undirected [Edges](Edge).
///
/// The only adjacency data kept is the list of incident edge ids per node.
/// Neighbor nodes and neighbor edges are derived from it on request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeoGraph {
    nodes: BTreeMap<i64, Node>,
    edges: BTreeMap<i64, Edge>,
    incident: HashMap<i64, Vec<i64>>,
}

impl GeoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node), ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns a mutable iterator over all [Nodes](Node), ordered by id.
    /// Only `elevation`, `safety` and `group` can be changed through it.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Returns an iterator over all [Edges](Edge), ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn contains_node(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn node(&self, id: i64) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Retrieves a [Node] with the provided id for updating its elevation, safety or group.
    pub fn node_mut(&mut self, id: i64) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Retrieves an [Edge] with the provided id.
    pub fn edge(&self, id: i64) -> Result<&Edge, GraphError> {
        self.edges.get(&id).ok_or(GraphError::EdgeNotFound(id))
    }

    /// Inserts a [Node], unless a node with the same id already exists.
    ///
    /// Repeated calls never overwrite: the first node registered under an id is kept
    /// and returned, and the new one is discarded.
    pub fn add_node(&mut self, node: Node) -> &Node {
        match self.nodes.entry(node.id()) {
            Entry::Vacant(e) => e.insert(node),
            Entry::Occupied(e) => e.into_mut(),
        }
    }

    /// Inserts an [Edge], unless an edge with the same id already exists
    /// (in which case the existing edge is returned).
    ///
    /// Both endpoints must already be in the graph. This function does not check
    /// for other edges between the same pair of nodes; see [GeoGraph::edge_between].
    pub fn add_edge(&mut self, edge: Edge) -> Result<&Edge, GraphError> {
        if self.edges.contains_key(&edge.id) {
            return self.edge(edge.id);
        }

        for node in [edge.a, edge.b] {
            if !self.nodes.contains_key(&node) {
                return Err(GraphError::EndpointMissing {
                    edge: edge.id,
                    node,
                });
            }
        }

        let importance = edge.importance.value();
        if !importance.is_finite() || importance < 0.0 {
            return Err(GraphError::InvalidImportance {
                edge: edge.id,
                value: importance,
            });
        }

        self.incident.entry(edge.a).or_default().push(edge.id);
        if edge.b != edge.a {
            self.incident.entry(edge.b).or_default().push(edge.id);
        }

        Ok(&*self.edges.entry(edge.id).or_insert(edge))
    }

    /// Gets ids of all edges touching a node, in order of insertion.
    pub fn incident_edges(&self, node_id: i64) -> &[i64] {
        self.incident
            .get(&node_id)
            .map(|e| e.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over `(edge, neighbor_id)` pairs for every edge touching a node.
    pub fn edges_from(&self, node_id: i64) -> impl Iterator<Item = (&Edge, i64)> + '_ {
        self.incident_edges(node_id).iter().filter_map(move |id| {
            let edge = self.edges.get(id)?;
            Some((edge, edge.other(node_id)?))
        })
    }

    /// Gets ids of all nodes directly connected to a node, without duplicates,
    /// in order of the first connecting edge.
    pub fn neighbors(&self, node_id: i64) -> Vec<i64> {
        let mut neighbors = Vec::new();
        for (_, other) in self.edges_from(node_id) {
            if !neighbors.contains(&other) {
                neighbors.push(other);
            }
        }
        neighbors
    }

    /// Gets ids of all other edges sharing an endpoint with the given edge.
    pub fn neighbor_edges(&self, edge_id: i64) -> Result<Vec<i64>, GraphError> {
        let edge = self.edge(edge_id)?;
        let mut result = Vec::new();
        for node in [edge.a, edge.b] {
            for &other in self.incident_edges(node) {
                if other != edge_id && !result.contains(&other) {
                    result.push(other);
                }
            }
        }
        Ok(result)
    }

    /// Finds the first-inserted edge joining the unordered pair `{x, y}`.
    ///
    /// Only the incident edges of `x` are scanned, so the cost is proportional to its degree.
    pub fn edge_between(&self, x: i64, y: i64) -> Option<&Edge> {
        self.incident_edges(x)
            .iter()
            .filter_map(|id| self.edges.get(id))
            .find(|e| e.connects(x, y))
    }

    /// Returns the largest edge id in the graph, or 0 for a graph without edges.
    pub fn max_edge_id(&self) -> i64 {
        self.edges.keys().next_back().copied().unwrap_or(0)
    }
}
