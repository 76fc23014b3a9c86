// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Flat JSON export and import of a [GeoGraph].
//!
//! The format uses Spanish key names:
//!
//! ```json
//! {
//!   "nodos": [{"id": 1, "latitud": -33.45, "longitud": -70.65, "altura": 600.0,
//!              "prob_accidente": 0.1, "vecinos": [2], "caminos": [101]}],
//!   "caminos": [{"id": 101, "nodos": [1, 2], "ciclovia": true, "importancia": 2.0,
//!                "tipo_importancia": "categorica", "vecinos": [102]}]
//! }
//! ```
//!
//! Adjacency lists (`vecinos`, `caminos`) are written for consumers of the file,
//! but ignored on import: they are always rebuilt from the edges.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Edge, GeoGraph, GraphError, Importance, Node};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph: {0}")]
    Graph(#[from] GraphError),
}

/// Serializable copy of a whole [GeoGraph].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "nodos")]
    pub nodes: Vec<NodeRecord>,

    #[serde(rename = "caminos")]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i64,

    #[serde(rename = "latitud")]
    pub lat: f64,

    #[serde(rename = "longitud")]
    pub lon: f64,

    #[serde(rename = "altura", default)]
    pub elevation: f64,

    #[serde(rename = "prob_accidente", default)]
    pub safety: f64,

    #[serde(rename = "grupo", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(rename = "vecinos", default)]
    pub neighbors: Vec<i64>,

    #[serde(rename = "caminos", default)]
    pub edges: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: i64,

    #[serde(rename = "nodos")]
    pub nodes: [i64; 2],

    #[serde(rename = "ciclovia", default)]
    pub bikeway: bool,

    #[serde(rename = "importancia")]
    pub importance: f64,

    /// Which [Importance] variant `importance` holds;
    /// files without this key are treated as categorical.
    #[serde(rename = "tipo_importancia", default)]
    pub importance_kind: ImportanceKind,

    #[serde(rename = "vecinos", default)]
    pub neighbors: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportanceKind {
    #[default]
    #[serde(rename = "categorica")]
    Categorical,

    #[serde(rename = "costo")]
    PrecomputedCost,
}

impl Snapshot {
    /// Copies all nodes and edges of a graph, in order of their ids.
    pub fn from_graph(g: &GeoGraph) -> Self {
        let nodes = g
            .nodes()
            .map(|n| NodeRecord {
                id: n.id(),
                lat: n.lat(),
                lon: n.lon(),
                elevation: n.elevation,
                safety: n.safety,
                group: n.group.clone(),
                neighbors: g.neighbors(n.id()),
                edges: g.incident_edges(n.id()).to_vec(),
            })
            .collect();

        let edges = g
            .edges()
            .map(|e| {
                let (importance, importance_kind) = match e.importance {
                    Importance::Categorical(v) => (v, ImportanceKind::Categorical),
                    Importance::PrecomputedCost(v) => (v, ImportanceKind::PrecomputedCost),
                };
                EdgeRecord {
                    id: e.id,
                    nodes: [e.a, e.b],
                    bikeway: e.bikeway,
                    importance,
                    importance_kind,
                    neighbors: g.neighbor_edges(e.id).unwrap_or_default(),
                }
            })
            .collect();

        Self { nodes, edges }
    }

    /// Rebuilds a [GeoGraph]. Fails if an edge refers to an unknown node
    /// or carries an invalid importance.
    pub fn into_graph(self) -> Result<GeoGraph, SnapshotError> {
        let mut g = GeoGraph::default();

        for n in self.nodes {
            let mut node = Node::new(n.id, n.lat, n.lon)
                .with_elevation(n.elevation)
                .with_safety(n.safety);
            node.group = n.group;
            g.add_node(node);
        }

        for e in self.edges {
            let importance = match e.importance_kind {
                ImportanceKind::Categorical => Importance::Categorical(e.importance),
                ImportanceKind::PrecomputedCost => Importance::PrecomputedCost(e.importance),
            };
            let [a, b] = e.nodes;
            g.add_edge(
                Edge::new(e.id, a, b)
                    .with_bikeway(e.bikeway)
                    .with_importance(importance),
            )?;
        }

        Ok(g)
    }
}

/// Writes a graph as pretty-printed JSON.
pub fn write<W: io::Write>(g: &GeoGraph, writer: W) -> Result<(), SnapshotError> {
    serde_json::to_writer_pretty(writer, &Snapshot::from_graph(g))?;
    Ok(())
}

/// Reads a graph written by [write].
pub fn read<R: io::Read>(reader: R) -> Result<GeoGraph, SnapshotError> {
    let s: Snapshot = serde_json::from_reader(reader)?;
    s.into_graph()
}

pub fn save<P: AsRef<Path>>(g: &GeoGraph, path: P) -> Result<(), SnapshotError> {
    let mut w = io::BufWriter::new(File::create(path)?);
    write(g, &mut w)?;
    io::Write::flush(&mut w)?;
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<GeoGraph, SnapshotError> {
    let f = File::open(path)?;
    read(io::BufReader::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn santiago() -> GeoGraph {
        let mut g = GeoGraph::default();
        g.add_node(Node::new(1, -33.45, -70.65).with_elevation(600.0).with_safety(0.1));
        g.add_node(
            Node::new(2, -33.46, -70.66)
                .with_elevation(605.0)
                .with_safety(0.05)
                .with_group("PROVIDENCIA"),
        );
        g.add_node(Node::new(3, -33.47, -70.67).with_elevation(610.0).with_safety(0.2));
        g.add_edge(
            Edge::new(101, 1, 2)
                .with_bikeway(true)
                .with_importance(Importance::Categorical(2.0)),
        )
        .unwrap();
        g.add_edge(Edge::new(102, 2, 3).with_importance(Importance::PrecomputedCost(1448.5)))
            .unwrap();
        g
    }

    #[test]
    fn json_layout() {
        let mut buf = Vec::new();
        write(&santiago(), &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let n2 = &v["nodos"][1];
        assert_eq!(n2["id"], 2);
        assert_eq!(n2["latitud"], -33.46);
        assert_eq!(n2["longitud"], -70.66);
        assert_eq!(n2["altura"], 605.0);
        assert_eq!(n2["prob_accidente"], 0.05);
        assert_eq!(n2["grupo"], "PROVIDENCIA");
        assert_eq!(n2["vecinos"], serde_json::json!([1, 3]));
        assert_eq!(n2["caminos"], serde_json::json!([101, 102]));
        assert!(v["nodos"][0].get("grupo").is_none());

        let e1 = &v["caminos"][0];
        assert_eq!(e1["id"], 101);
        assert_eq!(e1["nodos"], serde_json::json!([1, 2]));
        assert_eq!(e1["ciclovia"], true);
        assert_eq!(e1["importancia"], 2.0);
        assert_eq!(e1["tipo_importancia"], "categorica");
        assert_eq!(e1["vecinos"], serde_json::json!([102]));
        assert_eq!(v["caminos"][1]["tipo_importancia"], "costo");
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grafo.json");

        let g = santiago();
        save(&g, &path).unwrap();
        assert_eq!(load(&path).unwrap(), g);
    }

    #[test]
    fn import_without_optional_keys() {
        let data = br#"{
            "nodos": [
                {"id": 1, "latitud": -33.45, "longitud": -70.65},
                {"id": 2, "latitud": -33.46, "longitud": -70.66, "altura": 605.0}
            ],
            "caminos": [{"id": 7, "nodos": [2, 1], "importancia": 3}]
        }"#;
        let g = read(&data[..]).unwrap();

        assert_eq!(g.node(1).unwrap().elevation, 0.0);
        assert_eq!(g.node(2).unwrap().elevation, 605.0);

        let e = g.edge(7).unwrap();
        assert!(!e.bikeway);
        assert_eq!(e.importance, Importance::Categorical(3.0));
        assert_eq!(g.neighbors(1), vec![2]);
    }

    #[test]
    fn import_ignores_stale_adjacency() {
        let data = br#"{
            "nodos": [
                {"id": 1, "latitud": 0.0, "longitud": 0.0, "vecinos": [5, 6], "caminos": [99]},
                {"id": 2, "latitud": 0.0, "longitud": 1.0}
            ],
            "caminos": [{"id": 1, "nodos": [1, 2], "importancia": 1, "vecinos": [42]}]
        }"#;
        let g = read(&data[..]).unwrap();
        assert_eq!(g.neighbors(1), vec![2]);
        assert_eq!(g.incident_edges(1), &[1]);
        assert!(g.neighbor_edges(1).unwrap().is_empty());
    }

    #[test]
    fn import_rejects_missing_endpoint() {
        let data = br#"{
            "nodos": [{"id": 1, "latitud": 0.0, "longitud": 0.0}],
            "caminos": [{"id": 1, "nodos": [1, 2], "importancia": 1}]
        }"#;
        assert!(matches!(
            read(&data[..]),
            Err(SnapshotError::Graph(GraphError::EndpointMissing { edge: 1, node: 2 }))
        ));
    }

    #[test]
    fn import_rejects_invalid_json() {
        assert!(matches!(read(&b"{\"nodos\": ["[..]), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(dir.path().join("missing.json")),
            Err(SnapshotError::Io(_))
        ));
    }
}
