// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Multi-criteria bicycle routing over [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! OSM points and ways are converted into an undirected [GeoGraph], where every
//! [Node] carries an elevation and a safety score. Routes are found with Dijkstra or A*
//! under a configurable cost combining distance, uphill elevation gain and segment
//! [Importance] (see [routing::CostWeights]).
//!
//! # Example
//!
//! ```no_run
//! let mut g = bikeroute::GeoGraph::default();
//! let options = bikeroute::osm::Options::new(&bikeroute::osm::BICYCLE_PROFILE);
//! bikeroute::osm::add_features_from_file(&mut g, &options, "path/to/santiago.osm")
//!     .expect("failed to load santiago.osm");
//!
//! let request = bikeroute::routing::RouteRequest {
//!     start: 386235,
//!     goal: 386236,
//!     algorithm: bikeroute::routing::Algorithm::AStar,
//!     weights: bikeroute::routing::CostWeights::default(),
//!     heuristic_weight: None,
//! };
//! let route = bikeroute::routing::find_route(&g, &request).expect("failed to find route");
//!
//! println!("Route: {:?}", route.nodes);
//! ```
//!
//! The graph performs no locking. Pathfinding borrows it immutably, so the borrow checker
//! already rules out mutation during a query; sharing one graph between concurrent
//! queries and ingestion is left to the caller (e.g. an `RwLock<GeoGraph>`).

mod distance;
pub mod elevation;
mod graph;
mod kd;
pub mod osm;
pub mod routing;
pub mod safety;
pub mod snapshot;

pub use distance::earth_distance;
pub use elevation::ElevationEstimator;
pub use graph::{GeoGraph, GraphError};
pub use kd::KDTree;

/// Represents a point of the street network: an intersection or a way vertex.
///
/// `id`, `lat` and `lon` are fixed once the node is created. `elevation`, `safety`
/// and `group` may be updated later through [GeoGraph::node_mut].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: i64,
    lat: f64,
    lon: f64,

    /// Elevation above sea level, in meters.
    pub elevation: f64,

    /// Danger score in `[0, 1]`; higher values are less safe.
    pub safety: f64,

    /// Key of the area (e.g. a commune) this node belongs to, used by
    /// [safety::annotate_safety].
    pub group: Option<String>,
}

impl Node {
    pub fn new(id: i64, lat: f64, lon: f64) -> Self {
        Self {
            id,
            lat,
            lon,
            elevation: 0.0,
            safety: 0.0,
            group: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_safety(mut self, safety: f64) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to another node, in meters.
    #[inline]
    pub fn distance_to(&self, other: &Node) -> f64 {
        earth_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Weight of a street segment, as produced by one of the two ingestion
/// [modes](osm::ImportanceMode).
///
/// Both forms enter the route cost through the `w_seg` term of [routing::CostWeights].
/// Values must be finite and non-negative; [GeoGraph::add_edge] rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Importance {
    /// Small weight derived from the road classification (see [osm::Profile]).
    Categorical(f64),

    /// Absolute segment cost: length in meters scaled by `1 + safety_a + safety_b`.
    PrecomputedCost(f64),
}

impl Importance {
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Self::Categorical(v) | Self::PrecomputedCost(v) => v,
        }
    }
}

impl Default for Importance {
    fn default() -> Self {
        Self::Categorical(1.0)
    }
}

/// Represents an undirected street segment between two [Nodes](Node).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: i64,
    pub a: i64,
    pub b: i64,

    /// Whether the segment is a dedicated or designated cycling facility.
    pub bikeway: bool,

    pub importance: Importance,
}

impl Edge {
    pub fn new(id: i64, a: i64, b: i64) -> Self {
        Self {
            id,
            a,
            b,
            bikeway: false,
            importance: Importance::default(),
        }
    }

    pub fn with_bikeway(mut self, bikeway: bool) -> Self {
        self.bikeway = bikeway;
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Returns the endpoint opposite to `node_id`, or `None` if the edge doesn't touch it.
    #[inline]
    pub fn other(&self, node_id: i64) -> Option<i64> {
        if node_id == self.a {
            Some(self.b)
        } else if node_id == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Checks whether this edge joins the unordered pair `{x, y}`.
    #[inline]
    pub fn connects(&self, x: i64, y: i64) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}
