// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Cheapest-path search over a [GeoGraph](crate::GeoGraph).

mod astar;
mod cost;
mod dijkstra;
mod error;
mod path;
mod queue;

use serde::{Deserialize, Serialize};

pub use astar::astar;
pub use cost::CostWeights;
pub use dijkstra::{dijkstra, ShortestPaths};
pub use error::{ConfigError, RouteError};
pub use path::reconstruct_path;

use crate::GeoGraph;

/// Ordered sequence of node ids from the start to the goal (both inclusive).
///
/// Serializes to `{"ruta": [...]}`. An empty route means the goal is unreachable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "ruta", default)]
    pub nodes: Vec<i64>,

    /// Total cost of the route, `None` if the route is empty.
    #[serde(skip)]
    pub cost: Option<f64>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Search algorithm used by [find_route].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Dijkstra,

    #[default]
    AStar,
}

/// Everything needed to run a single route search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: i64,
    pub goal: i64,

    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(flatten)]
    pub weights: CostWeights,

    /// Expected scale of the A* distance heuristic. Only validated, never used as the scale:
    /// the search always scales the heuristic by `weights.w_dist`, and any other value
    /// is rejected with [ConfigError::InconsistentHeuristic].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic_weight: Option<f64>,
}

impl RouteRequest {
    /// Rejects weights which could produce negative costs and
    /// heuristic scales which don't match the distance weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        match self.heuristic_weight {
            Some(h) if h != self.weights.w_dist => Err(ConfigError::InconsistentHeuristic {
                heuristic: h,
                distance: self.weights.w_dist,
            }),
            _ => Ok(()),
        }
    }
}

/// Finds the cheapest route for the provided [RouteRequest] with the requested [Algorithm].
pub fn find_route(g: &GeoGraph, request: &RouteRequest) -> Result<Route, RouteError> {
    request.validate()?;
    match request.algorithm {
        Algorithm::Dijkstra => Ok(dijkstra(g, &request.weights, request.start, Some(request.goal))?
            .route_to(request.start, request.goal)),
        Algorithm::AStar => astar(g, &request.weights, request.start, request.goal),
    }
}
