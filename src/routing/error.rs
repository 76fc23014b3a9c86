// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [dijkstra](super::dijkstra),
/// [astar](super::astar) or [find_route](super::find_route).
///
/// Not finding any route is not an error - an empty [Route](super::Route) is returned instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// The start or goal node doesn't exist in the graph.
    #[error("invalid node: {0}")]
    NodeNotFound(i64),

    /// The cost configuration could produce negative costs
    /// or an inadmissible A* heuristic.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

/// Reasons for rejecting a cost configuration, see [CostWeights::validate](super::CostWeights::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("heuristic weight {heuristic} differs from distance weight {distance}")]
    InconsistentHeuristic { heuristic: f64, distance: f64 },
}
