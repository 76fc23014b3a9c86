// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::queue::Frontier;
use super::{reconstruct_path, CostWeights, Route, RouteError};
use crate::GeoGraph;

/// Result of a single-source [dijkstra] search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortestPaths {
    /// Best known cost from the start to every reached node.
    /// Exact for all nodes expanded before the search stopped.
    pub distances: HashMap<i64, f64>,

    /// Previous node on the best known path to every reached node (except the start).
    pub predecessors: HashMap<i64, i64>,
}

impl ShortestPaths {
    /// Extracts the [Route] from `start` to `goal`;
    /// empty if `goal` was not reached.
    pub fn route_to(&self, start: i64, goal: i64) -> Route {
        let nodes = reconstruct_path(&self.predecessors, start, goal);
        if nodes.is_empty() {
            Route::default()
        } else {
            Route {
                nodes,
                cost: self.distances.get(&goal).copied(),
            }
        }
    }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest paths from `start` to every reachable node.
///
/// If `goal` is provided, the search stops as soon as `goal` is taken off the queue -
/// its cost is final at that point, while other nodes may only have tentative costs.
///
/// Edges are traversed in both directions.
pub fn dijkstra(
    g: &GeoGraph,
    weights: &CostWeights,
    start: i64,
    goal: Option<i64>,
) -> Result<ShortestPaths, RouteError> {
    weights.validate()?;
    g.node(start).map_err(|_| RouteError::NodeNotFound(start))?;
    if let Some(goal) = goal {
        g.node(goal).map_err(|_| RouteError::NodeNotFound(goal))?;
    }

    let mut queue = Frontier::default();
    let mut result = ShortestPaths::default();

    queue.push(start, 0.0, 0.0);
    result.distances.insert(start, 0.0);

    while let Some(item) = queue.pop() {
        if Some(item.at) == goal {
            break;
        }

        // Stale entry - a cheaper way to this node was already expanded
        if item.cost > result.distances.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        let Ok(at) = g.node(item.at) else { continue };

        for (edge, neighbor_id) in g.edges_from(item.at) {
            let Ok(neighbor) = g.node(neighbor_id) else {
                continue;
            };

            let neighbor_cost = item.cost + weights.edge_cost(at, neighbor, edge);
            if neighbor_cost
                >= result
                    .distances
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            result.predecessors.insert(neighbor_id, item.at);
            result.distances.insert(neighbor_id, neighbor_cost);
            queue.push(neighbor_id, neighbor_cost, neighbor_cost);
        }
    }

    Ok(result)
}
