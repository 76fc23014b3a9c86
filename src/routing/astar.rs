// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::queue::Frontier;
use super::{reconstruct_path, CostWeights, Route, RouteError};
use crate::GeoGraph;

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the cheapest route between two nodes in the provided graph.
///
/// The heuristic is the crow-flies distance to `goal` scaled by `weights.w_dist`,
/// which keeps it consistent with [CostWeights::edge_cost] - the returned route
/// is as cheap as the one found by [dijkstra](super::dijkstra).
///
/// Returns an empty [Route] if there is no route between the two nodes.
pub fn astar(
    g: &GeoGraph,
    weights: &CostWeights,
    start: i64,
    goal: i64,
) -> Result<Route, RouteError> {
    weights.validate()?;
    let start_node = g.node(start).map_err(|_| RouteError::NodeNotFound(start))?;
    let goal_node = g.node(goal).map_err(|_| RouteError::NodeNotFound(goal))?;

    let mut queue = Frontier::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();

    queue.push(start, 0.0, weights.heuristic(start_node, goal_node));
    known_costs.insert(start, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == goal {
            return Ok(Route {
                nodes: reconstruct_path(&came_from, start, goal),
                cost: Some(item.cost),
            });
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        let Ok(at) = g.node(item.at) else { continue };

        for (edge, neighbor_id) in g.edges_from(item.at) {
            // Check if the referred node exists
            let Ok(neighbor) = g.node(neighbor_id) else {
                continue;
            };

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + weights.edge_cost(at, neighbor, edge);
            if neighbor_cost >= known_costs.get(&neighbor_id).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(
                neighbor_id,
                neighbor_cost,
                neighbor_cost + weights.heuristic(neighbor, goal_node),
            );
        }
    }

    Ok(Route::default())
}
