// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::{Edge, Importance, Node};

/// Multipliers of the three criteria combined into the cost of traversing an [Edge]:
///
/// ```text
/// cost(a, b) = w_dist * distance(a, b)
///            + w_elev * max(0, elevation(b) - elevation(a))
///            + w_seg  * importance(edge)
/// ```
///
/// Distance is the great-circle distance in meters. Only climbing is penalized,
/// so the cost of an edge may differ between directions.
///
/// All weights must be finite and non-negative ([CostWeights::validate]); together with
/// the non-negative importance enforced by [GeoGraph](crate::GeoGraph) this ensures
/// no edge ever has a negative cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub w_dist: f64,
    pub w_elev: f64,
    pub w_seg: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            w_dist: 1.0,
            w_elev: 0.0,
            w_seg: 1.0,
        }
    }
}

impl CostWeights {
    pub fn new(w_dist: f64, w_elev: f64, w_seg: f64) -> Self {
        Self {
            w_dist,
            w_elev,
            w_seg,
        }
    }

    /// Ensures every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("w_dist", self.w_dist),
            ("w_elev", self.w_elev),
            ("w_seg", self.w_seg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }

    /// Cost of traversing `edge` from `from` to `to`.
    pub fn edge_cost(&self, from: &Node, to: &Node, edge: &Edge) -> f64 {
        let distance = from.distance_to(to);
        let climb = (to.elevation - from.elevation).max(0.0);
        let segment = match edge.importance {
            Importance::Categorical(weight) => weight,
            Importance::PrecomputedCost(cost) => cost,
        };

        self.w_dist * distance + self.w_elev * climb + self.w_seg * segment
    }

    /// A* estimate of the remaining cost from `node` to `goal`.
    ///
    /// Every edge costs at least `w_dist` times the crow-flies distance between its ends,
    /// so this never overestimates and satisfies the triangle inequality.
    #[inline]
    pub fn heuristic(&self, node: &Node, goal: &Node) -> f64 {
        self.w_dist * node.distance_to(goal)
    }
}
