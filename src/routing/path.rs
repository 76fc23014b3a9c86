// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Rebuilds the node sequence from `start` to `goal` by following `predecessors`
/// backwards from `goal`.
///
/// Returns an empty vector if the predecessor chain of `goal` doesn't lead to `start`
/// (i.e. `goal` was never reached).
pub fn reconstruct_path(predecessors: &HashMap<i64, i64>, start: i64, goal: i64) -> Vec<i64> {
    let mut path = vec![goal];
    let mut last = goal;

    while last != start {
        match predecessors.get(&last) {
            Some(&nd) => {
                path.push(nd);
                last = nd;
            }
            None => return vec![],
        }

        // A chain longer than the map must be cyclic
        if path.len() > predecessors.len() + 1 {
            return vec![];
        }
    }

    path.reverse();
    path
}
