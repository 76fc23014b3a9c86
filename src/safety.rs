// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Applying per-area safety scores onto nodes.

use std::collections::HashMap;

use log::{debug, warn};

use crate::GeoGraph;

/// Sets the [safety](crate::Node::safety) of every node whose
/// [group](crate::Node::group) has an entry in `scores`.
///
/// Scores are expected to be already normalized to `[0, 1]`;
/// entries outside of that range (or not finite) are ignored with a warning.
/// Nodes without a group, or with a group absent from `scores`, are left unchanged.
///
/// Returns the number of nodes which received a score.
pub fn annotate_safety(g: &mut GeoGraph, scores: &HashMap<String, f64>) -> usize {
    let valid = scores
        .iter()
        .filter(|&(group, &score)| {
            if (0.0..=1.0).contains(&score) {
                true
            } else {
                warn!("ignoring safety score {score} for {group:?}: outside of [0, 1]");
                false
            }
        })
        .collect::<HashMap<_, _>>();

    let mut updated = 0;
    for node in g.nodes_mut() {
        if let Some(&&score) = node.group.as_ref().and_then(|group| valid.get(group)) {
            node.safety = score;
            updated += 1;
        }
    }

    debug!("safety scores applied to {updated} nodes");
    updated
}
