// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{Edge, GeoGraph, Importance, Node};

use super::{
    model::{Feature, Point, Way},
    FeatureReader, ImportanceMode, IngestReport, Options, ProximityBounds,
};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [GeoGraph].
///
/// Ingestion happens in three passes: nodes are registered as they come in,
/// ways are buffered and converted into edges once all nodes are known,
/// and finally nearby nodes are linked (see [ProximityBounds]).
pub(super) struct GraphBuilder<'a> {
    g: &'a mut GeoGraph,
    options: &'a Options<'a>,
    next_edge_id: i64,
    ignore_bbox: bool,

    /// Ids of nodes seen in this run, in order of appearance.
    order: Vec<i64>,
    seen: HashSet<i64>,

    ways: Vec<Way>,
    report: IngestReport,
    warned_no_elevation: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new graph builder, allocating edge ids after the largest one already in the graph.
    pub(super) fn new(g: &'a mut GeoGraph, options: &'a Options<'a>) -> Self {
        let next_edge_id = g.max_edge_id() + 1;

        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());
        if !ignore_bbox {
            debug!("filtering nodes by bbox {:?}", options.bbox);
        }

        Self {
            g,
            options,
            next_edge_id,
            ignore_bbox,
            order: Vec::default(),
            seen: HashSet::default(),
            ways: Vec::default(),
            report: IngestReport::default(),
            warned_no_elevation: false,
        }
    }

    /// Add all features from the provided [FeatureReader].
    pub(super) fn add_features<F: FeatureReader>(
        mut self,
        mut features: F,
    ) -> Result<IngestReport, F::Error> {
        while let Some(f) = features.next()? {
            match f {
                Feature::Point(p) => self.add_point(p),
                Feature::Way(w) => self.ways.push(w),
            }
        }
        self.report.skipped_records += features.skipped();
        info!(
            "registered {} nodes ({} skipped records)",
            self.report.nodes, self.report.skipped_records
        );

        self.add_ways();
        info!(
            "created {} edges from ways ({} duplicates, {} unresolved references)",
            self.report.way_edges, self.report.duplicates, self.report.unresolved_refs
        );

        self.add_proximity_edges();
        info!("created {} proximity edges", self.report.proximity_edges);

        Ok(self.report)
    }

    fn add_point(&mut self, p: Point) {
        // NaN fails both range checks
        if p.id == 0 || !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lon) {
            warn!("skipping node {}: invalid position ({}, {})", p.id, p.lat, p.lon);
            self.report.skipped_records += 1;
            return;
        }

        if !self.is_in_bbox(p.lat, p.lon) {
            return;
        }

        if self.seen.insert(p.id) {
            self.order.push(p.id);
        }

        if self.g.contains_node(p.id) {
            debug!("node {} already in graph - ignoring", p.id);
            return;
        }

        let elevation = match p.elevation() {
            Some(ele) => ele,
            None => self.estimate_elevation(p.lat, p.lon),
        };

        let mut node = Node::new(p.id, p.lat, p.lon)
            .with_elevation(elevation)
            .with_safety(self.options.profile.node_safety(&p.tags));
        if let Some(group) = self.options.group_tag.and_then(|k| p.tags.get(k)) {
            node = node.with_group(group.as_str());
        }

        self.g.add_node(node);
        self.report.nodes += 1;
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn estimate_elevation(&mut self, lat: f64, lon: f64) -> f64 {
        match self.options.elevation {
            Some(e) if !e.is_empty() => e.estimate(lat, lon, self.options.elevation_neighbors),
            _ => {
                if !self.warned_no_elevation {
                    warn!("no elevation reference data - nodes without \"ele\" get 0 m");
                    self.warned_no_elevation = true;
                }
                0.0
            }
        }
    }

    fn add_ways(&mut self) {
        let ways = std::mem::take(&mut self.ways);
        for w in &ways {
            self.add_way(w);
        }
    }

    fn add_way(&mut self, w: &Way) {
        let profile = self.options.profile;
        let Some(class_importance) = profile.way_importance(&w.tags) else {
            debug!("way {} is not routable - ignoring", w.id);
            self.report.ignored_ways += 1;
            return;
        };
        let bikeway = profile.is_bikeway(&w.tags);

        for pair in w.refs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }

            let Some(distance) = self.weighted_distance(a, b) else {
                if self.ignore_bbox {
                    warn!("way {}: skipping segment {a}-{b}: reference to unknown node", w.id);
                } else {
                    debug!("way {}: skipping segment {a}-{b}: node outside of bbox", w.id);
                }
                self.report.unresolved_refs += 1;
                continue;
            };

            if self.g.edge_between(a, b).is_some() {
                debug!("way {}: nodes {a} and {b} already connected", w.id);
                self.report.duplicates += 1;
                continue;
            }

            let importance = match self.options.importance {
                ImportanceMode::RoadClass => Importance::Categorical(class_importance),
                ImportanceMode::WeightedDistance => Importance::PrecomputedCost(distance),
            };

            if self.add_edge(a, b, bikeway, importance) {
                self.report.way_edges += 1;
            }
        }
    }

    fn add_proximity_edges(&mut self) {
        let ProximityBounds {
            max_sources,
            window,
            max_distance,
        } = self.options.proximity;
        let order = std::mem::take(&mut self.order);

        for (i, &a) in order.iter().enumerate().take(max_sources) {
            for &b in order.iter().skip(i + 1).take(window) {
                let (Ok(node_a), Ok(node_b)) = (self.g.node(a), self.g.node(b)) else {
                    continue;
                };

                let distance = node_a.distance_to(node_b);
                if distance >= max_distance || self.g.edge_between(a, b).is_some() {
                    continue;
                }

                let importance = match self.options.importance {
                    ImportanceMode::RoadClass => {
                        Importance::Categorical(self.options.profile.default_importance)
                    }
                    ImportanceMode::WeightedDistance => Importance::PrecomputedCost(
                        distance * (1.0 + node_a.safety + node_b.safety),
                    ),
                };

                if self.add_edge(a, b, false, importance) {
                    self.report.proximity_edges += 1;
                }
            }
        }
    }

    /// Returns the distance between two nodes scaled by `1 + safety_a + safety_b`,
    /// or `None` if any of the nodes doesn't exist.
    fn weighted_distance(&self, a: i64, b: i64) -> Option<f64> {
        let a = self.g.node(a).ok()?;
        let b = self.g.node(b).ok()?;
        Some(a.distance_to(b) * (1.0 + a.safety + b.safety))
    }

    fn add_edge(&mut self, a: i64, b: i64, bikeway: bool, importance: Importance) -> bool {
        let edge = Edge::new(self.next_edge_id, a, b)
            .with_bikeway(bikeway)
            .with_importance(importance);

        match self.g.add_edge(edge) {
            Ok(_) => {
                self.next_edge_id += 1;
                true
            }
            Err(e) => {
                warn!("skipping edge {a}-{b}: {e}");
                false
            }
        }
    }
}
