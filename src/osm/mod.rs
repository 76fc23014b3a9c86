// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Building a [GeoGraph](crate::GeoGraph) from [OpenStreetMap](https://www.openstreetmap.org/) data.

mod profile;
mod reader;

pub use profile::{Hazard, Profile, RoadClass, BICYCLE_PROFILE};
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, ingest, Error,
    Feature, FileFormat, ImportanceMode, IngestReport, Options, Point, ProximityBounds, Way,
};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::elevation::ElevationSample;
    use crate::{earth_distance, Edge, ElevationEstimator, GeoGraph, Importance, Node};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b) as f64).abs() < 1e-6,
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    const SIMPLE_XML: &[u8] = include_bytes!("reader/test_fixtures/simple.osm");
    const SIMPLE_XML_GZ: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.gz");
    const SIMPLE_XML_BZ2: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.bz2");

    const SIMPLE_REPORT: IngestReport = IngestReport {
        nodes: 8,
        way_edges: 7,
        proximity_edges: 1,
        duplicates: 1,
        skipped_records: 2,
        unresolved_refs: 1,
        ignored_ways: 2,
    };

    fn edge(g: &GeoGraph, a: i64, b: i64) -> &Edge {
        g.edge_between(a, b)
            .unwrap_or_else(|| panic!("missing edge {a}-{b}"))
    }

    fn load(options: &Options, data: &[u8]) -> (GeoGraph, IngestReport) {
        let mut g = GeoGraph::default();
        let report = add_features_from_buffer(&mut g, options, data).unwrap();
        (g, report)
    }

    fn check_simple_graph(g: &GeoGraph) {
        //  -1 ── -2 ── -3
        //   ┆ ╲   │     │ (cycleway)
        //  -7  ╲  │     │
        //   │   ╲ │     │
        //  -6 ── -5 ── -4
        //
        // -1┆-7 is a proximity link, -2──-5 a designated footway,
        // -6─-1 is private and the -1─-2─-5 building outline is not a road.

        assert_eq!(g.node_count(), 8);
        assert_eq!(g.edge_count(), 8);

        for (a, b) in [(-1, -2), (-2, -3), (-3, -4), (-4, -5), (-5, -6), (-5, -2), (-6, -7)] {
            assert_eq!(edge(g, a, b).id, edge(g, b, a).id);
        }

        // Proximity link: -1 and -7 are ~78 m apart
        assert!(!edge(g, -1, -7).bikeway);

        // Private and non-highway ways
        assert!(g.edge_between(-6, -1).is_none());
        assert!(g.edge_between(-1, -5).is_none());

        // Malformed node and the segment referencing it
        assert!(!g.contains_node(-8));

        // Bikeways
        assert!(edge(g, -3, -4).bikeway);
        assert!(edge(g, -2, -5).bikeway);
        assert!(!edge(g, -1, -2).bikeway);
        assert!(!edge(g, -4, -5).bikeway);

        assert_eq!(g.neighbors(-2), vec![-1, -3, -5]);
    }

    #[test]
    fn build_graph_xml() {
        let options = Options::new(&BICYCLE_PROFILE);
        let (g, report) = load(&options, SIMPLE_XML);
        check_simple_graph(&g);
        assert_eq!(report, SIMPLE_REPORT);
    }

    #[test]
    fn build_graph_gz() {
        let options = Options {
            file_format: FileFormat::XmlGz,
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, report) = load(&options, SIMPLE_XML_GZ);
        check_simple_graph(&g);
        assert_eq!(report, SIMPLE_REPORT);
    }

    #[test]
    fn build_graph_bz2() {
        let options = Options {
            file_format: FileFormat::XmlBz2,
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, report) = load(&options, SIMPLE_XML_BZ2);
        check_simple_graph(&g);
        assert_eq!(report, SIMPLE_REPORT);
    }

    #[test]
    fn build_graph_from_io() {
        let mut g = GeoGraph::default();
        let options = Options::new(&BICYCLE_PROFILE);
        let report =
            add_features_from_io(&mut g, &options, std::io::Cursor::new(SIMPLE_XML)).unwrap();
        check_simple_graph(&g);
        assert_eq!(report, SIMPLE_REPORT);
    }

    #[test]
    fn build_graph_from_file() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/osm/reader/test_fixtures/simple.osm.gz"
        );
        let mut g = GeoGraph::default();
        let options = Options {
            file_format: FileFormat::from_path(path),
            ..Options::new(&BICYCLE_PROFILE)
        };
        let report = add_features_from_file(&mut g, &options, path).unwrap();
        check_simple_graph(&g);
        assert_eq!(report, SIMPLE_REPORT);
    }

    #[test]
    fn missing_file() {
        let mut g = GeoGraph::default();
        let options = Options::new(&BICYCLE_PROFILE);
        let err = add_features_from_file(&mut g, &options, "does/not/exist.osm").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(g.is_empty());
    }

    #[test]
    fn node_attributes() {
        let options = Options {
            group_tag: Some("comuna"),
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, _) = load(&options, SIMPLE_XML);

        let safety = |id| g.node(id).unwrap().safety;
        assert_eq!(safety(-1), 0.2);
        assert_eq!(safety(-2), 0.3);
        assert_eq!(safety(-3), 0.5);
        assert_eq!(safety(-4), 0.1);
        assert_eq!(safety(-5), 0.4);
        assert_eq!(safety(-6), 0.5);

        let elevation = |id| g.node(id).unwrap().elevation;
        assert_eq!(elevation(-1), 0.0);
        assert_eq!(elevation(-3), 610.0);
        assert_eq!(elevation(-4), 605.0);

        let group = |id| g.node(id).unwrap().group.clone();
        assert_eq!(group(-1).as_deref(), Some("Santiago"));
        assert_eq!(group(-2).as_deref(), Some("Santiago"));
        assert_eq!(group(-3).as_deref(), Some("Providencia"));
        assert_eq!(group(-5), None);
    }

    #[test]
    fn groups_not_assigned_without_group_tag() {
        let (g, _) = load(&Options::new(&BICYCLE_PROFILE), SIMPLE_XML);
        assert!(g.nodes().all(|n| n.group.is_none()));
    }

    #[test]
    fn estimated_elevation() {
        let estimator = ElevationEstimator::new([
            ElevationSample {
                lat: -33.45,
                lon: -70.65,
                elevation: 570.0,
            },
            ElevationSample {
                lat: -33.46,
                lon: -70.66,
                elevation: 590.0,
            },
        ]);
        let options = Options {
            elevation: Some(&estimator),
            elevation_neighbors: 1,
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, _) = load(&options, SIMPLE_XML);

        let elevation = |id| g.node(id).unwrap().elevation;
        assert_eq!(elevation(-1), 570.0);
        assert_eq!(elevation(-7), 570.0);
        assert_eq!(elevation(-9), 590.0);

        // Explicit "ele" always wins
        assert_eq!(elevation(-3), 610.0);
        assert_eq!(elevation(-4), 605.0);
    }

    #[test]
    fn weighted_distance_importance() {
        let (g, _) = load(&Options::new(&BICYCLE_PROFILE), SIMPLE_XML);

        let d = earth_distance(-33.45, -70.65, -33.45, -70.648);
        match edge(&g, -1, -2).importance {
            Importance::PrecomputedCost(cost) => assert_almost_eq!(cost, d * 1.5),
            other => panic!("unexpected importance: {other:?}"),
        }

        let d = earth_distance(-33.45, -70.65, -33.4507, -70.65);
        match edge(&g, -1, -7).importance {
            Importance::PrecomputedCost(cost) => assert_almost_eq!(cost, d * 1.7),
            other => panic!("unexpected importance: {other:?}"),
        }
    }

    #[test]
    fn road_class_importance() {
        let options = Options {
            importance: ImportanceMode::RoadClass,
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, _) = load(&options, SIMPLE_XML);

        let importance = |a, b| edge(&g, a, b).importance;
        assert_eq!(importance(-1, -2), Importance::Categorical(1.0)); // residential
        assert_eq!(importance(-3, -4), Importance::Categorical(2.0)); // cycleway
        assert_eq!(importance(-4, -5), Importance::Categorical(2.0)); // primary
        assert_eq!(importance(-5, -2), Importance::Categorical(2.0)); // designated footway
        assert_eq!(importance(-6, -7), Importance::Categorical(1.0)); // service
        assert_eq!(importance(-1, -7), Importance::Categorical(1.0)); // proximity
    }

    #[test]
    fn edge_ids_in_order_of_creation() {
        let (g, _) = load(&Options::new(&BICYCLE_PROFILE), SIMPLE_XML);
        assert_eq!(edge(&g, -1, -2).id, 1);
        assert_eq!(edge(&g, -2, -3).id, 2);
        assert_eq!(edge(&g, -3, -4).id, 3);
        assert_eq!(edge(&g, -4, -5).id, 4);
        assert_eq!(edge(&g, -5, -6).id, 5);
        assert_eq!(edge(&g, -5, -2).id, 6);
        assert_eq!(edge(&g, -6, -7).id, 7);
        assert_eq!(edge(&g, -1, -7).id, 8);
    }

    #[test]
    fn reingestion_creates_no_duplicates() {
        let options = Options::new(&BICYCLE_PROFILE);
        let (mut g, _) = load(&options, SIMPLE_XML);
        let before = g.clone();

        let report = add_features_from_buffer(&mut g, &options, SIMPLE_XML).unwrap();
        assert_eq!(
            report,
            IngestReport {
                nodes: 0,
                way_edges: 0,
                proximity_edges: 0,
                duplicates: 8,
                skipped_records: 2,
                unresolved_refs: 1,
                ignored_ways: 2,
            }
        );
        assert_eq!(g, before);
    }

    #[test]
    fn edge_ids_continue_after_existing_edges() {
        let mut g = GeoGraph::default();
        g.add_node(Node::new(1, 10.0, 10.0));
        g.add_node(Node::new(2, 10.0, 10.1));
        g.add_edge(Edge::new(100, 1, 2)).unwrap();

        load_into(&mut g, &Options::new(&BICYCLE_PROFILE));

        assert_eq!(g.edge_count(), 9);
        assert_eq!(edge(&g, -1, -2).id, 101);
        assert_eq!(g.max_edge_id(), 108);
    }

    fn load_into(g: &mut GeoGraph, options: &Options) {
        add_features_from_buffer(g, options, SIMPLE_XML).unwrap();
    }

    #[test]
    fn bbox() {
        let options = Options {
            bbox: [-70.651, -33.453, -70.645, -33.449],
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, report) = load(&options, SIMPLE_XML);
        assert_eq!(report.nodes, 7);
        assert!(!g.contains_node(-9));
        assert_eq!(g.edge_count(), 8);
    }

    #[test]
    fn proximity_bounds() {
        let no_sources = Options {
            proximity: ProximityBounds {
                max_sources: 0,
                ..ProximityBounds::default()
            },
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (g, report) = load(&no_sources, SIMPLE_XML);
        assert_eq!(report.proximity_edges, 0);
        assert!(g.edge_between(-1, -7).is_none());

        let short = Options {
            proximity: ProximityBounds {
                max_distance: 50.0,
                ..ProximityBounds::default()
            },
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (_, report) = load(&short, SIMPLE_XML);
        assert_eq!(report.proximity_edges, 0);

        // -7 is the 7th node, beyond a window of 5 nodes after -1
        let narrow = Options {
            proximity: ProximityBounds {
                window: 5,
                ..ProximityBounds::default()
            },
            ..Options::new(&BICYCLE_PROFILE)
        };
        let (_, report) = load(&narrow, SIMPLE_XML);
        assert_eq!(report.proximity_edges, 0);
    }

    fn point(id: i64, lat: f64, lon: f64) -> Feature {
        Feature::Point(Point {
            id,
            lat,
            lon,
            ele: None,
            tags: HashMap::default(),
        })
    }

    fn way(id: i64, refs: &[i64], tags: HashMap<String, String>) -> Feature {
        Feature::Way(Way {
            id,
            refs: refs.to_vec(),
            tags,
        })
    }

    #[test]
    fn ingest_records() {
        let features = vec![
            point(1, -33.45, -70.65),
            point(2, -33.46, -70.66),
            point(3, -33.47, -70.67),
            point(4, -33.48, -70.68),
            way(10, &[1, 2, 3, 2, 1], tags! {"highway": "residential"}),
            way(11, &[3, 2, 4, 3], tags! {"highway": "cycleway"}),
            way(12, &[1, 1, 5, 4], tags! {"highway": "tertiary"}),
        ];

        let mut g = GeoGraph::default();
        let report = ingest(&mut g, &Options::new(&BICYCLE_PROFILE), features);

        // Distinct pairs: 1-2, 2-3, 2-4, 3-4
        assert_eq!(g.edge_count(), 4);
        assert_eq!(report.way_edges, 4);
        assert_eq!(report.duplicates, 3);
        assert_eq!(report.unresolved_refs, 2);
        assert_eq!(report.proximity_edges, 0);

        // First way wins
        assert!(!edge(&g, 2, 3).bikeway);
        assert!(edge(&g, 2, 4).bikeway);
    }

    #[test]
    fn ingest_skips_invalid_positions() {
        let features = vec![
            point(1, -33.45, -70.65),
            point(2, f64::NAN, -70.66),
            point(3, 500.0, -70.67),
            point(4, -33.48, f64::INFINITY),
            point(0, -33.49, -70.69),
            way(10, &[1, 2, 3], tags! {"highway": "residential"}),
        ];
        let options = Options {
            importance: ImportanceMode::RoadClass,
            ..Options::new(&BICYCLE_PROFILE)
        };

        let mut g = GeoGraph::default();
        let report = ingest(&mut g, &options, features);

        assert_eq!(report.nodes, 1);
        assert_eq!(report.skipped_records, 4);
        assert_eq!(report.unresolved_refs, 2);
        assert_eq!(report.way_edges, 0);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 0);
        assert!(!g.contains_node(2));
        assert!(!g.contains_node(3));
        assert!(!g.contains_node(0));
    }

    #[test]
    fn ingest_order_does_not_matter_for_dedup() {
        let mut features = vec![
            point(1, -33.45, -70.65),
            point(2, -33.46, -70.66),
            point(3, -33.47, -70.67),
            way(10, &[1, 2, 3], tags! {"highway": "residential"}),
            way(11, &[3, 2, 1], tags! {"highway": "residential"}),
        ];

        let mut g1 = GeoGraph::default();
        ingest(&mut g1, &Options::new(&BICYCLE_PROFILE), features.clone());

        features.reverse();
        let mut g2 = GeoGraph::default();
        ingest(&mut g2, &Options::new(&BICYCLE_PROFILE), features);

        assert_eq!(g1.edge_count(), 2);
        assert_eq!(g2.edge_count(), 2);
    }
}
