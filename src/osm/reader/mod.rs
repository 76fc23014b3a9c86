// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::convert::Infallible;
use std::fs::File;
use std::io;
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::osm::Profile;
use crate::{ElevationEstimator, GeoGraph};

mod graph_builder;
mod model;
mod xml;

pub use model::{Feature, Point, Way};

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    #[default]
    Xml,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the file extension: `.gz` and `.bz2`
    /// are compressed, anything else is assumed to be plain XML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::XmlGz,
            Some("bz2") => Self::XmlBz2,
            _ => Self::Xml,
        }
    }
}

/// Representation of [Importance](crate::Importance) assigned to created edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportanceMode {
    /// [Categorical](crate::Importance::Categorical) weight of the road class,
    /// as defined by the [Profile].
    RoadClass,

    /// [Precomputed cost](crate::Importance::PrecomputedCost): segment length (in meters)
    /// scaled by `1 + safety_a + safety_b` of its endpoints.
    #[default]
    WeightedDistance,
}

/// Limits of the pass linking nearby nodes which are not connected by any way.
///
/// Only the first `max_sources` nodes (in order of appearance) are considered,
/// each paired with up to `window` nodes following it. Pairs closer than
/// `max_distance` meters and not yet connected get an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityBounds {
    pub max_sources: usize,
    pub window: usize,
    pub max_distance: f64,
}

impl Default for ProximityBounds {
    fn default() -> Self {
        Self {
            max_sources: 100,
            window: 30,
            max_distance: 100.0,
        }
    }
}

/// Additional controls for interpreting OSM data as a routing [GeoGraph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// How OSM features should be interpreted and converted into a [GeoGraph].
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],

    /// Reference data for nodes without an explicit `ele` attribute or tag.
    /// Without it, such nodes get an elevation of zero.
    pub elevation: Option<&'a ElevationEstimator>,

    /// Number of nearest reference samples used by [ElevationEstimator::estimate].
    pub elevation_neighbors: usize,

    pub importance: ImportanceMode,

    pub proximity: ProximityBounds,

    /// Tag key whose value becomes the [group](crate::Node::group) of a node,
    /// e.g. `"comuna"`.
    pub group_tag: Option<&'a str>,
}

impl<'a> Options<'a> {
    /// Creates [Options] with the provided [Profile] and defaults for everything else.
    pub fn new(profile: &'a Profile<'a>) -> Self {
        Self {
            profile,
            file_format: FileFormat::default(),
            bbox: [0.0; 4],
            elevation: None,
            elevation_neighbors: crate::elevation::DEFAULT_NEIGHBORS,
            importance: ImportanceMode::default(),
            proximity: ProximityBounds::default(),
            group_tag: None,
        }
    }
}

/// Failure of the input stream. Problems with individual features never
/// cause an error; these are logged and counted in [IngestReport].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Summary of a single ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of nodes added to the graph.
    pub nodes: usize,

    /// Number of edges created from consecutive way references.
    pub way_edges: usize,

    /// Number of edges created by linking nearby nodes (see [ProximityBounds]).
    pub proximity_edges: usize,

    /// Number of way segments skipped, as their nodes were already connected.
    pub duplicates: usize,

    /// Number of malformed nodes and ways.
    pub skipped_records: usize,

    /// Number of way segments skipped due to a reference to an unknown node.
    pub unresolved_refs: usize,

    /// Number of ways not used for routing (unclassified or with prohibited access).
    pub ignored_ways: usize,
}

/// Internal trait for objects which can stream [osm features](Feature)
/// from an underlying source.
trait FeatureReader {
    type Error;
    fn next(&mut self) -> Result<Option<Feature>, Self::Error>;

    /// Returns the number of malformed features dropped by the reader so far.
    fn skipped(&self) -> usize {
        0
    }
}

/// [FeatureReader] over already-parsed features.
struct Features<I>(I);

impl<I: Iterator<Item = Feature>> FeatureReader for Features<I> {
    type Error = Infallible;

    fn next(&mut self) -> Result<Option<Feature>, Self::Error> {
        Ok(self.0.next())
    }
}

/// Adds already-parsed OSM features into a [GeoGraph] as per the provided [Options].
/// [Options::file_format] is ignored.
pub fn ingest<I: IntoIterator<Item = Feature>>(
    g: &mut GeoGraph,
    options: &Options<'_>,
    features: I,
) -> IngestReport {
    match GraphBuilder::new(g, options).add_features(Features(features.into_iter())) {
        Ok(report) => report,
        Err(never) => match never {},
    }
}

/// Parse OSM features from a reader into a [GeoGraph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn add_features_from_io<R: io::Read>(
    g: &mut GeoGraph,
    options: &Options<'_>,
    reader: R,
) -> Result<IngestReport, Error> {
    let report = match options.file_format {
        FileFormat::Xml => {
            let b = io::BufReader::new(reader);
            let r = xml::Reader::from_io(b);
            GraphBuilder::new(g, options).add_features(r)?
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            let b = io::BufReader::new(d);
            let r = xml::Reader::from_io(b);
            GraphBuilder::new(g, options).add_features(r)?
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            let b = io::BufReader::new(d);
            let r = xml::Reader::from_io(b);
            GraphBuilder::new(g, options).add_features(r)?
        }
    };
    Ok(report)
}

/// Parse OSM features from a file at the provided path into a [GeoGraph] as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    g: &mut GeoGraph,
    options: &Options<'_>,
    path: P,
) -> Result<IngestReport, Error> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse OSM features from a static buffer into a [GeoGraph] as per the provided [Options].
pub fn add_features_from_buffer(
    g: &mut GeoGraph,
    options: &Options<'_>,
    data: &[u8],
) -> Result<IngestReport, Error> {
    if options.file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data);
        Ok(GraphBuilder::new(g, options).add_features(r)?)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        add_features_from_io(g, options, cursor)
    }
}
