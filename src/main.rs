use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use bikeroute::elevation::ElevationError;
use bikeroute::osm::{FileFormat, ImportanceMode};
use bikeroute::routing::{Algorithm, CostWeights, RouteRequest};
use bikeroute::snapshot::SnapshotError;
use bikeroute::{ElevationEstimator, GeoGraph};
use clap::{Parser, ValueEnum};
use log::info;

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("{0}: {1}")]
    Osm(PathBuf, #[source] bikeroute::osm::Error),

    #[error("{0}: {1}")]
    Elevation(PathBuf, #[source] ElevationError),

    #[error("{0}: {1}")]
    ScoresIo(PathBuf, #[source] io::Error),

    #[error("{0}: {1}")]
    ScoresJson(PathBuf, #[source] serde_json::Error),

    #[error("{0}: {1}")]
    Snapshot(PathBuf, #[source] SnapshotError),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Dijkstra,
    Astar,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImportanceArg {
    /// Categorical weight of the road class
    RoadClass,

    /// Segment length scaled by the safety of its endpoints
    WeightedDistance,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Xml,
    XmlGz,
    XmlBz2,
}

/// Finds a bicycle route between two OSM nodes and prints it as {"ruta": [...]}
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Id of the start node
    start: i64,

    /// Id of the goal node
    goal: i64,

    #[arg(long, value_enum, default_value_t = AlgorithmArg::Astar)]
    algorithm: AlgorithmArg,

    /// Weight of the distance (in meters)
    #[arg(long, default_value_t = 1.0)]
    w_dist: f64,

    /// Weight of the elevation gain (in meters)
    #[arg(long, default_value_t = 0.0)]
    w_elev: f64,

    /// Weight of the segment importance
    #[arg(long, default_value_t = 1.0)]
    w_seg: f64,

    /// Format of the OSM file, guessed from its extension by default
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long, value_enum, default_value_t = ImportanceArg::WeightedDistance)]
    importance: ImportanceArg,

    /// CSV file with lat,lon,ele columns for nodes without elevation
    #[arg(long)]
    elevation: Option<PathBuf>,

    /// JSON object mapping area names to safety scores in [0, 1]
    #[arg(long)]
    safety_scores: Option<PathBuf>,

    /// OSM tag with the area name of a node
    #[arg(long, default_value = "comuna")]
    group_tag: String,

    /// Write the graph as a JSON snapshot to this file
    #[arg(long)]
    export_graph: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let estimator = match &cli.elevation {
        Some(path) => Some(
            ElevationEstimator::from_csv_file(path)
                .map_err(|e| LoadError::Elevation(path.clone(), e))?,
        ),
        None => None,
    };

    let mut g = load_graph(&cli, estimator.as_ref())?;

    if let Some(path) = &cli.safety_scores {
        let scores = load_scores(path)?;
        bikeroute::safety::annotate_safety(&mut g, &scores);
    }

    if let Some(path) = &cli.export_graph {
        bikeroute::snapshot::save(&g, path).map_err(|e| LoadError::Snapshot(path.clone(), e))?;
        info!("graph written to {}", path.display());
    }

    let request = RouteRequest {
        start: cli.start,
        goal: cli.goal,
        algorithm: match cli.algorithm {
            AlgorithmArg::Dijkstra => Algorithm::Dijkstra,
            AlgorithmArg::Astar => Algorithm::AStar,
        },
        weights: CostWeights::new(cli.w_dist, cli.w_elev, cli.w_seg),
        heuristic_weight: None,
    };
    let route = bikeroute::routing::find_route(&g, &request)?;

    match route.cost {
        Some(cost) => info!("route over {} nodes, cost {cost:.2}", route.nodes.len()),
        None => info!("no route between {} and {}", cli.start, cli.goal),
    }
    println!("{}", serde_json::to_string(&route)?);

    Ok(())
}

fn load_graph(cli: &Cli, estimator: Option<&ElevationEstimator>) -> Result<GeoGraph, LoadError> {
    let mut g = GeoGraph::default();
    let options = bikeroute::osm::Options {
        file_format: match cli.format {
            Some(FormatArg::Xml) => FileFormat::Xml,
            Some(FormatArg::XmlGz) => FileFormat::XmlGz,
            Some(FormatArg::XmlBz2) => FileFormat::XmlBz2,
            None => FileFormat::from_path(&cli.osm_file),
        },
        elevation: estimator,
        importance: match cli.importance {
            ImportanceArg::RoadClass => ImportanceMode::RoadClass,
            ImportanceArg::WeightedDistance => ImportanceMode::WeightedDistance,
        },
        group_tag: Some(cli.group_tag.as_str()),
        ..bikeroute::osm::Options::new(&bikeroute::osm::BICYCLE_PROFILE)
    };

    match bikeroute::osm::add_features_from_file(&mut g, &options, &cli.osm_file) {
        Ok(_) => Ok(g),
        Err(e) => Err(LoadError::Osm(cli.osm_file.clone(), e)),
    }
}

fn load_scores(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    let f = File::open(path).map_err(|e| LoadError::ScoresIo(path.to_path_buf(), e))?;
    serde_json::from_reader(io::BufReader::new(f))
        .map_err(|e| LoadError::ScoresJson(path.to_path_buf(), e))
}
