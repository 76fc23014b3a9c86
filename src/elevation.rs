// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Elevation estimation from a set of reference samples.

use std::fs::File;
use std::io;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::KDTree;

/// Offset added to sample distances before inverting them,
/// so that a sample exactly at the queried position doesn't divide by zero.
const DISTANCE_EPSILON: f64 = 1e-8;

/// Recommended number of reference samples to interpolate from.
pub const DEFAULT_NEIGHBORS: usize = 3;

/// A known elevation at a specific position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElevationSample {
    pub lat: f64,
    pub lon: f64,

    /// Elevation above sea level, in meters.
    #[serde(rename = "ele")]
    pub elevation: f64,
}

/// Error which can occur when loading reference samples.
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Estimates elevation of arbitrary points by
/// [inverse distance weighting](https://en.wikipedia.org/wiki/Inverse_distance_weighting)
/// of the nearest reference samples.
///
/// An estimator without any samples is valid: every estimate is then `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ElevationEstimator {
    tree: Option<KDTree>,
    len: usize,
}

impl ElevationEstimator {
    /// Builds an estimator from a set of reference samples.
    /// Samples with non-finite coordinates or elevation are dropped.
    pub fn new<I: IntoIterator<Item = ElevationSample>>(samples: I) -> Self {
        let mut samples = samples
            .into_iter()
            .filter(|s| s.lat.is_finite() && s.lon.is_finite() && s.elevation.is_finite())
            .collect::<Vec<_>>();
        Self {
            len: samples.len(),
            tree: KDTree::build(&mut samples),
        }
    }

    /// Loads reference samples from a CSV with `lat`, `lon` and `ele` columns.
    /// Rows which can't be parsed are skipped with a warning.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, ElevationError> {
        let mut r = csv::Reader::from_reader(reader);

        // Surface a missing/unreadable header as an error, instead of skipping every row
        r.headers()?;

        let samples = r
            .deserialize::<ElevationSample>()
            .enumerate()
            .filter_map(|(idx, row)| match row {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("elevation data: skipping row {}: {}", idx + 1, e);
                    None
                }
            })
            .collect::<Vec<_>>();

        Ok(Self::new(samples))
    }

    /// Loads reference samples from a CSV file, see [ElevationEstimator::from_csv_reader].
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, ElevationError> {
        let f = File::open(path)?;
        Self::from_csv_reader(io::BufReader::new(f))
    }

    /// Returns the number of reference samples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Estimates the elevation at the provided position from up to `k` nearest
    /// reference samples. `k == 0` is treated as 1.
    ///
    /// Returns `0.0` (and logs a warning) if there are no reference samples.
    pub fn estimate(&self, lat: f64, lon: f64, k: usize) -> f64 {
        let Some(tree) = &self.tree else {
            warn!("no elevation reference data - assuming 0 m at ({lat}, {lon})");
            return 0.0;
        };

        if k <= 1 {
            return tree.find_nearest(lat, lon).elevation;
        }

        let (weighted, total) = tree.find_k_nearest(lat, lon, k).into_iter().fold(
            (0.0, 0.0),
            |(weighted, total), (sample, dist)| {
                let w = 1.0 / (dist + DISTANCE_EPSILON);
                (weighted + w * sample.elevation, total + w)
            },
        );
        weighted / total
    }
}
