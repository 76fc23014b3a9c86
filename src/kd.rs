// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::earth_distance;
use crate::elevation::ElevationSample;

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// used by the [ElevationEstimator](crate::ElevationEstimator) to find the reference
/// samples closest to a point without scanning the whole dataset.
///
/// This implementation assumes euclidean geometry, even though the distance function
/// used is [earth_distance]. This results in undefined behavior when points
/// are close to the ante meridian (180°/-180° longitude) or poles (90°/-90° latitude),
/// or when the data spans multiple continents.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: ElevationSample,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

/// Bounded list of the best candidates found so far, sorted by ascending distance.
struct Candidates {
    k: usize,
    best: Vec<(ElevationSample, f64)>,
}

impl Candidates {
    fn offer(&mut self, sample: ElevationSample, dist: f64) {
        if self.best.len() == self.k && dist >= self.worst() {
            return;
        }
        let idx = self.best.partition_point(|&(_, d)| d <= dist);
        self.best.insert(idx, (sample, dist));
        self.best.truncate(self.k);
    }

    /// Distance which a new candidate has to beat, or infinity if the list is not yet full.
    fn worst(&self) -> f64 {
        if self.best.len() < self.k {
            f64::INFINITY
        } else {
            self.best.last().map_or(f64::INFINITY, |&(_, d)| d)
        }
    }
}

impl KDTree {
    /// Finds the closest sample to the given position.
    pub fn find_nearest(&self, lat: f64, lon: f64) -> ElevationSample {
        let mut candidates = Candidates {
            k: 1,
            best: Vec::with_capacity(2),
        };
        self.search(lat, lon, false, &mut candidates);
        candidates.best.first().map_or(self.pivot, |&(s, _)| s)
    }

    /// Finds up to `k` samples closest to the given position, together with their
    /// distances (in meters), ordered from the closest.
    pub fn find_k_nearest(&self, lat: f64, lon: f64, k: usize) -> Vec<(ElevationSample, f64)> {
        if k == 0 {
            return vec![];
        }
        let mut candidates = Candidates {
            k,
            best: Vec::with_capacity(k + 1),
        };
        self.search(lat, lon, false, &mut candidates);
        candidates.best
    }

    fn search(&self, lat: f64, lon: f64, lon_divides: bool, candidates: &mut Candidates) {
        candidates.offer(
            self.pivot,
            earth_distance(lat, lon, self.pivot.lat, self.pivot.lon),
        );

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < self.pivot.lon
        } else {
            lat < self.pivot.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            branch.search(lat, lon, !lon_divides, candidates);
        }

        if let Some(ref branch) = second {
            // A closer sample is possible in the second branch if and only if
            // the splitting axis is closer than the current worst candidate.
            let (axis_lat, axis_lon) = if lon_divides {
                (lat, self.pivot.lon)
            } else {
                (self.pivot.lat, lon)
            };
            let dist_to_axis = earth_distance(lat, lon, axis_lat, axis_lon);

            if dist_to_axis < candidates.worst() {
                branch.search(lat, lon, !lon_divides, candidates);
            }
        }
    }

    /// Builds a k-d tree from an iterable of [ElevationSamples](ElevationSample).
    pub fn from_iter<I: IntoIterator<Item = ElevationSample>>(samples: I) -> Option<Self> {
        let mut samples = samples.into_iter().collect::<Vec<_>>();
        Self::build(samples.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [ElevationSamples](ElevationSample).
    /// Samples will be reordered in the slice to facility building the tree.
    pub fn build(samples: &mut [ElevationSample]) -> Option<Self> {
        Self::build_impl(samples, false)
    }

    fn build_impl(samples: &mut [ElevationSample], lon_divides: bool) -> Option<Self> {
        match samples.len() {
            0 => None,
            1 => Some(Self {
                pivot: samples[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    samples.sort_by(|a, b| a.lon.total_cmp(&b.lon));
                } else {
                    samples.sort_by(|a, b| a.lat.total_cmp(&b.lat));
                }
                let median = samples.len() / 2;
                let pivot = samples[median];
                let (left, right_and_pivot) = samples.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
    }
}
