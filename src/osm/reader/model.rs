// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Represents an [OSM node](https://wiki.openstreetmap.org/wiki/Node).
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,

    /// Elevation from the `ele` attribute, if the source provided one.
    pub ele: Option<f64>,

    pub tags: HashMap<String, String>,
}

impl Point {
    /// Returns the explicit elevation of this point, preferring the `ele` attribute
    /// over the [`ele` tag](https://wiki.openstreetmap.org/wiki/Key:ele).
    pub fn elevation(&self) -> Option<f64> {
        self.ele
            .or_else(|| self.tags.get("ele").and_then(|v| parse_ele(v)))
            .filter(|e| e.is_finite())
    }
}

/// Parses values like "570", "570.5" or "570 m".
fn parse_ele(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_suffix('m').unwrap_or(value).trim_end();
    value.parse().ok()
}

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub refs: Vec<i64>,
    pub tags: HashMap<String, String>,
}

/// Union over [OSM features/elements](https://wiki.openstreetmap.org/wiki/Elements)
/// relevant for routing. Relations are not represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Point(Point),
    Way(Way),
}
