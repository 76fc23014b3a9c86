// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes how to interpret OSM tags when converting data into a [GeoGraph](crate::GeoGraph).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the routing profile.
    pub name: &'a str,

    /// Tag key classifying ways, customary "highway". Ways without this key are not
    /// used for routing.
    pub class_key: &'a str,

    /// Importance of specific values of [Profile::class_key]. Ways with values not
    /// in this table get [Profile::bikeway_importance] if they are bikeways (see
    /// [Profile::is_bikeway]), or [Profile::default_importance] otherwise.
    ///
    /// Lower values are preferred; all values must be finite and not less than zero.
    pub classes: &'a [RoadClass<'a>],

    /// Importance of classified ways without a matching [RoadClass].
    pub default_importance: f64,

    /// Importance of bikeways without a matching [RoadClass].
    pub bikeway_importance: f64,

    /// Safety scores of nodes with specific tags. A node gets the score of the
    /// first matching [Hazard], or [Profile::default_safety] if none match.
    pub hazards: &'a [Hazard<'a>],

    /// Safety score of nodes not matching any [Hazard].
    pub default_safety: f64,

    /// Value of [Profile::class_key] marking dedicated bikeways.
    pub bikeway_class: &'a str,

    /// Tag key describing bicycle access, customary "bicycle".
    pub bicycle_key: &'a str,

    /// Values of [Profile::bicycle_key] which mark a way as a bikeway.
    pub bikeway_access: &'a [&'a str],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    pub access: &'a [&'a str],
}

/// Importance of ways with a specific value of [Profile::class_key].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadClass<'a> {
    /// E.g. "motorway", "residential" or "cycleway".
    pub value: &'a str,

    pub importance: f64,
}

/// Safety score of nodes with a specific tag, e.g. traffic signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard<'a> {
    pub key: &'a str,
    pub value: &'a str,

    /// Score in `[0, 1]`; higher values are less safe.
    pub safety: f64,
}

impl<'a> Profile<'a> {
    /// Returns the importance of a way with given tags, or `None` if the way
    /// should not be used for routing - because it is not classified
    /// or is disallowed by the access tags (see [Profile::is_allowed]).
    pub fn way_importance(&self, tags: &HashMap<String, String>) -> Option<f64> {
        let class = tags.get(self.class_key)?;
        if !self.is_allowed(tags) {
            return None;
        }

        let importance = self
            .classes
            .iter()
            .find_map(|c| (c.value == class.as_str()).then_some(c.importance))
            .unwrap_or_else(|| {
                if self.is_bikeway(tags) {
                    self.bikeway_importance
                } else {
                    self.default_importance
                }
            });
        Some(importance)
    }

    /// Checks if the way is a dedicated cycleway, or has bicycle access
    /// explicitly granted ([Profile::bikeway_access]).
    pub fn is_bikeway(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(self.class_key).map(|v| v.as_str()) == Some(self.bikeway_class)
            || tags
                .get(self.bicycle_key)
                .is_some_and(|v| self.bikeway_access.contains(&v.as_str()))
    }

    /// Checks if the way is routable by considering access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }

    /// Returns the safety score of a node with given tags.
    pub fn node_safety(&self, tags: &HashMap<String, String>) -> f64 {
        self.hazards
            .iter()
            .find_map(|h| {
                if tags.get(h.key).map(|v| v.as_str()) == Some(h.value) {
                    Some(h.safety)
                } else {
                    None
                }
            })
            .unwrap_or(self.default_safety)
    }
}

/// Routing [Profile] for bicycles, which avoids major roads and
/// scores intersections by their traffic control.
///
/// | highway                          | importance |
/// |----------------------------------|------------|
/// | motorway, trunk (and links)      | 3          |
/// | primary, secondary (and links)   | 2          |
/// | cycleway                         | 2          |
/// | tertiary (and link), residential, living_street | 1 |
/// | other bikeways                   | 2          |
/// | anything else                    | 1          |
///
/// | node tag                 | safety |
/// |--------------------------|--------|
/// | railway=station          | 0.1    |
/// | highway=traffic_signals  | 0.2    |
/// | highway=crossing         | 0.3    |
/// | highway=stop, give_way   | 0.4    |
/// | anything else            | 0.5    |
pub const BICYCLE_PROFILE: Profile = Profile {
    name: "bicycle",
    class_key: "highway",
    classes: &[
        RoadClass {
            value: "motorway",
            importance: 3.0,
        },
        RoadClass {
            value: "motorway_link",
            importance: 3.0,
        },
        RoadClass {
            value: "trunk",
            importance: 3.0,
        },
        RoadClass {
            value: "trunk_link",
            importance: 3.0,
        },
        RoadClass {
            value: "primary",
            importance: 2.0,
        },
        RoadClass {
            value: "primary_link",
            importance: 2.0,
        },
        RoadClass {
            value: "secondary",
            importance: 2.0,
        },
        RoadClass {
            value: "secondary_link",
            importance: 2.0,
        },
        RoadClass {
            value: "cycleway",
            importance: 2.0,
        },
        RoadClass {
            value: "tertiary",
            importance: 1.0,
        },
        RoadClass {
            value: "tertiary_link",
            importance: 1.0,
        },
        RoadClass {
            value: "residential",
            importance: 1.0,
        },
        RoadClass {
            value: "living_street",
            importance: 1.0,
        },
    ],
    default_importance: 1.0,
    bikeway_importance: 2.0,
    hazards: &[
        Hazard {
            key: "highway",
            value: "traffic_signals",
            safety: 0.2,
        },
        Hazard {
            key: "highway",
            value: "crossing",
            safety: 0.3,
        },
        Hazard {
            key: "highway",
            value: "stop",
            safety: 0.4,
        },
        Hazard {
            key: "highway",
            value: "give_way",
            safety: 0.4,
        },
        Hazard {
            key: "railway",
            value: "station",
            safety: 0.1,
        },
    ],
    default_safety: 0.5,
    bikeway_class: "cycleway",
    bicycle_key: "bicycle",
    bikeway_access: &["yes", "designated"],
    access: &["access", "vehicle", "bicycle"],
};
