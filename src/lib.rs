// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

pub mod circuit;
mod components;
mod config;
mod engine;
mod geodesic;
mod graph;
pub mod gpx;
pub mod kd;
pub mod osm;
pub mod report;

pub use circuit::RouteError;
pub use components::ComponentCensus;
pub use config::{Config, ConfigError, TurnMultipliers};
pub use engine::{generate_route, RouteResult, RouteStats};
pub use geodesic::{earth_distance, forward_bearing, turn_angle, TurnKind};
pub use graph::{DirectedEdge, RouteGraph};

/// Represents a point of the road network, taken directly from an
/// [OSM node](https://wiki.openstreetmap.org/wiki/Node).
///
/// Latitude and longitude are WGS-84 decimal degrees. Nodes with
/// out-of-range coordinates are dropped before graph construction;
/// see [generate_route].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}
