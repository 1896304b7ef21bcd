// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::geodesic::TurnKind;

/// Length multipliers applied when scoring an outgoing edge by the
/// maneuver required to enter it. Lower is preferred; the collection arm
/// sits on the right side of the vehicle, hence right turns must stay
/// the cheapest and turn-arounds the most expensive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnMultipliers {
    pub straight: f64,
    pub right: f64,
    pub left: f64,
    pub u_turn: f64,
}

impl Default for TurnMultipliers {
    fn default() -> Self {
        Self {
            straight: 1.0,
            right: 0.5,
            left: 2.0,
            u_turn: 3.0,
        }
    }
}

/// Describes how OSM data is reduced to a road network and how the
/// circuit walker scores maneuvers.
///
/// The defaults reproduce the standard residential-collection setup;
/// every field can be overridden before handing the value to
/// [generate_route](crate::generate_route).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `highway` values accepted as driveable streets.
    pub allowed_highways: BTreeSet<String>,

    /// `highway` values forcibly rejected. Disjoint from
    /// [Config::allowed_highways] by default; kept as a separate check so
    /// broadening the allowed set can never accidentally admit these.
    pub excluded_highways: BTreeSet<String>,

    /// `service` values which reject a way (parking infrastructure).
    pub excluded_service_values: BTreeSet<String>,

    /// `access` values which reject a way.
    pub excluded_access_values: BTreeSet<String>,

    /// The `oneway` tag is read but deliberately not routed on: servicing
    /// both curbs requires driving every street in both directions, which
    /// may violate one-way restrictions. Reports must disclose this.
    /// Only `true` is supported.
    pub ignore_oneway: bool,

    pub turn_multipliers: TurnMultipliers,

    /// Turn angles (degrees, absolute) below this are "straight".
    pub straight_threshold_deg: f64,

    /// Turn angles (degrees, absolute) above this are turn-arounds.
    pub u_turn_threshold_deg: f64,

    /// Assumed average speed, used only for the drive-time estimate.
    /// Never affects routing.
    pub average_speed_kmh: f64,

    /// Node to start and end the circuit at. When absent, or when the node
    /// is not part of the routed component, the smallest node id with an
    /// outgoing edge is used.
    pub start_node_id: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        fn set(values: &[&str]) -> BTreeSet<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            allowed_highways: set(&[
                "residential",
                "unclassified",
                "service",
                "tertiary",
                "secondary",
            ]),
            excluded_highways: set(&[
                "footway",
                "cycleway",
                "steps",
                "path",
                "track",
                "pedestrian",
            ]),
            excluded_service_values: set(&["parking_aisle", "parking"]),
            excluded_access_values: set(&["private", "no"]),
            ignore_oneway: true,
            turn_multipliers: TurnMultipliers::default(),
            straight_threshold_deg: 10.0,
            u_turn_threshold_deg: 150.0,
            average_speed_kmh: 30.0,
            start_node_id: None,
        }
    }
}

/// Error conditions for nonsensical [Config] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("turn multipliers must be finite and non-negative")]
    InvalidMultiplier,

    #[error("turn multipliers must order right < straight < left < u-turn")]
    MultiplierOrder,

    #[error("turn thresholds must satisfy 0 < straight < u-turn < 180")]
    InvalidThreshold,

    #[error("average speed must be a positive number of km/h")]
    InvalidSpeed,

    #[error("one-way restrictions must be ignored for both-curb coverage")]
    OnewayNotIgnored,
}

impl Config {
    /// Validates the value. Must be checked before routing; the scoring
    /// and classification helpers assume a valid configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.turn_multipliers;
        let all = [m.straight, m.right, m.left, m.u_turn];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidMultiplier);
        }
        if !(m.right < m.straight && m.straight < m.left && m.left < m.u_turn) {
            return Err(ConfigError::MultiplierOrder);
        }

        if !(self.straight_threshold_deg > 0.0
            && self.straight_threshold_deg < self.u_turn_threshold_deg
            && self.u_turn_threshold_deg < 180.0)
        {
            return Err(ConfigError::InvalidThreshold);
        }

        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(ConfigError::InvalidSpeed);
        }

        if !self.ignore_oneway {
            return Err(ConfigError::OnewayNotIgnored);
        }

        Ok(())
    }

    /// Classifies a turn angle under the configured thresholds.
    pub fn classify_turn(&self, angle: f64) -> TurnKind {
        TurnKind::classify(
            angle,
            self.straight_threshold_deg,
            self.u_turn_threshold_deg,
        )
    }

    /// Returns the length multiplier for a maneuver.
    pub fn turn_multiplier(&self, kind: TurnKind) -> f64 {
        match kind {
            TurnKind::Straight => self.turn_multipliers.straight,
            TurnKind::Right => self.turn_multipliers.right,
            TurnKind::Left => self.turn_multipliers.left,
            TurnKind::UTurn => self.turn_multipliers.u_turn,
        }
    }
}
