// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Radius of the spherical Earth model, in meters. Spherical accuracy is
/// plenty for collection areas a few kilometers across.
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Twice [EARTH_RADIUS], precomputed for the haversine evaluation.
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    EARTH_DIAMETER * h.sqrt().asin()
}

/// Calculates the initial [bearing](https://en.wikipedia.org/wiki/Bearing_(navigation))
/// of the great circle from the first to the second position.
/// Returns degrees in [-180, 180], where 0 is north and +90 is east.
///
/// The bearing is undefined when both positions coincide; callers must
/// not invoke this on zero-length segments (the graph builder rejects them).
pub fn forward_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    y.atan2(x).to_degrees()
}

/// Calculates the signed angle between an incoming and an outgoing bearing.
/// Positive is a turn to the right, negative to the left.
pub fn turn_angle(bearing_in: f64, bearing_out: f64) -> f64 {
    (bearing_out - bearing_in + 180.0).rem_euclid(360.0) - 180.0
}

/// Classification of a junction maneuver by its [turn_angle].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Straight,
    Right,
    Left,
    UTurn,
}

impl TurnKind {
    /// Classifies a turn angle. `straight_threshold` bounds the angles
    /// considered "straight", `u_turn_threshold` the angles considered a
    /// turn-around; the turn-around check takes precedence.
    pub fn classify(angle: f64, straight_threshold: f64, u_turn_threshold: f64) -> TurnKind {
        let abs = angle.abs();
        if abs > u_turn_threshold {
            TurnKind::UTurn
        } else if abs < straight_threshold {
            TurnKind::Straight
        } else if angle > 0.0 {
            TurnKind::Right
        } else {
            TurnKind::Left
        }
    }
}
