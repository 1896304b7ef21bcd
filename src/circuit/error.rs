// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::ConfigError;

/// Error conditions which may abort route generation. All of these are
/// hard failures: no partial route is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// No driveable edges survived filtering and component selection.
    #[error("road network is empty after filtering")]
    EmptyNetwork,

    /// No node has an outgoing edge to start the circuit from.
    #[error("road network has no node with an outgoing edge")]
    Disconnected,

    /// Degree balance could not be restored by duplicating edges.
    /// Unreachable as long as every segment is inserted in both
    /// directions.
    #[error("road network cannot be made Eulerian")]
    NotEulerizable,

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}
