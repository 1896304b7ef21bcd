// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod eulerize;
mod hierholzer;
mod selector;

pub use error::RouteError;
pub use eulerize::ensure_eulerian;
pub use hierholzer::extract_circuit;
pub use selector::{EdgeSelector, FirstUnused, SelectorContext, ShortestEdgeFirst, TurnPreferring};
