// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Node};

/// Nearest-node lookup over the road network via a
/// [k-d tree](https://en.wikipedia.org/wiki/K-d_tree), letting the CLI
/// snap a free-form start position onto the network without a linear scan.
///
/// Splits are made on raw latitude/longitude while distances use
/// [earth_distance], which misbehaves near the antimeridian and the poles
/// or across continent-sized data; collection areas are far smaller than
/// that.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Returns the [Node] closest to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        let mut best = (self.pivot, f64::INFINITY);
        self.nearest_into(lat, lon, false, &mut best);
        best.0
    }

    fn nearest_into(&self, lat: f64, lon: f64, split_on_lon: bool, best: &mut (Node, f64)) {
        let own = earth_distance(lat, lon, self.pivot.lat, self.pivot.lon);
        if own < best.1 {
            *best = (self.pivot, own);
        }

        // Walk the side of the split holding the query first; the other
        // side can only win if the splitting line itself lies closer than
        // the best match so far.
        let query_below = if split_on_lon {
            lon < self.pivot.lon
        } else {
            lat < self.pivot.lat
        };
        let (near, far) = if query_below {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(child) = near {
            child.nearest_into(lat, lon, !split_on_lon, best);
        }

        if let Some(child) = far {
            let (line_lat, line_lon) = if split_on_lon {
                (lat, self.pivot.lon)
            } else {
                (self.pivot.lat, lon)
            };
            if earth_distance(lat, lon, line_lat, line_lon) < best.1 {
                child.nearest_into(lat, lon, !split_on_lon, best);
            }
        }
    }

    /// Collects an iterable of [Nodes](Node) into a tree; `None` when the
    /// iterable is empty.
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a tree over the given nodes, reordering the slice in the
    /// process; `None` when the slice is empty.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::split(nodes, false)
    }

    fn split(nodes: &mut [Node], split_on_lon: bool) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        if split_on_lon {
            nodes.sort_by(|a, b| a.lon.partial_cmp(&b.lon).unwrap());
        } else {
            nodes.sort_by(|a, b| a.lat.partial_cmp(&b.lat).unwrap());
        }

        let mid = nodes.len() / 2;
        let (below, rest) = nodes.split_at_mut(mid);
        let (pivot, above) = rest.split_first_mut()?;
        Some(Self {
            pivot: *pivot,
            left: Self::split(below, !split_on_lon).map(Box::new),
            right: Self::split(above, !split_on_lon).map(Box::new),
        })
    }
}
