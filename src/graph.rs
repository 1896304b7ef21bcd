// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::BTreeMap;
use std::collections::BTreeSet;

use crate::{earth_distance, Node};

/// Represents a single directed traversal between two adjacent road-network
/// nodes. Its index in [RouteGraph::edges] is the edge's identity;
/// parallel edges between the same ordered pair are distinct entries.
///
/// Edges duplicated to restore degree balance reuse the geometry of an
/// existing record and are indistinguishable from it in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedEdge {
    pub from: i64,
    pub to: i64,
    pub length_m: f64,
}

/// Represents a road network as a directed multigraph.
///
/// Edges live in a dense array with stable indices; per-node adjacency is
/// a sorted map of edge-index lists. Nodes hold no edge references and
/// edges hold node ids only, so graph-changing passes can rebuild the
/// adjacency from the edge array alone.
///
/// Every segment added through [RouteGraph::add_segment] inserts one edge
/// in each direction, so each node's in- and out-degree grow in lockstep
/// and the graph admits a closed Eulerian circuit as soon as it is
/// weakly connected.
#[derive(Debug, Default, Clone)]
pub struct RouteGraph {
    nodes: BTreeMap<i64, Node>,
    edges: Vec<DirectedEdge>,
    adjacency: BTreeMap<i64, Vec<usize>>,
}

impl RouteGraph {
    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of directed edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph,
    /// in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all node ids, in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.keys().copied()
    }

    /// Retrieves a [Node] with the provided id.
    pub fn node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).copied()
    }

    /// Returns all edge records, indexed by edge identity.
    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    /// Retrieves the edge with the given index. Panics on unknown indices.
    pub fn edge(&self, idx: usize) -> DirectedEdge {
        self.edges[idx]
    }

    /// Returns the indices of all edges outgoing from a node,
    /// in insertion order.
    pub fn out_edges(&self, id: i64) -> &[usize] {
        self.adjacency
            .get(&id)
            .map(|e| e.as_slice())
            .unwrap_or_default()
    }

    /// Adds a road segment between two nodes: one edge in each direction,
    /// both with the great-circle length of the segment. The endpoints are
    /// registered in the node table on first use.
    ///
    /// Zero-length segments (`a.id == b.id`) must be skipped by the caller.
    pub fn add_segment(&mut self, a: Node, b: Node) {
        assert_ne!(a.id, b.id);

        let length_m = earth_distance(a.lat, a.lon, b.lat, b.lon);
        self.nodes.entry(a.id).or_insert(a);
        self.nodes.entry(b.id).or_insert(b);
        self.push_edge(DirectedEdge {
            from: a.id,
            to: b.id,
            length_m,
        });
        self.push_edge(DirectedEdge {
            from: b.id,
            to: a.id,
            length_m,
        });
    }

    /// Appends a copy of an existing edge record, returning the new index.
    /// Used when restoring degree balance; the duplicate carries the same
    /// geometry as the original.
    pub fn duplicate_edge(&mut self, idx: usize) -> usize {
        let copy = self.edges[idx];
        self.push_edge(copy)
    }

    fn push_edge(&mut self, edge: DirectedEdge) -> usize {
        let idx = self.edges.len();
        self.adjacency.entry(edge.from).or_default().push(idx);
        self.edges.push(edge);
        idx
    }

    /// Keeps only the nodes in `keep` and the edges with both endpoints in
    /// it. Edge indices are re-assigned; any previously-held index is
    /// invalidated.
    pub fn retain_nodes(&mut self, keep: &BTreeSet<i64>) {
        self.nodes.retain(|id, _| keep.contains(id));
        self.edges
            .retain(|e| keep.contains(&e.from) && keep.contains(&e.to));

        self.adjacency.clear();
        for (idx, edge) in self.edges.iter().enumerate() {
            self.adjacency.entry(edge.from).or_default().push(idx);
        }
    }

    /// Returns, for every node with unequal degrees, the difference
    /// `out_degree - in_degree`. Empty iff the graph is degree-balanced.
    pub fn degree_imbalances(&self) -> BTreeMap<i64, i64> {
        let mut diff: BTreeMap<i64, i64> = BTreeMap::new();
        for edge in &self.edges {
            *diff.entry(edge.from).or_default() += 1;
            *diff.entry(edge.to).or_default() -= 1;
        }
        diff.retain(|_, d| *d != 0);
        diff
    }

    /// Returns the undirected neighbor sets of every node. Parallel edges
    /// and direction collapse into a single neighbor entry.
    pub fn undirected_neighbors(&self) -> BTreeMap<i64, BTreeSet<i64>> {
        let mut neighbors: BTreeMap<i64, BTreeSet<i64>> =
            self.nodes.keys().map(|&id| (id, BTreeSet::new())).collect();
        for edge in &self.edges {
            neighbors.entry(edge.from).or_default().insert(edge.to);
            neighbors.entry(edge.to).or_default().insert(edge.from);
        }
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! n {
        ($id:expr, $lat:expr, $lon:expr) => {
            Node {
                id: $id,
                lat: $lat,
                lon: $lon,
            }
        };
    }

    #[test]
    fn segment_inserts_both_directions() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.out_edges(1), &[0]);
        assert_eq!(g.out_edges(2), &[1]);
        assert_eq!(g.edge(0).from, 1);
        assert_eq!(g.edge(0).to, 2);
        assert_eq!(g.edge(1).from, 2);
        assert_eq!(g.edge(1).to, 1);
        assert_eq!(g.edge(0).length_m, g.edge(1).length_m);
        assert!(g.edge(0).length_m > 100.0 && g.edge(0).length_m < 120.0);
    }

    #[test]
    fn parallel_edges_are_kept_apart() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));

        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.out_edges(1), &[0, 2]);
        assert_eq!(g.out_edges(2), &[1, 3]);
    }

    #[test]
    fn graph_is_degree_balanced_by_construction() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.001, 0.001));
        g.add_segment(n!(3, 0.001, 0.001), n!(1, 0.0, 0.0));
        assert!(g.degree_imbalances().is_empty());
    }

    #[test]
    fn ring_of_k_segments_has_2k_edges_and_balanced_degree_2() {
        let coords: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)];
        let mut g = RouteGraph::default();
        for i in 0..4 {
            let (alat, alon) = coords[i];
            let (blat, blon) = coords[(i + 1) % 4];
            g.add_segment(n!(i as i64 + 1, alat, alon), n!((i as i64 + 1) % 4 + 1, blat, blon));
        }

        assert_eq!(g.edge_count(), 8);
        assert!(g.degree_imbalances().is_empty());
        for id in g.node_ids().collect::<Vec<_>>() {
            assert_eq!(g.out_edges(id).len(), 2);
        }
    }

    #[test]
    fn duplicate_edge_unbalances_degrees() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        let idx = g.duplicate_edge(0);

        assert_eq!(idx, 2);
        assert_eq!(g.edge(2), g.edge(0));
        assert_eq!(g.out_edges(1), &[0, 2]);

        let imbalances = g.degree_imbalances();
        assert_eq!(imbalances.get(&1), Some(&1));
        assert_eq!(imbalances.get(&2), Some(&-1));
    }

    #[test]
    fn retain_nodes_drops_crossing_edges() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.001, 0.001));
        g.retain_nodes(&BTreeSet::from([1, 2]));

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert!(g.edges().iter().all(|e| e.to != 3 && e.from != 3));
        assert_eq!(g.out_edges(3), &[] as &[usize]);
    }

    #[test]
    fn undirected_neighbors_collapse_parallels() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        let neighbors = g.undirected_neighbors();
        assert_eq!(neighbors[&1], BTreeSet::from([2]));
        assert_eq!(neighbors[&2], BTreeSet::from([1]));
    }
}
