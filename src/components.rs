// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, VecDeque};

use crate::RouteGraph;

/// Census of the weakly connected components of a road network,
/// produced by [select_largest_component].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCensus {
    /// Number of components before selection.
    pub total: usize,

    /// Node count of the kept component.
    pub kept_nodes: usize,

    /// Node counts of the discarded components, largest first
    /// (ties by smallest contained node id).
    pub discarded: Vec<usize>,
}

/// Computes the weakly connected components of the graph, keeps the one
/// with the most nodes and discards everything else. Ties are broken
/// towards the component containing the smallest node id, making the
/// choice deterministic.
///
/// Returns the census; the graph is pruned in place.
pub fn select_largest_component(graph: &mut RouteGraph) -> ComponentCensus {
    let components = weak_components(graph);

    // Components are discovered in ascending order of their smallest node
    // id, so the first largest component also wins the id tie-break.
    let kept_idx = components
        .iter()
        .enumerate()
        .max_by_key(|(idx, c)| (c.len(), std::cmp::Reverse(*idx)))
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    let mut discarded: Vec<usize> = components
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != kept_idx)
        .map(|(_, c)| c.len())
        .collect();
    discarded.sort_unstable_by(|a, b| b.cmp(a));

    let census = ComponentCensus {
        total: components.len(),
        kept_nodes: components.get(kept_idx).map(|c| c.len()).unwrap_or(0),
        discarded,
    };

    if let Some(keep) = components.into_iter().nth(kept_idx) {
        graph.retain_nodes(&keep);
    }

    log::info!(
        target: "curbroute.components",
        "{} component(s); keeping {} nodes, discarding {} component(s)",
        census.total,
        census.kept_nodes,
        census.discarded.len(),
    );

    census
}

/// Returns true if at most one weakly connected component exists among
/// the graph's non-isolated nodes.
pub fn is_weakly_connected(graph: &RouteGraph) -> bool {
    weak_components(graph).len() <= 1
}

/// Finds all weakly connected components by BFS over the undirected
/// projection, seeded in ascending node-id order. Each component's seed
/// is therefore its smallest node id.
fn weak_components(graph: &RouteGraph) -> Vec<BTreeSet<i64>> {
    let neighbors = graph.undirected_neighbors();
    let mut visited: BTreeSet<i64> = BTreeSet::new();
    let mut components: Vec<BTreeSet<i64>> = Vec::new();

    for seed in graph.node_ids() {
        if visited.contains(&seed) {
            continue;
        }

        let mut component = BTreeSet::new();
        let mut queue = VecDeque::from([seed]);
        visited.insert(seed);

        while let Some(id) = queue.pop_front() {
            component.insert(id);
            for &next in &neighbors[&id] {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    macro_rules! n {
        ($id:expr, $lat:expr, $lon:expr) => {
            Node {
                id: $id,
                lat: $lat,
                lon: $lon,
            }
        };
    }

    fn ring(graph: &mut RouteGraph, ids: &[i64], lat0: f64) {
        for i in 0..ids.len() {
            let j = (i + 1) % ids.len();
            graph.add_segment(
                n!(ids[i], lat0 + 0.001 * i as f64, 0.0),
                n!(ids[j], lat0 + 0.001 * j as f64, 0.0),
            );
        }
    }

    #[test]
    fn single_component_keeps_everything() {
        let mut g = RouteGraph::default();
        ring(&mut g, &[1, 2, 3], 0.0);

        let census = select_largest_component(&mut g);
        assert_eq!(census.total, 1);
        assert_eq!(census.kept_nodes, 3);
        assert!(census.discarded.is_empty());
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 6);
        assert!(is_weakly_connected(&g));
    }

    #[test]
    fn larger_component_wins() {
        let mut g = RouteGraph::default();
        ring(&mut g, &[1, 2, 3], 0.0); // 3 nodes
        ring(&mut g, &[10, 11, 12, 13], 1.0); // 4 nodes

        let census = select_largest_component(&mut g);
        assert_eq!(census.total, 2);
        assert_eq!(census.kept_nodes, 4);
        assert_eq!(census.discarded, vec![3]);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 8);
        assert!(g.node(1).is_none());
        assert!(g.node(10).is_some());
    }

    #[test]
    fn equal_sizes_keep_the_smaller_ids() {
        let mut g = RouteGraph::default();
        ring(&mut g, &[10, 11, 12], 1.0);
        ring(&mut g, &[1, 2, 3], 0.0);

        let census = select_largest_component(&mut g);
        assert_eq!(census.total, 2);
        assert_eq!(census.kept_nodes, 3);
        assert_eq!(census.discarded, vec![3]);
        assert!(g.node(1).is_some());
        assert!(g.node(10).is_none());
    }

    #[test]
    fn empty_graph_has_no_components() {
        let mut g = RouteGraph::default();
        let census = select_largest_component(&mut g);
        assert_eq!(census.total, 0);
        assert_eq!(census.kept_nodes, 0);
        assert!(is_weakly_connected(&g));
    }
}
