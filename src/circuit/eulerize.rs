// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BinaryHeap};

use crate::circuit::RouteError;
use crate::components::is_weakly_connected;
use crate::RouteGraph;

/// Verifies that every node's in-degree equals its out-degree, restoring
/// the balance by duplicating edges along shortest directed paths when it
/// does not. Returns the number of duplicated edges (0 in the usual case).
///
/// Since every road segment is inserted in both directions, the balance
/// holds by construction and this only ever duplicates edges when that
/// guarantee is relaxed upstream. The repair duplicates existing edge
/// records only; no new geometry is invented.
///
/// A directed path duplicated from `a` to `b` raises the out-degree at
/// `a` and the in-degree at `b`, so paths run from nodes with an
/// in-surplus towards nodes with an out-surplus, greedily matching the
/// nearest pair first, with multiplicities equal to the imbalance.
pub fn ensure_eulerian(graph: &mut RouteGraph) -> Result<usize, RouteError> {
    let imbalances = graph.degree_imbalances();
    if imbalances.is_empty() {
        return Ok(0);
    }

    log::warn!(
        target: "curbroute.circuit",
        "{} node(s) with unbalanced degrees, duplicating edges to repair",
        imbalances.len(),
    );

    // Multiplicity-expanded lists, ascending by node id.
    let mut path_tails: Vec<i64> = Vec::new(); // in-surplus: out - in < 0
    let mut path_heads: Vec<i64> = Vec::new(); // out-surplus: out - in > 0
    for (&id, &diff) in &imbalances {
        for _ in 0..diff.unsigned_abs() {
            if diff < 0 {
                path_tails.push(id);
            } else {
                path_heads.push(id);
            }
        }
    }
    debug_assert_eq!(path_tails.len(), path_heads.len());

    let mut duplicated = 0;
    while let (Some(_), Some(_)) = (path_tails.first(), path_heads.first()) {
        let (tail_pos, head_pos, path) = nearest_pair(graph, &path_tails, &path_heads)?;
        for edge_idx in path {
            graph.duplicate_edge(edge_idx);
            duplicated += 1;
        }
        path_tails.remove(tail_pos);
        path_heads.remove(head_pos);
    }

    if !graph.degree_imbalances().is_empty() || !is_weakly_connected(graph) {
        return Err(RouteError::NotEulerizable);
    }

    log::info!(
        target: "curbroute.circuit",
        "duplicated {} edge(s) to restore degree balance",
        duplicated,
    );
    Ok(duplicated)
}

/// Finds the closest (tail, head) pair by shortest directed path over edge
/// lengths. Ties prefer the smaller tail id, then the smaller head id.
/// Returns positions into both lists plus the edge-index path.
fn nearest_pair(
    graph: &RouteGraph,
    path_tails: &[i64],
    path_heads: &[i64],
) -> Result<(usize, usize, Vec<usize>), RouteError> {
    let mut best: Option<(f64, usize, usize)> = None;

    let mut cached: Option<(i64, ShortestPaths)> = None;
    for (tail_pos, &tail) in path_tails.iter().enumerate() {
        // The lists may repeat a node; reuse the search we just ran.
        if cached.as_ref().map(|&(t, _)| t) != Some(tail) {
            cached = Some((tail, shortest_paths(graph, tail)));
        }
        let paths = &cached.as_ref().unwrap().1;

        for (head_pos, &head) in path_heads.iter().enumerate() {
            if let Some(&cost) = paths.cost.get(&head) {
                let better = match best {
                    None => true,
                    Some((best_cost, ..)) => cost < best_cost,
                };
                if better {
                    best = Some((cost, tail_pos, head_pos));
                }
            }
        }
    }

    let (_, tail_pos, head_pos) = best.ok_or(RouteError::NotEulerizable)?;

    // Rebuild the path for the winning pair.
    let paths = shortest_paths(graph, path_tails[tail_pos]);
    let mut path = Vec::new();
    let mut at = path_heads[head_pos];
    while at != path_tails[tail_pos] {
        let edge_idx = paths.via[&at];
        path.push(edge_idx);
        at = graph.edge(edge_idx).from;
    }
    path.reverse();
    Ok((tail_pos, head_pos, path))
}

#[derive(Debug, Default)]
struct ShortestPaths {
    cost: BTreeMap<i64, f64>,
    /// For every reached node, the edge it was cheapest to arrive by.
    via: BTreeMap<i64, usize>,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        // Compared backwards on purpose: BinaryHeap pops its greatest
        // item, and the cheapest entry must come out first.
        other.cost.partial_cmp(&self.cost)
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.partial_cmp(self).unwrap()
    }
}

/// Dijkstra over directed edges weighted by length, from a single source.
fn shortest_paths(graph: &RouteGraph, from: i64) -> ShortestPaths {
    let mut paths = ShortestPaths::default();
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();

    paths.cost.insert(from, 0.0);
    queue.push(QueueItem { at: from, cost: 0.0 });

    while let Some(item) = queue.pop() {
        // A node improved after being queued leaves its old entry behind;
        // drop such stale entries instead of re-prioritizing the heap.
        if item.cost > paths.cost.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        for &edge_idx in graph.out_edges(item.at) {
            let edge = graph.edge(edge_idx);
            let cost = item.cost + edge.length_m;
            if cost < paths.cost.get(&edge.to).copied().unwrap_or(f64::INFINITY) {
                paths.cost.insert(edge.to, cost);
                paths.via.insert(edge.to, edge_idx);
                queue.push(QueueItem { at: edge.to, cost });
            }
        }
    }

    paths
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

    fn triangle() -> RouteGraph {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.001, 0.0));
        g.add_segment(n!(3, 0.001, 0.0), n!(1, 0.0, 0.0));
        g
    }

    #[test]
    fn balanced_graph_needs_nothing() {
        let mut g = triangle();
        assert_eq!(ensure_eulerian(&mut g), Ok(0));
        assert_eq!(g.edge_count(), 6);
    }

    #[test]
    fn lone_duplicate_is_countered_by_its_reverse() {
        let mut g = triangle();
        g.duplicate_edge(0); // one extra 1 -> 2
        assert!(!g.degree_imbalances().is_empty());

        let duplicated = ensure_eulerian(&mut g).unwrap();
        // The shortest repair is duplicating the single 2 -> 1 edge.
        assert_eq!(duplicated, 1);
        assert!(g.degree_imbalances().is_empty());
        assert_eq!(g.edge_count(), 8);
    }

    #[test]
    fn repair_may_span_multiple_edges() {
        // Chain 1 - 2 - 3 with an extra 1 -> 2 -> 3 overload: the repair
        // has to walk all the way back.
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.0, 0.002));
        g.duplicate_edge(0); // 1 -> 2
        g.duplicate_edge(2); // 2 -> 3

        let duplicated = ensure_eulerian(&mut g).unwrap();
        assert_eq!(duplicated, 2); // 3 -> 2 and 2 -> 1
        assert!(g.degree_imbalances().is_empty());
    }

    #[test]
    fn shortest_paths_accumulate_edge_lengths() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.0, 0.002));

        let paths = shortest_paths(&g, 1);
        assert_eq!(paths.cost[&1], 0.0);
        assert_eq!(g.edge(paths.via[&3]).from, 2);
        let expected = g.edge(0).length_m + g.edge(2).length_m;
        assert_eq!(paths.cost[&3], expected);
    }
}
