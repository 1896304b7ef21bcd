// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use fixedbitset::FixedBitSet;

use crate::circuit::{EdgeSelector, SelectorContext};
use crate::RouteGraph;

/// Extracts a closed Eulerian circuit starting (and ending) at `start`,
/// using [Hierholzer's algorithm](https://en.wikipedia.org/wiki/Eulerian_path#Hierholzer's_algorithm).
/// Returns the circuit as a sequence of edge indices; every edge of the
/// graph appears exactly once, and consecutive edges share a node.
///
/// Unlike the textbook formulation, the next outgoing edge is not taken
/// from a fixed adjacency order: the provided selector is consulted every
/// time, with the unused candidates and the walk's arrival direction.
/// This is what lets turn preferences shape the final permutation.
///
/// The graph must be degree-balanced and weakly connected (see
/// [ensure_eulerian](crate::circuit::ensure_eulerian)), and `start` must
/// have an outgoing edge; all three are guaranteed by the pipeline.
pub fn extract_circuit<S: EdgeSelector>(
    graph: &RouteGraph,
    start: i64,
    selector: &S,
) -> Vec<usize> {
    let mut used = FixedBitSet::with_capacity(graph.edge_count());
    let mut remaining: BTreeMap<i64, usize> = graph
        .node_ids()
        .map(|id| (id, graph.out_edges(id).len()))
        .collect();

    // The walk as a stack of (node, edge arrived by). When a node runs out
    // of unused edges it is popped and its arrival edge is emitted, which
    // produces the circuit in end-to-start order.
    let mut stack: Vec<(i64, Option<usize>)> = vec![(start, None)];
    let mut circuit: Vec<usize> = Vec::with_capacity(graph.edge_count());
    let mut candidates: Vec<usize> = Vec::new();

    while let Some(&(at, arrived_by)) = stack.last() {
        if remaining.get(&at).copied().unwrap_or(0) > 0 {
            candidates.clear();
            candidates.extend(
                graph
                    .out_edges(at)
                    .iter()
                    .copied()
                    .filter(|&e| !used.contains(e)),
            );

            let chosen = selector.pick(&SelectorContext {
                graph,
                at,
                arrived_from: arrived_by.map(|e| graph.edge(e).from),
                candidates: &candidates,
            });
            debug_assert!(candidates.contains(&chosen));

            used.insert(chosen);
            *remaining.get_mut(&at).unwrap() -= 1;
            stack.push((graph.edge(chosen).to, Some(chosen)));
        } else {
            stack.pop();
            if let Some(e) = arrived_by {
                circuit.push(e);
            }
        }
    }

    circuit.reverse();
    circuit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{FirstUnused, TurnPreferring};
    use crate::{Config, Node};

    macro_rules! n {
        ($id:expr, $lat:expr, $lon:expr) => {
            Node {
                id: $id,
                lat: $lat,
                lon: $lon,
            }
        };
    }

    fn assert_valid_circuit(graph: &RouteGraph, start: i64, circuit: &[usize]) {
        // Every edge exactly once...
        assert_eq!(circuit.len(), graph.edge_count());
        let mut seen = vec![false; graph.edge_count()];
        for &e in circuit {
            assert!(!seen[e], "edge {} traversed twice", e);
            seen[e] = true;
        }

        // ...and consecutive edges chain up, closing at the start.
        assert_eq!(graph.edge(circuit[0]).from, start);
        assert_eq!(graph.edge(*circuit.last().unwrap()).to, start);
        for pair in circuit.windows(2) {
            assert_eq!(graph.edge(pair[0]).to, graph.edge(pair[1]).from);
        }
    }

    fn triangle() -> RouteGraph {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.001, 0.0));
        g.add_segment(n!(3, 0.001, 0.0), n!(1, 0.0, 0.0));
        g
    }

    #[test]
    fn triangle_circuit_covers_all_six_edges() {
        let g = triangle();
        let config = Config::default();
        let circuit = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        assert_valid_circuit(&g, 1, &circuit);
        assert_eq!(circuit.len(), 6);
    }

    #[test]
    fn chain_turns_around_at_the_far_end() {
        // A - B - C collinear: the only circuit is out-and-back.
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, -0.001));
        g.add_segment(n!(2, 0.0, -0.001), n!(3, 0.0, -0.002));

        let config = Config::default();
        let circuit = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        assert_valid_circuit(&g, 1, &circuit);

        let visited: Vec<i64> = circuit.iter().map(|&e| g.edge(e).to).collect();
        assert_eq!(visited, [2, 3, 2, 1]);
    }

    #[test]
    fn parallel_edges_are_each_traversed_once() {
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));

        let config = Config::default();
        let circuit = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        assert_valid_circuit(&g, 1, &circuit);
        assert_eq!(circuit.len(), 4);
    }

    #[test]
    fn figure_eight_is_spliced_into_one_circuit() {
        // Two triangles sharing node 1: subtours must splice.
        let mut g = RouteGraph::default();
        g.add_segment(n!(1, 0.0, 0.0), n!(2, 0.0, 0.001));
        g.add_segment(n!(2, 0.0, 0.001), n!(3, 0.001, 0.001));
        g.add_segment(n!(3, 0.001, 0.001), n!(1, 0.0, 0.0));
        g.add_segment(n!(1, 0.0, 0.0), n!(4, 0.0, -0.001));
        g.add_segment(n!(4, 0.0, -0.001), n!(5, -0.001, -0.001));
        g.add_segment(n!(5, -0.001, -0.001), n!(1, 0.0, 0.0));

        let config = Config::default();
        let circuit = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        assert_valid_circuit(&g, 1, &circuit);
        assert_eq!(circuit.len(), 12);
    }

    #[test]
    fn circuit_is_deterministic() {
        let g = triangle();
        let config = Config::default();
        let a = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        let b = extract_circuit(&g, 1, &TurnPreferring::new(&config));
        assert_eq!(a, b);
    }

    #[test]
    fn first_unused_strategy_is_also_a_valid_walk() {
        let g = triangle();
        let circuit = extract_circuit(&g, 2, &FirstUnused);
        assert_valid_circuit(&g, 2, &circuit);
    }
}
