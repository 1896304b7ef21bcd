// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{forward_bearing, turn_angle, Config, RouteGraph};

/// Everything a [selector](EdgeSelector) may look at when choosing the
/// next edge of the circuit.
#[derive(Debug, Clone, Copy)]
pub struct SelectorContext<'a> {
    pub graph: &'a RouteGraph,

    /// The node the walk currently stands on.
    pub at: i64,

    /// Tail of the edge the walk arrived by, absent for the first edge
    /// out of the start node.
    pub arrived_from: Option<i64>,

    /// Indices of the unused edges outgoing from [SelectorContext::at],
    /// in ascending order. Never empty.
    pub candidates: &'a [usize],
}

/// Strategy for picking the next outgoing edge during circuit extraction.
///
/// Any choice from the candidate set yields a valid Eulerian circuit; the
/// strategy only shapes which permutation comes out, and with it the turn
/// statistics of the final route. Implementations must be deterministic.
pub trait EdgeSelector {
    /// Picks one of `ctx.candidates`. Returns the chosen edge index.
    fn pick(&self, ctx: &SelectorContext<'_>) -> usize;
}

/// The production strategy: scores every candidate by the maneuver needed
/// to enter it, preferring (in order) right turns, going straight, left
/// turns and finally turn-arounds, each weighted by edge length.
///
/// Greedy per-junction choice; the circuit minimizing total turn cost is
/// not attempted (finding it is NP-hard), but in practice this yields the
/// right-turn surplus the collection arm wants.
#[derive(Debug, Clone, Copy)]
pub struct TurnPreferring<'a> {
    config: &'a Config,
}

impl<'a> TurnPreferring<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    fn score(&self, ctx: &SelectorContext<'_>, edge_idx: usize) -> f64 {
        let edge = ctx.graph.edge(edge_idx);

        let previous = match ctx.arrived_from {
            Some(p) if p != ctx.at && edge.to != edge.from => p,
            // No turn context: first edge out of the start node, or the
            // degenerate self-loop/zero-length cases which the builder
            // already rejects.
            _ => return edge.length_m,
        };

        let p = ctx
            .graph
            .node(previous)
            .expect("arrival edge endpoints must exist");
        let u = ctx.graph.node(ctx.at).expect("current node must exist");
        let v = ctx.graph.node(edge.to).expect("edge head must exist");

        let bearing_in = forward_bearing(p.lat, p.lon, u.lat, u.lon);
        let bearing_out = forward_bearing(u.lat, u.lon, v.lat, v.lon);
        let angle = turn_angle(bearing_in, bearing_out);
        let multiplier = self.config.turn_multiplier(self.config.classify_turn(angle));

        multiplier * edge.length_m
    }
}

impl<'a> EdgeSelector for TurnPreferring<'a> {
    fn pick(&self, ctx: &SelectorContext<'_>) -> usize {
        pick_by_score(ctx, |idx| self.score(ctx, idx))
    }
}

/// Baseline strategy ignoring turn context: cheapest edge first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestEdgeFirst;

impl EdgeSelector for ShortestEdgeFirst {
    fn pick(&self, ctx: &SelectorContext<'_>) -> usize {
        pick_by_score(ctx, |idx| ctx.graph.edge(idx).length_m)
    }
}

/// Takes the lowest-index unused edge. Deterministic independent of
/// geometry; intended for tests which pin circuit structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstUnused;

impl EdgeSelector for FirstUnused {
    fn pick(&self, ctx: &SelectorContext<'_>) -> usize {
        ctx.candidates[0]
    }
}

/// Selects the candidate with the lowest score; equal scores fall back to
/// the smaller head node id, then the smaller edge index, so the choice
/// never depends on container iteration order.
fn pick_by_score(ctx: &SelectorContext<'_>, mut score: impl FnMut(usize) -> f64) -> usize {
    let mut best_idx = ctx.candidates[0];
    let mut best_score = score(best_idx);
    let mut best_to = ctx.graph.edge(best_idx).to;

    for &idx in &ctx.candidates[1..] {
        let s = score(idx);
        let to = ctx.graph.edge(idx).to;
        if s < best_score || (s == best_score && (to, idx) < (best_to, best_idx)) {
            best_idx = idx;
            best_score = s;
            best_to = to;
        }
    }

    best_idx
}
