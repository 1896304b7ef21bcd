// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::BTreeMap;

use crate::circuit::{ensure_eulerian, extract_circuit, RouteError, TurnPreferring};
use crate::components::select_largest_component;
use crate::osm::reader::Way;
use crate::osm::CollectionProfile;
use crate::{forward_bearing, turn_angle, Config, Node, RouteGraph, TurnKind};

/// Everything the downstream writers need to know about a generated
/// route. See [generate_route] for the field semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    /// Length of the full circuit, in meters.
    pub total_length_m: f64,

    /// `total_length_m` at [Config::average_speed_kmh], in seconds.
    pub drive_time_s: f64,

    pub right_turns: usize,
    pub left_turns: usize,
    pub straight: usize,
    pub u_turns: usize,

    /// Road segments serviced by the route. Each is driven twice, once
    /// per direction, so each curb ends up on the collection-arm side.
    pub unique_segments: usize,

    /// Directed edge traversals of the circuit, including any edges
    /// duplicated to restore degree balance.
    pub directed_traversals: usize,

    /// Node count of the routed (largest) component.
    pub kept_nodes: usize,

    /// Total number of weakly connected components in the filtered network.
    pub total_components: usize,

    /// Node counts of the skipped components, largest first.
    pub discarded_components: Vec<usize>,

    /// Always true: one-way restrictions are read but deliberately not
    /// obeyed, since both curbs of every street must be serviced.
    pub oneway_ignored: bool,

    /// Driveable ways carrying a one-way restriction that the route may
    /// violate.
    pub oneway_tagged_ways: usize,

    /// Ways rejected by the tag filter.
    pub filtered_ways: usize,

    /// Driveable ways dropped because fewer than two of their node
    /// references could be resolved.
    pub dropped_ways: usize,

    /// Nodes dropped for out-of-range coordinates.
    pub dropped_nodes: usize,

    /// Edges duplicated to restore degree balance (0 unless the
    /// bidirectional guarantee was relaxed upstream).
    pub eulerized_edges: usize,

    /// The node the circuit starts and ends at.
    pub start_node: i64,
}

/// A generated collection route: the closed waypoint sequence plus its
/// statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// `(lat, lon)` per circuit waypoint. One more entry than
    /// [RouteStats::directed_traversals]; the first and last are equal.
    /// Consecutive duplicates are preserved as-is.
    pub waypoints: Vec<(f64, f64)>,

    pub stats: RouteStats,
}

/// Generates a single closed route covering every driveable street of the
/// given OSM extract twice, once per direction, preferring right turns.
///
/// The pipeline: drop nodes with out-of-range coordinates, filter ways
/// through [CollectionProfile], build the bidirectional multigraph, keep
/// the largest weakly connected component, verify (or restore) degree
/// balance, and extract an Eulerian circuit with the turn-preferring
/// selector.
///
/// Identical inputs and configuration produce identical results, on any
/// machine. No partial result is ever returned: any [RouteError] leaves
/// the caller with nothing to write.
pub fn generate_route(
    nodes: &BTreeMap<i64, Node>,
    ways: &[Way],
    config: &Config,
) -> Result<RouteResult, RouteError> {
    config.validate()?;

    let (nodes, dropped_nodes) = sanitize_nodes(nodes);
    let profile = CollectionProfile::new(config);
    let filter = filter_ways(&profile, &nodes, ways);
    log::info!(
        target: "curbroute.engine",
        "{} of {} ways are driveable ({} dropped for missing nodes)",
        filter.accepted.len(),
        ways.len(),
        filter.dropped_ways,
    );

    let mut graph = build_graph(&nodes, &filter.accepted);
    let census = select_largest_component(&mut graph);
    if graph.edge_count() == 0 {
        return Err(RouteError::EmptyNetwork);
    }
    let unique_segments = graph.edge_count() / 2;

    let eulerized_edges = ensure_eulerian(&mut graph)?;
    let start_node = pick_start_node(&graph, config.start_node_id)?;

    let selector = TurnPreferring::new(config);
    let circuit = extract_circuit(&graph, start_node, &selector);
    log::info!(
        target: "curbroute.engine",
        "circuit of {} traversals from node {}",
        circuit.len(),
        start_node,
    );

    Ok(assemble_result(
        &graph,
        &circuit,
        config,
        RouteStats {
            total_length_m: 0.0,
            drive_time_s: 0.0,
            right_turns: 0,
            left_turns: 0,
            straight: 0,
            u_turns: 0,
            unique_segments,
            directed_traversals: circuit.len(),
            kept_nodes: census.kept_nodes,
            total_components: census.total,
            discarded_components: census.discarded,
            oneway_ignored: true,
            oneway_tagged_ways: filter.oneway_tagged,
            filtered_ways: filter.filtered_ways,
            dropped_ways: filter.dropped_ways,
            dropped_nodes,
            eulerized_edges,
            start_node,
        },
    ))
}

/// Drops nodes with latitude or longitude outside the WGS-84 range.
/// Returns the surviving table and the dropped count.
fn sanitize_nodes(nodes: &BTreeMap<i64, Node>) -> (BTreeMap<i64, Node>, usize) {
    let sane: BTreeMap<i64, Node> = nodes
        .iter()
        .filter(|(_, n)| {
            n.lat >= -90.0 && n.lat <= 90.0 && n.lon >= -180.0 && n.lon <= 180.0
        })
        .map(|(&id, &n)| (id, n))
        .collect();
    let dropped = nodes.len() - sane.len();
    if dropped > 0 {
        log::warn!(
            target: "curbroute.engine",
            "dropping {} node(s) with out-of-range coordinates",
            dropped,
        );
    }
    (sane, dropped)
}

struct FilterOutcome {
    accepted: Vec<Way>,
    filtered_ways: usize,
    dropped_ways: usize,
    oneway_tagged: usize,
}

/// Applies the tag contract and the structural checks: a driveable way
/// must keep at least two resolvable node references. Unresolvable
/// references are pruned rather than failing the job.
fn filter_ways(
    profile: &CollectionProfile<'_>,
    nodes: &BTreeMap<i64, Node>,
    ways: &[Way],
) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        accepted: Vec::new(),
        filtered_ways: 0,
        dropped_ways: 0,
        oneway_tagged: 0,
    };

    for way in ways {
        if !profile.is_driveable(&way.tags) {
            outcome.filtered_ways += 1;
            continue;
        }

        let resolvable: Vec<i64> = way
            .nodes
            .iter()
            .copied()
            .filter(|id| nodes.contains_key(id))
            .collect();
        if resolvable.len() < 2 {
            log::warn!(
                target: "curbroute.engine",
                "way {} has fewer than 2 resolvable nodes - dropping",
                way.id,
            );
            outcome.dropped_ways += 1;
            continue;
        }

        if profile.is_oneway_tagged(&way.tags) {
            outcome.oneway_tagged += 1;
        }

        outcome.accepted.push(Way {
            id: way.id,
            nodes: resolvable,
            tags: way.tags.clone(),
        });
    }

    outcome
}

/// Builds the bidirectional multigraph from the accepted ways. Every
/// adjacent node pair becomes two opposite edges; pairs with `u == v`
/// are skipped.
fn build_graph(nodes: &BTreeMap<i64, Node>, ways: &[Way]) -> RouteGraph {
    let mut graph = RouteGraph::default();
    for way in ways {
        for pair in way.nodes.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }
            // filter_ways only keeps resolvable references.
            graph.add_segment(nodes[&pair[0]], nodes[&pair[1]]);
        }
    }
    graph
}

/// Uses the configured start node when it can actually start a circuit,
/// falling back to the smallest node id with an outgoing edge.
fn pick_start_node(graph: &RouteGraph, configured: Option<i64>) -> Result<i64, RouteError> {
    if let Some(id) = configured {
        if !graph.out_edges(id).is_empty() {
            return Ok(id);
        }
        log::warn!(
            target: "curbroute.engine",
            "start node {} is not part of the routed component - picking one instead",
            id,
        );
    }

    graph
        .node_ids()
        .find(|&id| !graph.out_edges(id).is_empty())
        .ok_or(RouteError::Disconnected)
}

fn assemble_result(
    graph: &RouteGraph,
    circuit: &[usize],
    config: &Config,
    mut stats: RouteStats,
) -> RouteResult {
    let mut waypoints = Vec::with_capacity(circuit.len() + 1);
    if let Some(&first) = circuit.first() {
        let tail = graph.node(graph.edge(first).from).unwrap();
        waypoints.push((tail.lat, tail.lon));
    }
    for &edge_idx in circuit {
        let edge = graph.edge(edge_idx);
        let head = graph.node(edge.to).unwrap();
        waypoints.push((head.lat, head.lon));
        stats.total_length_m += edge.length_m;
    }

    stats.drive_time_s = stats.total_length_m / (config.average_speed_kmh / 3.6);

    for pair in circuit.windows(2) {
        let (a, b) = (graph.edge(pair[0]), graph.edge(pair[1]));
        let p = graph.node(a.from).unwrap();
        let u = graph.node(a.to).unwrap();
        let v = graph.node(b.to).unwrap();

        let angle = turn_angle(
            forward_bearing(p.lat, p.lon, u.lat, u.lon),
            forward_bearing(u.lat, u.lon, v.lat, v.lon),
        );
        match config.classify_turn(angle) {
            TurnKind::Straight => stats.straight += 1,
            TurnKind::Right => stats.right_turns += 1,
            TurnKind::Left => stats.left_turns += 1,
            TurnKind::UTurn => stats.u_turns += 1,
        }
    }

    RouteResult { waypoints, stats }
}
