// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use crate::{Config, RouteStats};

/// Renders the route statistics as a Markdown document for dispatchers.
/// The output is fully determined by its inputs (no timestamps).
pub fn write_report<W: io::Write>(
    w: &mut W,
    config: &Config,
    stats: &RouteStats,
    gpx_name: &str,
) -> io::Result<()> {
    writeln!(w, "# Collection route: {}\n", gpx_name)?;

    writeln!(w, "## What the route guarantees\n")?;
    writeln!(
        w,
        "- **Single continuous track:** one `<trk>` with one `<trkseg>`, closed (start = end)."
    )?;
    writeln!(
        w,
        "- **Right-side arm coverage:** every street segment is driven twice, once per \
         direction, so each curb appears on the vehicle's right on one of the passes."
    )?;
    writeln!(
        w,
        "- **Fewer left turns where possible:** a greedy bearing-based heuristic prefers \
         right turns and penalizes left turns and turn-arounds."
    )?;
    if stats.oneway_ignored {
        writeln!(
            w,
            "- **One-way restrictions: IGNORED.** Both-curb coverage requires driving every \
             street in both directions; {} routed way(s) carry a one-way tag the route may \
             violate.",
            stats.oneway_tagged_ways,
        )?;
    }

    writeln!(w, "\n## What was included / excluded\n")?;
    writeln!(
        w,
        "- **Included highway types:** {}",
        join(&config.allowed_highways),
    )?;
    writeln!(
        w,
        "- **Excluded highway types:** {}",
        join(&config.excluded_highways),
    )?;
    writeln!(
        w,
        "- **Excluded service values:** {}",
        join(&config.excluded_service_values),
    )?;
    writeln!(
        w,
        "- **Excluded access values:** {}",
        join(&config.excluded_access_values),
    )?;
    writeln!(w, "- **Ways rejected by the filter:** {}", stats.filtered_ways)?;
    writeln!(
        w,
        "- **Ways dropped for unresolvable nodes:** {}",
        stats.dropped_ways,
    )?;
    writeln!(
        w,
        "- **Nodes dropped for invalid coordinates:** {}",
        stats.dropped_nodes,
    )?;

    writeln!(w, "\n## Network\n")?;
    writeln!(w, "- **Connected components found:** {}", stats.total_components)?;
    writeln!(
        w,
        "- **Component routed:** largest, {} nodes",
        stats.kept_nodes,
    )?;
    if stats.discarded_components.is_empty() {
        writeln!(w, "- **Components discarded:** none")?;
    } else {
        writeln!(
            w,
            "- **Components discarded:** {} (sizes: {})",
            stats.discarded_components.len(),
            stats
                .discarded_components
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )?;
    }

    writeln!(w, "\n## Route statistics\n")?;
    writeln!(w, "- **Unique segments:** {}", stats.unique_segments)?;
    writeln!(
        w,
        "- **Directed traversals:** {} (2 x unique segments when no repair was needed)",
        stats.directed_traversals,
    )?;
    writeln!(
        w,
        "- **Distance:** {:.2} km",
        stats.total_length_m / 1000.0,
    )?;
    writeln!(
        w,
        "- **Estimated drive time:** {:.0} min at {} km/h",
        stats.drive_time_s / 60.0,
        config.average_speed_kmh,
    )?;
    writeln!(w, "- **Start/end node:** {}", stats.start_node)?;

    writeln!(w, "\n### Turn analysis\n")?;
    writeln!(w, "- **Right turns:** {}", stats.right_turns)?;
    writeln!(w, "- **Left turns:** {}", stats.left_turns)?;
    writeln!(w, "- **Straight:** {}", stats.straight)?;
    writeln!(
        w,
        "- **Turn-arounds (over {}°):** {}",
        config.u_turn_threshold_deg, stats.u_turns,
    )?;

    if stats.eulerized_edges > 0 {
        writeln!(w, "\n### Circuit repair\n")?;
        writeln!(
            w,
            "- **Edges duplicated to close the circuit:** {}",
            stats.eulerized_edges,
        )?;
    }

    Ok(())
}

fn join(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}
