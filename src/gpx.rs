// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

/// Writes a waypoint sequence as a [GPX 1.1](https://www.topografix.com/gpx.asp)
/// document: exactly one track with exactly one segment, one point per
/// waypoint in order. Consecutive duplicates are preserved; consumers
/// rely on the point count equalling circuit length + 1.
pub fn write_track<W: io::Write>(
    w: &mut W,
    name: &str,
    desc: &str,
    waypoints: &[(f64, f64)],
) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<gpx version="1.1" creator="curbroute" xmlns="http://www.topografix.com/GPX/1/1">"#
    )?;
    writeln!(w, "  <metadata>")?;
    writeln!(w, "    <name>{}</name>", escape(name))?;
    writeln!(w, "    <desc>{}</desc>", escape(desc))?;
    writeln!(w, "  </metadata>")?;
    writeln!(w, "  <trk>")?;
    writeln!(w, "    <name>{}</name>", escape(name))?;
    writeln!(w, "    <trkseg>")?;
    for &(lat, lon) in waypoints {
        writeln!(w, r#"      <trkpt lat="{}" lon="{}"/>"#, lat, lon)?;
    }
    writeln!(w, "    </trkseg>")?;
    writeln!(w, "  </trk>")?;
    writeln!(w, "</gpx>")?;
    Ok(())
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
