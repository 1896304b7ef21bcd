// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::{from_utf8, FromStr};

use quick_xml::events::{BytesStart, Event};

use super::model::{Feature, Way};
use crate::Node;

/// Streams [Features](Feature) out of an OSM XML document.
pub(super) fn features<R: io::BufRead>(reader: R) -> XmlFeatures<R> {
    XmlFeatures {
        xml: quick_xml::Reader::from_reader(reader),
        buf: Vec::new(),
        done: false,
    }
}

/// Iterator over the `<node>` and `<way>` elements of an OSM document.
///
/// Everything else is skipped: relations carry turn restrictions and
/// boundaries, neither of which matters for curb coverage. Malformed
/// elements are dropped rather than raised; the source data is
/// crowd-sourced and one bad element should not sink the whole extract.
pub(super) struct XmlFeatures<R: io::BufRead> {
    xml: quick_xml::Reader<R>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: io::BufRead> XmlFeatures<R> {
    /// Consumes events up to the matching `</way>`, accumulating `<nd>`
    /// and `<tag>` children. Returns None when the document ends mid-way.
    fn collect_way(&mut self, id: i64) -> Result<Option<Way>, quick_xml::Error> {
        let mut way = Way {
            id,
            nodes: Vec::new(),
            tags: HashMap::new(),
        };

        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf)? {
                Event::Empty(child) => match child.local_name().as_ref() {
                    b"nd" => {
                        if let Some(reference) = attr(&child, b"ref") {
                            way.nodes.push(reference);
                        }
                    }
                    b"tag" => {
                        if let Some(key) = attr::<String>(&child, b"k") {
                            way.tags.insert(key, attr(&child, b"v").unwrap_or_default());
                        }
                    }
                    _ => {}
                },

                Event::End(end) if end.local_name().as_ref() == b"way" => {
                    return Ok(Some(way));
                }

                Event::Eof => {
                    self.done = true;
                    return Ok(None);
                }

                _ => {}
            }
        }
    }
}

impl<R: io::BufRead> Iterator for XmlFeatures<R> {
    type Item = Result<Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            let event = match self.xml.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => return Some(Err(e)),
            };

            // Nodes are complete as soon as their opening tag is seen
            // (their children are of no interest); ways need their
            // children collected first, which must wait until the event
            // borrow ends.
            let mut way_id = None;
            match event {
                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(node) = node_from(&start) {
                            return Some(Ok(Feature::Node(node)));
                        }
                    }
                    b"way" => way_id = attr(&start, b"id"),
                    _ => {}
                },

                Event::Empty(start) => {
                    if start.local_name().as_ref() == b"node" {
                        if let Some(node) = node_from(&start) {
                            return Some(Ok(Feature::Node(node)));
                        }
                    }
                    // A self-closing <way/> has no segments; skip it.
                }

                Event::Eof => self.done = true,

                _ => {}
            }

            if let Some(id) = way_id {
                match self.collect_way(id) {
                    Ok(Some(way)) => return Some(Ok(Feature::Way(way))),
                    Ok(None) => {} // truncated <way>, swallowed at EOF
                    Err(e) => return Some(Err(e)),
                }
            }
        }

        None
    }
}

fn node_from(start: &BytesStart<'_>) -> Option<Node> {
    let id = attr(start, b"id")?;
    let lat: f64 = attr(start, b"lat")?;
    let lon: f64 = attr(start, b"lon")?;
    (lat.is_finite() && lon.is_finite()).then(|| Node { id, lat, lon })
}

/// Returns the parsed value of the named attribute, if it is present,
/// valid UTF-8 and parseable as `T`.
fn attr<T: FromStr>(start: &BytesStart<'_>, name: &[u8]) -> Option<T> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| from_utf8(&a.value).ok()?.parse().ok())
}
