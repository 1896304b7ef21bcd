// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::Node;

pub mod model;
mod xml;

pub use model::Way;

/// Error which can occur while loading an OSM extract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read: {0}")]
    Io(#[from] io::Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("input is neither OSM XML nor a gzip/bzip2 stream")]
    UnrecognizedInput,
}

/// Typed contents of an OSM extract: the node table plus the way list in
/// document order. Nothing is filtered here; non-driveable ways and
/// dangling node references are still present.
#[derive(Debug, Clone, Default)]
pub struct OsmData {
    pub nodes: BTreeMap<i64, Node>,
    pub ways: Vec<Way>,
}

impl OsmData {
    fn insert(&mut self, feature: model::Feature) {
        match feature {
            // Repeated node ids keep their first occurrence, like most
            // OSM consumers do.
            model::Feature::Node(node) => {
                self.nodes.entry(node.id).or_insert(node);
            }
            model::Feature::Way(way) => self.ways.push(way),
        }
    }
}

/// Compression wrapper, sniffed from the first bytes of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Plain,
    Gzip,
    Bzip2,
}

fn sniff(head: &[u8]) -> Option<Encoding> {
    match head {
        [b'<', ..] => Some(Encoding::Plain),
        [0x1F, 0x8B, ..] => Some(Encoding::Gzip),
        [b'B', b'Z', b'h', ..] => Some(Encoding::Bzip2),
        _ => None,
    }
}

/// Loads an [OsmData] from a stream of OSM XML, which may be gzip- or
/// bzip2-compressed; the wrapping is sniffed from the stream itself.
pub fn read<R: io::BufRead>(mut reader: R) -> Result<OsmData, Error> {
    match sniff(reader.fill_buf()?).ok_or(Error::UnrecognizedInput)? {
        Encoding::Plain => collect(reader),
        Encoding::Gzip => collect(io::BufReader::new(flate2::bufread::MultiGzDecoder::new(
            reader,
        ))),
        Encoding::Bzip2 => collect(io::BufReader::new(bzip2::bufread::MultiBzDecoder::new(
            reader,
        ))),
    }
}

/// Loads an [OsmData] from a file; see [read].
pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<OsmData, Error> {
    read(io::BufReader::new(File::open(path)?))
}

fn collect<R: io::BufRead>(reader: R) -> Result<OsmData, Error> {
    let mut data = OsmData::default();
    for feature in xml::features(reader) {
        data.insert(feature?);
    }

    log::info!(
        target: "curbroute.osm",
        "parsed {} nodes and {} ways",
        data.nodes.len(),
        data.ways.len(),
    );
    Ok(data)
}
