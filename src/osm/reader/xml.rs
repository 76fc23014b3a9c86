// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::{from_utf8, FromStr};

use log::warn;
use quick_xml::events::attributes::{AttrError, Attribute};
use quick_xml::events::{BytesStart, Event};

use super::model::{Feature, Point, Way};
use super::FeatureReader;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Problem with a single XML element, which causes it to be skipped.
#[derive(Debug, thiserror::Error)]
enum Malformed {
    #[error("missing {0:?} attribute")]
    MissingAttribute(&'static str),

    #[error("invalid {0:?} attribute")]
    InvalidAttribute(&'static str),

    #[error(transparent)]
    Attr(#[from] AttrError),
}

/// Reader reads osm [Features](Feature) from an XML file.
///
/// Malformed nodes and ways are skipped with a warning (and counted, see
/// [FeatureReader::skipped]); only errors of the XML stream itself are returned.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
    skipped: usize,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self {
            parser,
            eof: false,
            skipped: 0,
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

impl<P: Parser> FeatureReader for Reader<P> {
    type Error = quick_xml::Error;

    fn next(&mut self) -> Result<Option<Feature>, Self::Error> {
        let mut f: Option<Feature> = None;

        while !self.eof {
            match self.parser.read_event()? {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => match parse_node(&start) {
                        Ok(p) => return Ok(Some(Feature::Point(p))),
                        Err(e) => {
                            warn!("skipping node: {e}");
                            self.skipped += 1;
                        }
                    },
                    // "way" can't be self-closing
                    b"tag" => match parse_tag(&start) {
                        Ok((k, v)) => {
                            if let Some(tags) = feature_tags(&mut f) {
                                tags.insert(k, v);
                            }
                        }
                        Err(e) => {
                            if let Some(name) = feature_name(&f) {
                                warn!("skipping tag of {name}: {e}");
                            }
                        }
                    },
                    b"nd" => match parse_nd(&start) {
                        Ok(r) => {
                            if let Some(refs) = feature_refs(&mut f) {
                                refs.push(r);
                            }
                        }
                        Err(e) => {
                            if let Some(name) = feature_name(&f) {
                                warn!("skipping nd of {name}: {e}");
                            }
                        }
                    },
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => match parse_node(&start) {
                        Ok(p) => f = Some(Feature::Point(p)),
                        Err(e) => {
                            warn!("skipping node: {e}");
                            self.skipped += 1;
                        }
                    },
                    b"way" => match parse_way(&start) {
                        Ok(w) => f = Some(Feature::Way(w)),
                        Err(e) => {
                            warn!("skipping way: {e}");
                            self.skipped += 1;
                        }
                    },
                    b"relation" => f = None,
                    _ => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Ok(Some(f));
                        }
                    }
                    _ => {}
                },

                Event::Eof => self.eof = true,

                _ => {}
            }
        }

        Ok(f)
    }

    fn skipped(&self) -> usize {
        self.skipped
    }
}

fn parse_value<T: FromStr>(attr: &Attribute<'_>, name: &'static str) -> Result<T, Malformed> {
    from_utf8(&attr.value)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(Malformed::InvalidAttribute(name))
}

fn parse_node(start: &BytesStart<'_>) -> Result<Point, Malformed> {
    let mut id: Option<i64> = None;
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;
    let mut ele: Option<f64> = None;

    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" => id = Some(parse_value(&attr, "id")?),
            b"lat" => lat = Some(parse_value(&attr, "lat")?),
            b"lon" => lon = Some(parse_value(&attr, "lon")?),
            b"ele" => ele = parse_value(&attr, "ele").ok(),
            _ => {}
        }
    }

    let id = id.ok_or(Malformed::MissingAttribute("id"))?;
    let lat = lat.ok_or(Malformed::MissingAttribute("lat"))?;
    let lon = lon.ok_or(Malformed::MissingAttribute("lon"))?;

    if id == 0 {
        Err(Malformed::InvalidAttribute("id"))
    } else if !(-90.0..=90.0).contains(&lat) {
        Err(Malformed::InvalidAttribute("lat"))
    } else if !(-180.0..=180.0).contains(&lon) {
        Err(Malformed::InvalidAttribute("lon"))
    } else {
        Ok(Point {
            id,
            lat,
            lon,
            ele,
            tags: HashMap::default(),
        })
    }
}

fn parse_way(start: &BytesStart<'_>) -> Result<Way, Malformed> {
    let mut id: Option<i64> = None;

    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"id" {
            id = Some(parse_value(&attr, "id")?);
        }
    }

    match id {
        None => Err(Malformed::MissingAttribute("id")),
        Some(0) => Err(Malformed::InvalidAttribute("id")),
        Some(id) => Ok(Way {
            id,
            refs: Vec::default(),
            tags: HashMap::default(),
        }),
    }
}

fn parse_tag(start: &BytesStart<'_>) -> Result<(String, String), Malformed> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"k" => {
                k = Some(
                    attr.unescape_value()
                        .map_err(|_| Malformed::InvalidAttribute("k"))?
                        .into_owned(),
                )
            }
            b"v" => {
                v = Some(
                    attr.unescape_value()
                        .map_err(|_| Malformed::InvalidAttribute("v"))?
                        .into_owned(),
                )
            }
            _ => {}
        }
    }

    let k = k.ok_or(Malformed::MissingAttribute("k"))?;
    Ok((k, v.unwrap_or_default()))
}

fn parse_nd(start: &BytesStart<'_>) -> Result<i64, Malformed> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ref" {
            return parse_value(&attr, "ref");
        }
    }
    Err(Malformed::MissingAttribute("ref"))
}

fn feature_tags(f: &mut Option<Feature>) -> Option<&mut HashMap<String, String>> {
    match f {
        Some(Feature::Point(ref mut p)) => Some(&mut p.tags),
        Some(Feature::Way(ref mut w)) => Some(&mut w.tags),
        None => None,
    }
}

fn feature_refs(f: &mut Option<Feature>) -> Option<&mut Vec<i64>> {
    match f {
        Some(Feature::Way(ref mut w)) => Some(&mut w.refs),
        _ => None,
    }
}

fn feature_name(f: &Option<Feature>) -> Option<String> {
    match f {
        Some(Feature::Point(p)) => Some(format!("node {}", p.id)),
        Some(Feature::Way(w)) => Some(format!("way {}", w.id)),
        None => None,
    }
}
