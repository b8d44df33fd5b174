//! SVG markup parsing for the quality checker.
//!
//! The rules only need element names, attributes and nesting depth, so the
//! document is flattened into a pre-order list of [`Element`]s while
//! quick-xml checks well-formedness. The raw markup is kept for the rules
//! that match on text.

use crate::error::IconsetError;
use quick_xml::encoding::{detect_encoding, Decoder};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local tag name (`path`, `linearGradient`, …), prefix stripped.
    pub name: String,
    /// Attributes with their qualified names and unescaped values.
    pub attributes: Vec<(String, String)>,
    /// 0 for the root element.
    pub depth: usize,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }
}

/// A parsed, well-formed SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    raw: String,
    elements: Vec<Element>,
}

impl SvgDocument {
    /// Parse raw bytes in the encoding named by the BOM or the XML
    /// declaration (UTF-8 when neither is present). Bytes that do not decode
    /// count as malformed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, IconsetError> {
        let raw = decode(&bytes)?;
        Self::parse(raw)
    }

    /// Parse markup into a flat element list.
    ///
    /// # Errors
    /// [`IconsetError::MalformedDocument`] for mismatched or missing end
    /// tags, bad attributes or entities, a missing root element, or more
    /// than one root.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IconsetError> {
        let raw = raw.into();
        let elements = flatten(&raw)?;
        Ok(Self { raw, elements })
    }

    /// The outermost element.
    pub fn root(&self) -> &Element {
        // `flatten` never returns an empty list.
        &self.elements[0]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements with the given local name, in document order.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.name == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.named(name).count()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Length of the markup as UTF-8, which differs from the file size for
    /// other declared encodings.
    pub fn size_bytes(&self) -> u64 {
        self.raw.len() as u64
    }
}

fn decode(bytes: &[u8]) -> Result<String, IconsetError> {
    // The reader refines its decoder from the BOM and the declaration, both
    // of which come before the first element.
    let mut reader = Reader::from_reader(bytes);
    loop {
        match reader.read_event() {
            Ok(Event::Decl(_) | Event::Start(_) | Event::Empty(_) | Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    let bom_len = detect_encoding(bytes).map_or(0, |(_, len)| len);
    reader
        .decoder()
        .decode(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .map_err(|e| malformed(e.to_string()))
}

fn flatten(raw: &str) -> Result<Vec<Element>, IconsetError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().check_end_names = true;

    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut root_done = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root_done {
                    return Err(malformed("content after the root element"));
                }
                elements.push(element(&e, depth, reader.decoder())?);
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if root_done {
                    return Err(malformed("content after the root element"));
                }
                elements.push(element(&e, depth, reader.decoder())?);
                if depth == 0 {
                    root_done = true;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                if depth == 0 {
                    root_done = true;
                }
            }
            Ok(Event::Text(t)) => {
                t.unescape()
                    .map_err(|e| malformed(format!("bad text content: {}", e)))?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    if elements.is_empty() {
        return Err(malformed("no root element"));
    }
    if depth != 0 {
        return Err(malformed(format!("{} unclosed element(s) at end of file", depth)));
    }
    Ok(elements)
}

fn element(start: &BytesStart<'_>, depth: usize, decoder: Decoder) -> Result<Element, IconsetError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(format!("bad attribute on <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| malformed(format!("bad value for '{}' on <{}>: {}", key, name, e)))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        depth,
    })
}

fn malformed(detail: impl Into<String>) -> IconsetError {
    IconsetError::MalformedDocument {
        detail: detail.into(),
    }
}
