use std::sync::LazyLock;

use regex::Regex;

use crate::model::strip_rate_separators;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DOLAR\s*\$\s*([\d.,]+)\s*\|\s*([+\d\s-]+)\s*(.*)").unwrap()
});
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Lomas de Zamora|Buenos Aires|Argentina|[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,\s*(?:Provincia|Ciudad)",
    )
    .unwrap()
});
static MIN_PURCHASE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+)\s*equipos?\s*primera\s*compra",
        r"(?i)m[ií]nimo\s*:?\s*(\d+)\s*equipos?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Marker that makes a line a product candidate.
pub const USD_MARKER: &str = "USD";

/// Fields captured from a `DOLAR $ <rate> | <contact> <name>` line.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Digits only, grouping separators removed.
    pub rate: String,
    pub contact: String,
    /// May be empty; the block builder substitutes the placeholder.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Empty,
    Header(Header),
    Product(&'a str),
    Attribute(&'a str),
    Noise(&'a str),
}

impl<'a> Line<'a> {
    /// Trimmed text for every kind that carries one.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Line::Product(t) | Line::Attribute(t) | Line::Noise(t) => Some(t),
            Line::Empty | Line::Header(_) => None,
        }
    }
}

pub fn classify_lines(text: &str) -> Vec<Line<'_>> {
    text.lines().map(classify).collect()
}

/// Tag one line. Precedence: header, product (`USD` present), attribute, noise.
pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Empty;
    }
    if let Some(header) = parse_header(line) {
        return Line::Header(header);
    }
    if line.contains(USD_MARKER) {
        return Line::Product(line);
    }
    if find_location(line).is_some() || find_min_purchase(line).is_some() {
        return Line::Attribute(line);
    }
    Line::Noise(line)
}

pub fn parse_header(line: &str) -> Option<Header> {
    let caps = HEADER_RE.captures(line)?;
    Some(Header {
        rate: strip_rate_separators(&caps[1]),
        contact: caps[2].trim().to_string(),
        name: caps[3].trim().to_string(),
    })
}

/// Matched place text, as written.
pub fn find_location(line: &str) -> Option<String> {
    LOCATION_RE.find(line).map(|m| m.as_str().to_string())
}

/// Normalized to "<n> equipos".
pub fn find_min_purchase(line: &str) -> Option<String> {
    MIN_PURCHASE_RES
        .iter()
        .find_map(|re| re.captures(line))
        .map(|caps| format!("{} equipos", &caps[1]))
}
