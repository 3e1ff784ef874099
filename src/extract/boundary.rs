//! Section boundary classification.
//!
//! A single stateless predicate decides whether a line is a section edge:
//! a divider rule, a numeric heading or a markdown heading. The section
//! model, the claim extractor and the sanitizer all ask this module, so
//! their notions of where a section ends cannot drift apart.
//!
//! Whether a numeric heading is *accepted* as a page split is a
//! document-level decision (it depends on the preceding divider) and
//! lives in [`crate::extract::sections`]. This module only recognizes
//! the shape of a line.

use once_cell::sync::Lazy;
use regex::Regex;

static NUM_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)*)\.\s+(.+?)\s*$").expect("valid numeric heading regex")
});
static MD_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(#{1,6})\s+(.+?)\s*$").expect("valid markdown heading regex"));
static DIVIDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:⸻+|[-_]{3,}|={3,})\s*$").expect("valid divider regex"));
static BEGIN_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<!--\s*BEGIN\s+(.+?)\s*-->\s*$").expect("valid part marker regex")
});
static PART_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<!--\s*(?:BEGIN|END)\s+.+?-->\s*$").expect("valid part edge regex")
});

/// What kind of section edge a line is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// A full-width rule or a run of 3+ `-`, `_` or `=`
    Divider,

    /// `<digits>. Title` or dotted `<digits>.<digits>. Title`
    NumericHeading {
        number: &'a str,
        level: u8,
        title: &'a str,
    },

    /// 1 to 6 leading `#` followed by a title
    MarkdownHeading { level: u8, title: &'a str },
}

impl LineClass<'_> {
    pub fn is_divider(&self) -> bool {
        matches!(self, LineClass::Divider)
    }
}

/// Classify one line. Returns `None` for ordinary content.
pub fn classify(line: &str) -> Option<LineClass<'_>> {
    if line.trim().is_empty() {
        return None;
    }

    if DIVIDER_RE.is_match(line) {
        return Some(LineClass::Divider);
    }

    if let Some(caps) = NUM_HEADING_RE.captures(line) {
        let number = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2).map_or("", |m| m.as_str());
        let level = number.split('.').count().min(u8::MAX as usize) as u8;
        return Some(LineClass::NumericHeading {
            number,
            level,
            title,
        });
    }

    if let Some(caps) = MD_HEADING_RE.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
        // Closing hashes (`## Title ##`) are decoration
        let title = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim_end_matches('#')
            .trim_end();
        if title.is_empty() {
            return None;
        }
        return Some(LineClass::MarkdownHeading { level, title });
    }

    None
}

/// True when the line is any kind of section edge
pub fn is_boundary(line: &str) -> bool {
    classify(line).is_some()
}

pub fn is_divider(line: &str) -> bool {
    DIVIDER_RE.is_match(line)
}

/// HTML comment lines (assembly markers and the like) carry no content
pub fn is_ignorable(line: &str) -> bool {
    let s = line.trim();
    s.starts_with("<!--") && s.ends_with("-->")
}

/// Part file named by a `<!-- BEGIN <file> -->` assembly marker
pub fn begin_part_marker(line: &str) -> Option<&str> {
    BEGIN_PART_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `BEGIN` or `END` assembly marker: the edge of a part inside an assembled source
pub fn is_part_marker(line: &str) -> bool {
    PART_MARKER_RE.is_match(line)
}

/// Nearest line before `idx` that is neither blank nor ignorable
pub fn prev_significant<'a>(lines: &[&'a str], idx: usize) -> Option<(usize, &'a str)> {
    lines[..idx.min(lines.len())]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, line)| !line.trim().is_empty() && !is_ignorable(line))
        .map(|(j, line)| (j, *line))
}
