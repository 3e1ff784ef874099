//! Claim syntax recognition and evidence region delimiting.
//!
//! Both the claim extractor and the sanitizer scan the document on their
//! own, but every decision about where an annotation starts and ends is
//! made here:
//!
//! - [`claim_start`] recognizes the three claim syntaxes in priority order
//!   (block, inline suffix, single line)
//! - [`block_extent`] finds the closing marker of a block claim; a block
//!   that is never closed stops at the edge of its section
//! - [`evidence_region`] collects the lines following an inline claim (or a
//!   standalone evidence header) up to the first blank line, claim start or
//!   section boundary

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::boundary::{is_boundary, is_part_marker};

static BLOCK_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*]\s*)?\[claim\]\s*$").expect("valid block open regex")
});
static BLOCK_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\[/claim\]\s*$").expect("valid block close regex"));
static CLAIM_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*]\s*)?(?:\[claim\]\s*|claim\s*:\s*)(.+?)\s*$")
        .expect("valid claim line regex")
});
static INLINE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)\s*\[c\]\s*$").expect("valid inline marker regex"));
static EVIDENCE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:evidence|links|sources|verification(?:\s+paths?)?|verify|citations)\s*:?\s*(?:\(.*\))?\s*$",
    )
    .expect("valid evidence header regex")
});

/// The claim syntax a line opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStart<'a> {
    /// `[CLAIM]` alone on a line; the claim runs to `[/CLAIM]`
    BlockOpen,

    /// `Sentence. [C]`; the claim is the text before the marker
    /// (possibly empty) and evidence follows on the next lines
    InlineSuffix { text: &'a str },

    /// `CLAIM: text` or `[CLAIM] text`; no evidence region
    SingleLine { text: &'a str },
}

/// Recognize a claim start, trying the syntaxes in priority order
pub fn claim_start(line: &str) -> Option<ClaimStart<'_>> {
    if BLOCK_OPEN_RE.is_match(line) {
        return Some(ClaimStart::BlockOpen);
    }

    if let Some(caps) = INLINE_MARKER_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str().trim());
        return Some(ClaimStart::InlineSuffix { text });
    }

    if let Some(caps) = CLAIM_LINE_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str().trim());
        return Some(ClaimStart::SingleLine { text });
    }

    None
}

pub fn is_claim_start(line: &str) -> bool {
    claim_start(line).is_some()
}

pub fn is_block_close(line: &str) -> bool {
    BLOCK_CLOSE_RE.is_match(line)
}

/// A bare `Evidence:` / `Links` / `Sources (primary)` style label
pub fn is_evidence_header(line: &str) -> bool {
    EVIDENCE_HEADER_RE.is_match(line)
}

/// Extent of a block claim opened at `open_idx`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockExtent {
    /// Lines between the markers
    pub content: Range<usize>,

    /// Whether a closing marker was found (otherwise the block ran to end of input)
    pub closed: bool,

    /// Index of the first line after the block
    pub next: usize,
}

/// Find the lines of a block claim whose opening marker is at `open_idx`.
///
/// The search for `[/CLAIM]` never passes `limit` (the end of the section
/// owning the block) or a part marker; an unclosed block ends there.
pub fn block_extent(lines: &[&str], open_idx: usize, limit: usize) -> BlockExtent {
    let start = (open_idx + 1).min(lines.len());
    let stop = limit.clamp(start, lines.len());

    for (idx, line) in lines.iter().enumerate().take(stop).skip(start) {
        if is_block_close(line) {
            return BlockExtent {
                content: start..idx,
                closed: true,
                next: idx + 1,
            };
        }
        if is_part_marker(line) {
            return BlockExtent {
                content: start..idx,
                closed: false,
                next: idx,
            };
        }
    }

    BlockExtent {
        content: start..stop,
        closed: false,
        next: stop,
    }
}

/// Why an evidence region stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionEnd {
    /// A blank line, which the region consumes
    Blank,

    /// The next claim of any syntax
    ClaimStart,

    /// A heading or divider
    Boundary,

    EndOfInput,
}

/// Lines collected as evidence after a claim or evidence header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRegion {
    /// Evidence lines (never includes the terminating blank line)
    pub lines: Range<usize>,

    pub end: RegionEnd,

    /// Index of the first line the caller should scan next. One past the
    /// blank line when the region ended on a blank, otherwise the
    /// terminating line itself so it is reprocessed.
    pub next: usize,
}

impl EvidenceRegion {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when a boundary cut the region off mid-content
    pub fn truncated_by_boundary(&self) -> bool {
        self.end == RegionEnd::Boundary && !self.lines.is_empty()
    }
}

/// Collect the evidence region starting at `start`.
///
/// Stops at the first blank line (consumed), claim start or section
/// boundary (both left for the caller to reprocess), or end of input.
pub fn evidence_region(lines: &[&str], start: usize) -> EvidenceRegion {
    let start = start.min(lines.len());

    for (j, line) in lines.iter().enumerate().skip(start) {
        let end = if line.trim().is_empty() {
            Some(RegionEnd::Blank)
        } else if is_boundary(line) {
            Some(RegionEnd::Boundary)
        } else if is_claim_start(line) {
            Some(RegionEnd::ClaimStart)
        } else {
            None
        };

        if let Some(end) = end {
            let next = if end == RegionEnd::Blank { j + 1 } else { j };
            return EvidenceRegion {
                lines: start..j,
                end,
                next,
            };
        }
    }

    EvidenceRegion {
        lines: start..lines.len(),
        end: RegionEnd::EndOfInput,
        next: lines.len(),
    }
}
