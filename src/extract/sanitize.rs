//! Human-facing view of the dossier with annotations removed.
//!
//! The sanitizer re-scans the original text on its own and decides, per
//! line, what a reader should see:
//!
//! - `[CLAIM]` ... `[/CLAIM]` blocks and single-line claims disappear
//! - inline `[C]` claims keep their sentence, lose the marker, and lose the
//!   evidence region that follows
//! - standalone `Evidence:` / `Sources:` blocks disappear
//!
//! Regions are delimited by the same functions the claim extractor uses,
//! so a line is hidden here exactly when the extractor treats it as
//! evidence.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::region::{
    block_extent, claim_start, evidence_region, is_evidence_header, ClaimStart, EvidenceRegion,
    RegionEnd,
};

static HORIZONTAL_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid whitespace regex"));

/// Why a line was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    /// Part of a block or single-line claim
    Claim,
    /// Evidence region following an inline claim
    Evidence,
    /// A standalone evidence header and the lines it governs
    EvidenceBlock,
}

/// What happens to one input line in the sanitized view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Keep,
    /// Inline claim: keep the sentence, drop the `[C]` marker
    StripMarker,
    Delete(Removed),
    /// Blank line that terminated a hidden region; becomes one paragraph break
    Separator,
}

/// Decide the fate of every line of `text`
pub fn classify_lines(text: &str) -> Vec<LineAction> {
    let lines: Vec<&str> = text.lines().collect();
    let mut actions = vec![LineAction::Keep; lines.len()];

    let mut i = 0;
    while i < lines.len() {
        match claim_start(lines[i]) {
            Some(ClaimStart::BlockOpen) => {
                let block = block_extent(&lines, i, lines.len());
                mark(&mut actions, i..block.next, LineAction::Delete(Removed::Claim));
                i = block.next;
            }
            Some(ClaimStart::InlineSuffix { .. }) => {
                actions[i] = LineAction::StripMarker;
                let region = evidence_region(&lines, i + 1);
                hide_region(&mut actions, &region, Removed::Evidence);
                i = region.next;
            }
            Some(ClaimStart::SingleLine { .. }) => {
                actions[i] = LineAction::Delete(Removed::Claim);
                i += 1;
            }
            None if is_evidence_header(lines[i]) => {
                actions[i] = LineAction::Delete(Removed::EvidenceBlock);
                let region = evidence_region(&lines, i + 1);
                hide_region(&mut actions, &region, Removed::EvidenceBlock);
                i = region.next;
            }
            None => i += 1,
        }
    }

    actions
}

fn mark(actions: &mut [LineAction], range: Range<usize>, action: LineAction) {
    for slot in &mut actions[range] {
        *slot = action;
    }
}

fn hide_region(actions: &mut [LineAction], region: &EvidenceRegion, why: Removed) {
    mark(actions, region.lines.clone(), LineAction::Delete(why));
    if region.end == RegionEnd::Blank {
        actions[region.lines.end] = LineAction::Separator;
    }
}

/// Remove the trailing `[C]` marker, collapsing leftover whitespace runs
/// but keeping the line's indentation
pub fn strip_inline_marker(line: &str) -> String {
    let Some(ClaimStart::InlineSuffix { text }) = claim_start(line) else {
        return line.to_string();
    };
    let indent = &line[..line.len() - line.trim_start().len()];
    format!("{}{}", indent, HORIZONTAL_RUN_RE.replace_all(text, " "))
}

/// Render the sanitized view of `text`
pub fn sanitize(text: &str) -> String {
    let actions = classify_lines(text);
    let mut out: Vec<String> = Vec::new();

    for (line, action) in text.lines().zip(actions) {
        match action {
            LineAction::Keep => out.push(line.to_string()),
            LineAction::StripMarker => {
                let stripped = strip_inline_marker(line);
                if !stripped.trim().is_empty() {
                    out.push(stripped);
                }
            }
            LineAction::Delete(_) => {}
            LineAction::Separator => {
                if out.last().is_some_and(|prev| !prev.trim().is_empty()) {
                    out.push(String::new());
                }
            }
        }
    }

    format!("{}\n", out.join("\n").trim())
}
