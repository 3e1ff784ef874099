//! Claim extraction.
//!
//! One left-to-right scan over the document's lines. The section cursor
//! follows heading and part boundaries, and each line is tested against
//! the three claim syntaxes in priority order (see [`super::region`]):
//!
//! 1. `[CLAIM]` ... `[/CLAIM]` blocks, which are their own evidence source
//! 2. `Sentence. [C]` followed by an evidence region
//! 3. `CLAIM: text` / `[CLAIM] text` single lines, without evidence
//!
//! Ids are not assigned here; the ledger numbers claims per section in
//! scan order.

use std::ops::Range;

use tracing::{debug, warn};

use crate::domain::SectionRef;

use super::metadata::{extract_links, parse_evidence, EventMeta};
use super::region::{block_extent, claim_start, evidence_region, ClaimStart};
use super::sections::SectionModel;

/// Which syntax a claim was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimForm {
    Block,
    InlineSuffix,
    SingleLine,
}

/// A claim as found in the text, before id assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedClaim {
    pub form: ClaimForm,

    /// Trimmed claim text (newlines preserved for blocks)
    pub text: String,

    /// Cleaned evidence text; always empty for blocks and single lines
    pub evidence: String,

    pub links: Vec<String>,

    pub meta: EventMeta,

    pub section: SectionRef,

    /// 1-based line of the claim (the opening marker for blocks)
    pub source_line: usize,
}

/// Everything one extraction pass produces
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Claims in scan order
    pub claims: Vec<ExtractedClaim>,

    /// 0-based line ranges of every evidence region consumed after an
    /// inline claim, including claims discarded for empty text
    pub evidence_regions: Vec<Range<usize>>,
}

/// Extract all claims from `text`, attributing each to a section of `model`
pub fn extract_claims(text: &str, model: &SectionModel) -> Extraction {
    let lines: Vec<&str> = text.lines().collect();
    let mut cursor = model.cursor();
    let mut out = Extraction::default();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        cursor.advance(i, line);

        match claim_start(line) {
            Some(ClaimStart::BlockOpen) => {
                let limit = cursor.section_limit(i).unwrap_or(lines.len());
                let block = block_extent(&lines, i, limit);
                let raw = lines[block.content.clone()].join("\n");

                if !block.closed {
                    debug!(line = i + 1, end = block.next, "Claim block never closed");
                }

                // The whole block is the claim; metadata lines only fill the event fields
                push_claim(
                    &mut out.claims,
                    ExtractedClaim {
                        form: ClaimForm::Block,
                        text: raw.trim().to_string(),
                        evidence: String::new(),
                        links: extract_links(&raw),
                        meta: parse_evidence(&raw).meta,
                        section: cursor.current_ref(),
                        source_line: i + 1,
                    },
                );
                i = block.next;
            }
            Some(ClaimStart::InlineSuffix { text }) => {
                let region = evidence_region(&lines, i + 1);
                let raw = lines[region.lines.clone()].join("\n");
                let parsed = parse_evidence(&raw);

                if region.truncated_by_boundary() {
                    warn!(
                        line = i + 1,
                        boundary_line = region.next + 1,
                        "Evidence region cut off by a section boundary"
                    );
                }

                let links = if region.is_empty() {
                    extract_links(text)
                } else {
                    parsed.links
                };

                push_claim(
                    &mut out.claims,
                    ExtractedClaim {
                        form: ClaimForm::InlineSuffix,
                        text: text.trim().to_string(),
                        evidence: parsed.text,
                        links,
                        meta: parsed.meta,
                        section: cursor.current_ref(),
                        source_line: i + 1,
                    },
                );
                out.evidence_regions.push(region.lines);
                i = region.next;
            }
            Some(ClaimStart::SingleLine { text }) => {
                push_claim(
                    &mut out.claims,
                    ExtractedClaim {
                        form: ClaimForm::SingleLine,
                        text: text.trim().to_string(),
                        evidence: String::new(),
                        links: extract_links(text),
                        meta: EventMeta::default(),
                        section: cursor.current_ref(),
                        source_line: i + 1,
                    },
                );
                i += 1;
            }
            None => i += 1,
        }
    }

    out
}

fn push_claim(claims: &mut Vec<ExtractedClaim>, claim: ExtractedClaim) {
    if claim.text.is_empty() {
        debug!(line = claim.source_line, "Empty claim discarded");
        return;
    }
    debug!(
        line = claim.source_line,
        form = ?claim.form,
        section = %claim.section.id,
        "Claim recognized"
    );
    claims.push(claim);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Extraction {
        let model = SectionModel::from_single_file(text);
        extract_claims(text, &model)
    }

    #[test]
    fn test_inline_claim_with_metadata() {
        let text = "The treasury was audited twice. [C]\nDATE: 2024-03-01\nTITLE: Audit disclosed\nTAGS: finance, oversight\n- https://example.org/report\n\nUnrelated next paragraph.";
        let out = extract(text);

        assert_eq!(out.claims.len(), 1);
        let c = &out.claims[0];
        assert_eq!(c.form, ClaimForm::InlineSuffix);
        assert_eq!(c.text, "The treasury was audited twice.");
        assert_eq!(c.meta.date, "2024-03-01");
        assert_eq!(c.meta.title, "Audit disclosed");
        assert_eq!(c.meta.tags, vec!["finance", "oversight"]);
        assert_eq!(c.links, vec!["https://example.org/report"]);
        assert_eq!(c.evidence, "- https://example.org/report");
        assert!(!c.evidence.contains("Unrelated"));
        assert_eq!(out.evidence_regions, vec![1..5]);
    }

    #[test]
    fn test_block_claim() {
        let text = "[CLAIM]\nThe treasury was audited twice.\nDATE: 2024-03-01\nhttps://example.org/a\n[/CLAIM]\nafter";
        let out = extract(text);

        assert_eq!(out.claims.len(), 1);
        let c = &out.claims[0];
        assert_eq!(c.form, ClaimForm::Block);
        assert_eq!(
            c.text,
            "The treasury was audited twice.\nDATE: 2024-03-01\nhttps://example.org/a"
        );
        assert_eq!(c.evidence, "");
        assert_eq!(c.meta.date, "2024-03-01");
        assert_eq!(c.links, vec!["https://example.org/a"]);
        assert_eq!(c.source_line, 1);
    }

    #[test]
    fn test_block_text_keeps_every_line() {
        let text = "[CLAIM]\nNote: the board resigned in 2020.\n[/CLAIM]\n[CLAIM]\nFirst paragraph.\n\n    indented detail\nSources\n[/CLAIM]";
        let out = extract(text);

        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0].text, "Note: the board resigned in 2020.");
        assert_eq!(out.claims[0].meta.note, "the board resigned in 2020.");
        assert_eq!(
            out.claims[1].text,
            "First paragraph.\n\n    indented detail\nSources"
        );
    }

    #[test]
    fn test_unclosed_block_stays_in_its_section() {
        let text = "1. One\n[CLAIM]\nNever closed.\n\n---\n\n2. Two\nCLAIM: In two.";
        let out = extract(text);

        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0].text, "Never closed.");
        assert_eq!(out.claims[0].section.id, "01-one");
        assert_eq!(out.claims[1].section.id, "02-two");
    }

    #[test]
    fn test_single_line_claim_links_from_text() {
        let out = extract("CLAIM: Audited, see https://example.org/a.\nnext line");
        assert_eq!(out.claims.len(), 1);
        assert_eq!(out.claims[0].form, ClaimForm::SingleLine);
        assert_eq!(out.claims[0].links, vec!["https://example.org/a"]);
        assert!(out.evidence_regions.is_empty());
    }

    #[test]
    fn test_inline_claim_without_region_links_from_text() {
        let out = extract("Audited per https://example.org/a [C]\n\nnext");
        assert_eq!(out.claims[0].links, vec!["https://example.org/a"]);
        assert_eq!(out.evidence_regions, vec![1..1]);
    }

    #[test]
    fn test_empty_claims_discarded_but_region_consumed() {
        let out = extract("[C]\n- https://example.org/a\n\nCLAIM:   \n[CLAIM]\n\n[/CLAIM]");
        assert!(out.claims.is_empty());
        assert_eq!(out.evidence_regions, vec![1..2]);
    }

    #[test]
    fn test_consecutive_inline_claims() {
        let text = "First. [C]\n- https://a.example\nSecond. [C]\n- https://b.example";
        let out = extract(text);
        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0].links, vec!["https://a.example"]);
        assert_eq!(out.claims[1].links, vec!["https://b.example"]);
        assert_eq!(out.claims[1].source_line, 3);
    }

    #[test]
    fn test_section_attribution() {
        let text = "Before. [C]\n\n1. One\nIn one. [C]\n\n---\n2. Two\nCLAIM: In two.";
        let out = extract(text);
        let sections: Vec<&str> = out.claims.iter().map(|c| c.section.id.as_str()).collect();
        assert_eq!(sections, vec!["no-part", "01-one", "02-two"]);
        assert_eq!(out.claims[2].section.label, "2. Two");
        assert_eq!(out.claims[2].section.url, "02-two.html");
    }

    #[test]
    fn test_region_cut_by_boundary() {
        let text = "1. One\nClaim. [C]\n- https://a.example\n---\n2. Two\n- https://b.example";
        let out = extract(text);
        assert_eq!(out.claims[0].links, vec!["https://a.example"]);
        assert_eq!(out.evidence_regions, vec![2..3]);
    }
}
