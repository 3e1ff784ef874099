//! Ledger assembly: per-section claim ids and serialized record sets.

use std::collections::BTreeMap;

use crate::domain::{Claim, ClaimMin};
use crate::extract::ExtractedClaim;

/// Stable claim id: `C-<section-id>-<NNN>`, sequence 1-based and zero-padded
pub fn claim_id(section_id: &str, seq: usize) -> String {
    format!("C-{}-{:03}", section_id, seq)
}

/// Per-section running counters, advanced once per claim in scan order
#[derive(Debug, Default)]
struct SectionCounters {
    counts: BTreeMap<String, usize>,
}

impl SectionCounters {
    fn next(&mut self, section_id: &str) -> usize {
        let count = self.counts.entry(section_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// The claim ledger of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    claims: Vec<Claim>,
}

impl Ledger {
    /// Number the extracted claims and turn them into ledger records
    pub fn assemble(extracted: Vec<ExtractedClaim>) -> Self {
        let mut counters = SectionCounters::default();

        let claims = extracted
            .into_iter()
            .map(|c| {
                let seq = counters.next(&c.section.id);
                Claim {
                    id: claim_id(&c.section.id, seq),
                    text: c.text,
                    evidence: c.evidence,
                    links: c.links,
                    section_id: c.section.id,
                    section_label: c.section.label,
                    url: c.section.url,
                    source_line: c.source_line,
                    date: c.meta.date,
                    date_raw: c.meta.date_raw,
                    title: c.meta.title,
                    tags: c.meta.tags,
                    note: c.meta.note,
                }
            })
            .collect();

        Self { claims }
    }

    /// Wrap records loaded back from `claims.json`
    pub fn from_claims(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn minified(&self) -> Vec<ClaimMin> {
        self.claims.iter().map(ClaimMin::from).collect()
    }

    /// Full records, pretty-printed
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.claims)
    }

    /// Minified records, compact
    pub fn to_min_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.minified())
    }

    /// Markdown listing of the ledger (`claims.md`)
    pub fn render_listing(&self, doc_title: &str) -> String {
        let mut out = format!("# {} - Claims Ledger\n\n", doc_title);
        out.push_str(
            "Claims are extracted from `[CLAIM]...[/CLAIM]` blocks, `CLAIM:` lines and sentences ending in `[C]`.\n\n",
        );
        out.push_str("- [claims.json](claims.json)\n- [claims.min.json](claims.min.json)\n\n");

        if self.claims.is_empty() {
            out.push_str("No claims found yet. Add blocks like:\n\n");
            out.push_str("```text\n[CLAIM]\nYour claim text...\n[/CLAIM]\n```\n\n");
            out.push_str(
                "Or single lines like `CLAIM: ...`, or end a sentence with `[C]` and list its evidence on the lines below.\n",
            );
            return out;
        }

        out.push_str("| ID | Claim | Section | Links |\n");
        out.push_str("|---|---|---|---|\n");
        for claim in &self.claims {
            let section = if claim.url.is_empty() {
                table_cell(&claim.section_label)
            } else {
                format!("[{}]({})", table_cell(&claim.section_label), claim.url)
            };
            let links = claim
                .links
                .iter()
                .map(|url| format!("<{}>", url))
                .collect::<Vec<_>>()
                .join(" ");

            out.push_str(&format!(
                "| <a id=\"{id}\"></a>{id} | {text} | {section} (line {line}) | {links} |\n",
                id = claim.id,
                text = table_cell(&claim.text),
                section = section,
                line = claim.source_line,
                links = links,
            ));
        }

        out
    }
}

/// Make text safe for a single Markdown table cell
fn table_cell(text: &str) -> String {
    text.trim().replace('|', "\\|").replace('\n', "<br>")
}
