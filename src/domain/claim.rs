//! Claim ledger records.
//!
//! These types are the `claims.json` / `claims.min.json` schemas.

use serde::{Deserialize, Serialize};

/// One atomic assertion in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// `C-<section-id>-<NNN>`, 1-based per section
    pub id: String,

    /// Normalized, trimmed claim text
    pub text: String,

    /// Evidence region with metadata and header lines removed
    #[serde(default)]
    pub evidence: String,

    /// Cited URLs in first-seen order, deduplicated
    #[serde(default)]
    pub links: Vec<String>,

    pub section_id: String,

    pub section_label: String,

    /// Output page of the owning section (empty outside any section)
    #[serde(default)]
    pub url: String,

    /// 1-based line where the claim starts in the source
    pub source_line: usize,

    /// ISO `YYYY-MM-DD`, empty when absent or unparseable
    #[serde(default)]
    pub date: String,

    /// Date text that was present but not ISO
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date_raw: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub note: String,
}

impl Claim {
    /// Claim text with runs of whitespace collapsed to single spaces
    pub fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text)
    }

    pub fn has_date(&self) -> bool {
        !self.date.trim().is_empty()
    }
}

/// Compact claim record for `claims.min.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMin {
    pub id: String,

    /// Section page url
    pub u: String,

    /// Whitespace-collapsed text
    pub t: String,

    /// Number of cited links
    pub n: usize,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&Claim> for ClaimMin {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id.clone(),
            u: claim.url.clone(),
            t: claim.normalized_text(),
            n: claim.links.len(),
            date: claim.date.clone(),
            title: claim.title.clone(),
            tags: claim.tags.clone(),
        }
    }
}

/// Collapse every run of whitespace (including newlines) to one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
