//! Evidence region parsing.
//!
//! An evidence region may carry `DATE:`, `TITLE:`, `TAGS:` and `NOTE:`
//! lines alongside citations. This module pulls those fields out, drops
//! bare region headers such as `Sources:`, and returns what is left as the
//! cleaned evidence text. Links are always taken from the raw region so
//! that stripping a metadata line can never lose a citation.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::frontmatter::strip_wrapping_quotes;
use super::region::is_evidence_header;

static META_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*]\s+)?(date|title|tags|note)\s*:\s*(.*?)\s*$")
        .expect("valid metadata line regex")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s)>\]]+").expect("valid url regex"));

/// Punctuation that ends a sentence rather than a URL
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Optional timeline fields carried by an evidence region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMeta {
    /// Validated `YYYY-MM-DD`, empty otherwise
    pub date: String,

    /// Date text that failed validation
    pub date_raw: String,

    pub title: String,

    pub tags: Vec<String>,

    pub note: String,
}

/// Result of parsing one evidence region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEvidence {
    pub meta: EventMeta,

    /// Remaining lines, trimmed, blank lines dropped
    pub text: String,

    /// URLs from the raw region, first-seen order, deduplicated
    pub links: Vec<String>,
}

/// Parse a raw evidence region
pub fn parse_evidence(raw: &str) -> ParsedEvidence {
    let mut meta = EventMeta::default();
    let mut kept: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() || is_evidence_header(line) {
            continue;
        }

        let Some(caps) = META_LINE_RE.captures(line) else {
            kept.push(line.trim());
            continue;
        };

        let label = caps.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
        let value = caps.get(2).map_or("", |m| m.as_str());
        apply_field(&mut meta, &label, value);
    }

    ParsedEvidence {
        meta,
        text: kept.join("\n"),
        links: extract_links(raw),
    }
}

fn apply_field(meta: &mut EventMeta, label: &str, value: &str) {
    let value = strip_wrapping_quotes(value);
    if value.is_empty() {
        return;
    }

    match label {
        "date" => {
            if !meta.date.is_empty() || !meta.date_raw.is_empty() {
                return;
            }
            if is_iso_date(value) {
                meta.date = value.to_string();
            } else {
                tracing::warn!(date = value, "Unparseable claim date kept as date_raw");
                meta.date_raw = value.to_string();
            }
        }
        "title" => {
            if meta.title.is_empty() {
                meta.title = value.to_string();
            }
        }
        "tags" => {
            for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                if !meta.tags.iter().any(|existing| existing == tag) {
                    meta.tags.push(tag.to_string());
                }
            }
        }
        "note" => {
            if !meta.note.is_empty() {
                meta.note.push('\n');
            }
            meta.note.push_str(value);
        }
        _ => {}
    }
}

/// Strict `YYYY-MM-DD` that is also a real calendar date
pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// All `http(s)://` URLs in `text`, deduplicated in first-seen order
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for m in URL_RE.find_iter(text) {
        let url = m.as_str().trim_end_matches(URL_TRAILING);
        if url.ends_with("://") {
            continue;
        }
        if !links.iter().any(|existing| existing == url) {
            links.push(url.to_string());
        }
    }

    links
}
