//! Sections: the addressable units a dossier is split into.
//!
//! A section comes either from a discrete part file carrying its own
//! metadata header, or from a heading recognized inside a single flat
//! document.

use serde::{Deserialize, Serialize};

/// Order assigned to sections that do not declare one, so they sort last.
pub const UNORDERED: u64 = 999_999;

/// Id, label and url used for claims found outside any section.
pub const NO_SECTION_ID: &str = "no-part";
pub const NO_SECTION_LABEL: &str = "No part";

/// Where a section came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    /// `3. Title` style heading in a single-file document
    #[serde(rename = "num")]
    NumericHeading,

    /// `# Title` style heading in a single-file document
    #[serde(rename = "md")]
    MarkdownHeading,

    /// One discrete part file with its own metadata header
    #[serde(rename = "part")]
    Part,

    /// The whole document, used when no heading was recognized
    #[serde(rename = "full")]
    FullDocument,
}

/// Half-open range of 0-based line indexes `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line_idx: usize) -> bool {
        line_idx >= self.start && line_idx < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One logical section of the dossier.
///
/// Serializes to the section metadata record consumed by renderers
/// (`toc.json`). The body is carried along for page generation but is
/// never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Stable slug or explicit identifier
    pub id: String,

    pub kind: SectionKind,

    /// Primary sort key
    pub order: u64,

    /// Dotted numeric label (`"3"`, `"3.1"`), empty when the section has none
    #[serde(default)]
    pub number: String,

    /// Nesting depth, 1 for top level
    pub level: u8,

    pub title: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub summary: Vec<String>,

    #[serde(default)]
    pub related: Vec<String>,

    /// Output page this section renders to
    pub url: String,

    /// Part file name (parts mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Lines owned by this section (single-file mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineRange>,

    /// Text owned by this section
    #[serde(skip)]
    pub body: String,
}

impl Section {
    /// Human label: `"3. Budget"` for numbered sections, the bare title otherwise
    pub fn label(&self) -> String {
        if self.number.is_empty() {
            self.title.clone()
        } else {
            format!("{}. {}", self.number, self.title)
        }
    }

    /// File name of the sanitized body page
    pub fn page_name(&self) -> String {
        format!("{}.txt", self.id)
    }

    /// Reference handed to claims attributed to this section
    pub fn to_ref(&self) -> SectionRef {
        SectionRef {
            id: self.id.clone(),
            label: self.label(),
            url: self.url.clone(),
        }
    }
}

/// What a claim keeps about its owning section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef {
    pub id: String,
    pub label: String,
    pub url: String,
}

impl SectionRef {
    /// The implicit bucket for claims seen before any section starts
    pub fn none() -> Self {
        Self {
            id: NO_SECTION_ID.to_string(),
            label: NO_SECTION_LABEL.to_string(),
            url: String::new(),
        }
    }
}

/// Slug used for section ids and file names: lowercase ASCII alphanumerics
/// joined by single dashes, `"section"` when nothing survives.
pub fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: &str, title: &str) -> Section {
        Section {
            id: slugify(title),
            kind: SectionKind::NumericHeading,
            order: 1,
            number: number.to_string(),
            level: 1,
            title: title.to_string(),
            keywords: Vec::new(),
            summary: Vec::new(),
            related: Vec::new(),
            url: format!("{}.html", slugify(title)),
            source_file: None,
            lines: None,
            body: String::new(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Budget Items, Purchased!"), "budget-items-purchased");
        assert_eq!(slugify("  --Hello--World--  "), "hello-world");
        assert_eq!(slugify("???"), "section");
        assert_eq!(slugify("Café 2024"), "caf-2024");
    }

    #[test]
    fn test_label() {
        assert_eq!(section("3", "Budget").label(), "3. Budget");
        assert_eq!(section("", "Preface").label(), "Preface");
    }

    #[test]
    fn test_serialization_skips_body() {
        let mut s = section("3", "Budget");
        s.body = "secret body".to_string();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"kind\":\"num\""));
        assert!(!json.contains("secret body"));
        assert!(!json.contains("source_file"));
    }

    #[test]
    fn test_line_range() {
        let r = LineRange::new(2, 5);
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert_eq!(r.len(), 3);
    }
}
