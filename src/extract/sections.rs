//! Section model construction.
//!
//! Two input modes produce the same ordered list of [`Section`]s:
//!
//! - **Parts mode**: one part file per section, each with an optional
//!   metadata header (see [`super::frontmatter`]).
//! - **Single-file mode**: headings recognized by the boundary classifier
//!   split one flat document.
//!
//! In single-file mode a level-1 numeric heading is only accepted when
//! the nearest significant line above it is a divider, except for the
//! first numeric heading of the document. Without this rule every
//! numbered list item would start a new page. When a divider promotes a
//! heading, the previous section ends *before* the divider.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{slugify, LineRange, Section, SectionKind, SectionRef, UNORDERED};

use super::boundary::{begin_part_marker, classify, prev_significant, LineClass};
use super::frontmatter::parse_front_matter;

/// Title of the synthetic section used when no heading is recognized
pub const FULL_DOCUMENT_TITLE: &str = "Full Document";
const FULL_DOCUMENT_ID: &str = "full";

/// A part file as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFile {
    /// File name including extension (`03-budget.md`)
    pub name: String,
    pub text: String,
}

impl PartFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }
}

/// A heading accepted as a page split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: SectionKind,
    pub number: String,
    pub level: u8,
    pub title: String,
    pub line_idx: usize,
    /// Divider line that promoted this heading; the previous section ends there
    pub cut_before: Option<usize>,
}

impl Heading {
    /// Section id derived from the heading: `03-budget` for `3. Budget`,
    /// the title slug for markdown headings
    pub fn base_id(&self) -> String {
        match self.kind {
            SectionKind::NumericHeading => {
                let number = self
                    .number
                    .split('.')
                    .map(|part| format!("{:0>2}", part))
                    .collect::<Vec<_>>()
                    .join("-");
                format!("{}-{}", number, slugify(&self.title))
            }
            _ => slugify(&self.title),
        }
    }
}

/// Find the headings that split a single-file document into pages
pub fn detect_headings(lines: &[&str]) -> Vec<Heading> {
    let mut heads = Vec::new();
    let mut seen_numeric = false;

    for (i, line) in lines.iter().enumerate() {
        let Some(class) = classify(line) else {
            continue;
        };

        let prev_divider = prev_significant(lines, i)
            .filter(|(_, prev)| classify(prev).is_some_and(|c| c.is_divider()))
            .map(|(j, _)| j);

        match class {
            LineClass::NumericHeading {
                number,
                level,
                title,
            } => {
                if level != 1 {
                    continue;
                }
                if seen_numeric && prev_divider.is_none() {
                    debug!(line = i + 1, number, "Numeric line without divider, not a heading");
                    continue;
                }
                seen_numeric = true;
                heads.push(Heading {
                    kind: SectionKind::NumericHeading,
                    number: number.to_string(),
                    level,
                    title: title.to_string(),
                    line_idx: i,
                    cut_before: prev_divider,
                });
            }
            LineClass::MarkdownHeading { level, title } => {
                if level != 1 {
                    continue;
                }
                heads.push(Heading {
                    kind: SectionKind::MarkdownHeading,
                    number: String::new(),
                    level,
                    title: title.to_string(),
                    line_idx: i,
                    cut_before: prev_divider,
                });
            }
            LineClass::Divider => {}
        }
    }

    heads
}

/// Exclusive end line of the section opened by `heads[idx]`
pub fn section_end(heads: &[Heading], idx: usize, total_lines: usize) -> usize {
    let cur = &heads[idx];
    heads[idx + 1..]
        .iter()
        .find(|next| next.level <= cur.level)
        .map_or(total_lines, |next| next.cut_before.unwrap_or(next.line_idx))
}

/// Ordered sections of one document
#[derive(Debug, Clone, Default)]
pub struct SectionModel {
    sections: Vec<Section>,
}

impl SectionModel {
    /// Build from a flat document using in-band headings
    pub fn from_single_file(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let heads = detect_headings(&lines);

        if heads.is_empty() {
            return Self {
                sections: vec![Section {
                    id: FULL_DOCUMENT_ID.to_string(),
                    kind: SectionKind::FullDocument,
                    order: 1,
                    number: String::new(),
                    level: 1,
                    title: FULL_DOCUMENT_TITLE.to_string(),
                    keywords: Vec::new(),
                    summary: Vec::new(),
                    related: Vec::new(),
                    url: format!("{}.html", FULL_DOCUMENT_ID),
                    source_file: None,
                    lines: Some(LineRange::new(0, lines.len())),
                    body: text.to_string(),
                }],
            };
        }

        let mut ids = UniqueIds::default();
        let sections = heads
            .iter()
            .enumerate()
            .map(|(idx, head)| {
                let end = section_end(&heads, idx, lines.len());
                let id = ids.claim(head.base_id());
                debug!(%id, line = head.line_idx + 1, end, "Section accepted");
                Section {
                    url: format!("{}.html", id),
                    id,
                    kind: head.kind,
                    order: idx as u64 + 1,
                    number: head.number.clone(),
                    level: head.level,
                    title: head.title.clone(),
                    keywords: Vec::new(),
                    summary: Vec::new(),
                    related: Vec::new(),
                    source_file: None,
                    lines: Some(LineRange::new(head.line_idx, end)),
                    body: lines[head.line_idx..end].join("\n"),
                }
            })
            .collect();

        Self { sections }
    }

    /// Build from discrete part files, each carrying its own metadata
    pub fn from_parts(parts: &[PartFile]) -> Self {
        let mut sections: Vec<Section> = parts.iter().map(section_from_part).collect();

        sections.sort_by(|a, b| {
            (a.order, &a.id, &a.source_file).cmp(&(b.order, &b.id, &b.source_file))
        });

        let mut ids = UniqueIds::default();
        for section in &mut sections {
            let id = ids.claim(section.id.clone());
            if id != section.id {
                section.url = format!("{}.html", id);
                section.id = id;
            }
        }

        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Cursor tracking the current section during a line scan
    pub fn cursor(&self) -> SectionCursor<'_> {
        SectionCursor::new(&self.sections)
    }
}

fn section_from_part(part: &PartFile) -> Section {
    let fm = parse_front_matter(&part.text);

    let id = fm
        .scalar("id")
        .map(str::to_string)
        .unwrap_or_else(|| slugify(part.stem()));
    let order = fm
        .scalar("order")
        .and_then(|o| o.parse::<u64>().ok())
        .unwrap_or(UNORDERED);
    let level = fm
        .scalar("level")
        .and_then(|l| l.parse::<u8>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(1);

    Section {
        url: format!("{}.html", id),
        kind: SectionKind::Part,
        order,
        number: fm.scalar("number").unwrap_or_default().to_string(),
        level,
        title: fm.scalar("title").unwrap_or(part.stem()).to_string(),
        keywords: fm.list("keywords"),
        summary: fm.list("summary"),
        related: fm.list("related"),
        source_file: Some(part.name.clone()),
        lines: None,
        body: fm.body,
        id,
    }
}

/// Hands out section ids, suffixing `-2`, `-3`, ... on collision
#[derive(Default)]
struct UniqueIds {
    taken: HashSet<String>,
}

impl UniqueIds {
    fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.taken.insert(candidate.clone()) {
                tracing::warn!(%base, id = %candidate, "Duplicate section id disambiguated");
                return candidate;
            }
            n += 1;
        }
    }
}

/// Tracks which section owns the line being scanned.
///
/// Heading-derived sections switch when the scan reaches their first
/// line; part sections switch on `<!-- BEGIN <file> -->` markers.
pub struct SectionCursor<'a> {
    ranged: Vec<&'a Section>,
    next: usize,
    by_file: HashMap<&'a str, &'a Section>,
    current: Option<&'a Section>,
}

impl<'a> SectionCursor<'a> {
    fn new(sections: &'a [Section]) -> Self {
        let mut ranged: Vec<&Section> = sections.iter().filter(|s| s.lines.is_some()).collect();
        ranged.sort_by_key(|s| s.lines.map_or(0, |r| r.start));

        let by_file = sections
            .iter()
            .filter_map(|s| s.source_file.as_deref().map(|f| (f, s)))
            .collect();

        Self {
            ranged,
            next: 0,
            by_file,
            current: None,
        }
    }

    /// Move to `line_idx`. Lines may be skipped but never revisited.
    pub fn advance(&mut self, line_idx: usize, line: &str) {
        while let Some(&section) = self.ranged.get(self.next) {
            if section.lines.map_or(true, |r| r.start > line_idx) {
                break;
            }
            self.current = Some(section);
            self.next += 1;
        }

        if let Some(file) = begin_part_marker(line) {
            self.current = self.by_file.get(file).copied();
            if self.current.is_none() {
                debug!(file, "Assembly marker for unknown part");
            }
        }
    }

    pub fn current(&self) -> Option<&'a Section> {
        self.current
    }

    /// First line past the section that owns `line_idx`, when the model
    /// knows line ranges. Lines before the first section end where it
    /// starts; part sections are bounded by their markers instead.
    pub fn section_limit(&self, line_idx: usize) -> Option<usize> {
        match self.current {
            Some(section) if section.lines.is_none() => None,
            Some(Section {
                lines: Some(range), ..
            }) if range.contains(line_idx) => Some(range.end),
            _ => self
                .ranged
                .get(self.next)
                .and_then(|s| s.lines)
                .map(|r| r.start),
        }
    }

    /// Reference to the current section, or the implicit no-section bucket
    pub fn current_ref(&self) -> SectionRef {
        self.current.map_or_else(SectionRef::none, Section::to_ref)
    }
}

/// Concatenate parts into one source, each wrapped in BEGIN/END markers.
///
/// Returns `None` when every part is empty.
pub fn assemble_source(parts: &[PartFile]) -> Option<String> {
    let chunks: Vec<String> = parts
        .iter()
        .filter_map(|part| {
            let text = part.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(format!(
                "\n\n<!-- BEGIN {name} -->\n\n{text}\n\n<!-- END {name} -->\n\n",
                name = part.name,
                text = text
            ))
        })
        .collect();

    if chunks.is_empty() {
        return None;
    }

    Some(format!("{}\n", chunks.join("\n").trim()))
}
