//! Timeline projection of the ledger.
//!
//! Only claims with a validated date become events. Events sort by
//! `(date, id)` and are grouped by day for display.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{collapse_whitespace, Claim, TimelineDay, TimelineEvent};

static SECTION_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(?:[.)]|$)").expect("valid section number regex"));
static CLAIM_SHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(C-\d+)").expect("valid short claim id regex"));

/// How event titles are derived from claim text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSettings {
    /// Characters kept before truncating
    pub title_max_chars: usize,

    /// Appended when a derived title was truncated
    pub ellipsis: String,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            title_max_chars: 120,
            ellipsis: "…".to_string(),
        }
    }
}

/// Title for a claim without an explicit one
pub fn derive_title(text: &str, settings: &TimelineSettings) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= settings.title_max_chars {
        return collapsed;
    }
    let mut title: String = collapsed.chars().take(settings.title_max_chars).collect();
    title.push_str(&settings.ellipsis);
    title
}

/// Leading number of a section label: `"8"` for `"8. Title"` or `"8) Title"`
pub fn section_number(label: &str) -> String {
    SECTION_NUM_RE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map_or_else(String::new, |m| m.as_str().to_string())
}

/// `C-08` for ids that start with a numeric section, otherwise the id itself
pub fn short_claim_id(id: &str) -> String {
    let id = id.trim();
    CLAIM_SHORT_RE
        .captures(id)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| id.to_string(), |m| m.as_str().to_uppercase())
}

/// Project dated claims into sorted timeline events
pub fn build_events(claims: &[Claim], settings: &TimelineSettings) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = claims
        .iter()
        .filter(|c| c.has_date())
        .map(|c| {
            let title = match c.title.trim() {
                "" => derive_title(&c.text, settings),
                explicit => explicit.to_string(),
            };
            let section_label = c.section_label.trim().to_string();

            TimelineEvent {
                date: c.date.trim().to_string(),
                title,
                id: c.id.clone(),
                claim: c.text.clone(),
                tags: c.tags.clone(),
                note: c.note.clone(),
                section_url: c.url.clone(),
                section_num: section_number(&section_label),
                section_label,
                claim_url: format!("claims.html#{}", c.id),
                claim_short: short_claim_id(&c.id),
                links: c.links.clone(),
            }
        })
        .collect();

    events.sort_by(|a, b| (&a.date, &a.id).cmp(&(&b.date, &b.id)));
    events
}

/// Group sorted events by date, keeping their order within each day
pub fn group_by_day(events: &[TimelineEvent]) -> Vec<TimelineDay<'_>> {
    let mut days: Vec<TimelineDay<'_>> = Vec::new();

    for event in events {
        match days.last_mut() {
            Some(day) if day.date == event.date => day.events.push(event),
            _ => days.push(TimelineDay {
                date: &event.date,
                events: vec![event],
            }),
        }
    }

    days
}

/// Markdown listing of the timeline (`timeline.md`)
pub fn render_listing(events: &[TimelineEvent], doc_title: &str) -> String {
    let mut out = format!("# {} - Timeline\n\n", doc_title);

    if events.is_empty() {
        out.push_str("No dated claims yet. Add a `DATE: YYYY-MM-DD` line to a claim's evidence.\n");
        return out;
    }

    for day in group_by_day(events) {
        out.push_str(&format!("## {}\n\n", day.date));
        for event in day.events {
            out.push_str(&format!("- **{}**", event.title));
            if !event.tags.is_empty() {
                out.push_str(&format!(" [{}]", event.tags.join(", ")));
            }
            out.push_str(&format!(" ([{}]({})", event.claim_short, event.claim_url));
            if !event.section_label.is_empty() {
                let section = if event.section_num.is_empty() {
                    event.section_label.clone()
                } else {
                    format!("§{}", event.section_num)
                };
                if event.section_url.is_empty() {
                    out.push_str(&format!(", {}", section));
                } else {
                    out.push_str(&format!(", [{}]({})", section, event.section_url));
                }
            }
            out.push_str(")\n");

            for line in event.note.lines().filter(|l| !l.trim().is_empty()) {
                out.push_str(&format!("  > {}\n", line.trim()));
            }
            for link in &event.links {
                out.push_str(&format!("  - <{}>\n", link));
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(id: &str, date: &str, text: &str) -> Claim {
        Claim {
            id: id.to_string(),
            text: text.to_string(),
            evidence: String::new(),
            links: Vec::new(),
            section_id: "08-budget".to_string(),
            section_label: "8. Budget".to_string(),
            url: "08-budget.html".to_string(),
            source_line: 1,
            date: date.to_string(),
            date_raw: String::new(),
            title: String::new(),
            tags: Vec::new(),
            note: String::new(),
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let claims = vec![
            claim("C-b-001", "2024-03-01", "later id"),
            claim("C-a-001", "2024-03-01", "earlier id"),
            claim("C-a-002", "", "undated"),
            claim("C-a-003", "2023-12-31", "earliest"),
        ];
        let events = build_events(&claims, &TimelineSettings::default());
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["C-a-003", "C-a-001", "C-b-001"]);
    }

    #[test]
    fn test_event_fields() {
        let mut c = claim("C-08-budget-001", "2024-03-01", "The treasury\n was audited.");
        c.links = vec!["https://example.org".to_string()];
        let events = build_events(&[c], &TimelineSettings::default());
        let e = &events[0];
        assert_eq!(e.title, "The treasury was audited.");
        assert_eq!(e.section_num, "8");
        assert_eq!(e.claim_url, "claims.html#C-08-budget-001");
        assert_eq!(e.claim_short, "C-08");
        assert_eq!(e.section_url, "08-budget.html");
        assert_eq!(e.links, vec!["https://example.org"]);
    }

    #[test]
    fn test_explicit_title_wins() {
        let mut c = claim("C-a-001", "2024-03-01", "long text");
        c.title = " Audit disclosed ".to_string();
        let events = build_events(&[c], &TimelineSettings::default());
        assert_eq!(events[0].title, "Audit disclosed");
    }

    #[test]
    fn test_derive_title_truncates_by_chars() {
        let settings = TimelineSettings {
            title_max_chars: 5,
            ellipsis: "…".to_string(),
        };
        assert_eq!(derive_title("ééééé", &settings), "ééééé");
        assert_eq!(derive_title("éééééé", &settings), "ééééé…");
        assert_eq!(derive_title(&"x".repeat(121), &TimelineSettings::default()).chars().count(), 121);
    }

    #[test]
    fn test_short_ids_and_section_numbers() {
        assert_eq!(short_claim_id("c-12-foo-001"), "C-12");
        assert_eq!(short_claim_id("C-no-part-001"), "C-no-part-001");
        assert_eq!(section_number("8) Title"), "8");
        assert_eq!(section_number("12"), "12");
        assert_eq!(section_number("Budget"), "");
        assert_eq!(section_number("3.1. Sub"), "3");
    }

    #[test]
    fn test_group_by_day_and_listing() {
        let claims = vec![
            claim("C-a-001", "2024-03-01", "one"),
            claim("C-a-002", "2024-03-01", "two"),
            claim("C-a-003", "2024-04-01", "three"),
        ];
        let events = build_events(&claims, &TimelineSettings::default());
        let days = group_by_day(&events);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].events.len(), 2);
        assert_eq!(days[1].date, "2024-04-01");

        let listing = render_listing(&events, "Dossier");
        assert!(listing.contains("## 2024-03-01\n\n- **one** ([C-a-001](claims.html#C-a-001), [§8](08-budget.html))\n"));
        assert!(render_listing(&[], "Dossier").contains("No dated claims yet"));
    }
}
