//! Claim queue: splice pre-written claims into part files.
//!
//! A queue is a YAML list of items:
//!
//! ```yaml
//! - claim: The treasury was audited twice.
//!   part: dossier/parts/03-budget.md
//!   insert_after: "## Audits"
//!   date: 2024-03-01
//!   title: Audit disclosed
//!   tags: [Finance, Public Oversight]
//!   sources:
//!     - https://example.org/report
//! ```
//!
//! Each item becomes an inline `[C]` claim followed by its evidence region,
//! in the exact shape the extractor reads back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Default queue location relative to the repository root
pub const DEFAULT_QUEUE_PATH: &str = "dossier/claim_queue.yaml";

/// Errors that can occur while applying a queue
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue file not found: {}", .0.display())]
    QueueNotFound(PathBuf),

    #[error("Queue item {index} is missing required field: {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("Part not found: {}", .0.display())]
    PartNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Queue parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Queue item as written in YAML; every field is loosely typed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQueueItem {
    pub claim: Option<Value>,
    pub part: Option<Value>,
    pub insert_after: Option<Value>,
    pub date: Option<Value>,
    pub title: Option<Value>,
    pub tags: Option<Value>,
    pub note: Option<Value>,
    pub sources: Option<Value>,
}

/// A validated queue item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub claim: String,
    /// Part file, relative to the queue root
    pub part: PathBuf,
    pub insert_after: Option<String>,
    pub date: String,
    pub title: String,
    /// Comma-separated, as written into the `TAGS:` line
    pub tags: String,
    pub note: String,
    pub sources: Vec<String>,
}

/// Outcome of applying a queue
#[derive(Debug, Clone, Default)]
pub struct QueueReport {
    pub items: usize,
    /// Part files whose content changed (or would change on a dry run)
    pub touched: Vec<PathBuf>,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

fn field_text(value: &Option<Value>) -> String {
    value.as_ref().map(scalar_text).unwrap_or_default()
}

fn field_list(value: &Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => Some(scalar_text(other))
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

impl QueueItem {
    /// Validate a raw item; `index` is 1-based for error messages
    pub fn from_raw(raw: &RawQueueItem, index: usize) -> Result<Self, QueueError> {
        let claim = field_text(&raw.claim);
        if claim.is_empty() {
            return Err(QueueError::MissingField {
                index,
                field: "claim",
            });
        }
        let part = field_text(&raw.part);
        if part.is_empty() {
            return Err(QueueError::MissingField {
                index,
                field: "part",
            });
        }

        // List tags are normalized; a plain string is taken as written
        let tags = match &raw.tags {
            Some(Value::Sequence(items)) => items
                .iter()
                .map(scalar_text)
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase().replace(' ', "-"))
                .collect::<Vec<_>>()
                .join(","),
            other => field_text(other),
        };

        Ok(Self {
            claim,
            part: PathBuf::from(part),
            insert_after: Some(field_text(&raw.insert_after)).filter(|s| !s.is_empty()),
            date: field_text(&raw.date),
            title: field_text(&raw.title),
            tags,
            note: field_text(&raw.note),
            sources: field_list(&raw.sources),
        })
    }

    /// Lines of the claim block, ending with a blank line
    pub fn claim_block(&self) -> Vec<String> {
        let claim = self.claim.trim_end();
        let mut lines = vec![if claim.ends_with("[C]") {
            claim.to_string()
        } else {
            format!("{} [C]", claim)
        }];

        lines.push(format!("DATE: {}", self.date));
        lines.push(format!("TITLE: {}", self.title));
        lines.push(format!("TAGS: {}", self.tags));

        if self.note.is_empty() {
            lines.push("NOTE: ".to_string());
        } else {
            lines.extend(self.note.lines().map(|l| format!("NOTE: {}", l.trim())));
        }

        lines.extend(self.sources.iter().map(|src| format!("- {}", src)));
        lines.push(String::new());
        lines
    }
}

/// Parse queue YAML into validated items
pub fn parse_queue(yaml: &str) -> Result<Vec<QueueItem>, QueueError> {
    let has_content = yaml
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#'));
    if !has_content {
        return Ok(Vec::new());
    }
    let raw: Option<Vec<RawQueueItem>> = serde_yaml::from_str(yaml)?;
    raw.unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(idx, item)| QueueItem::from_raw(item, idx + 1))
        .collect()
}

/// Insert `block` after the first line containing `insert_after`, or at
/// the end. A blank line separates it from preceding content.
pub fn insert_block(text: &str, block: &[String], insert_after: Option<&str>) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let at = insert_after
        .and_then(|needle| lines.iter().position(|line| line.contains(needle)))
        .map_or(lines.len(), |idx| idx + 1);

    let is_blank = |line: &&str| line.trim().is_empty();

    let mut out: Vec<&str> = lines[..at].to_vec();
    if at > 0 && !is_blank(&lines[at - 1]) {
        out.push("");
    }
    out.extend(block.iter().map(String::as_str));

    let rest = &lines[at..];
    if rest.first().is_some_and(is_blank) && out.last().is_some_and(is_blank) {
        out.pop();
    }
    out.extend_from_slice(rest);

    while out.last().is_some_and(is_blank) {
        out.pop();
    }
    format!("{}\n", out.join("\n"))
}

/// Apply every item of the queue at `queue_path` to part files under `root`.
///
/// Items targeting the same part accumulate in order. Nothing is written
/// when `dry_run` is set.
pub async fn apply_queue(
    queue_path: &Path,
    root: &Path,
    dry_run: bool,
) -> Result<QueueReport, QueueError> {
    if !fs::try_exists(queue_path).await? {
        return Err(QueueError::QueueNotFound(queue_path.to_path_buf()));
    }

    let items = parse_queue(&fs::read_to_string(queue_path).await?)?;
    info!(count = items.len(), queue = %queue_path.display(), "Loaded claim queue");

    // path -> (original, updated)
    let mut files: BTreeMap<PathBuf, (String, String)> = BTreeMap::new();

    for item in &items {
        let part_path = root.join(&item.part);
        if !files.contains_key(&part_path) {
            if !fs::try_exists(&part_path).await? {
                return Err(QueueError::PartNotFound(part_path));
            }
            let original = fs::read_to_string(&part_path).await?;
            files.insert(part_path.clone(), (original.clone(), original));
        }

        if let Some((_, current)) = files.get_mut(&part_path) {
            *current = insert_block(current, &item.claim_block(), item.insert_after.as_deref());
            debug!(part = %part_path.display(), "Claim block spliced");
        }
    }

    let mut report = QueueReport {
        items: items.len(),
        touched: Vec::new(),
    };

    for (path, (original, updated)) in files {
        if updated == original {
            continue;
        }
        if !dry_run {
            fs::write(&path, &updated).await?;
            info!(part = %path.display(), "Updated part");
        }
        report.touched.push(path);
    }

    Ok(report)
}
