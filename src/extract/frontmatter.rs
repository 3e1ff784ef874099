//! Section metadata header parser.
//!
//! Part files may open with a small key/value block:
//!
//! ```text
//! ---
//! id: budget
//! order: 3
//! title: "Budget: items purchased"
//! keywords:
//!   - treasury
//!   - audit
//! related: [oversight, procurement]
//! ---
//! ```
//!
//! This is deliberately not YAML: titles routinely contain colons, quotes
//! and dashes that a YAML parser rejects. Each line is handled by a tiny
//! state machine that only knows `key: scalar`, `key:` followed by `- item`
//! lines, and inline `[a, b]` lists.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A parsed metadata value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

/// Metadata block plus the remaining body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub fields: BTreeMap<String, MetaValue>,
    pub body: String,
}

impl FrontMatter {
    /// Non-empty scalar value for `key`
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(MetaValue::Scalar(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Value for `key` as a list. A scalar becomes a one-item list; `""`
    /// and `"[]"` become empty.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(MetaValue::List(items)) => items.clone(),
            Some(MetaValue::Scalar(s)) if s.is_empty() || s == "[]" => Vec::new(),
            Some(MetaValue::Scalar(s)) => vec![s.clone()],
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parser state between lines
enum State {
    /// No key seen yet
    Start,
    /// Last key seen; `- item` lines append to it if it holds a list
    AfterKey(String),
}

/// Split a document into its metadata block and body.
///
/// Without an opening `---` on the first line, or without a closing
/// `---`, the whole text is body and the metadata is empty.
pub fn parse_front_matter(text: &str) -> FrontMatter {
    let lines: Vec<&str> = text.lines().collect();

    let opens = lines
        .first()
        .map(|first| first.trim() == DELIMITER)
        .unwrap_or(false);
    if !opens {
        return FrontMatter {
            fields: BTreeMap::new(),
            body: text.to_string(),
        };
    }

    let Some(close) = lines
        .iter()
        .skip(1)
        .position(|line| line.trim() == DELIMITER)
        .map(|offset| offset + 1)
    else {
        return FrontMatter {
            fields: BTreeMap::new(),
            body: text.to_string(),
        };
    };

    let fields = parse_fields(&lines[1..close]);
    let body = lines[close + 1..].join("\n").trim_start_matches('\n').to_string();

    FrontMatter { fields, body }
}

fn parse_fields(lines: &[&str]) -> BTreeMap<String, MetaValue> {
    let mut fields = BTreeMap::new();
    let mut state = State::Start;

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(item) = line.strip_prefix('-') {
            if let State::AfterKey(key) = &state {
                if let Some(MetaValue::List(items)) = fields.get_mut(key) {
                    let item = strip_wrapping_quotes(item);
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                }
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if !is_key(key) {
            continue;
        }

        let value = value.trim();
        let parsed = if value.is_empty() {
            MetaValue::List(Vec::new())
        } else if value.len() >= 2 && value.starts_with('[') && value.ends_with(']') {
            MetaValue::List(
                value[1..value.len() - 1]
                    .split(',')
                    .map(strip_wrapping_quotes)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            MetaValue::Scalar(strip_wrapping_quotes(value).to_string())
        };

        fields.insert(key.to_string(), parsed);
        state = State::AfterKey(key.to_string());
    }

    fields
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Trim, then drop one pair of matching surrounding `"` or `'`
pub fn strip_wrapping_quotes(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && (bytes[0] == b'"' || bytes[0] == b'\'')
    {
        s[1..s.len() - 1].trim()
    } else {
        s
    }
}
