//! Timeline records (`timeline.json`).

use serde::{Deserialize, Serialize};

/// A dated claim projected for the timeline view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// ISO `YYYY-MM-DD`
    pub date: String,

    /// Explicit claim title, or one derived from the claim text
    pub title: String,

    /// Claim id
    pub id: String,

    /// Full claim text
    pub claim: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub section_url: String,

    #[serde(default)]
    pub section_label: String,

    /// Leading number of the section label (`"8"` for `"8. Title"`)
    #[serde(default)]
    pub section_num: String,

    /// Anchor of the claim in the ledger listing
    pub claim_url: String,

    /// `C-<digits>` prefix of the id when it has one
    pub claim_short: String,

    #[serde(default)]
    pub links: Vec<String>,
}

/// All events sharing one date, in timeline order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineDay<'a> {
    pub date: &'a str,
    pub events: Vec<&'a TimelineEvent>,
}
