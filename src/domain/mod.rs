//! Domain types for dossier processing.
//!
//! This module contains the core data structures:
//! - Section: an addressable unit of the document
//! - Claim: one ledger record (full and minified)
//! - TimelineEvent: a dated projection of a claim

pub mod claim;
pub mod section;
pub mod timeline;

// Re-export commonly used types
pub use claim::{collapse_whitespace, Claim, ClaimMin};
pub use section::{
    slugify, LineRange, Section, SectionKind, SectionRef, NO_SECTION_ID, NO_SECTION_LABEL,
    UNORDERED,
};
pub use timeline::{TimelineDay, TimelineEvent};
