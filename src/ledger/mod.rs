//! Claim ledger and timeline.
//!
//! This module contains:
//! - Ledger: id assignment, full and minified record sets, listing
//! - timeline: dated projection of the ledger, grouped by day

pub mod assembler;
pub mod timeline;

// Re-export commonly used types
pub use assembler::{claim_id, Ledger};
pub use timeline::{build_events, derive_title, group_by_day, TimelineSettings};
