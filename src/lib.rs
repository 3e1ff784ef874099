//! dossier - claim ledger and section engine for annotated documents
//!
//! A dossier is prose interleaved with evidentiary annotations. This crate
//! turns one into:
//! - a claim ledger (full and minified JSON, plus a listing)
//! - a timeline of the dated claims
//! - sanitized per-section pages with the annotations removed
//!
//! # Architecture
//!
//! The engine is two independent line scans over the same text:
//! - the claim extractor, which builds the ledger
//! - the sanitizer, which builds the human view
//!
//! Both delimit annotations through the same predicates in
//! `extract::region`, so they always agree on which lines are evidence.
//!
//! # Modules
//!
//! - `domain`: Data structures (Section, Claim, TimelineEvent)
//! - `extract`: Boundary classification, section model, claims, sanitizer
//! - `ledger`: Claim ids, ledger serialization, timeline
//! - `site`: Reading inputs and writing artifacts
//! - `queue`: Splicing queued claims into part files
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Everything at once
//! dossier build dossier/parts site
//!
//! # Or step by step
//! dossier assemble dossier/parts dossier/source.md
//! dossier split dossier/parts site
//! dossier claims dossier/source.md site
//! dossier timeline site
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod queue;
pub mod site;

// Re-export main types at crate root for convenience
pub use domain::{Claim, ClaimMin, Section, SectionKind, SectionRef, TimelineEvent};
pub use error::DossierError;
pub use extract::{extract_claims, sanitize, PartFile, SectionModel};
pub use ledger::{Ledger, TimelineSettings};
