//! Annotation extraction and section segmentation.
//!
//! This module contains:
//! - boundary: line classification (headings, dividers, part markers)
//! - frontmatter: part file metadata headers
//! - sections: section model for parts and single-file documents
//! - region: claim syntaxes and evidence region delimiting
//! - metadata: evidence parsing (DATE/TITLE/TAGS/NOTE, links)
//! - claims: the claim extractor
//! - sanitize: the human-facing view with annotations removed
//!
//! Everything here is synchronous and works on borrowed text.

pub mod boundary;
pub mod claims;
pub mod frontmatter;
pub mod metadata;
pub mod region;
pub mod sanitize;
pub mod sections;

// Re-export commonly used types
pub use boundary::{classify, is_boundary, LineClass};
pub use claims::{extract_claims, ClaimForm, ExtractedClaim, Extraction};
pub use frontmatter::{parse_front_matter, FrontMatter, MetaValue};
pub use metadata::{extract_links, is_iso_date, parse_evidence, EventMeta, ParsedEvidence};
pub use region::{claim_start, evidence_region, ClaimStart, EvidenceRegion, RegionEnd};
pub use sanitize::{classify_lines, sanitize, LineAction, Removed};
pub use sections::{assemble_source, PartFile, SectionModel, FULL_DOCUMENT_TITLE};
