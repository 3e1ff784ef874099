//! Fatal errors of a dossier build.
//!
//! Structural absence (missing metadata, unclosed blocks, missing dates)
//! never reaches this type; it resolves to defaults inside the extractor.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that halt a build
#[derive(Debug, Error)]
pub enum DossierError {
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("No part files (*.md) found in {}", .0.display())]
    NoParts(PathBuf),

    #[error("No claims.json in {} (run `dossier claims` first)", .0.display())]
    ClaimsNotFound(PathBuf),
}
