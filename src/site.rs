//! Filesystem side of a build: read inputs, write artifacts.
//!
//! Every artifact written into an output directory is recorded in that
//! directory's `manifest.json` as `sha256:<hex>`, so two runs over the same
//! input can be compared without diffing every file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use crate::config::ResolvedConfig;
use crate::domain::{Claim, TimelineEvent};
use crate::error::DossierError;
use crate::extract::boundary::is_ignorable;
use crate::extract::{assemble_source, extract_claims, sanitize, PartFile, SectionModel};
use crate::ledger::timeline::render_listing as render_timeline;
use crate::ledger::{build_events, Ledger, TimelineSettings};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const TOC_FILE: &str = "toc.json";
pub const CLAIMS_FILE: &str = "claims.json";
pub const CLAIMS_MIN_FILE: &str = "claims.min.json";
pub const CLAIMS_LISTING_FILE: &str = "claims.md";
pub const TIMELINE_FILE: &str = "timeline.json";
pub const TIMELINE_LISTING_FILE: &str = "timeline.md";

const DEFAULT_TITLE: &str = "Dossier";

/// `sha256:<hex>` digest of `bytes`
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// An output directory plus its manifest
pub struct OutputDir {
    dir: PathBuf,
    manifest: BTreeMap<String, String>,
}

impl OutputDir {
    /// Create the directory if needed and load any existing manifest
    pub async fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            let content = fs::read_to_string(&manifest_path)
                .await
                .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
            serde_json::from_str(&content).context("Failed to parse manifest JSON")?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write one artifact and record its digest
    pub async fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.manifest.insert(name.to_string(), digest(contents.as_bytes()));
        debug!(artifact = name, bytes = contents.len(), "Wrote artifact");
        Ok(())
    }

    /// Persist the manifest
    pub async fn finish(self) -> Result<BTreeMap<String, String>> {
        let content = serde_json::to_string_pretty(&self.manifest)?;
        let path = self.dir.join(MANIFEST_FILE);
        fs::write(&path, format!("{}\n", content))
            .await
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        Ok(self.manifest)
    }
}

/// Load `*.md` part files from `dir`, sorted by file name.
///
/// A missing directory yields no parts.
pub async fn load_parts(dir: &Path) -> Result<Vec<PartFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*.md",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read part: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        parts.push(PartFile::new(name, text));
    }

    Ok(parts)
}

/// Title from the first meaningful line, leading `#` removed
pub fn pick_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_ignorable(line))
        .map(|line| line.trim_start_matches('#').trim())
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

/// How the document was supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// A directory of part files
    Parts,
    /// A single source file; a sibling parts directory attributes claims
    IndexedSource,
    /// A single source file split by its headings
    SingleFile,
}

/// A loaded document ready for extraction
#[derive(Debug, Clone)]
pub struct Document {
    pub mode: InputMode,
    pub title: String,
    /// Text scanned for claims (assembled in parts mode)
    pub source: String,
    /// Sections that become pages and `toc.json`
    pub model: SectionModel,
    /// Part sections that claims are attributed to (indexed sources only)
    pub parts_index: Option<SectionModel>,
}

impl Document {
    /// Load `input`, which is either a parts directory or a source file
    pub async fn load(input: &Path, config: &ResolvedConfig) -> Result<Self> {
        if !input.exists() {
            return Err(DossierError::InputNotFound(input.to_path_buf()).into());
        }

        if input.is_dir() {
            let parts = load_parts(input).await?;
            let source = assemble_source(&parts)
                .ok_or_else(|| DossierError::NoParts(input.to_path_buf()))?;
            let model = SectionModel::from_parts(&parts);
            info!(parts = parts.len(), sections = model.len(), "Loaded parts");
            return Ok(Self::new(InputMode::Parts, source, model, None, config));
        }

        let source = fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read source: {}", input.display()))?;

        let parts_dir = input
            .parent()
            .unwrap_or(Path::new("."))
            .join(&config.parts_dir);
        let parts = load_parts(&parts_dir).await?;

        let model = SectionModel::from_single_file(&source);
        let (mode, parts_index) = if parts.is_empty() {
            (InputMode::SingleFile, None)
        } else {
            debug!(dir = %parts_dir.display(), "Using sibling parts as claim index");
            (InputMode::IndexedSource, Some(SectionModel::from_parts(&parts)))
        };
        info!(mode = ?mode, sections = model.len(), "Loaded source");

        Ok(Self::new(mode, source, model, parts_index, config))
    }

    fn new(
        mode: InputMode,
        source: String,
        model: SectionModel,
        parts_index: Option<SectionModel>,
        config: &ResolvedConfig,
    ) -> Self {
        // Assembled sources open with markers and metadata, so parts take
        // their title from the first part's body
        let title = config.title.clone().unwrap_or_else(|| match mode {
            InputMode::SingleFile => pick_title(&source),
            InputMode::Parts | InputMode::IndexedSource => parts_index
                .as_ref()
                .unwrap_or(&model)
                .sections()
                .first()
                .map_or_else(|| DEFAULT_TITLE.to_string(), |s| pick_title(&s.body)),
        });

        Self {
            mode,
            title,
            source,
            model,
            parts_index,
        }
    }

    /// Sections claims are attributed to
    pub fn claim_sections(&self) -> &SectionModel {
        self.parts_index.as_ref().unwrap_or(&self.model)
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::assemble(extract_claims(&self.source, self.claim_sections()).claims)
    }
}

/// Write `toc.json` and one sanitized page per section
pub async fn write_pages(doc: &Document, out: &mut OutputDir) -> Result<usize> {
    let toc = serde_json::to_string_pretty(doc.model.sections())?;
    out.write(TOC_FILE, &toc).await?;

    for section in doc.model.sections() {
        out.write(&section.page_name(), &sanitize(&section.body)).await?;
    }

    info!(count = doc.model.len(), "Wrote section pages");
    Ok(doc.model.len())
}

/// Write the full, minified and listing forms of the ledger
pub async fn write_ledger(ledger: &Ledger, title: &str, out: &mut OutputDir) -> Result<()> {
    out.write(CLAIMS_FILE, &ledger.to_json()?).await?;
    out.write(CLAIMS_MIN_FILE, &ledger.to_min_json()?).await?;
    out.write(CLAIMS_LISTING_FILE, &ledger.render_listing(title)).await?;

    info!(count = ledger.len(), "Wrote claim ledger");
    Ok(())
}

/// Write `timeline.json` and its listing
pub async fn write_timeline(
    claims: &[Claim],
    title: &str,
    settings: &TimelineSettings,
    out: &mut OutputDir,
) -> Result<Vec<TimelineEvent>> {
    let events = build_events(claims, settings);
    out.write(TIMELINE_FILE, &serde_json::to_string_pretty(&events)?)
        .await?;
    out.write(TIMELINE_LISTING_FILE, &render_timeline(&events, title))
        .await?;

    info!(count = events.len(), "Wrote timeline");
    Ok(events)
}

/// Load `claims.json` from a site directory
pub async fn load_claims(site_dir: &Path) -> Result<Vec<Claim>> {
    let path = site_dir.join(CLAIMS_FILE);
    if !path.exists() {
        return Err(DossierError::ClaimsNotFound(site_dir.to_path_buf()).into());
    }

    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Counts reported by a full build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub sections: usize,
    pub claims: usize,
    pub events: usize,
}

/// `split`: section metadata and sanitized pages
pub async fn split(input: &Path, out_dir: &Path, config: &ResolvedConfig) -> Result<usize> {
    let doc = Document::load(input, config).await?;
    let mut out = OutputDir::open(out_dir).await?;
    let count = write_pages(&doc, &mut out).await?;
    out.finish().await?;
    Ok(count)
}

/// `claims`: the claim ledger
pub async fn claims(source: &Path, out_dir: &Path, config: &ResolvedConfig) -> Result<Ledger> {
    let doc = Document::load(source, config).await?;
    let ledger = doc.ledger();
    let mut out = OutputDir::open(out_dir).await?;
    write_ledger(&ledger, &doc.title, &mut out).await?;
    out.finish().await?;
    Ok(ledger)
}

/// `timeline`: dated events from an existing `claims.json`
pub async fn timeline(site_dir: &Path, config: &ResolvedConfig) -> Result<Vec<TimelineEvent>> {
    let claims = load_claims(site_dir).await?;
    let title = config.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let mut out = OutputDir::open(site_dir).await?;
    let events = write_timeline(&claims, title, &config.timeline(), &mut out).await?;
    out.finish().await?;
    Ok(events)
}

/// `build`: pages, ledger and timeline from one load of the input
pub async fn build(input: &Path, out_dir: &Path, config: &ResolvedConfig) -> Result<BuildSummary> {
    let doc = Document::load(input, config).await?;
    let mut out = OutputDir::open(out_dir).await?;

    let sections = write_pages(&doc, &mut out).await?;
    let ledger = doc.ledger();
    write_ledger(&ledger, &doc.title, &mut out).await?;
    let events = write_timeline(ledger.claims(), &doc.title, &config.timeline(), &mut out).await?;
    out.finish().await?;

    Ok(BuildSummary {
        sections,
        claims: ledger.len(),
        events: events.len(),
    })
}

/// `assemble`: concatenate part files into one source file
pub async fn assemble(parts_dir: &Path, out_file: &Path) -> Result<usize> {
    if !parts_dir.exists() {
        return Err(DossierError::InputNotFound(parts_dir.to_path_buf()).into());
    }

    let parts = load_parts(parts_dir).await?;
    let source =
        assemble_source(&parts).ok_or_else(|| DossierError::NoParts(parts_dir.to_path_buf()))?;

    if let Some(parent) = out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(out_file, &source)
        .await
        .with_context(|| format!("Failed to write {}", out_file.display()))?;

    info!(parts = parts.len(), out = %out_file.display(), "Assembled source");
    Ok(parts.len())
}
