//! Command-line interface for dossier.
//!
//! Provides commands for splitting a dossier into pages, extracting the
//! claim ledger, building the timeline, assembling parts, and applying a
//! claim queue.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::queue::{self, DEFAULT_QUEUE_PATH};
use crate::site;

/// dossier - claim ledger and section pages from an annotated document
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write section metadata (toc.json) and sanitized pages
    Split {
        /// Parts directory or single source file
        input: PathBuf,

        /// Output directory (defaults to the configured site dir)
        out_dir: Option<PathBuf>,
    },

    /// Extract the claim ledger (claims.json, claims.min.json, claims.md)
    Claims {
        /// Source file (a sibling parts dir is used as section index) or parts directory
        source: PathBuf,

        /// Output directory (defaults to the configured site dir)
        out_dir: Option<PathBuf>,
    },

    /// Build timeline.json and timeline.md from an existing claims.json
    Timeline {
        /// Site directory holding claims.json (defaults to the configured site dir)
        site_dir: Option<PathBuf>,
    },

    /// Run split, claims and timeline in one pass
    Build {
        /// Parts directory or single source file
        input: PathBuf,

        /// Output directory (defaults to the configured site dir)
        out_dir: Option<PathBuf>,
    },

    /// Concatenate part files into one source file
    Assemble {
        /// Directory of *.md part files
        parts_dir: PathBuf,

        /// Output file
        out_file: PathBuf,
    },

    /// Splice queued claims into part files
    Queue {
        /// Queue YAML file
        #[arg(default_value = DEFAULT_QUEUE_PATH)]
        queue: PathBuf,

        /// Root that part paths are relative to
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Split { input, out_dir } => {
                let cfg = config::config()?;
                let out = out_dir_or_default(out_dir, cfg);
                let count = site::split(&input, &out, cfg).await?;
                println!("Wrote {} ({} sections)", out.display(), count);
                Ok(())
            }
            Commands::Claims { source, out_dir } => {
                let cfg = config::config()?;
                let out = out_dir_or_default(out_dir, cfg);
                let ledger = site::claims(&source, &out, cfg).await?;
                println!(
                    "Wrote {} ({} claims)",
                    out.join(site::CLAIMS_FILE).display(),
                    ledger.len()
                );
                Ok(())
            }
            Commands::Timeline { site_dir } => {
                let cfg = config::config()?;
                let dir = out_dir_or_default(site_dir, cfg);
                let events = site::timeline(&dir, cfg).await?;
                println!(
                    "Wrote {} ({} events)",
                    dir.join(site::TIMELINE_FILE).display(),
                    events.len()
                );
                Ok(())
            }
            Commands::Build { input, out_dir } => {
                let cfg = config::config()?;
                let out = out_dir_or_default(out_dir, cfg);
                let summary = site::build(&input, &out, cfg).await?;
                println!(
                    "Wrote {} ({} sections, {} claims, {} events)",
                    out.display(),
                    summary.sections,
                    summary.claims,
                    summary.events
                );
                Ok(())
            }
            Commands::Assemble {
                parts_dir,
                out_file,
            } => {
                let count = site::assemble(&parts_dir, &out_file).await?;
                println!("Wrote {} from {} part(s)", out_file.display(), count);
                Ok(())
            }
            Commands::Queue {
                queue,
                root,
                dry_run,
            } => run_queue(&queue, &root, dry_run).await,
            Commands::Config => show_config(),
        }
    }
}

fn out_dir_or_default(dir: Option<PathBuf>, cfg: &ResolvedConfig) -> PathBuf {
    dir.unwrap_or_else(|| cfg.site_dir.clone())
}

async fn run_queue(queue_path: &Path, root: &Path, dry_run: bool) -> Result<()> {
    let report = queue::apply_queue(queue_path, root, dry_run).await?;

    if report.touched.is_empty() {
        println!("No changes.");
        return Ok(());
    }

    println!("{}", if dry_run { "Would update:" } else { "Updated:" });
    for path in &report.touched {
        println!("- {}", path.display());
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Dossier Configuration");
    println!("=====================");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!(
        "Title:      {}",
        cfg.title.as_deref().unwrap_or("(first line of the document)")
    );
    println!("Site dir:   {}", cfg.site_dir.display());
    println!("Parts dir:  {}", cfg.parts_dir);
    println!();
    println!("Timeline:");
    println!("  Title max chars: {}", cfg.title_max_chars);
    println!("  Ellipsis:        {}", cfg.ellipsis);

    Ok(())
}
