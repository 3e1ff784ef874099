//! Site Integration Tests
//!
//! Runs the filesystem pipeline (split, claims, timeline, build, assemble)
//! against temporary directories.

use std::path::Path;

use dossier::config::ResolvedConfig;
use dossier::domain::{Claim, ClaimMin, Section, TimelineEvent};
use dossier::site;
use dossier::DossierError;
use tempfile::TempDir;
use tokio::fs;

const INTRO: &str = "---
id: intro
order: 1
number: 1
title: \"Intro: scope\"
keywords: [harbor, audit]
---

# Harbor Authority

The authority was founded in 1998. [C]
DATE: 1998-05-01
- https://example.org/founding

Plain prose stays.
";

const BUDGET: &str = "---
id: budget
order: 2
number: 2
title: Budget
---

The treasury was audited twice. [C]
DATE: 2024-03-01
TITLE: Audit disclosed
- https://example.org/report

CLAIM: Spending rose in 2023.
";

async fn write_parts(dir: &Path) {
    fs::create_dir_all(dir).await.unwrap();
    fs::write(dir.join("01-intro.md"), INTRO).await.unwrap();
    fs::write(dir.join("02-budget.md"), BUDGET).await.unwrap();
    fs::write(dir.join("notes.txt"), "ignored").await.unwrap();
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let content = fs::read_to_string(path).await.unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_build_from_parts_writes_all_artifacts() {
    let temp = TempDir::new().unwrap();
    let parts = temp.path().join("parts");
    let out = temp.path().join("site");
    write_parts(&parts).await;

    let summary = site::build(&parts, &out, &ResolvedConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.sections, 2);
    assert_eq!(summary.claims, 3);
    assert_eq!(summary.events, 2);

    let toc: Vec<Section> = read_json(&out.join(site::TOC_FILE)).await;
    assert_eq!(toc[0].id, "intro");
    assert_eq!(toc[0].title, "Intro: scope");
    assert_eq!(toc[0].keywords, vec!["harbor", "audit"]);
    assert_eq!(toc[1].url, "budget.html");

    let page = fs::read_to_string(out.join("intro.txt")).await.unwrap();
    assert!(page.contains("The authority was founded in 1998.\n\nPlain prose stays."));
    assert!(!page.contains("[C]"));
    assert!(!page.contains("example.org"));

    let claims: Vec<Claim> = read_json(&out.join(site::CLAIMS_FILE)).await;
    let ids: Vec<&str> = claims.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["C-intro-001", "C-budget-001", "C-budget-002"]);
    assert_eq!(claims[0].section_label, "1. Intro: scope");

    let min: Vec<ClaimMin> = read_json(&out.join(site::CLAIMS_MIN_FILE)).await;
    assert_eq!(min.len(), 3);
    assert_eq!(min[1].u, "budget.html");

    let events: Vec<TimelineEvent> = read_json(&out.join(site::TIMELINE_FILE)).await;
    assert_eq!(events[0].date, "1998-05-01");
    assert_eq!(events[1].title, "Audit disclosed");

    let listing = fs::read_to_string(out.join(site::CLAIMS_LISTING_FILE)).await.unwrap();
    assert!(listing.starts_with("# Harbor Authority - Claims Ledger"));
    let timeline = fs::read_to_string(out.join(site::TIMELINE_LISTING_FILE)).await.unwrap();
    assert!(timeline.contains("## 2024-03-01"));
}

#[tokio::test]
async fn test_manifest_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let parts = temp.path().join("parts");
    write_parts(&parts).await;

    let first = temp.path().join("first");
    let second = temp.path().join("second");
    site::build(&parts, &first, &ResolvedConfig::default()).await.unwrap();
    site::build(&parts, &second, &ResolvedConfig::default()).await.unwrap();

    let a = fs::read_to_string(first.join(site::MANIFEST_FILE)).await.unwrap();
    let b = fs::read_to_string(second.join(site::MANIFEST_FILE)).await.unwrap();
    assert_eq!(a, b);

    let manifest: std::collections::BTreeMap<String, String> =
        read_json(&first.join(site::MANIFEST_FILE)).await;
    let claims = fs::read(first.join(site::CLAIMS_FILE)).await.unwrap();
    assert_eq!(manifest[site::CLAIMS_FILE], site::digest(&claims));
    assert!(manifest.contains_key("intro.txt"));
}

#[tokio::test]
async fn test_claims_from_assembled_source_uses_sibling_parts() {
    let temp = TempDir::new().unwrap();
    let parts = temp.path().join("parts");
    write_parts(&parts).await;

    let source = temp.path().join("source.md");
    let count = site::assemble(&parts, &source).await.unwrap();
    assert_eq!(count, 2);

    let out = temp.path().join("site");
    let config = ResolvedConfig {
        title: Some("Configured Title".to_string()),
        ..ResolvedConfig::default()
    };
    let ledger = site::claims(&source, &out, &config).await.unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.claims()[1].id, "C-budget-001");

    let listing = fs::read_to_string(out.join(site::CLAIMS_LISTING_FILE)).await.unwrap();
    assert!(listing.starts_with("# Configured Title - Claims Ledger"));

    // Timeline runs later, from the written claims.json
    let events = site::timeline(&out, &config).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(out.join(site::TIMELINE_FILE).exists());

    let manifest: std::collections::BTreeMap<String, String> =
        read_json(&out.join(site::MANIFEST_FILE)).await;
    assert!(manifest.contains_key(site::CLAIMS_FILE));
    assert!(manifest.contains_key(site::TIMELINE_FILE));
}

#[tokio::test]
async fn test_split_single_file_by_headings() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("dossier.md");
    fs::write(
        &source,
        "Case File\n\n1. Opening\nIntro text. [C]\n- https://a.example\n\n---\n\n2. Money\nCLAIM: Hidden.\nVisible.\n",
    )
    .await
    .unwrap();

    let out = temp.path().join("site");
    let count = site::split(&source, &out, &ResolvedConfig::default())
        .await
        .unwrap();
    assert_eq!(count, 2);

    let opening = fs::read_to_string(out.join("01-opening.txt")).await.unwrap();
    assert_eq!(opening, "1. Opening\nIntro text.\n");
    let money = fs::read_to_string(out.join("02-money.txt")).await.unwrap();
    assert_eq!(money, "2. Money\nVisible.\n");
}

#[tokio::test]
async fn test_source_headings_drive_pages_beside_parts_dir() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source.md");
    fs::write(
        &source,
        "Case File\n\n1. Opening\nIntro text. [C]\n\n---\n\n2. Money\nVisible.\n",
    )
    .await
    .unwrap();
    fs::create_dir_all(temp.path().join("parts")).await.unwrap();
    fs::write(temp.path().join("parts/x.md"), "---\nid: other\n---\nOther")
        .await
        .unwrap();

    let out = temp.path().join("site");
    let summary = site::build(&source, &out, &ResolvedConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.sections, 2);

    let toc: Vec<Section> = read_json(&out.join(site::TOC_FILE)).await;
    let ids: Vec<&str> = toc.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["01-opening", "02-money"]);
    assert!(out.join("01-opening.txt").exists());
    assert!(!out.join("other.txt").exists());

    // Claims follow the parts index, which only knows marked parts
    let claims: Vec<Claim> = read_json(&out.join(site::CLAIMS_FILE)).await;
    assert_eq!(claims[0].section_id, "no-part");
}

#[tokio::test]
async fn test_missing_inputs_are_fatal() {
    let temp = TempDir::new().unwrap();
    let config = ResolvedConfig::default();
    let out = temp.path().join("site");

    let err = site::build(&temp.path().join("absent.md"), &out, &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DossierError>(),
        Some(DossierError::InputNotFound(_))
    ));

    let empty = temp.path().join("empty");
    fs::create_dir_all(&empty).await.unwrap();
    let err = site::build(&empty, &out, &config).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DossierError>(),
        Some(DossierError::NoParts(_))
    ));

    let err = site::timeline(&empty, &config).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DossierError>(),
        Some(DossierError::ClaimsNotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_parts_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    let parts = site::load_parts(&temp.path().join("nope")).await.unwrap();
    assert!(parts.is_empty());
}
