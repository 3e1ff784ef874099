//! Claim Queue Integration Tests
//!
//! Applies queue files to part files on disk and reads the result back
//! through the extractor.

use std::path::Path;

use dossier::extract::extract_claims;
use dossier::queue::{apply_queue, QueueError};
use dossier::{Ledger, PartFile, SectionModel};
use tempfile::TempDir;
use tokio::fs;

const PART: &str = "---
id: budget
title: Budget
---

## Audits

Closing remarks.
";

const QUEUE: &str = r###"
# pending claims
- claim: The treasury was audited twice.
  part: parts/budget.md
  insert_after: "## Audits"
  date: 2024-03-01
  title: Audit disclosed
  tags: [Finance, Public Oversight]
  sources:
    - https://example.org/report
- claim: Spending rose in 2023.
  part: parts/budget.md
"###;

async fn setup(queue: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("parts")).await.unwrap();
    fs::write(temp.path().join("parts/budget.md"), PART).await.unwrap();
    fs::write(temp.path().join("queue.yaml"), queue).await.unwrap();
    temp
}

async fn read_part(root: &Path) -> String {
    fs::read_to_string(root.join("parts/budget.md")).await.unwrap()
}

#[tokio::test]
async fn test_apply_queue_splices_claims() {
    let temp = setup(QUEUE).await;
    let report = apply_queue(&temp.path().join("queue.yaml"), temp.path(), false)
        .await
        .unwrap();

    assert_eq!(report.items, 2);
    assert_eq!(report.touched, vec![temp.path().join("parts/budget.md")]);

    let updated = read_part(temp.path()).await;
    assert!(updated.contains(
        "## Audits\n\nThe treasury was audited twice. [C]\nDATE: 2024-03-01\nTITLE: Audit disclosed\nTAGS: finance,public-oversight\nNOTE: \n- https://example.org/report\n\nClosing remarks."
    ));
    assert!(updated.ends_with("Spending rose in 2023. [C]\nDATE: \nTITLE: \nTAGS: \nNOTE: \n"));
}

#[tokio::test]
async fn test_spliced_claims_extract_back() {
    let temp = setup(QUEUE).await;
    apply_queue(&temp.path().join("queue.yaml"), temp.path(), false)
        .await
        .unwrap();

    let parts = vec![PartFile::new("budget.md", read_part(temp.path()).await)];
    let source = dossier::extract::assemble_source(&parts).unwrap();
    let model = SectionModel::from_parts(&parts);
    let ledger = Ledger::assemble(extract_claims(&source, &model).claims);
    let claims = ledger.claims();

    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].id, "C-budget-001");
    assert_eq!(claims[0].text, "The treasury was audited twice.");
    assert_eq!(claims[0].date, "2024-03-01");
    assert_eq!(claims[0].title, "Audit disclosed");
    assert_eq!(claims[0].tags, vec!["finance", "public-oversight"]);
    assert_eq!(claims[0].links, vec!["https://example.org/report"]);

    assert_eq!(claims[1].text, "Spending rose in 2023.");
    assert!(claims[1].date.is_empty());
    assert!(claims[1].links.is_empty());
}

#[tokio::test]
async fn test_dry_run_leaves_parts_untouched() {
    let temp = setup(QUEUE).await;
    let report = apply_queue(&temp.path().join("queue.yaml"), temp.path(), true)
        .await
        .unwrap();

    assert_eq!(report.touched.len(), 1);
    assert_eq!(read_part(temp.path()).await, PART);
}

#[tokio::test]
async fn test_empty_queue_changes_nothing() {
    let temp = setup("# nothing queued\n").await;
    let report = apply_queue(&temp.path().join("queue.yaml"), temp.path(), false)
        .await
        .unwrap();

    assert_eq!(report.items, 0);
    assert!(report.touched.is_empty());
    assert_eq!(read_part(temp.path()).await, PART);
}

#[tokio::test]
async fn test_missing_queue_and_part() {
    let temp = setup("- claim: Orphan.\n  part: parts/missing.md\n").await;

    let err = apply_queue(&temp.path().join("absent.yaml"), temp.path(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::QueueNotFound(_)));

    let err = apply_queue(&temp.path().join("queue.yaml"), temp.path(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::PartNotFound(_)));
}

#[tokio::test]
async fn test_missing_field_is_reported_with_index() {
    let temp = setup("- claim: Fine.\n  part: parts/budget.md\n- part: parts/budget.md\n").await;

    let err = apply_queue(&temp.path().join("queue.yaml"), temp.path(), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueueError::MissingField {
            index: 2,
            field: "claim"
        }
    ));
    assert_eq!(read_part(temp.path()).await, PART);
}
