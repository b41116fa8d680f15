//! End-to-end tests: store, engine, page snapshot, and message boundary

use jobsweep::page::{CardSnapshot, PageSnapshot, SnapshotPage};
use jobsweep::{Category, JobsweepBuilder, JobsweepError};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn card(company: &str, title: &str) -> CardSnapshot {
    CardSnapshot {
        company: Some(company.to_string()),
        title: Some(title.to_string()),
        dismissed: false,
        affordance: true,
        confirms: true,
        confirm_delay_ms: None,
    }
}

fn linkedin_page(cards: Vec<CardSnapshot>) -> SnapshotPage {
    SnapshotPage::new(&PageSnapshot {
        site: "https://www.linkedin.com/jobs/search".to_string(),
        cards,
    })
}

async fn quick_build() -> jobsweep::Jobsweep {
    JobsweepBuilder::new()
        .confirm_timeout(Duration::from_millis(300))
        .poll_interval(Duration::from_millis(5))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_company_filter_end_to_end() {
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let page = linkedin_page(vec![
        card("Acme Corp", "Engineer"),
        card("Globex", "Engineer"),
    ]);

    let report = sweep.sweep(&page).await.unwrap();
    assert_eq!(report.dismissed(), 1);
    report.settle().await;

    // Counter was updated across the message boundary
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sweep.store().dismissed_count().await.unwrap(), 1);

    // Only the matching card was dismissed
    let state = page.to_snapshot();
    assert!(state.cards[0].dismissed);
    assert!(!state.cards[1].dismissed);
}

#[tokio::test]
async fn test_title_regex_end_to_end() {
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Titles, "/^senior/")
        .await
        .unwrap();

    let page = linkedin_page(vec![
        card("Acme", "Senior Engineer"),
        card("Acme", "Engineering Lead"),
    ]);

    let report = sweep.sweep(&page).await.unwrap();
    assert_eq!(report.dismissed(), 1);

    let state = page.to_snapshot();
    assert!(state.cards[0].dismissed);
    assert!(!state.cards[1].dismissed);
}

#[tokio::test]
async fn test_second_sweep_counts_zero() {
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let page = linkedin_page(vec![card("Acme Corp", "Engineer")]);

    let first = sweep.sweep(&page).await.unwrap();
    assert_eq!(first.dismissed(), 1);
    first.settle().await;

    let second = sweep.sweep(&page).await.unwrap();
    assert_eq!(second.dismissed(), 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sweep.store().dismissed_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_off_target_sweep_is_an_error() {
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let page = SnapshotPage::new(&PageSnapshot {
        site: "https://example.com/careers".to_string(),
        cards: vec![card("Acme", "Engineer")],
    });

    let err = sweep.sweep(&page).await.unwrap_err();
    assert!(matches!(err, JobsweepError::NotOnTargetSite));
    assert_eq!(sweep.store().dismissed_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delayed_confirmation_is_observed() {
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let mut slow = card("Acme", "Engineer");
    slow.confirm_delay_ms = Some(30);
    let page = linkedin_page(vec![slow]);

    let report = sweep.sweep(&page).await.unwrap();
    assert_eq!(report.dismissed(), 1);
    assert_eq!(report.settle().await, 1);
}

#[tokio::test]
async fn test_unconfirmed_dismissal_still_counts() {
    // The count is optimistic: a trigger whose marker never appears is still
    // reported as dismissed, the watcher just times out.
    let sweep = quick_build().await;
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let mut silent = card("Acme", "Engineer");
    silent.confirms = false;
    let page = linkedin_page(vec![silent]);

    let report = sweep.sweep(&page).await.unwrap();
    assert_eq!(report.dismissed(), 1);
    assert_eq!(report.settle().await, 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sweep.store().dismissed_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sweep_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("jobsweep.json");

    let sweep = JobsweepBuilder::new()
        .store_file(&store_path)
        .confirm_timeout(Duration::from_millis(300))
        .poll_interval(Duration::from_millis(5))
        .build()
        .await
        .unwrap();
    sweep
        .store()
        .add_patterns(Category::Companies, "Acme")
        .await
        .unwrap();

    let page = linkedin_page(vec![card("Acme Corp", "Engineer")]);
    let report = sweep.sweep(&page).await.unwrap();
    assert_eq!(report.dismissed(), 1);
    report.settle().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(sweep);

    // Reopen and verify the counter persisted
    let reopened = JobsweepBuilder::new()
        .store_file(&store_path)
        .build()
        .await
        .unwrap();
    assert_eq!(reopened.store().dismissed_count().await.unwrap(), 1);
}
