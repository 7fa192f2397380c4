/*!
 * Integration tests for a page moving through its translation states
 */

use anyhow::Result;
use transpage::sync::PageState;
use transpage::workflow::PageStore;
use crate::common::{self, SAMPLE_PAGE};

fn names(pages: &[transpage::workflow::PageSummary]) -> Vec<&str> {
    pages.iter().map(|p| p.name.as_str()).collect()
}

/// Test proposed, active, broken and outdated in order
#[tokio::test]
async fn test_lifecycle_shouldWalkThroughAllStates() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let svc = common::file_service(&temp_dir.path().join("pages.db"))?;

    svc.import("Guide", SAMPLE_PAGE).await?;
    svc.import("Notes", "No translatable content here.").await?;
    let pages = svc.list_pages().await?;
    assert_eq!(names(pages.get(PageState::Proposed)), vec!["Guide"]);
    assert_eq!(pages.len(), 1);

    let marked = svc.mark("Guide", &[]).await?;
    let pages = svc.list_pages().await?;
    assert_eq!(names(&pages.active), vec!["Guide"]);

    // A bad edit cannot be tagged, so the page breaks
    let text = svc.store().fetch_text("Guide", marked.revision).await?;
    svc.import("Guide", &format!("{}<translate>", text)).await?;
    let pages = svc.list_pages().await?;
    assert_eq!(names(&pages.broken), vec!["Guide"]);

    // A good edit is tagged ready again, but not yet marked
    svc.import("Guide", &text.replace("talk page", "forum")).await?;
    let pages = svc.list_pages().await?;
    assert_eq!(names(&pages.outdated), vec!["Guide"]);

    svc.mark("Guide", &[]).await?;
    let pages = svc.list_pages().await?;
    assert_eq!(names(&pages.active), vec!["Guide"]);
    assert_eq!(pages.active[0].unit_count, 3);
    Ok(())
}

/// Test that unmarking drops the page from the listing and remarking keeps ids
#[tokio::test]
async fn test_unmark_thenRemark_shouldKeepIds() -> Result<()> {
    let svc = common::in_memory_service();
    svc.import("Guide", SAMPLE_PAGE).await?;
    svc.mark("Guide", &[]).await?;

    svc.unmark("Guide").await?;
    assert!(svc.list_pages().await?.is_empty());

    let head = svc.tag_ready("Guide").await?;
    let outcome = svc.mark("Guide", &[]).await?;

    assert_eq!(outcome.revision, head);
    assert!(outcome.fuzzy.is_empty());
    let ids: Vec<u64> = svc
        .store()
        .load_previous_units("Guide")
        .await?
        .iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}

/// Test that data survives reopening the database file
#[tokio::test]
async fn test_reopen_shouldKeepMarkedUnits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("pages.db");

    {
        let svc = common::file_service(&db_path)?;
        svc.import("Guide", SAMPLE_PAGE).await?;
        svc.mark("Guide", &[]).await?;
    }

    let svc = common::file_service(&db_path)?;
    let preview = svc.preview("Guide").await?;

    assert!(!preview.text_changed);
    assert_eq!(preview.next_free_id, 4);
    Ok(())
}

/// Test that tagging a page without regions is refused
#[test]
fn test_tagReady_withoutRegions_shouldFail() {
    let svc = common::in_memory_service();

    tokio_test::block_on(async {
        svc.import("Notes", "Plain text").await.unwrap();
        assert!(svc.tag_ready("Notes").await.is_err());
    });
}
