/*!
 * Integration tests for the marking workflow over SQLite
 */

use std::sync::Arc;
use transpage::app_config::MarkingConfig;
use transpage::database::Repository;
use transpage::errors::WorkflowError;
use transpage::page::{ParseCache, UnitId, UnitKind};
use transpage::workflow::{MarkingService, PageStore};
use crate::common::{self, SAMPLE_PAGE};

/// Test the first mark of a fresh page
#[tokio::test]
async fn test_mark_withFreshPage_shouldAssignSequentialIds() {
    common::init_logging();
    let svc = common::in_memory_service();
    svc.import("Guide", SAMPLE_PAGE).await.unwrap();

    let preview = svc.preview("Guide").await.unwrap();
    assert!(preview.text_changed);
    assert!(preview.units.iter().all(|u| u.kind == UnitKind::New));
    assert_eq!(preview.next_free_id, 4);

    let outcome = svc.commit(&preview, &[]).await.unwrap();
    assert_eq!(outcome.unit_count, 3);
    assert!(outcome.fuzzy.is_empty());

    let stored = svc.store().load_previous_units("Guide").await.unwrap();
    let ids: Vec<u64> = stored.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

/// Test a full edit cycle: change, insert and delete paragraphs
#[tokio::test]
async fn test_mark_afterEdits_shouldClassifyEveryUnit() {
    let svc = common::in_memory_service();
    svc.import("Guide", "<translate>One\n\nTwo\n\nThree</translate>").await.unwrap();
    let first = svc.mark("Guide", &[]).await.unwrap();
    let marked = svc.store().fetch_text("Guide", first.revision).await.unwrap();

    // Unit 2 edited, unit 3 removed, a new paragraph added at the end
    let edited = marked
        .replace("Two", "Two, revised")
        .replace("\n\n<!--T:3-->\nThree", "")
        .replace("</translate>", "\n\nFour</translate>");
    svc.import("Guide", &edited).await.unwrap();

    let preview = svc.preview("Guide").await.unwrap();

    let summary: Vec<(UnitId, UnitKind)> = preview.units.iter().map(|u| (u.id, u.kind)).collect();
    assert_eq!(
        summary,
        vec![
            (UnitId::Assigned(1), UnitKind::Unchanged),
            (UnitId::Assigned(2), UnitKind::Changed),
            (UnitId::Assigned(4), UnitKind::New),
        ]
    );
    assert_eq!(preview.deleted.len(), 1);
    assert_eq!(preview.deleted[0].id, UnitId::Assigned(3));
    assert_eq!(preview.deleted[0].text, "Three");

    let outcome = svc.commit(&preview, &[]).await.unwrap();
    assert_eq!(outcome.fuzzy, vec![2]);
    assert_eq!(outcome.deleted, vec![3]);
    assert_eq!(svc.store().next_free_id("page|Guide").await.unwrap(), 5);
}

/// Test that a dry run leaves the store untouched
#[tokio::test]
async fn test_preview_shouldNotWrite() {
    let svc = common::in_memory_service();
    let imported = svc.import("Guide", SAMPLE_PAGE).await.unwrap();

    svc.preview("Guide").await.unwrap();
    svc.preview("Guide").await.unwrap();

    let state = svc.store().load_document_state("Guide").await.unwrap();
    assert_eq!(state.head_revision, imported.revision);
    assert_eq!(state.marked_revision, None);
    assert!(svc.store().load_previous_units("Guide").await.unwrap().is_empty());
}

/// Test that blocking can be switched off in the configuration
#[tokio::test]
async fn test_mark_withBlockingDisabled_shouldCommitDespiteErrors() {
    let repo = Repository::new_in_memory().unwrap();
    let config = MarkingConfig { block_on_errors: false };
    let svc = MarkingService::new(Arc::new(repo), ParseCache::default(), config);
    svc.import("Guide", "<translate>Text <!--T: broken</translate>").await.unwrap();

    let outcome = svc.mark("Guide", &[]).await.unwrap();

    assert_eq!(outcome.unit_count, 1);
}

/// Test that an unparseable head revision cannot be marked
#[tokio::test]
async fn test_mark_withUnbalancedHead_shouldFailParse() {
    let svc = common::in_memory_service();
    svc.import("Guide", "<translate>One</translate>").await.unwrap();
    svc.import("Guide", "<translate>One").await.unwrap();

    let result = svc.mark("Guide", &[]).await;

    assert!(matches!(result, Err(WorkflowError::Parse(_))));
}

/// Test that concurrent marks of one page never hand out the same id twice
#[tokio::test]
async fn test_mark_concurrently_shouldSerializePerPage() {
    let svc = Arc::new(common::in_memory_service());
    svc.import("Guide", "<translate>A\n\nB</translate>").await.unwrap();

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.mark("Guide", &[]).await })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.mark("Guide", &[]).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    // Whichever ran second found the markers already written and changed nothing
    assert!(results.iter().all(|r| r.is_ok()));
    let stored = svc.store().load_previous_units("Guide").await.unwrap();
    let ids: Vec<u64> = stored.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(svc.store().next_free_id("page|Guide").await.unwrap(), 3);
}
