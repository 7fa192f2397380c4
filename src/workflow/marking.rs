/*!
 * Marking pages for translation.
 *
 * The service ties the parser and the identity resolver to a `PageStore`:
 *
 * - `import` saves a revision and tags it ready when it is translatable
 * - `preview` parses the head revision and resolves unit ids without writing
 * - `commit` persists a preview: markers written back, units replaced,
 *   watermark raised and the revision tagged, all in one step
 * - `unmark` withdraws a page from translation
 * - `list_pages` groups every page by its state
 *
 * Resolve-then-commit runs under a per-document lock.
 */

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

use super::locks::DocumentLocks;
use super::store::{page_group, MarkCommit, PageStore, PageSummary};
use crate::app_config::MarkingConfig;
use crate::errors::WorkflowError;
use crate::page::{parse, Issue, ParseCache, ParseResult, Rev, Severity, Snapshot, Unit, UnitKind};
use crate::sync::{classify_all, resolve_units, ClassifiedPages};

/// Everything a mark would change, computed without writing
#[derive(Debug, Clone, Serialize)]
pub struct MarkPreview {
    /// Page name
    pub document: String,
    /// Revision the preview was built from
    pub revision: Rev,
    /// Current units with their resolved ids and kinds
    pub units: Vec<Unit>,
    /// Stored units no longer present
    pub deleted: Vec<Unit>,
    /// Watermark after the mark
    pub next_free_id: u64,
    /// Page text with every unit carrying its marker
    pub source_text: String,
    /// Whether `source_text` differs from the stored revision
    pub text_changed: bool,
}

impl MarkPreview {
    /// All issues, in unit order
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.units.iter().flat_map(|u| u.issues.iter())
    }

    /// Number of error-severity issues
    pub fn error_count(&self) -> usize {
        self.issues().filter(|i| i.severity == Severity::Error).count()
    }

    /// Units whose text changed since the last mark
    pub fn changed(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.kind == UnitKind::Changed)
    }
}

/// Result of a committed mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkOutcome {
    /// Page name
    pub document: String,
    /// Revision that was marked
    pub revision: Rev,
    /// Number of units stored
    pub unit_count: usize,
    /// Changed units whose existing translations need review
    pub fuzzy: Vec<u64>,
    /// Ids of units that were removed
    pub deleted: Vec<u64>,
}

/// Result of importing a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// Saved revision
    pub revision: Rev,
    /// Whether the revision was tagged ready for translation
    pub ready: bool,
}

/// Marking workflow over a page store
pub struct MarkingService<S: PageStore> {
    store: Arc<S>,
    cache: ParseCache,
    locks: DocumentLocks,
    config: MarkingConfig,
}

impl<S: PageStore> MarkingService<S> {
    /// Create a new marking service
    pub fn new(store: Arc<S>, cache: ParseCache, config: MarkingConfig) -> Self {
        Self {
            store,
            cache,
            locks: DocumentLocks::new(),
            config,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Parse a stored revision, going through the cache
    pub async fn parse_revision(&self, document: &str, revision: Rev) -> Result<Arc<ParseResult>, WorkflowError> {
        if let Some(parsed) = self.cache.get(document, revision) {
            return Ok(parsed);
        }

        let snapshot = self.load_snapshot(document, revision).await?;
        self.parse_snapshot(&snapshot)
    }

    async fn load_snapshot(&self, document: &str, revision: Rev) -> Result<Snapshot, WorkflowError> {
        let text = self.store.fetch_text(document, revision).await?;
        Ok(Snapshot::new(document, revision, &text))
    }

    fn parse_snapshot(&self, snapshot: &Snapshot) -> Result<Arc<ParseResult>, WorkflowError> {
        if let Some(parsed) = self.cache.get(&snapshot.document, snapshot.revision) {
            return Ok(parsed);
        }

        let parsed = Arc::new(parse(&snapshot.text)?);
        self.cache.store(&snapshot.document, snapshot.revision, parsed.clone());
        Ok(parsed)
    }

    /// Save a new revision, tagging it ready when it holds translatable regions.
    ///
    /// A revision that does not parse is still saved, just not tagged.
    pub async fn import(&self, document: &str, text: &str) -> Result<ImportOutcome, WorkflowError> {
        let _guard = self.locks.lock(document).await;

        let revision = self.store.save_revision(document, text).await?;

        let ready = match self.parse_revision(document, revision).await {
            Ok(parsed) if parsed.is_translatable() => {
                self.store.add_ready_tag(document, revision).await?;
                true
            }
            Ok(_) => false,
            Err(WorkflowError::Parse(e)) => {
                warn!("Revision {} of '{}' is not ready for translation: {}", revision, document, e);
                false
            }
            Err(e) => return Err(e),
        };

        info!("Imported '{}' as revision {}{}", document, revision, if ready { " (ready)" } else { "" });
        Ok(ImportOutcome { revision, ready })
    }

    /// Tag the head revision ready for translation
    pub async fn tag_ready(&self, document: &str) -> Result<Rev, WorkflowError> {
        let _guard = self.locks.lock(document).await;

        let head = self.store.load_document_state(document).await?.head_revision;
        let parsed = self.parse_revision(document, head).await?;
        if !parsed.is_translatable() {
            return Err(WorkflowError::NotTranslatable(document.to_string()));
        }

        self.store.add_ready_tag(document, head).await?;
        Ok(head)
    }

    /// Compute what marking the head revision would do
    pub async fn preview(&self, document: &str) -> Result<MarkPreview, WorkflowError> {
        let _guard = self.locks.lock(document).await;
        self.preview_locked(document).await
    }

    async fn preview_locked(&self, document: &str) -> Result<MarkPreview, WorkflowError> {
        let head = self.store.load_document_state(document).await?.head_revision;
        let snapshot = self.load_snapshot(document, head).await?;
        let parsed = self.parse_snapshot(&snapshot)?;
        if !parsed.is_translatable() {
            return Err(WorkflowError::NotTranslatable(document.to_string()));
        }

        let previous = self.store.load_previous_units(document).await?;
        let next_free_id = self.store.next_free_id(&page_group(document)).await?;
        let resolution = resolve_units(&parsed.units, &previous, next_free_id)?;

        let source_text = parsed.with_units(resolution.current()).source_text();
        let text_changed = source_text != snapshot.text;

        let (deleted, units): (Vec<Unit>, Vec<Unit>) = resolution
            .units
            .into_iter()
            .partition(|u| u.kind == UnitKind::Deleted);

        debug!(
            "Preview of '{}' @ {}: {} unit(s), {} deleted, next id {}",
            document,
            head,
            units.len(),
            deleted.len(),
            resolution.next_free_id
        );

        Ok(MarkPreview {
            document: document.to_string(),
            revision: head,
            units,
            deleted,
            next_free_id: resolution.next_free_id,
            source_text,
            text_changed,
        })
    }

    /// Persist a preview.
    ///
    /// Fails with `Stale` when the page moved on since the preview was built.
    /// Changed units listed in `no_fuzzy` keep their translations as they are.
    pub async fn commit(&self, preview: &MarkPreview, no_fuzzy: &[u64]) -> Result<MarkOutcome, WorkflowError> {
        let _guard = self.locks.lock(&preview.document).await;

        let head = self.store.load_document_state(&preview.document).await?.head_revision;
        if head != preview.revision {
            return Err(WorkflowError::Stale {
                document: preview.document.clone(),
                expected: preview.revision,
                actual: head,
            });
        }

        self.commit_locked(preview, no_fuzzy).await
    }

    /// Preview and commit in one step
    pub async fn mark(&self, document: &str, no_fuzzy: &[u64]) -> Result<MarkOutcome, WorkflowError> {
        let _guard = self.locks.lock(document).await;
        let preview = self.preview_locked(document).await?;
        self.commit_locked(&preview, no_fuzzy).await
    }

    async fn commit_locked(&self, preview: &MarkPreview, no_fuzzy: &[u64]) -> Result<MarkOutcome, WorkflowError> {
        let errors = preview.error_count();
        if self.config.block_on_errors && errors > 0 {
            warn!("Refusing to mark '{}': {} blocking issue(s)", preview.document, errors);
            return Err(WorkflowError::Blocked {
                document: preview.document.clone(),
                count: errors,
            });
        }

        let units: Vec<(u64, String)> = preview
            .units
            .iter()
            .filter_map(|u| u.id.number().map(|id| (id, u.text.clone())))
            .collect();
        let unit_count = units.len();

        let commit = MarkCommit {
            document: preview.document.clone(),
            base_revision: preview.revision,
            new_text: preview.text_changed.then(|| preview.source_text.clone()),
            units,
            next_free_id: preview.next_free_id,
        };

        let revision = self.store.commit_mark(commit).await?;
        self.cache.invalidate(&preview.document);

        let fuzzy: Vec<u64> = preview
            .changed()
            .filter_map(|u| u.id.number())
            .filter(|id| !no_fuzzy.contains(id))
            .collect();
        let deleted: Vec<u64> = preview.deleted.iter().filter_map(|u| u.id.number()).collect();

        info!(
            "Marked '{}' at revision {}: {} unit(s), {} to review, {} deleted",
            preview.document,
            revision,
            unit_count,
            fuzzy.len(),
            deleted.len()
        );

        Ok(MarkOutcome {
            document: preview.document.clone(),
            revision,
            unit_count,
            fuzzy,
            deleted,
        })
    }

    /// Withdraw a page from translation. Stored units and ids are kept.
    pub async fn unmark(&self, document: &str) -> Result<(), WorkflowError> {
        let _guard = self.locks.lock(document).await;

        // Fails with NotFound for unknown pages
        self.store.load_document_state(document).await?;
        self.store.unmark(document).await?;

        info!("Unmarked '{}'", document);
        Ok(())
    }

    /// Every page grouped by state
    pub async fn list_pages(&self) -> Result<ClassifiedPages<PageSummary>, WorkflowError> {
        let states = self.store.load_all_states().await?;
        Ok(classify_all(states))
    }
}
