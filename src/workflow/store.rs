/*!
 * Storage interface consumed by the marking workflow.
 */

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::StoreError;
use crate::page::Rev;
use crate::sync::{DocumentState, IndexedUnits};

/// Short description of a stored page, used when listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page name
    pub name: String,
    /// Latest revision
    pub head_revision: Rev,
    /// Number of stored units
    pub unit_count: usize,
}

/// Everything persisted when a page is marked for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkCommit {
    /// Page name
    pub document: String,
    /// Revision the units were resolved from
    pub base_revision: Rev,
    /// Text with markers to save as a new revision, when it differs from the base
    pub new_text: Option<String>,
    /// `(id, text)` of every current unit, in document order
    pub units: Vec<(u64, String)>,
    /// New id watermark for the page group
    pub next_free_id: u64,
}

impl MarkCommit {
    /// Id group the page draws its unit ids from
    pub fn group(&self) -> String {
        page_group(&self.document)
    }
}

/// Id group of a page
pub fn page_group(document: &str) -> String {
    format!("page|{}", document)
}

/// Page storage used by the marking workflow
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Text of a page at a revision
    async fn fetch_text(&self, document: &str, revision: Rev) -> Result<String, StoreError>;

    /// Units stored at the last mark, in stored order
    async fn load_previous_units(&self, document: &str) -> Result<IndexedUnits, StoreError>;

    /// Revision markers of one page
    async fn load_document_state(&self, document: &str) -> Result<DocumentState, StoreError>;

    /// Revision markers of every page, read in one pass
    async fn load_all_states(&self) -> Result<Vec<(DocumentState, PageSummary)>, StoreError>;

    /// Next unused unit id of a group
    async fn next_free_id(&self, group: &str) -> Result<u64, StoreError>;

    /// Persist a mark atomically and return the marked revision
    async fn commit_mark(&self, commit: MarkCommit) -> Result<Rev, StoreError>;

    /// Tag a revision as ready for translation
    async fn add_ready_tag(&self, document: &str, revision: Rev) -> Result<(), StoreError>;

    /// Save a new revision of a page, creating the page when needed
    async fn save_revision(&self, document: &str, text: &str) -> Result<Rev, StoreError>;

    /// Remove the ready and mark tags of a page
    async fn unmark(&self, document: &str) -> Result<(), StoreError>;
}
