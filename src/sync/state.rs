/*!
 * Document synchronization state.
 *
 * A translatable document carries up to three revision markers: the head
 * revision, the revision last tagged ready for translation and the revision
 * last marked for translation. Their relation decides the page state.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::page::Rev;

/// Revision markers of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Revision last tagged ready for translation
    pub tagged_revision: Option<Rev>,
    /// Revision last marked for translation
    pub marked_revision: Option<Rev>,
    /// Latest revision
    pub head_revision: Rev,
}

impl DocumentState {
    /// Create a new document state
    pub fn new(tagged_revision: Option<Rev>, marked_revision: Option<Rev>, head_revision: Rev) -> Self {
        Self {
            tagged_revision,
            marked_revision,
            head_revision,
        }
    }
}

/// Translation readiness of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    /// Ready but never marked
    Proposed,
    /// Marked at its latest revision
    Active,
    /// Marked, but a newer revision is ready and waits to be marked
    Outdated,
    /// Edited after it was tagged ready
    Broken,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageState::Proposed => write!(f, "proposed"),
            PageState::Active => write!(f, "active"),
            PageState::Outdated => write!(f, "outdated"),
            PageState::Broken => write!(f, "broken"),
        }
    }
}

impl FromStr for PageState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proposed" => Ok(PageState::Proposed),
            "active" => Ok(PageState::Active),
            "outdated" => Ok(PageState::Outdated),
            "broken" => Ok(PageState::Broken),
            _ => Err(anyhow::anyhow!("Invalid page state: {}", s)),
        }
    }
}

/// Classify a document from its revision markers.
///
/// Returns `None` for documents that were never marked and are not tagged at
/// their head revision; they take no part in translation.
pub fn classify(state: &DocumentState) -> Option<PageState> {
    let tagged_at_head = state.tagged_revision == Some(state.head_revision);

    match state.marked_revision {
        None if tagged_at_head => Some(PageState::Proposed),
        None => None,
        Some(marked) if tagged_at_head => {
            if Some(marked) == state.tagged_revision {
                Some(PageState::Active)
            } else {
                Some(PageState::Outdated)
            }
        }
        Some(_) => Some(PageState::Broken),
    }
}

/// Pages grouped by state, each group in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPages<M> {
    pub proposed: Vec<M>,
    pub active: Vec<M>,
    pub outdated: Vec<M>,
    pub broken: Vec<M>,
}

impl<M> Default for ClassifiedPages<M> {
    fn default() -> Self {
        Self {
            proposed: Vec::new(),
            active: Vec::new(),
            outdated: Vec::new(),
            broken: Vec::new(),
        }
    }
}

impl<M> ClassifiedPages<M> {
    /// Pages in one state
    pub fn get(&self, state: PageState) -> &[M] {
        match state {
            PageState::Proposed => &self.proposed,
            PageState::Active => &self.active,
            PageState::Outdated => &self.outdated,
            PageState::Broken => &self.broken,
        }
    }

    /// Total number of classified pages
    pub fn len(&self) -> usize {
        self.proposed.len() + self.active.len() + self.outdated.len() + self.broken.len()
    }

    /// Whether no page was classified
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify many documents at once, carrying a payload along with each one
pub fn classify_all<M, I>(pages: I) -> ClassifiedPages<M>
where
    I: IntoIterator<Item = (DocumentState, M)>,
{
    let mut classified = ClassifiedPages::default();
    for (state, page) in pages {
        match classify(&state) {
            Some(PageState::Proposed) => classified.proposed.push(page),
            Some(PageState::Active) => classified.active.push(page),
            Some(PageState::Outdated) => classified.outdated.push(page),
            Some(PageState::Broken) => classified.broken.push(page),
            None => {}
        }
    }
    classified
}
