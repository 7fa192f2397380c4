/*!
 * Unit identity and document state tracking.
 *
 * - `identity`: diffs parsed units against stored ones and assigns ids
 * - `state`: classifies documents from their revision markers
 */

pub mod identity;
pub mod state;

pub use identity::{resolve_units, IndexedUnits, Resolution};
pub use state::{classify, classify_all, ClassifiedPages, DocumentState, PageState};
