/*!
 * Marking workflow.
 *
 * - `store`: the storage interface the workflow consumes
 * - `locks`: per-document serialization
 * - `marking`: preview, commit, import, unmark and listing
 */

pub mod locks;
pub mod marking;
pub mod store;

pub use locks::DocumentLocks;
pub use marking::{ImportOutcome, MarkOutcome, MarkPreview, MarkingService};
pub use store::{page_group, MarkCommit, PageStore, PageSummary};
