/*!
 * Translatable page parsing.
 *
 * This module turns a document into a template and an ordered list of
 * translation units:
 *
 * - `region`: finds `<translate>` regions
 * - `splitter`: cuts regions into units and reads their markers
 * - `template`: reassembles the template and renders text back into it
 * - `parser`: the full parse pipeline
 * - `placeholder`: collision-free placeholder tokens
 * - `unit`: unit, id, issue and snapshot types
 * - `cache`: parse results keyed by document revision
 */

pub mod cache;
pub mod parser;
pub mod placeholder;
pub mod region;
pub mod splitter;
pub mod template;
pub mod unit;

// Re-export main types
pub use cache::ParseCache;
pub use parser::parse;
pub use template::ParseResult;
pub use unit::{codes, Issue, Rev, Severity, Snapshot, Unit, UnitId, UnitKind};
