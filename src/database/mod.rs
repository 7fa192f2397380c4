/*!
 * Database module for persistent storage of pages and their units.
 *
 * This module provides SQLite-based persistence for:
 * - Page revisions
 * - Ready and mark revision tags
 * - Units stored at the last mark
 * - The per-page unit id watermark
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
