/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access. The
 * repository is the SQLite implementation of `PageStore`.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{meta_keys, PageRecord, RevTag, RevisionRecord, UnitRecord};
use crate::errors::StoreError;
use crate::page::Rev;
use crate::sync::{DocumentState, IndexedUnits};
use crate::workflow::{MarkCommit, PageStore, PageSummary};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a repository backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = DatabaseConnection::new(path)?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Page Operations
    // =========================================================================

    /// Get a page by name
    pub async fn get_page(&self, name: &str) -> Result<Option<PageRecord>> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT name, created_at, updated_at FROM pages WHERE name = ?1",
                        [&name],
                        |row| {
                            Ok(PageRecord {
                                name: row.get(0)?,
                                created_at: row.get(1)?,
                                updated_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// All revisions of a page, oldest first
    pub async fn get_revisions(&self, name: &str) -> Result<Vec<RevisionRecord>> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, page, text, created_at FROM revisions WHERE page = ?1 ORDER BY id",
                )?;

                let revisions = stmt
                    .query_map([&name], |row| {
                        Ok(RevisionRecord {
                            id: row.get::<_, i64>(0)? as Rev,
                            page: row.get(1)?,
                            text: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(revisions)
            })
            .await
    }

    /// Stored units of a page in order
    pub async fn get_units(&self, name: &str) -> Result<Vec<UnitRecord>> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| Self::get_units_sync(conn, &name))
            .await
    }

    /// Stored units of a page (synchronous version for use within transactions)
    fn get_units_sync(conn: &Connection, name: &str) -> Result<Vec<UnitRecord>> {
        let mut stmt = conn.prepare(
            "SELECT page, unit_id, position, text FROM units WHERE page = ?1 ORDER BY position",
        )?;

        let units = stmt
            .query_map([name], |row| {
                Ok(UnitRecord {
                    page: row.get(0)?,
                    unit_id: row.get::<_, i64>(1)? as u64,
                    position: row.get::<_, i64>(2)? as usize,
                    text: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(units)
    }

    /// Revision a tag points at
    pub async fn get_tag(&self, name: &str, tag: RevTag) -> Result<Option<Rev>> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| Self::get_tag_sync(conn, &name, tag))
            .await
    }

    fn get_tag_sync(conn: &Connection, name: &str, tag: RevTag) -> Result<Option<Rev>> {
        let revision = conn
            .query_row(
                "SELECT revision FROM revtags WHERE page = ?1 AND tag = ?2",
                params![name, tag.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        Ok(revision.map(|r| r as Rev))
    }

    fn set_tag_sync(conn: &Connection, name: &str, tag: RevTag, revision: Rev) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO revtags (page, tag, revision) VALUES (?1, ?2, ?3)
            ON CONFLICT(page, tag) DO UPDATE SET revision = excluded.revision
            "#,
            params![name, tag.as_str(), revision as i64],
        )?;
        Ok(())
    }

    fn head_revision_sync(conn: &Connection, name: &str) -> Result<Option<Rev>> {
        let head: Option<i64> = conn.query_row(
            "SELECT MAX(id) FROM revisions WHERE page = ?1",
            [name],
            |row| row.get(0),
        )?;

        Ok(head.map(|h| h as Rev))
    }

    fn insert_revision_sync(conn: &Connection, name: &str, text: &str) -> Result<Rev> {
        let now = chrono::Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO pages (name, created_at, updated_at) VALUES (?1, ?2, ?2)
            ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at
            "#,
            params![name, now],
        )?;

        conn.execute(
            "INSERT INTO revisions (page, text, created_at) VALUES (?1, ?2, ?3)",
            params![name, text, now],
        )?;

        Ok(conn.last_insert_rowid() as Rev)
    }

    // =========================================================================
    // Group Metadata
    // =========================================================================

    fn max_id_sync(conn: &Connection, group: &str) -> Result<u64> {
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM group_metadata WHERE group_id = ?1 AND key = ?2",
                params![group, meta_keys::MAX_ID],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(v) => v
                .parse()
                .with_context(|| format!("Corrupt {} for group '{}': {}", meta_keys::MAX_ID, group, v)),
            None => Ok(0),
        }
    }

    fn raise_max_id_sync(conn: &Connection, group: &str, max_id: u64) -> Result<()> {
        let current = Self::max_id_sync(conn, group)?;
        if max_id <= current {
            return Ok(());
        }

        conn.execute(
            r#"
            INSERT INTO group_metadata (group_id, key, value) VALUES (?1, ?2, ?3)
            ON CONFLICT(group_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![group, meta_keys::MAX_ID, max_id.to_string()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl PageStore for Repository {
    async fn fetch_text(&self, document: &str, revision: Rev) -> Result<String, StoreError> {
        let name = document.to_string();

        let text = self
            .db
            .execute_async(move |conn| {
                let text = conn
                    .query_row(
                        "SELECT text FROM revisions WHERE page = ?1 AND id = ?2",
                        params![name, revision as i64],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(text)
            })
            .await?;

        text.ok_or_else(|| StoreError::NotFound {
            document: document.to_string(),
            revision: Some(revision),
        })
    }

    async fn load_previous_units(&self, document: &str) -> Result<IndexedUnits, StoreError> {
        let units = self.get_units(document).await?;
        Ok(units.into_iter().map(|u| (u.unit_id, u.text)).collect())
    }

    async fn load_document_state(&self, document: &str) -> Result<DocumentState, StoreError> {
        let name = document.to_string();

        let state = self
            .db
            .execute_async(move |conn| {
                let head = match Self::head_revision_sync(conn, &name)? {
                    Some(head) => head,
                    None => return Ok(None),
                };

                Ok(Some(DocumentState {
                    tagged_revision: Self::get_tag_sync(conn, &name, RevTag::Ready)?,
                    marked_revision: Self::get_tag_sync(conn, &name, RevTag::Marked)?,
                    head_revision: head,
                }))
            })
            .await?;

        state.ok_or_else(|| StoreError::NotFound {
            document: document.to_string(),
            revision: None,
        })
    }

    async fn load_all_states(&self) -> Result<Vec<(DocumentState, PageSummary)>, StoreError> {
        let states = self
            .db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT p.name,
                           (SELECT MAX(r.id) FROM revisions r WHERE r.page = p.name),
                           (SELECT t.revision FROM revtags t WHERE t.page = p.name AND t.tag = ?1),
                           (SELECT t.revision FROM revtags t WHERE t.page = p.name AND t.tag = ?2),
                           (SELECT COUNT(*) FROM units u WHERE u.page = p.name)
                    FROM pages p
                    ORDER BY p.name
                    "#,
                )?;

                let rows = stmt
                    .query_map(
                        params![RevTag::Ready.as_str(), RevTag::Marked.as_str()],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, Option<i64>>(1)?,
                                row.get::<_, Option<i64>>(2)?,
                                row.get::<_, Option<i64>>(3)?,
                                row.get::<_, i64>(4)?,
                            ))
                        },
                    )?
                    .collect::<Result<Vec<_>, _>>()?;

                let states = rows
                    .into_iter()
                    .filter_map(|(name, head, tagged, marked, unit_count)| {
                        let head = head? as Rev;
                        let state = DocumentState {
                            tagged_revision: tagged.map(|r| r as Rev),
                            marked_revision: marked.map(|r| r as Rev),
                            head_revision: head,
                        };
                        let summary = PageSummary {
                            name,
                            head_revision: head,
                            unit_count: unit_count as usize,
                        };
                        Some((state, summary))
                    })
                    .collect();

                Ok(states)
            })
            .await?;

        Ok(states)
    }

    async fn next_free_id(&self, group: &str) -> Result<u64, StoreError> {
        let name = group.to_string();

        let max_id = self
            .db
            .execute_async(move |conn| Self::max_id_sync(conn, &name))
            .await?;

        max_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Database(format!("No unit ids left in group '{}'", group)))
    }

    async fn commit_mark(&self, commit: MarkCommit) -> Result<Rev, StoreError> {
        let document = commit.document.clone();
        let unit_count = commit.units.len();

        let revision = self
            .db
            .transaction_async(move |tx| {
                let head = Self::head_revision_sync(tx, &commit.document)?;
                if head != Some(commit.base_revision) {
                    anyhow::bail!(
                        "Page '{}' is at revision {:?}, expected {}",
                        commit.document,
                        head,
                        commit.base_revision
                    );
                }

                let revision = match &commit.new_text {
                    Some(text) => Self::insert_revision_sync(tx, &commit.document, text)?,
                    None => commit.base_revision,
                };

                tx.execute("DELETE FROM units WHERE page = ?1", [&commit.document])?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO units (page, unit_id, position, text) VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for (position, (id, text)) in commit.units.iter().enumerate() {
                        stmt.execute(params![commit.document, *id as i64, position as i64, text])?;
                    }
                }

                Self::raise_max_id_sync(tx, &commit.group(), commit.next_free_id.saturating_sub(1))?;
                Self::set_tag_sync(tx, &commit.document, RevTag::Ready, revision)?;
                Self::set_tag_sync(tx, &commit.document, RevTag::Marked, revision)?;

                Ok(revision)
            })
            .await?;

        info!(
            "Committed mark of '{}' at revision {} with {} unit(s)",
            document, revision, unit_count
        );
        Ok(revision)
    }

    async fn add_ready_tag(&self, document: &str, revision: Rev) -> Result<(), StoreError> {
        let name = document.to_string();

        let found = self
            .db
            .execute_async(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT COUNT(*) FROM revisions WHERE page = ?1 AND id = ?2",
                    params![name, revision as i64],
                    |row| row.get(0),
                )?;
                if exists {
                    Self::set_tag_sync(conn, &name, RevTag::Ready, revision)?;
                }
                Ok(exists)
            })
            .await?;

        if !found {
            return Err(StoreError::NotFound {
                document: document.to_string(),
                revision: Some(revision),
            });
        }

        debug!("Tagged revision {} of '{}' as ready", revision, document);
        Ok(())
    }

    async fn save_revision(&self, document: &str, text: &str) -> Result<Rev, StoreError> {
        let name = document.to_string();
        let text = text.to_string();

        let revision = self
            .db
            .transaction_async(move |tx| Self::insert_revision_sync(tx, &name, &text))
            .await?;

        debug!("Saved revision {} of '{}'", revision, document);
        Ok(revision)
    }

    async fn unmark(&self, document: &str) -> Result<(), StoreError> {
        let name = document.to_string();

        let removed = self
            .db
            .execute_async(move |conn| {
                Ok(conn.execute("DELETE FROM revtags WHERE page = ?1", [&name])?)
            })
            .await?;

        debug!("Removed {} tag(s) from '{}'", removed, document);
        Ok(())
    }
}
