/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::page::Rev;

/// Revision markers stored per page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevTag {
    /// Revision is ready for translation
    Ready,
    /// Revision was marked for translation
    Marked,
}

impl RevTag {
    /// Tag name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RevTag::Ready => "tp:tag",
            RevTag::Marked => "tp:mark",
        }
    }
}

impl fmt::Display for RevTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RevTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tp:tag" => Ok(RevTag::Ready),
            "tp:mark" => Ok(RevTag::Marked),
            _ => Err(anyhow::anyhow!("Invalid revision tag: {}", s)),
        }
    }
}

/// Page record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page name
    pub name: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// Revision record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Global revision number
    pub id: Rev,
    /// Page the revision belongs to
    pub page: String,
    /// Full page text
    pub text: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

/// Stored unit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Page the unit belongs to
    pub page: String,
    /// Unit id
    pub unit_id: u64,
    /// Zero-based position in the page
    pub position: usize,
    /// Unit text without marker
    pub text: String,
}

/// Group metadata keys
pub mod meta_keys {
    /// Highest unit id ever handed out in a group
    pub const MAX_ID: &str = "maxid";
}
