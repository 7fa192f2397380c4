/*!
 * Translation unit model.
 *
 * A unit is one paragraph-sized piece of a translatable region. Its id is
 * either still pending or a number that stays attached to the same unit for
 * the lifetime of the document.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Revision number of a stored document
pub type Rev = u64;

/// Identifier of a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitId {
    /// No marker yet; a number is assigned when ids are resolved
    Pending,
    /// Persistent id carried by a `<!--T:ID-->` marker
    Assigned(u64),
}

impl UnitId {
    /// Whether the unit is still waiting for an id
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Numeric id, if assigned
    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Pending => None,
            Self::Assigned(id) => Some(*id),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Pending => write!(f, "new"),
            UnitId::Assigned(id) => write!(f, "{}", id),
        }
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        UnitId::Assigned(id)
    }
}

/// How a unit compares to the previously stored version of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Not stored before
    #[default]
    New,
    /// Stored with a different text
    Changed,
    /// Stored with exactly the same text
    Unchanged,
    /// Stored before but no longer present in the text
    Deleted,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::New => write!(f, "new"),
            UnitKind::Changed => write!(f, "changed"),
            UnitKind::Unchanged => write!(f, "unchanged"),
            UnitKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Unit is usable but worth a look
    Warning,
    /// Unit must be fixed before the document can be marked
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A problem found on a unit. Refers back to the unit by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// How serious the issue is
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `inline-marker`
    pub code: String,
    /// The unit the issue belongs to
    pub unit_id: UnitId,
}

impl Issue {
    /// Create a warning
    pub fn warning(code: &str, unit_id: UnitId) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            unit_id,
        }
    }

    /// Create an error
    pub fn error(code: &str, unit_id: UnitId) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            unit_id,
        }
    }
}

/// Issue codes
pub mod codes {
    /// The marker sat after a heading instead of at the start of the unit
    pub const INLINE_MARKER: &str = "inline-marker";
    /// The unit still contains an unterminated `<!--T:` marker
    pub const MALFORMED_MARKER: &str = "malformed-marker";
    /// The marker id was never stored for this document
    pub const UNKNOWN_MARKER_ID: &str = "unknown-marker-id";
    /// Old and new text differ only in whitespace
    pub const WHITESPACE_ONLY_CHANGE: &str = "whitespace-only-change";
}

/// One translatable unit of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit id
    pub id: UnitId,

    /// Visible text with the marker removed
    pub text: String,

    /// Change classification against the stored version
    #[serde(default)]
    pub kind: UnitKind,

    /// Stored text of a changed or deleted unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_text: Option<String>,

    /// Problems found on this unit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,

    /// Template token standing for this unit, empty for deleted units
    #[serde(skip)]
    pub placeholder: String,
}

impl Unit {
    /// Create a new pending unit
    pub fn pending(text: &str) -> Self {
        Self::with_id(UnitId::Pending, text)
    }

    /// Create a new unit with the given id
    pub fn with_id(id: UnitId, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            kind: UnitKind::New,
            previous_text: None,
            issues: Vec::new(),
            placeholder: String::new(),
        }
    }

    /// Attach the template token this unit stands for
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    /// Whether any issue of error severity is attached
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Text with the unit marker put back, as written to the source page.
    ///
    /// Units starting with a heading line keep the marker on the heading line
    /// so the heading stays a heading.
    pub fn marked_text(&self) -> String {
        let id = match self.id {
            UnitId::Pending => return self.text.clone(),
            UnitId::Assigned(id) => id,
        };

        let (first_line, rest) = match self.text.find('\n') {
            Some(pos) => self.text.split_at(pos),
            None => (self.text.as_str(), ""),
        };

        if is_heading(first_line) {
            format!("{} <!--T:{}-->{}", first_line, id, rest)
        } else {
            format!("<!--T:{}-->\n{}", id, self.text)
        }
    }
}

/// Whether a line is a wiki heading such as `== Title ==`
pub(crate) fn is_heading(line: &str) -> bool {
    let line = line.trim_end();
    let level = line.chars().take_while(|c| *c == '=').count();
    if level == 0 || line.len() <= level * 2 {
        return false;
    }
    line.ends_with(&"=".repeat(level)) && !line[level..line.len() - level].trim().is_empty()
}

/// A read-only view of a document at one revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Document name
    pub document: String,
    /// Revision the text belongs to
    pub revision: Rev,
    /// Full document text
    pub text: String,
}

impl Snapshot {
    /// Create a new snapshot
    pub fn new(document: &str, revision: Rev, text: &str) -> Self {
        Self {
            document: document.to_string(),
            revision,
            text: text.to_string(),
        }
    }
}
