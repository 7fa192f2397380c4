/*!
 * Error types for the transpage library.
 *
 * Every error produced by the parsing and identity core is plain data: it
 * names the kind of failure and the offending fragment or id, so the caller
 * can present the full list to a user or abort a larger operation. Errors are
 * defined with the thiserror crate.
 */

use thiserror::Error;

use crate::page::UnitId;

/// Errors that make a whole document unparseable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// An opening `<translate>` tag has no matching close tag
    #[error("Unbalanced region markers: <translate> is never closed near {context:?}")]
    UnclosedRegion {
        /// Skeleton text around the lone tag
        context: String,
    },

    /// A closing `</translate>` tag has no matching open tag
    #[error("Unbalanced region markers: </translate> without an opening tag near {context:?}")]
    UnopenedRegion {
        /// Skeleton text around the lone tag
        context: String,
    },
}

/// Problems with a single translation unit.
///
/// These are collected across the whole document and reported together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// More than one marker in a fragment, or one id carried by two fragments
    #[error("Duplicate unit marker{} in: {fragment}", id_suffix(.id))]
    DuplicateMarker {
        /// The id shared by several fragments, `None` when one fragment has several markers
        id: Option<u64>,
        /// The offending fragment text
        fragment: String,
    },

    /// Marker id uses a forbidden character or is not a number
    #[error("Invalid unit identifier {id:?} in: {fragment}")]
    InvalidIdentifier {
        /// The raw id text between `<!--T:` and `-->`
        id: String,
        /// The offending fragment text
        fragment: String,
    },

    /// Nothing is left of the unit once its marker is removed
    #[error("Unit is empty after removing its marker: {fragment}")]
    EmptyUnit {
        /// The offending fragment text
        fragment: String,
    },
}

/// Errors from parsing a document into a template and units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Region delimiters are unbalanced
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// One or more units are malformed
    #[error("{} invalid translation unit(s): {}", .0.len(), join_errors(.0))]
    Units(Vec<UnitError>),
}

impl ParseError {
    /// All unit-level errors, empty for structural failures
    pub fn unit_errors(&self) -> &[UnitError] {
        match self {
            Self::Structural(_) => &[],
            Self::Units(errors) => errors,
        }
    }
}

/// Errors from assigning identifiers to parsed units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The same id appears on two units of the same document
    #[error("Unit id {id} is used by more than one unit")]
    DuplicateId {
        /// The repeated id
        id: UnitId,
    },

    /// No id is left above the highest one in use
    #[error("Unit ids exhausted: no id is free above {highest}")]
    IdExhausted {
        /// Highest id in use
        highest: u64,
    },
}

/// Errors reported by a page store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested page or revision does not exist
    #[error("Revision {revision:?} of page '{document}' not found")]
    NotFound {
        /// Page name
        document: String,
        /// Requested revision, `None` for the head revision
        revision: Option<u64>,
    },

    /// The underlying database failed
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Database(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

/// Errors from the marking workflow
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The page text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Ids could not be resolved
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Storage failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The page has no translatable regions
    #[error("Page '{0}' contains no <translate> regions")]
    NotTranslatable(String),

    /// Error-severity issues prevent the mark from being committed
    #[error("Page '{document}' has {count} blocking issue(s)")]
    Blocked {
        /// Page name
        document: String,
        /// Number of error-severity issues
        count: usize,
    },

    /// The page changed between preview and commit
    #[error("Page '{document}' moved from revision {expected} to {actual} since the preview")]
    Stale {
        /// Page name
        document: String,
        /// Revision the preview was built from
        expected: u64,
        /// Current head revision
        actual: u64,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the marking workflow
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Error from parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

fn id_suffix(id: &Option<u64>) -> String {
    id.map(|i| format!(" {}", i)).unwrap_or_default()
}

fn join_errors(errors: &[UnitError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
