/*!
 * Unit identity resolution.
 *
 * Compares freshly parsed units with the units stored for the document,
 * hands out ids to new units and classifies every unit as new, changed,
 * unchanged or deleted.
 *
 * Ids come from a per-group watermark that only ever grows. An id whose
 * marker disappears from the text is retired, never handed out again.
 */

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::errors::IdentityError;
use crate::page::{codes, Issue, Severity, Unit, UnitId, UnitKind};

/// Previously stored units of a document, in stored order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedUnits {
    /// `(id, text)` pairs in stored order
    entries: Vec<(u64, String)>,
    /// Position of each id in `entries`
    index: HashMap<u64, usize>,
}

impl IndexedUnits {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stored unit. A repeated id replaces the earlier text.
    pub fn insert(&mut self, id: u64, text: &str) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = text.to_string(),
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push((id, text.to_string()));
            }
        }
    }

    /// Stored text for an id
    pub fn get(&self, id: u64) -> Option<&str> {
        self.index.get(&id).map(|&pos| self.entries[pos].1.as_str())
    }

    /// Whether an id is stored
    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Stored units in order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(id, text)| (*id, text.as_str()))
    }

    /// Number of stored units
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(u64, S)> for IndexedUnits {
    fn from_iter<I: IntoIterator<Item = (u64, S)>>(iter: I) -> Self {
        let mut units = Self::new();
        for (id, text) in iter {
            units.insert(id, text.as_ref());
        }
        units
    }
}

/// Outcome of resolving ids for a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Current units in document order, followed by deleted units in stored order
    pub units: Vec<Unit>,
    /// Watermark to store for the next resolution
    pub next_free_id: u64,
}

impl Resolution {
    /// Units still present in the text
    pub fn current(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.kind != UnitKind::Deleted)
    }

    /// Units that disappeared from the text
    pub fn deleted(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.kind == UnitKind::Deleted)
    }

    /// Whether anything differs from the stored version
    pub fn has_changes(&self) -> bool {
        self.units.iter().any(|u| u.kind != UnitKind::Unchanged)
    }

    /// Number of error-severity issues over all units
    pub fn error_count(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.issues.iter())
            .filter(|i| i.severity == Severity::Error)
            .count()
    }
}

/// Resolve the ids of parsed units against the stored ones.
///
/// Fails without a partial result when two parsed units carry the same id.
pub fn resolve_units(
    parsed: &[Unit],
    previous: &IndexedUnits,
    next_free_id: u64,
) -> Result<Resolution, IdentityError> {
    let mut present = HashSet::new();
    for unit in parsed {
        if let UnitId::Assigned(id) = unit.id {
            if !present.insert(id) {
                return Err(IdentityError::DuplicateId { id: unit.id });
            }
        }
    }

    // Hand-edited markers may point above the watermark; never hand those out again.
    let mut next = match present.iter().max() {
        Some(&highest) => highest
            .checked_add(1)
            .ok_or(IdentityError::IdExhausted { highest })?
            .max(next_free_id),
        None => next_free_id,
    };

    let mut units = Vec::with_capacity(parsed.len() + previous.len());
    for unit in parsed {
        let mut unit = unit.clone();
        match unit.id {
            UnitId::Pending => {
                unit.id = UnitId::Assigned(next);
                next = next
                    .checked_add(1)
                    .ok_or(IdentityError::IdExhausted { highest: next })?;
                unit.kind = UnitKind::New;
                for issue in &mut unit.issues {
                    issue.unit_id = unit.id;
                }
            }
            UnitId::Assigned(id) => match previous.get(id) {
                None => {
                    unit.kind = UnitKind::New;
                    unit.issues.push(Issue::warning(codes::UNKNOWN_MARKER_ID, unit.id));
                }
                Some(stored) if stored == unit.text => {
                    unit.kind = UnitKind::Unchanged;
                }
                Some(stored) => {
                    unit.kind = UnitKind::Changed;
                    if normalize_whitespace(stored) == normalize_whitespace(&unit.text) {
                        unit.issues
                            .push(Issue::warning(codes::WHITESPACE_ONLY_CHANGE, unit.id));
                    }
                    unit.previous_text = Some(stored.to_string());
                }
            },
        }
        debug!("Unit {} resolved as {}", unit.id, unit.kind);
        units.push(unit);
    }

    for (id, stored) in previous.iter() {
        if present.contains(&id) {
            continue;
        }
        let mut unit = Unit::with_id(UnitId::Assigned(id), stored);
        unit.kind = UnitKind::Deleted;
        debug!("Unit {} resolved as deleted", id);
        units.push(unit);
    }

    Ok(Resolution {
        units,
        next_free_id: next,
    })
}

/// Collapse whitespace runs so texts can be compared ignoring layout
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
