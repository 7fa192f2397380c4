/*!
 * Unit splitting and marker extraction.
 *
 * The interior of a region is cut into paragraph-sized units at blank lines.
 * Separators are kept verbatim so the region can be rebuilt byte for byte.
 * Each unit may carry one `<!--T:ID-->` marker naming its persistent id.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::placeholder::PlaceholderFactory;
use super::unit::{codes, is_heading, Issue, Unit, UnitId};
use crate::errors::UnitError;

/// Paragraph separator: a blank line with surrounding whitespace, or trailing whitespace
static SEPARATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\n\s*|\s*$").expect("Invalid separator regex"));

/// Any unit marker; group 1 is the raw id
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--T:(.*?)-->").expect("Invalid marker regex"));

/// Marker at the start of a unit, with the whitespace around it
static LEADING_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<!--T:(.*?)-->\s*").expect("Invalid leading marker regex"));

/// Marker anywhere, with the whitespace before it
static INLINE_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*<!--T:(.*?)-->").expect("Invalid inline marker regex"));

/// Start of a marker, used to spot unterminated ones
const MARKER_OPEN: &str = "<!--T:";

/// Characters never allowed in a marker id
pub const INVALID_ID_CHARS: &[char] = &['_', '/', '<', '>', '|'];

/// A piece of a split region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Whitespace kept as-is in the template
    Literal(String),
    /// A translation unit, standing in the template as its placeholder
    Unit(Unit),
}

/// A region interior cut into literal whitespace and units
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitRegion {
    /// Pieces in source order
    pub pieces: Vec<Piece>,
}

impl SplitRegion {
    /// Units of this region in order
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Unit(unit) => Some(unit),
            Piece::Literal(_) => None,
        })
    }
}

/// Cut text into alternating content and separator fragments.
///
/// Concatenating the result gives back the input. Empty fragments are dropped.
pub fn split_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut last_end = 0;

    for sep in SEPARATOR_REGEX.find_iter(text) {
        if sep.start() == sep.end() {
            continue;
        }
        if sep.start() > last_end {
            fragments.push(&text[last_end..sep.start()]);
        }
        fragments.push(sep.as_str());
        last_end = sep.end();
    }
    if last_end < text.len() {
        fragments.push(&text[last_end..]);
    }

    fragments
}

/// Split one region interior into pieces.
///
/// All unit errors in the region are returned together.
pub fn split_region(
    interior: &str,
    placeholders: &mut PlaceholderFactory<'_>,
) -> Result<SplitRegion, Vec<UnitError>> {
    let mut region = SplitRegion::default();
    let mut errors = Vec::new();

    for fragment in split_fragments(interior) {
        if fragment.trim().is_empty() {
            region.pieces.push(Piece::Literal(fragment.to_string()));
            continue;
        }

        match shake_unit(fragment) {
            Ok(unit) => {
                let unit = unit.with_placeholder(&placeholders.make());
                region.pieces.push(Piece::Unit(unit));
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        debug!("Split region into {} unit(s)", region.units().count());
        Ok(region)
    } else {
        Err(errors)
    }
}

/// Turn one fragment into a unit, extracting and removing its marker
pub fn shake_unit(fragment: &str) -> Result<Unit, UnitError> {
    let markers: Vec<&str> = MARKER_REGEX
        .captures_iter(fragment)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    let (id, text, inline) = match markers.as_slice() {
        [] => (UnitId::Pending, fragment.to_string(), false),
        [raw_id] => {
            let id = parse_marker_id(raw_id).ok_or_else(|| UnitError::InvalidIdentifier {
                id: raw_id.to_string(),
                fragment: fragment.to_string(),
            })?;
            let (text, inline) = strip_marker(fragment);
            (UnitId::Assigned(id), text, inline)
        }
        _ => {
            return Err(UnitError::DuplicateMarker {
                id: None,
                fragment: fragment.to_string(),
            });
        }
    };

    if text.trim().is_empty() {
        return Err(UnitError::EmptyUnit {
            fragment: fragment.to_string(),
        });
    }

    let mut unit = Unit::with_id(id, &text);
    if inline {
        unit.issues.push(Issue::warning(codes::INLINE_MARKER, id));
    }
    if unit.text.contains(MARKER_OPEN) {
        unit.issues.push(Issue::error(codes::MALFORMED_MARKER, id));
    }

    Ok(unit)
}

/// Remove the single marker of a fragment.
///
/// Returns the remaining text and whether the marker sat somewhere other than
/// the start of the unit or the end of a heading line.
fn strip_marker(fragment: &str) -> (String, bool) {
    if LEADING_MARKER_REGEX.is_match(fragment) {
        return (LEADING_MARKER_REGEX.replace(fragment, "").into_owned(), false);
    }

    let after_heading = INLINE_MARKER_REGEX
        .find(fragment)
        .map(|m| {
            let line_start = fragment[..m.start()].rfind('\n').map_or(0, |p| p + 1);
            is_heading(&fragment[line_start..m.start()])
        })
        .unwrap_or(false);

    (
        INLINE_MARKER_REGEX.replace(fragment, "").into_owned(),
        !after_heading,
    )
}

/// Validate a raw marker id and turn it into a number.
///
/// Only the canonical decimal form is accepted, so writing the id back
/// reproduces the marker exactly: no sign and no leading zeros.
pub fn parse_marker_id(raw: &str) -> Option<u64> {
    if raw.is_empty()
        || raw
            .chars()
            .any(|c| c.is_control() || INVALID_ID_CHARS.contains(&c))
    {
        return None;
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) || (raw.len() > 1 && raw.starts_with('0')) {
        return None;
    }
    raw.parse().ok()
}
