/*!
 * Region extraction.
 *
 * Finds the `<translate>...</translate>` regions of a document and replaces
 * each of them with a placeholder. Matching is shortest-first, so back to
 * back regions are captured separately and a close tag always ends the
 * nearest open one.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::placeholder::PlaceholderFactory;
use crate::errors::StructuralError;

/// Opening region delimiter
pub const OPEN_TAG: &str = "<translate>";

/// Closing region delimiter
pub const CLOSE_TAG: &str = "</translate>";

/// Regex for a complete region; group 1 is the opener with its trailing whitespace
static REGION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<translate>\s*)(.*?)</translate>").expect("Invalid region regex")
});

/// Characters of context shown around an unbalanced tag
const CONTEXT_CHARS: usize = 40;

/// One extracted region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Token that replaced the region in the skeleton
    pub placeholder: String,
    /// Opening tag plus any whitespace directly after it
    pub open: String,
    /// Content between the opener and the closing tag
    pub interior: String,
}

impl Region {
    /// The region as it appeared in the source text
    pub fn source(&self) -> String {
        format!("{}{}{}", self.open, self.interior, CLOSE_TAG)
    }
}

/// Document text with every region replaced by a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Text outside regions, with region placeholders
    pub skeleton: String,
    /// Regions in order of appearance
    pub regions: Vec<Region>,
}

/// Extract all regions from a document.
///
/// Fails only when a lone open or close tag remains once every balanced pair
/// has been taken out.
pub fn extract_regions(
    text: &str,
    placeholders: &mut PlaceholderFactory<'_>,
) -> Result<Extraction, StructuralError> {
    let mut skeleton = String::with_capacity(text.len());
    let mut regions = Vec::new();
    let mut last_end = 0;

    for whole in REGION_REGEX.find_iter(text) {
        // A close tag ends the nearest opener; earlier openers stay in the skeleton.
        let start = whole.start() + whole.as_str().rfind(OPEN_TAG).unwrap_or(0);
        let Some(caps) = REGION_REGEX.captures(&text[start..whole.end()]) else {
            continue;
        };
        let (Some(open), Some(interior)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        let placeholder = placeholders.make();
        skeleton.push_str(&text[last_end..start]);
        skeleton.push_str(&placeholder);
        last_end = whole.end();

        regions.push(Region {
            placeholder,
            open: open.as_str().to_string(),
            interior: interior.as_str().to_string(),
        });
    }
    skeleton.push_str(&text[last_end..]);

    if let Some(pos) = skeleton.find(OPEN_TAG) {
        return Err(StructuralError::UnclosedRegion {
            context: excerpt(&skeleton, pos),
        });
    }

    if let Some(pos) = skeleton.find(CLOSE_TAG) {
        return Err(StructuralError::UnopenedRegion {
            context: excerpt(&skeleton, pos),
        });
    }

    debug!("Extracted {} translatable region(s)", regions.len());

    Ok(Extraction { skeleton, regions })
}

/// Text around a byte position, cut on character boundaries
fn excerpt(text: &str, pos: usize) -> String {
    let start = text[..pos]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[pos..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len());
    text[start..end].to_string()
}
