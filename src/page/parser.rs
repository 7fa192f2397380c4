/*!
 * Document parsing pipeline.
 *
 * Runs region extraction, unit splitting and template assembly over one
 * document text. Parsing is a pure function of the text.
 */

use log::debug;
use std::collections::HashSet;

use super::placeholder::PlaceholderFactory;
use super::region::extract_regions;
use super::splitter::{split_region, SplitRegion};
use super::template::{assemble, ParseResult};
use super::unit::UnitId;
use crate::errors::{ParseError, UnitError};

/// Parse a document into a template and its ordered units.
///
/// Unbalanced region tags fail immediately. Unit problems are collected over
/// the whole document and returned together.
pub fn parse(text: &str) -> Result<ParseResult, ParseError> {
    let mut placeholders = PlaceholderFactory::new(text);
    let extraction = extract_regions(text, &mut placeholders)?;

    let mut errors: Vec<UnitError> = Vec::new();
    let mut split: Vec<SplitRegion> = Vec::with_capacity(extraction.regions.len());
    for region in &extraction.regions {
        match split_region(&region.interior, &mut placeholders) {
            Ok(region) => split.push(region),
            Err(mut region_errors) => errors.append(&mut region_errors),
        }
    }

    errors.extend(repeated_markers(&split));

    if !errors.is_empty() {
        debug!("Parse failed with {} unit error(s)", errors.len());
        return Err(ParseError::Units(errors));
    }

    let result = assemble(extraction, split);
    debug!(
        "Parsed {} region(s) into {} unit(s)",
        result.regions,
        result.units.len()
    );
    Ok(result)
}

/// Units whose marker id was already used earlier in the document
fn repeated_markers(split: &[SplitRegion]) -> Vec<UnitError> {
    let mut seen = HashSet::new();
    split
        .iter()
        .flat_map(|region| region.units())
        .filter_map(|unit| match unit.id {
            UnitId::Assigned(id) if !seen.insert(id) => Some(UnitError::DuplicateMarker {
                id: Some(id),
                fragment: unit.text.clone(),
            }),
            _ => None,
        })
        .collect()
}
