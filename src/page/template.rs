/*!
 * Template assembly and rendering.
 *
 * Assembly is the inverse of extraction and splitting: each region
 * placeholder in the skeleton is replaced by the region's delimiters and its
 * pieces, where every unit stands as its own placeholder. The result is the
 * template. Rendering substitutes text back for the unit placeholders.
 */

use serde::Serialize;

use super::region::{Extraction, CLOSE_TAG};
use super::splitter::{Piece, SplitRegion};
use super::unit::Unit;

/// A parsed document: a template plus its units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Document text with every unit replaced by its placeholder
    pub template: String,
    /// Units in order of first appearance
    pub units: Vec<Unit>,
    /// Number of translatable regions found
    pub regions: usize,
}

impl ParseResult {
    /// Substitute text for every unit placeholder.
    ///
    /// Placeholders that do not belong to a unit of this result are left alone.
    pub fn render_with<F>(&self, mut render: F) -> String
    where
        F: FnMut(&Unit) -> String,
    {
        let tokens = self
            .units
            .iter()
            .filter(|u| !u.placeholder.is_empty())
            .map(|u| (u.placeholder.as_str(), u));

        substitute(&self.template, tokens, |unit| render(unit))
    }

    /// The document with unit texts put back and no markers
    pub fn plain_text(&self) -> String {
        self.render_with(|unit| unit.text.clone())
    }

    /// The document as it should be saved: every unit with its marker
    pub fn source_text(&self) -> String {
        self.render_with(Unit::marked_text)
    }

    /// The template with each unit shown as its marker, for review
    pub fn template_pretty(&self) -> String {
        self.render_with(|unit| format!("<!--T:{}-->", unit.id))
    }

    /// Whether the document has any translatable region
    pub fn is_translatable(&self) -> bool {
        self.regions > 0
    }

    /// The same template with another set of units, e.g. after ids were resolved.
    ///
    /// Units without a placeholder in this template are dropped.
    pub fn with_units<'a, I>(&self, units: I) -> ParseResult
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        let units = units
            .into_iter()
            .filter(|u| !u.placeholder.is_empty() && self.template.contains(&u.placeholder))
            .cloned()
            .collect();

        ParseResult {
            template: self.template.clone(),
            units,
            regions: self.regions,
        }
    }
}

/// Put a skeleton and its split regions back together.
///
/// `split` must hold one entry per region of `extraction`, in the same order.
pub fn assemble(extraction: Extraction, split: Vec<SplitRegion>) -> ParseResult {
    let Extraction { skeleton, regions } = extraction;
    let region_count = regions.len();

    let mut region_templates: Vec<(String, String)> = Vec::with_capacity(region_count);
    let mut units = Vec::new();

    for (region, split_region) in regions.into_iter().zip(split) {
        let mut text = region.open;
        for piece in split_region.pieces {
            match piece {
                Piece::Literal(literal) => text.push_str(&literal),
                Piece::Unit(unit) => {
                    text.push_str(&unit.placeholder);
                    units.push(unit);
                }
            }
        }
        text.push_str(CLOSE_TAG);
        region_templates.push((region.placeholder, text));
    }

    let tokens = region_templates
        .iter()
        .map(|(placeholder, text)| (placeholder.as_str(), text.as_str()));
    let template = substitute(&skeleton, tokens, str::to_string);

    ParseResult {
        template,
        units,
        regions: region_count,
    }
}

/// Replace each token by its value, in order of appearance.
///
/// Tokens are matched exactly, so text that merely looks like a placeholder
/// is copied through unchanged. Tokens missing from `text` are skipped.
fn substitute<'t, T, I, F>(text: &str, tokens: I, mut value: F) -> String
where
    I: IntoIterator<Item = (&'t str, T)>,
    F: FnMut(T) -> String,
{
    let mut found: Vec<(usize, &str, T)> = tokens
        .into_iter()
        .filter_map(|(token, item)| text.find(token).map(|pos| (pos, token, item)))
        .collect();
    found.sort_by_key(|(pos, _, _)| *pos);

    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for (pos, token, item) in found {
        if pos < last_end {
            continue;
        }
        out.push_str(&text[last_end..pos]);
        out.push_str(&value(item));
        last_end = pos + token.len();
    }
    out.push_str(&text[last_end..]);
    out
}
