/*!
 * Tests for page parsing: regions, units, markers and rendering
 */

use transpage::errors::{ParseError, StructuralError, UnitError};
use transpage::page::{codes, parse, Severity, UnitId};
use transpage::sync::{resolve_units, IndexedUnits};
use crate::common::SAMPLE_PAGE;

/// Test that a realistic page yields one unit per paragraph
#[test]
fn test_parse_withSamplePage_shouldFindAllUnits() {
    let result = parse(SAMPLE_PAGE).expect("Sample page should parse");

    assert_eq!(result.regions, 2);
    let texts: Vec<&str> = result.units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "== Getting started ==\nInstall the tool first.",
            "Then run it once.",
            "Questions go to the talk page.",
        ]
    );
    assert!(result.units.iter().all(|u| u.id == UnitId::Pending));
}

/// Test that substituting unit texts back reproduces the input exactly
#[test]
fn test_plainText_withSamplePage_shouldRoundTrip() {
    let result = parse(SAMPLE_PAGE).unwrap();
    assert_eq!(result.plain_text(), SAMPLE_PAGE);
}

/// Test that odd whitespace around separators survives the round trip
#[test]
fn test_plainText_withIrregularWhitespace_shouldRoundTrip() {
    let text = "<translate>\n\nA\n\n\n\nB  \n\n</translate>\ntail  ";
    let result = parse(text).unwrap();

    let texts: Vec<&str> = result.units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert_eq!(result.plain_text(), text);
}

/// Test that input resembling a placeholder is left untouched
#[test]
fn test_plainText_withPlaceholderLookalike_shouldRoundTrip() {
    let text = "\u{7f}UNIQ00000000deadbeef|0\u{7f}\n<translate>A</translate>";
    let result = parse(text).unwrap();

    assert_eq!(result.units.len(), 1);
    assert_eq!(result.plain_text(), text);
}

/// Test that an unterminated lookalike right before a region cannot hide the region
#[test]
fn test_plainText_withUnterminatedLookalikeBeforeRegion_shouldRoundTrip() {
    let text = "\u{7f}UNIQ0000000000000000|1<translate>A</translate>";
    let result = parse(text).unwrap();

    assert_eq!(result.units.len(), 1);
    assert!(result.template.starts_with("\u{7f}UNIQ0000000000000000|1<translate>"));
    assert_eq!(result.plain_text(), text);
}

/// Test that marking, saving and parsing again is a fixpoint
#[test]
fn test_sourceText_reparsed_shouldKeepIdsAndTexts() {
    let parsed = parse(SAMPLE_PAGE).unwrap();
    let resolution = resolve_units(&parsed.units, &IndexedUnits::new(), 1).unwrap();
    let marked = parsed.with_units(resolution.current()).source_text();

    let reparsed = parse(&marked).unwrap();

    let ids: Vec<UnitId> = reparsed.units.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![UnitId::Assigned(1), UnitId::Assigned(2), UnitId::Assigned(3)]);
    for (before, after) in parsed.units.iter().zip(&reparsed.units) {
        assert_eq!(before.text, after.text);
        assert!(after.issues.is_empty(), "unexpected issues: {:?}", after.issues);
    }
    assert_eq!(reparsed.source_text(), marked);
}

/// Test that the heading marker goes on the heading line
#[test]
fn test_sourceText_withHeadingUnit_shouldKeepHeadingIntact() {
    let parsed = parse(SAMPLE_PAGE).unwrap();
    let resolution = resolve_units(&parsed.units, &IndexedUnits::new(), 7).unwrap();

    let marked = parsed.with_units(resolution.current()).source_text();

    assert!(marked.contains("== Getting started == <!--T:7-->\nInstall the tool first."));
    assert!(marked.contains("<!--T:8-->\nThen run it once."));
    assert!(marked.contains("<translate><!--T:9-->\nQuestions go to the talk page.</translate>"));
}

/// Test the review rendering of a template
#[test]
fn test_templatePretty_shouldShowIdsAndNew() {
    let result = parse("<translate><!--T:3-->\nOld\n\nFresh</translate>").unwrap();
    assert_eq!(result.template_pretty(), "<translate><!--T:3-->\n\n<!--T:new--></translate>");
}

/// Test that a close tag without an opener is rejected
#[test]
fn test_parse_withLoneCloseTag_shouldFailUnopened() {
    let result = parse("Text</translate> more");
    assert!(matches!(
        result,
        Err(ParseError::Structural(StructuralError::UnopenedRegion { .. }))
    ));
}

/// Test that a trailing open tag is rejected even after a valid region
#[test]
fn test_parse_withTrailingOpenTag_shouldFailUnclosed() {
    let result = parse("<translate>A</translate>\n<translate>B");
    assert!(matches!(
        result,
        Err(ParseError::Structural(StructuralError::UnclosedRegion { .. }))
    ));
}

/// Test that nested regions are rejected
#[test]
fn test_parse_withNestedRegions_shouldFail() {
    let result = parse("<translate>A <translate>B</translate> C</translate>");
    assert!(matches!(result, Err(ParseError::Structural(_))));
}

/// Test that forbidden characters in marker ids are reported
#[test]
fn test_parse_withInvalidIdentifiers_shouldReportEach() {
    let text = "<translate><!--T:a_b-->\nX\n\n<!--T:-->\nY\n\n<!--T:-3-->\nZ</translate>";

    let err = parse(text).unwrap_err();

    let ids: Vec<&str> = err
        .unit_errors()
        .iter()
        .filter_map(|e| match e {
            UnitError::InvalidIdentifier { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["a_b", "", "-3"]);
}

/// Test that ids which would not be written back verbatim are refused
#[test]
fn test_parse_withSignedOrPaddedIds_shouldReportInvalid() {
    let err = parse("<translate><!--T:+5-->\nA\n\n<!--T:05-->\nB</translate>").unwrap_err();

    let ids: Vec<&str> = err
        .unit_errors()
        .iter()
        .filter_map(|e| match e {
            UnitError::InvalidIdentifier { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["+5", "05"]);
}

/// Test that a unit holding only its marker is rejected
#[test]
fn test_parse_withMarkerOnlyUnit_shouldFailEmpty() {
    let err = parse("<translate><!--T:4--></translate>").unwrap_err();
    assert!(matches!(err.unit_errors(), [UnitError::EmptyUnit { .. }]));
}

/// Test that two markers in one paragraph are rejected
#[test]
fn test_parse_withTwoMarkersInOneUnit_shouldFailDuplicate() {
    let err = parse("<translate><!--T:1--> a <!--T:2--></translate>").unwrap_err();
    assert!(matches!(
        err.unit_errors(),
        [UnitError::DuplicateMarker { id: None, .. }]
    ));
}

/// Test that a marker in the middle of a line is stripped with a warning
#[test]
fn test_parse_withInlineMarker_shouldWarn() {
    let result = parse("<translate>Some <!--T:3--> text</translate>").unwrap();

    let unit = &result.units[0];
    assert_eq!(unit.id, UnitId::Assigned(3));
    assert_eq!(unit.text, "Some text");
    assert_eq!(unit.issues.len(), 1);
    assert_eq!(unit.issues[0].code, codes::INLINE_MARKER);
    assert_eq!(unit.issues[0].severity, Severity::Warning);
}

/// Test that an unterminated marker is flagged as an error
#[test]
fn test_parse_withUnterminatedMarker_shouldFlagError() {
    let result = parse("<translate><!--T:5 oops\nText</translate>").unwrap();

    let unit = &result.units[0];
    assert_eq!(unit.id, UnitId::Pending);
    assert!(unit.has_errors());
    assert_eq!(unit.issues[0].code, codes::MALFORMED_MARKER);
}
