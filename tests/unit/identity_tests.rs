/*!
 * Tests for unit identity resolution across edits
 */

use transpage::errors::IdentityError;
use transpage::page::{codes, parse, UnitId, UnitKind};
use transpage::sync::{resolve_units, IndexedUnits};

fn stored(units: &[(u64, &str)]) -> IndexedUnits {
    units.iter().map(|(id, text)| (*id, *text)).collect()
}

/// Test that editing one paragraph only changes that unit
#[test]
fn test_resolve_withOneEditedParagraph_shouldKeepOtherIds() {
    let previous = stored(&[(1, "Intro."), (2, "Body."), (3, "Outro.")]);
    let parsed = parse("<translate><!--T:1-->\nIntro.\n\n<!--T:2-->\nBody, edited.\n\n<!--T:3-->\nOutro.</translate>")
        .unwrap();

    let resolution = resolve_units(&parsed.units, &previous, 4).unwrap();

    let kinds: Vec<UnitKind> = resolution.units.iter().map(|u| u.kind).collect();
    assert_eq!(kinds, vec![UnitKind::Unchanged, UnitKind::Changed, UnitKind::Unchanged]);
    assert_eq!(resolution.units[1].previous_text.as_deref(), Some("Body."));
    assert_eq!(resolution.next_free_id, 4);
}

/// Test that a paragraph inserted between marked ones gets a fresh id
#[test]
fn test_resolve_withInsertedParagraph_shouldAppendFreshId() {
    let previous = stored(&[(1, "A"), (2, "B")]);
    let parsed = parse("<translate><!--T:1-->\nA\n\nNew\n\n<!--T:2-->\nB</translate>").unwrap();

    let resolution = resolve_units(&parsed.units, &previous, 3).unwrap();

    let ids: Vec<UnitId> = resolution.units.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![UnitId::Assigned(1), UnitId::Assigned(3), UnitId::Assigned(2)]);
    assert_eq!(resolution.units[1].kind, UnitKind::New);
}

/// Test that a deleted id is never handed out again
#[test]
fn test_resolve_afterDeletion_shouldNotReuseId() {
    let previous = stored(&[(1, "A"), (2, "B")]);
    let first = parse("<translate><!--T:1-->\nA</translate>").unwrap();
    let resolution = resolve_units(&first.units, &previous, 3).unwrap();
    assert_eq!(resolution.deleted().count(), 1);

    let stored_after: IndexedUnits = resolution
        .current()
        .filter_map(|u| u.id.number().map(|id| (id, u.text.clone())))
        .collect();
    let second = parse("<translate><!--T:1-->\nA\n\nAnother</translate>").unwrap();
    let next = resolve_units(&second.units, &stored_after, resolution.next_free_id).unwrap();

    assert_eq!(next.units[1].id, UnitId::Assigned(3));
}

/// Test that deleted units come after current ones, in stored order
#[test]
fn test_resolve_withSeveralDeletions_shouldKeepStoredOrder() {
    let previous = stored(&[(5, "E"), (1, "A"), (3, "C")]);
    let parsed = parse("<translate><!--T:1-->\nA</translate>").unwrap();

    let resolution = resolve_units(&parsed.units, &previous, 6).unwrap();

    let deleted: Vec<u64> = resolution.deleted().filter_map(|u| u.id.number()).collect();
    assert_eq!(deleted, vec![5, 3]);
    assert_eq!(resolution.units.last().map(|u| u.text.as_str()), Some("C"));
}

/// Test that resolving the same input twice gives the same result
#[test]
fn test_resolve_isDeterministic() {
    let previous = stored(&[(1, "A")]);
    let parsed = parse("<translate><!--T:1-->\nA2\n\nB\n\nC</translate>").unwrap();

    let first = resolve_units(&parsed.units, &previous, 2).unwrap();
    let second = resolve_units(&parsed.units, &previous, 2).unwrap();

    assert_eq!(first, second);
}

/// Test that a copied marker aborts resolution
#[test]
fn test_resolve_withCopiedMarker_shouldFailDuplicateId() {
    let mut parsed = parse("<translate><!--T:1-->\nA\n\nB</translate>").unwrap();
    parsed.units[1].id = UnitId::Assigned(1);

    let result = resolve_units(&parsed.units, &IndexedUnits::new(), 2);

    assert_eq!(result, Err(IdentityError::DuplicateId { id: UnitId::Assigned(1) }));
}

/// Test that a hand-written marker above the watermark pushes it up
#[test]
fn test_resolve_withHandWrittenHighMarker_shouldWarnAndRaiseWatermark() {
    let previous = stored(&[(1, "A")]);
    let parsed = parse("<translate><!--T:1-->\nA\n\n<!--T:40-->\nX\n\nY</translate>").unwrap();

    let resolution = resolve_units(&parsed.units, &previous, 2).unwrap();

    assert_eq!(resolution.units[1].kind, UnitKind::New);
    assert_eq!(resolution.units[1].issues[0].code, codes::UNKNOWN_MARKER_ID);
    assert_eq!(resolution.units[2].id, UnitId::Assigned(41));
    assert_eq!(resolution.next_free_id, 42);
}

/// Test that the returned watermark never goes down
#[test]
fn test_resolve_withNothingNew_shouldKeepWatermark() {
    let previous = stored(&[(1, "A")]);
    let parsed = parse("<translate><!--T:1-->\nA</translate>").unwrap();

    let resolution = resolve_units(&parsed.units, &previous, 17).unwrap();

    assert_eq!(resolution.next_free_id, 17);
    assert!(!resolution.has_changes());
}

/// Test that a marker at the top of the id range is reported instead of wrapping
#[test]
fn test_resolve_withMaximalMarkerId_shouldFailExhausted() {
    let parsed = parse("<translate><!--T:18446744073709551615-->\nA\n\nB</translate>").unwrap();

    let result = resolve_units(&parsed.units, &IndexedUnits::new(), 1);

    assert_eq!(result, Err(IdentityError::IdExhausted { highest: u64::MAX }));
}
