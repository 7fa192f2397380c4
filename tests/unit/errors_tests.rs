/*!
 * Tests for error types and their messages
 */

use transpage::errors::{AppError, IdentityError, ParseError, StoreError, UnitError, WorkflowError};
use transpage::page::{parse, UnitId};

/// Test that duplicate markers name the shared id when there is one
#[test]
fn test_duplicateMarker_display_shouldMentionId() {
    let with_id = UnitError::DuplicateMarker { id: Some(7), fragment: "B".to_string() };
    let without_id = UnitError::DuplicateMarker { id: None, fragment: "B".to_string() };

    assert_eq!(with_id.to_string(), "Duplicate unit marker 7 in: B");
    assert_eq!(without_id.to_string(), "Duplicate unit marker in: B");
}

/// Test that a unit error list shows every error
#[test]
fn test_parseError_withSeveralUnitErrors_shouldListAll() {
    let err = parse("<translate><!--T:x-->\nA\n\n<!--T:2--></translate>").unwrap_err();

    assert_eq!(err.unit_errors().len(), 2);
    let message = err.to_string();
    assert!(message.starts_with("2 invalid translation unit(s)"));
    assert!(message.contains("\"x\""));
    assert!(message.contains("empty"));
}

/// Test that structural errors carry the text around the lone tag
#[test]
fn test_structuralError_shouldIncludeContext() {
    let err = parse("before </translate> after").unwrap_err();

    assert!(err.unit_errors().is_empty());
    assert!(err.to_string().contains("</translate>"));
}

/// Test conversions into the workflow and application errors
#[test]
fn test_errorConversions_shouldWrapSources() {
    let identity = IdentityError::DuplicateId { id: UnitId::Assigned(3) };
    let workflow: WorkflowError = identity.into();
    assert!(workflow.to_string().contains("Unit id 3"));

    let store: StoreError = anyhow::anyhow!("disk full").into();
    assert!(matches!(store, StoreError::Database(ref m) if m.contains("disk full")));

    let parse_error: ParseError = parse("<translate>").unwrap_err();
    let app: AppError = parse_error.into();
    assert!(matches!(app, AppError::Parse(_)));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(AppError::from(io), AppError::File(_)));
}
