use serde_json::json;
use tracelens_sessions::{parse_session_payload, parse_session_str, FieldIssue, IngestError};

fn issue_paths(err: &IngestError) -> Vec<&str> {
    err.issues().iter().map(|i| i.path.as_str()).collect()
}

// ============================================================
// Accepted payloads
// ============================================================

#[test]
fn test_parse_full_session_object() {
    let payload = json!({
        "entries": [
            {"line": 62, "file": "test.cpp", "content": [{"id": "adj", "value": [[1], [0]]}]},
            {"line": 65, "content": []}
        ],
        "code": "int main() {}",
        "file": "test.cpp"
    });

    let session = parse_session_payload(&payload).unwrap();

    assert_eq!(session.id, None);
    assert_eq!(session.code.as_deref(), Some("int main() {}"));
    assert_eq!(session.file.as_deref(), Some("test.cpp"));
    assert_eq!(session.entries.len(), 2);
    assert_eq!(session.entries[0].line, 62);
    assert_eq!(session.entries[0].file.as_deref(), Some("test.cpp"));
    assert_eq!(session.entries[0].content[0].id, "adj");
    assert_eq!(session.entries[0].content[0].value, json!([[1], [0]]));
    assert_eq!(session.entries[1].file, None);
}

#[test]
fn test_parse_bare_entry_array() {
    let payload = json!([{"line": 1, "content": [{"id": "x", "value": 1}]}, {"line": 2}]);

    let session = parse_session_payload(&payload).unwrap();

    assert_eq!(session.entries.len(), 2);
    assert!(session.entries[1].content.is_empty());
    assert_eq!(session.code, None);
}

#[test]
fn test_defaults_for_optional_fields() {
    let payload = json!({
        "entries": [{"line": 3, "file": null, "content": null}],
        "code": null
    });

    let session = parse_session_payload(&payload).unwrap();

    assert_eq!(session.entries[0].file, None);
    assert!(session.entries[0].content.is_empty());
    assert_eq!(session.code, None);
}

#[test]
fn test_binding_without_value_is_null() {
    let payload = json!([{"line": 3, "content": [{"id": "flag"}]}]);
    let session = parse_session_payload(&payload).unwrap();
    assert_eq!(session.entries[0].content[0].value, json!(null));
}

#[test]
fn test_duplicate_binding_ids_allowed() {
    let payload = json!([{"line": 3, "content": [{"id": "t", "value": 1}, {"id": "t", "value": 2}]}]);
    let session = parse_session_payload(&payload).unwrap();
    assert_eq!(session.entries[0].content.len(), 2);
}

#[test]
fn test_integral_float_line_accepted() {
    let session = parse_session_payload(&json!([{"line": 12.0}])).unwrap();
    assert_eq!(session.entries[0].line, 12);
}

#[test]
fn test_supplied_id_kept_and_blank_dropped() {
    let with_id = parse_session_payload(&json!({"id": "run-7", "entries": []})).unwrap();
    assert_eq!(with_id.id.as_deref(), Some("run-7"));

    let blank = parse_session_payload(&json!({"id": "", "entries": []})).unwrap();
    assert_eq!(blank.id, None);
}

#[test]
fn test_unknown_fields_ignored() {
    let payload = json!({"entries": [{"line": 1, "extra": true}], "producer": "dbg.h"});
    assert!(parse_session_payload(&payload).is_ok());
}

// ============================================================
// Rejected payloads
// ============================================================

#[test]
fn test_missing_entries() {
    let err = parse_session_payload(&json!({"code": "x"})).unwrap_err();
    assert_eq!(
        err.issues(),
        &[FieldIssue::new("entries", "required")]
    );
}

#[test]
fn test_entries_not_array() {
    let err = parse_session_payload(&json!({"entries": {"line": 1}})).unwrap_err();
    assert_eq!(issue_paths(&err), vec!["entries"]);
}

#[test]
fn test_scalar_payload_rejected() {
    let err = parse_session_payload(&json!(17)).unwrap_err();
    assert_eq!(issue_paths(&err), vec!["$"]);
}

#[test]
fn test_bad_line_values() {
    let payload = json!([
        {"line": -1},
        {"line": "12"},
        {"line": 1.5},
        {"content": []}
    ]);

    let err = parse_session_payload(&payload).unwrap_err();

    assert_eq!(
        issue_paths(&err),
        vec![
            "entries[0].line",
            "entries[1].line",
            "entries[2].line",
            "entries[3].line"
        ]
    );
    assert_eq!(err.issues()[3].message, "required");
}

#[test]
fn test_bad_binding_pinpointed() {
    let payload = json!({
        "entries": [
            {"line": 1, "content": [{"id": "ok", "value": 1}]},
            {"line": 2, "content": [{"value": 1}, {"id": 5}, "loose"]}
        ]
    });

    let err = parse_session_payload(&payload).unwrap_err();

    assert_eq!(
        issue_paths(&err),
        vec![
            "entries[1].content[0].id",
            "entries[1].content[1].id",
            "entries[1].content[2]"
        ]
    );
}

#[test]
fn test_all_issues_reported_together() {
    let payload = json!({
        "entries": [{"line": 1, "file": 3, "content": "nope"}, 5],
        "code": 12,
        "file": false
    });

    let err = parse_session_payload(&payload).unwrap_err();

    assert_eq!(
        issue_paths(&err),
        vec![
            "code",
            "file",
            "entries[0].file",
            "entries[0].content",
            "entries[1]"
        ]
    );
}

#[test]
fn test_error_message_lists_issues() {
    let err = parse_session_payload(&json!([{"line": "x"}])).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("entries[0].line: expected a non-negative integer"));
}

// ============================================================
// Raw text
// ============================================================

#[test]
fn test_parse_session_str() {
    let session = parse_session_str(r#"{"entries":[{"line":4}]}"#).unwrap();
    assert_eq!(session.entries[0].line, 4);
}

#[test]
fn test_parse_session_str_malformed_json() {
    let err = parse_session_str("{not json").unwrap_err();
    assert!(matches!(err, IngestError::Json(_)));
    assert!(err.issues().is_empty());
}
