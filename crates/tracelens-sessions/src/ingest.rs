use serde_json::{Map, Value};

use crate::error::{FieldIssue, IngestError};
use crate::types::{Binding, Entry, NewSession};

/// Parse raw JSON text into a validated [`NewSession`].
pub fn parse_session_str(text: &str) -> Result<NewSession, IngestError> {
    let value: Value = serde_json::from_str(text)?;
    parse_session_payload(&value)
}

/// Validate a producer payload.
///
/// Accepts either `{"entries": [...], "code"?, "file"?, "id"?}` or a bare
/// array of entries. Every problem found is reported, each with the path of
/// the offending field.
pub fn parse_session_payload(value: &Value) -> Result<NewSession, IngestError> {
    let mut issues = Vec::new();

    let session = match value {
        Value::Array(items) => NewSession::new(parse_entries(items, &mut issues)),
        Value::Object(map) => {
            let id = optional_string(map, "id", "id", &mut issues);
            let code = optional_string(map, "code", "code", &mut issues);
            let file = optional_string(map, "file", "file", &mut issues);

            let entries = match map.get("entries") {
                Some(Value::Array(items)) => parse_entries(items, &mut issues),
                Some(_) => {
                    issues.push(FieldIssue::new("entries", "expected an array"));
                    Vec::new()
                }
                None => {
                    issues.push(FieldIssue::new("entries", "required"));
                    Vec::new()
                }
            };

            NewSession {
                id: id.filter(|id| !id.trim().is_empty()),
                entries,
                code,
                file,
            }
        }
        _ => {
            issues.push(FieldIssue::new(
                "$",
                "expected an object with `entries` or an array of entries",
            ));
            NewSession::default()
        }
    };

    if issues.is_empty() {
        Ok(session)
    } else {
        Err(IngestError::Invalid(issues))
    }
}

fn parse_entries(items: &[Value], issues: &mut Vec<FieldIssue>) -> Vec<Entry> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| parse_entry(item, &format!("entries[{}]", index), issues))
        .collect()
}

fn parse_entry(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<Entry> {
    let Some(map) = value.as_object() else {
        issues.push(FieldIssue::new(path, "expected an object"));
        return None;
    };

    let line = match map.get("line") {
        Some(line) => {
            let parsed = non_negative_integer(line);
            if parsed.is_none() {
                issues.push(FieldIssue::new(
                    format!("{}.line", path),
                    "expected a non-negative integer",
                ));
            }
            parsed
        }
        None => {
            issues.push(FieldIssue::new(format!("{}.line", path), "required"));
            None
        }
    };

    let file = optional_string(map, "file", &format!("{}.file", path), issues);

    let content = match map.get("content") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                parse_binding(item, &format!("{}.content[{}]", path, index), issues)
            })
            .collect(),
        Some(_) => {
            issues.push(FieldIssue::new(
                format!("{}.content", path),
                "expected an array",
            ));
            Vec::new()
        }
    };

    Some(Entry {
        line: line?,
        file,
        content,
    })
}

fn parse_binding(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<Binding> {
    let Some(map) = value.as_object() else {
        issues.push(FieldIssue::new(path, "expected an object"));
        return None;
    };

    let id = match map.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(_) => {
            issues.push(FieldIssue::new(format!("{}.id", path), "expected a string"));
            return None;
        }
        None => {
            issues.push(FieldIssue::new(format!("{}.id", path), "required"));
            return None;
        }
    };

    let value = map.get("value").cloned().unwrap_or(Value::Null);
    Some(Binding { id, value })
}

/// Optional string field; `null` counts as absent.
fn optional_string(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(FieldIssue::new(path, "expected a string"));
            None
        }
    }
}

fn non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
