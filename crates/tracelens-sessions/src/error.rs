use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session id already exists: {0}")]
    DuplicateId(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid session payload: {}", describe(.0))]
    Invalid(Vec<FieldIssue>),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    /// Field-level issues; empty for JSON syntax errors.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            IngestError::Invalid(issues) => issues,
            IngestError::Json(_) => &[],
        }
    }
}

/// A single problem with an ingested payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Location of the offending field, e.g. `entries[2].content[0].id`.
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
