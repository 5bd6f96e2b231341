use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named value captured at an instrumentation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub id: String,
    #[serde(default)]
    pub value: Value,
}

impl Binding {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// One recorded instrumentation hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub line: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub content: Vec<Binding>,
}

impl Entry {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            file: None,
            content: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_binding(mut self, id: impl Into<String>, value: Value) -> Self {
        self.content.push(Binding::new(id, value));
        self
    }
}

/// A validated session that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSession {
    /// Producer-supplied id; the store generates one when absent.
    pub id: Option<String>,
    pub entries: Vec<Entry>,
    pub code: Option<String>,
    pub file: Option<String>,
}

impl NewSession {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// One producer run, frozen once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl Session {
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Per-entry binding counts, in entry order.
    pub fn binding_counts(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.content.len()).collect()
    }
}

/// Binding counts of one session, for cheap polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    pub id: String,
    pub bindings: Vec<usize>,
}
