use serde::Serialize;
use serde_json::Value;

use crate::normalize::{normalize, NormalizedGraph};

/// Value of the `kind` tag marking a binding as graph data.
pub const GRAPH_KIND: &str = "graph";

/// A binding value tagged `{"kind": "graph", "adjacency": ...}`.
///
/// Untagged adjacency-shaped values are not recognized here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub adjacency: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
}

impl GraphPayload {
    /// Recognize a tagged graph payload. Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.get("kind").and_then(Value::as_str) != Some(GRAPH_KIND) {
            return None;
        }
        let adjacency = object.get("adjacency")?.clone();
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            adjacency,
            label: text("label"),
            raw_id: text("rawId"),
        })
    }

    pub fn normalize(&self) -> Option<NormalizedGraph> {
        normalize(&self.adjacency)
    }
}
