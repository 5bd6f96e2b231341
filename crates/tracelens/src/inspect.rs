//! Derived views over a stored session, shared by the HTTP API and the CLI.

use serde::Serialize;

use tracelens_graph::{normalize_with_shape, GraphPayload, NormalizedGraph, Shape};
use tracelens_outline::{group_steps, Location, StepGroup};
use tracelens_sessions::{Entry, NewSession, Session};

/// Anything carrying an ordered list of trace entries.
pub trait Trace {
    fn entries(&self) -> &[Entry];
}

impl Trace for Session {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl Trace for NewSession {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Group the trace's steps into the collapsible outline.
pub fn outline(trace: &impl Trace) -> Vec<StepGroup> {
    let locations: Vec<Location<'_>> = trace
        .entries()
        .iter()
        .map(|entry| Location::new(entry.line, entry.file.as_deref()))
        .collect();

    group_steps(&locations)
}

/// One renderable graph found among an entry's bindings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub binding_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    pub shape: Shape,
    pub graph: NormalizedGraph,
}

/// Every graph-tagged binding of `entry` whose adjacency yields a graph.
///
/// Bindings that are tagged but do not normalize are skipped.
pub fn graph_views(entry: &Entry) -> Vec<GraphView> {
    entry
        .content
        .iter()
        .filter_map(|binding| {
            let payload = GraphPayload::from_value(&binding.value)?;
            let (graph, shape) = normalize_with_shape(&payload.adjacency)?;
            Some(GraphView {
                label: payload.label.unwrap_or_else(|| binding.id.clone()),
                binding_id: binding.id.clone(),
                raw_id: payload.raw_id,
                shape,
                graph,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outline_reads_entry_locations() {
        let session = NewSession::new(
            [5, 7, 8, 7, 8, 9]
                .into_iter()
                .map(|line| Entry::new(line).with_file("a.cpp"))
                .collect(),
        );

        let groups = outline(&session);

        assert_eq!(groups.len(), 3);
        assert!(!groups[0].is_loop());
        assert!(groups[1].is_loop());
        assert_eq!(groups[1].file(), Some("a.cpp"));
        assert_eq!(groups[2].line(), 9);
    }

    #[test]
    fn test_graph_views_only_tagged_graphs() {
        let entry = Entry::new(3)
            .with_binding("plain", json!([[1], [0]]))
            .with_binding(
                "adj",
                json!({"kind": "graph", "adjacency": [[1], [0]], "rawId": "adj"}),
            )
            .with_binding(
                "named",
                json!({"kind": "graph", "adjacency": {"a": ["b"]}, "label": "roads"}),
            )
            .with_binding("empty", json!({"kind": "graph", "adjacency": []}));

        let views = graph_views(&entry);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].binding_id, "adj");
        assert_eq!(views[0].label, "adj");
        assert_eq!(views[0].raw_id.as_deref(), Some("adj"));
        assert_eq!(views[0].shape, Shape::IndexAdjacency);
        assert_eq!(views[1].label, "roads");
        assert_eq!(views[1].shape, Shape::ObjectMap);
        assert_eq!(views[1].graph.links.len(), 1);
    }

    #[test]
    fn test_graph_view_json_shape() {
        let entry = Entry::new(1).with_binding("g", json!({"kind": "graph", "adjacency": [[1], []]}));
        let value = serde_json::to_value(&graph_views(&entry)[0]).unwrap();

        assert_eq!(value["bindingId"], "g");
        assert_eq!(value["shape"], "index_adjacency");
        assert!(value.get("rawId").is_none());
        assert_eq!(value["graph"]["nodes"].as_array().unwrap().len(), 2);
    }
}
