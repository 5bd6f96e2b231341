use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::color::assign_colors;

/// A node of a normalized graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub color: String,
}

/// A directed link between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Canonical graph model handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub weighted: bool,
}

impl NormalizedGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// The interpretation that produced a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    MapAdjacency,
    IndexAdjacency,
    IndexAdjacencyPermissive,
    LenientMapAdjacency,
    ObjectMap,
}

type Matcher = fn(&Value) -> Option<GraphBuilder>;

/// Evaluated top to bottom; the first matcher returning a graph wins.
const MATCHERS: &[(Shape, Matcher)] = &[
    (Shape::MapAdjacency, match_map_adjacency),
    (Shape::IndexAdjacency, match_index_adjacency),
    (Shape::IndexAdjacencyPermissive, match_index_permissive),
    (Shape::LenientMapAdjacency, match_lenient_map_adjacency),
    (Shape::ObjectMap, match_object_map),
];

/// Normalize an adjacency-shaped value. `None` means "nothing to render".
pub fn normalize(value: &Value) -> Option<NormalizedGraph> {
    normalize_with_shape(value).map(|(graph, _)| graph)
}

/// Like [`normalize`], also reporting which shape matched.
pub fn normalize_with_shape(value: &Value) -> Option<(NormalizedGraph, Shape)> {
    MATCHERS.iter().find_map(|(shape, matcher)| {
        matcher(value).map(|builder| {
            tracing::trace!(?shape, nodes = builder.nodes.len(), "normalized graph");
            (builder.finish(), *shape)
        })
    })
}

fn match_map_adjacency(value: &Value) -> Option<GraphBuilder> {
    let rows = non_empty_array(value)?;
    let pairs: Vec<(String, &Value)> = rows.iter().map(map_pair).collect::<Option<_>>()?;
    Some(build_map(pairs))
}

fn match_index_adjacency(value: &Value) -> Option<GraphBuilder> {
    let rows = index_rows(value)?;
    let mut builder = GraphBuilder::with_index_nodes(rows.len());

    for (source, row) in rows.iter().enumerate() {
        builder.add_neighbours(&source.to_string(), classify(row));
    }

    // No usable row at all: let the permissive reading try.
    if builder.links.is_empty() {
        return None;
    }
    Some(builder)
}

fn match_index_permissive(value: &Value) -> Option<GraphBuilder> {
    let rows = index_rows(value)?;
    let mut builder = GraphBuilder::with_index_nodes(rows.len());

    for (source, row) in rows.iter().enumerate() {
        let source = source.to_string();
        for target in row.iter().filter(|v| v.is_number()).filter_map(identity_key) {
            builder.link(&source, target, None);
        }
    }
    Some(builder)
}

fn match_lenient_map_adjacency(value: &Value) -> Option<GraphBuilder> {
    let rows = non_empty_array(value)?;
    let pairs: Vec<(String, &Value)> = rows.iter().filter_map(map_pair).collect();
    if pairs.is_empty() {
        return None;
    }
    Some(build_map(pairs))
}

fn match_object_map(value: &Value) -> Option<GraphBuilder> {
    let object = value.as_object().filter(|o| !o.is_empty())?;
    if !object.values().all(|v| v.is_array() || v.is_null()) {
        return None;
    }
    let pairs = object.iter().map(|(k, v)| (k.clone(), v)).collect();
    Some(build_map(pairs))
}

fn build_map(pairs: Vec<(String, &Value)>) -> GraphBuilder {
    let mut builder = GraphBuilder::default();
    for (key, _) in &pairs {
        builder.ensure_node(key.clone());
    }
    for (key, neighbours) in pairs {
        if let Value::Array(items) = neighbours {
            builder.add_neighbours(&key, classify(items));
        }
    }
    builder
}

fn non_empty_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array().filter(|rows| !rows.is_empty())
}

/// Non-empty array whose every row is itself an array.
fn index_rows(value: &Value) -> Option<Vec<&Vec<Value>>> {
    non_empty_array(value)?.iter().map(Value::as_array).collect()
}

/// `[key, neighbours]` where `key` is a scalar identifier and `neighbours`
/// is an array or null.
fn map_pair(row: &Value) -> Option<(String, &Value)> {
    match row.as_array()?.as_slice() {
        [key, neighbours] if neighbours.is_array() || neighbours.is_null() => {
            Some((identity_key(key)?, neighbours))
        }
        _ => None,
    }
}

enum Neighbours {
    Plain(Vec<String>),
    Weighted(Vec<(String, f64)>),
    Unsupported,
}

fn classify(items: &[Value]) -> Neighbours {
    if let Some(targets) = items.iter().map(identity_key).collect::<Option<Vec<_>>>() {
        return Neighbours::Plain(targets);
    }
    if let Some(pairs) = items.iter().map(weight_pair).collect::<Option<Vec<_>>>() {
        return Neighbours::Weighted(pairs);
    }
    Neighbours::Unsupported
}

fn weight_pair(item: &Value) -> Option<(String, f64)> {
    match item.as_array()?.as_slice() {
        [target, weight] => Some((identity_key(target)?, weight.as_f64()?)),
        _ => None,
    }
}

/// Normalized string identity of a scalar key or target. Numbers, strings
/// and booleans that print the same name the same node.
fn identity_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<String>,
    positions: HashMap<String, usize>,
    links: Vec<GraphLink>,
    weighted: bool,
}

impl GraphBuilder {
    fn with_index_nodes(count: usize) -> Self {
        let mut builder = Self::default();
        for id in 0..count {
            builder.ensure_node(id.to_string());
        }
        builder
    }

    fn ensure_node(&mut self, id: String) {
        if !self.positions.contains_key(&id) {
            self.positions.insert(id.clone(), self.nodes.len());
            self.nodes.push(id);
        }
    }

    fn link(&mut self, source: &str, target: String, weight: Option<f64>) {
        self.ensure_node(target.clone());
        self.links.push(GraphLink {
            source: source.to_string(),
            target,
            weight,
        });
    }

    fn add_neighbours(&mut self, source: &str, neighbours: Neighbours) {
        match neighbours {
            Neighbours::Plain(targets) => {
                for target in targets {
                    self.link(source, target, None);
                }
            }
            Neighbours::Weighted(pairs) => {
                if !pairs.is_empty() {
                    self.weighted = true;
                }
                for (target, weight) in pairs {
                    self.link(source, target, Some(weight));
                }
            }
            Neighbours::Unsupported => {}
        }
    }

    fn finish(self) -> NormalizedGraph {
        let mut nodes: Vec<GraphNode> = self
            .nodes
            .into_iter()
            .map(|id| GraphNode {
                label: id.clone(),
                id,
                color: String::new(),
            })
            .collect();
        assign_colors(&mut nodes);

        NormalizedGraph {
            nodes,
            links: self.links,
            weighted: self.weighted,
        }
    }
}
