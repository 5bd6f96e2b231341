use std::collections::HashSet;

use serde_json::json;
use tracelens_graph::{
    assign_colors, normalize, normalize_with_shape, GraphLink, GraphNode, GraphPayload,
    NormalizedGraph, Shape,
};

fn node_ids(graph: &NormalizedGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn edges(graph: &NormalizedGraph) -> Vec<(&str, &str, Option<f64>)> {
    graph
        .links
        .iter()
        .map(|l| (l.source.as_str(), l.target.as_str(), l.weight))
        .collect()
}

// ============================================================
// Index adjacency
// ============================================================

#[test]
fn test_index_adjacency_unweighted() {
    let (graph, shape) = normalize_with_shape(&json!([[1], [0, 2], [1]])).unwrap();

    assert_eq!(shape, Shape::IndexAdjacency);
    assert_eq!(node_ids(&graph), vec!["0", "1", "2"]);
    assert_eq!(
        edges(&graph),
        vec![
            ("0", "1", None),
            ("1", "0", None),
            ("1", "2", None),
            ("2", "1", None)
        ]
    );
    assert!(!graph.weighted);
}

#[test]
fn test_index_adjacency_weighted_rows() {
    let graph = normalize(&json!([[[1, 4]], [[0, 4], [2, 1.5]], []])).unwrap();

    assert!(graph.weighted);
    assert_eq!(
        edges(&graph),
        vec![
            ("0", "1", Some(4.0)),
            ("1", "0", Some(4.0)),
            ("1", "2", Some(1.5))
        ]
    );
}

#[test]
fn test_index_adjacency_materializes_undeclared_targets() {
    let graph = normalize(&json!([[5], [0]])).unwrap();

    assert_eq!(node_ids(&graph), vec!["0", "1", "5"]);
    assert_eq!(edges(&graph), vec![("0", "5", None), ("1", "0", None)]);
}

#[test]
fn test_index_adjacency_mixed_row_contributes_nothing() {
    let graph = normalize(&json!([[1, [2, 3]], [0]])).unwrap();

    assert_eq!(edges(&graph), vec![("1", "0", None)]);
}

#[test]
fn test_index_adjacency_falls_back_to_permissive_reading() {
    // Every row is malformed, so the strict reading yields no links.
    let (graph, shape) = normalize_with_shape(&json!([[1, [2, 3]], [0, {"w": 1}]])).unwrap();

    assert_eq!(shape, Shape::IndexAdjacencyPermissive);
    assert!(!graph.weighted);
    assert_eq!(edges(&graph), vec![("0", "1", None), ("1", "0", None)]);
}

#[test]
fn test_empty_rows_are_isolated_nodes() {
    let (graph, shape) = normalize_with_shape(&json!([[], [], []])).unwrap();

    assert_eq!(shape, Shape::IndexAdjacencyPermissive);
    assert_eq!(graph.nodes.len(), 3);
    assert!(graph.links.is_empty());
}

// ============================================================
// Map adjacency
// ============================================================

#[test]
fn test_map_adjacency_weighted() {
    let (graph, shape) = normalize_with_shape(&json!([["a", [["b", 5]]], ["b", []]])).unwrap();

    assert_eq!(shape, Shape::MapAdjacency);
    assert_eq!(node_ids(&graph), vec!["a", "b"]);
    assert_eq!(edges(&graph), vec![("a", "b", Some(5.0))]);
    assert!(graph.weighted);
}

#[test]
fn test_map_adjacency_unweighted_with_null_neighbours() {
    let graph = normalize(&json!([[10, [20, 30]], [20, null]])).unwrap();

    assert_eq!(node_ids(&graph), vec!["10", "20", "30"]);
    assert_eq!(edges(&graph), vec![("10", "20", None), ("10", "30", None)]);
    assert!(!graph.weighted);
}

#[test]
fn test_numbers_and_strings_name_the_same_node() {
    let graph = normalize(&json!([["1", [2]], [2, ["1"]]])).unwrap();

    assert_eq!(node_ids(&graph), vec!["1", "2"]);
    assert_eq!(edges(&graph), vec![("1", "2", None), ("2", "1", None)]);
}

#[test]
fn test_map_adjacency_with_boolean_keys() {
    let (graph, shape) = normalize_with_shape(&json!([[true, [1]], [false, [true]]])).unwrap();

    assert_eq!(shape, Shape::MapAdjacency);
    assert_eq!(node_ids(&graph), vec!["true", "false", "1"]);
    assert_eq!(
        edges(&graph),
        vec![("true", "1", None), ("false", "true", None)]
    );
}

#[test]
fn test_lenient_map_skips_rows_that_are_not_pairs() {
    let (graph, shape) = normalize_with_shape(&json!([["a", ["b"]], 7, "noise"])).unwrap();

    assert_eq!(shape, Shape::LenientMapAdjacency);
    assert_eq!(node_ids(&graph), vec!["a", "b"]);
}

// ============================================================
// Object maps
// ============================================================

#[test]
fn test_object_map() {
    let (graph, shape) = normalize_with_shape(&json!({"0": [6, 13], "6": [0], "13": null})).unwrap();

    assert_eq!(shape, Shape::ObjectMap);
    let ids: HashSet<&str> = node_ids(&graph).into_iter().collect();
    assert_eq!(ids, HashSet::from(["0", "6", "13"]));
    assert_eq!(graph.links.len(), 3);
}

#[test]
fn test_object_with_non_list_values_is_not_a_graph() {
    assert!(normalize(&json!({"name": "dijkstra", "n": 4})).is_none());
}

// ============================================================
// Not a graph
// ============================================================

#[test]
fn test_scalars_and_empty_values_are_not_graphs() {
    for value in [
        json!(42),
        json!("text"),
        json!(null),
        json!(true),
        json!([]),
        json!({}),
        json!([1, 2, 3]),
    ] {
        assert!(normalize(&value).is_none(), "{} should not be a graph", value);
    }
}

// ============================================================
// Payloads
// ============================================================

#[test]
fn test_payload_normalizes_adjacency() {
    let value = json!({"kind": "graph", "adjacency": [[1, 2], [2], [0]], "label": "adj"});
    let payload = GraphPayload::from_value(&value).unwrap();
    let graph = payload.normalize().unwrap();

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.links.len(), 4);
}

#[test]
fn test_graph_serializes_without_missing_weights() {
    let graph = normalize(&json!([[1], []])).unwrap();
    let json = serde_json::to_value(&graph).unwrap();

    assert_eq!(json["weighted"], false);
    assert_eq!(json["links"][0], json!({"source": "0", "target": "1"}));
    assert!(json["nodes"][0]["color"].as_str().unwrap().starts_with('#'));
}

// ============================================================
// Colors
// ============================================================

fn nodes(count: usize) -> Vec<GraphNode> {
    (0..count)
        .map(|i| GraphNode {
            id: i.to_string(),
            label: i.to_string(),
            color: String::new(),
        })
        .collect()
}

#[test]
fn test_colors_pairwise_distinct() {
    for count in [1, 2, 10, 50, 200] {
        let mut graph_nodes = nodes(count);
        assign_colors(&mut graph_nodes);

        let colors: HashSet<&str> = graph_nodes.iter().map(|n| n.color.as_str()).collect();
        assert_eq!(colors.len(), count);
    }
}

#[test]
fn test_colors_degrade_gracefully_past_the_palette() {
    let mut graph_nodes = nodes(1000);
    assign_colors(&mut graph_nodes);

    for node in &graph_nodes {
        assert_eq!(node.color.len(), 7);
        assert!(node.color.starts_with('#'));
        assert!(node.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    let leading: HashSet<&str> = graph_nodes[..500].iter().map(|n| n.color.as_str()).collect();
    assert_eq!(leading.len(), 500);

    let mut again = nodes(1000);
    assign_colors(&mut again);
    assert_eq!(graph_nodes, again);
}

#[test]
fn test_colors_repeatable() {
    let mut first = nodes(120);
    let mut second = nodes(120);
    assign_colors(&mut first);
    assign_colors(&mut second);

    assert_eq!(first, second);
}

#[test]
fn test_color_stable_for_identity_across_graphs() {
    let a = normalize(&json!([["x", ["y"]]])).unwrap();
    let b = normalize(&json!([["x", []], ["z", []]])).unwrap();

    assert_eq!(a.node("x").unwrap().color, b.node("x").unwrap().color);
}

#[test]
fn test_colors_are_hex() {
    let mut graph_nodes = nodes(5);
    assign_colors(&mut graph_nodes);
    for node in &graph_nodes {
        assert_eq!(node.color.len(), 7);
        assert!(node.color.starts_with('#'));
        assert!(node.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_link_type_is_public() {
    let link = GraphLink {
        source: "a".into(),
        target: "b".into(),
        weight: None,
    };
    assert_eq!(link.source, "a");
}
