//! # tracelens-graph
//!
//! Converts adjacency-shaped values captured in a trace into a renderable
//! graph of nodes and links.
//!
//! ## Key Types
//!
//! - [`GraphPayload`] - A binding value explicitly tagged as a graph
//! - [`NormalizedGraph`] - Canonical `{nodes, links, weighted}` model
//! - [`Shape`] - Which interpretation of the input produced the graph
//!
//! ## Accepted shapes
//!
//! Tried in order, first match wins:
//!
//! 1. Map adjacency: `[[key, [targets...]], ...]`, optionally weighted
//!    with `[target, weight]` pairs
//! 2. Index adjacency: `[[targets...], ...]`, row `k` is node `k`
//! 3. Index adjacency read permissively, keeping only bare numeric targets
//! 4. Map adjacency over whichever rows look like `[key, targets]`
//! 5. Object map: `{"key": [targets...], ...}`
//!
//! Anything else is not a graph.

mod color;
mod normalize;
mod payload;

pub use color::{assign_colors, hsl_to_hex, seed_hue, LIGHTNESS, SATURATION};
pub use normalize::{normalize, normalize_with_shape, GraphLink, GraphNode, NormalizedGraph, Shape};
pub use payload::{GraphPayload, GRAPH_KIND};
