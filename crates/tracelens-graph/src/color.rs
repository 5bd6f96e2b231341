use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::normalize::GraphNode;

pub const SATURATION: f64 = 0.65;
pub const LIGHTNESS: f64 = 0.55;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Upper bound on hue probes per node. The golden-ratio sequence visits
/// every representable hue well before this at the fixed saturation and
/// lightness, so exhausting it means the color space is full.
const MAX_ATTEMPTS: u32 = 4096;

/// Assign each node a color that is stable for its identity and distinct
/// from every other node in the slice.
///
/// Nodes are processed in slice order. A node whose base hue collides with
/// an earlier node walks the hue circle in golden-ratio steps until it finds
/// a free color.
///
/// Once one node exhausts its probes the palette is treated as full: the
/// remaining nodes keep their base hue without probing, so colors repeat.
pub fn assign_colors(nodes: &mut [GraphNode]) {
    let mut used: HashSet<String> = HashSet::with_capacity(nodes.len());
    let mut saturated = false;

    for node in nodes.iter_mut() {
        let identity = if node.id.is_empty() {
            node.label.as_str()
        } else {
            node.id.as_str()
        };
        let seed = seed_hue(identity);

        let mut attempt = 0;
        let mut color = hsl_to_hex(seed, SATURATION, LIGHTNESS);
        while !saturated && used.contains(&color) && attempt < MAX_ATTEMPTS {
            attempt += 1;
            let hue = (seed + GOLDEN_RATIO_CONJUGATE * f64::from(attempt)).fract();
            color = hsl_to_hex(hue, SATURATION, LIGHTNESS);
        }

        if !saturated && used.contains(&color) {
            saturated = true;
            tracing::warn!(
                node = %node.id,
                distinct = used.len(),
                "ran out of distinct colors; reusing colors for the remaining nodes"
            );
        }

        used.insert(color.clone());
        node.color = color;
    }
}

/// Base hue in `[0, 1)` derived from the first four bytes of the SHA-256
/// digest of `identity`.
pub fn seed_hue(identity: &str) -> f64 {
    let digest = Sha256::digest(identity.as_bytes());
    let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    f64::from(value) / (f64::from(u32::MAX) + 1.0)
}

/// Convert HSL (all components in `[0, 1]`) to a `#rrggbb` string.
pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{}", hex::encode([channel(r), channel(g), channel(b)]))
}
