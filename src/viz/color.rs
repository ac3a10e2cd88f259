//! Height-based coloring over an HSV color wheel.

use serde::{Deserialize, Serialize};

/// RGBA color with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Map a height fraction onto the HSV color wheel at saturation 1, value 1.
///
/// The input wraps into [0, 1) instead of clamping, so the mapping is
/// cyclic: `height_color(h) == height_color(h + 1.0)`. Within each of the
/// six hue sectors the fractional part is inverted on even sectors; this
/// produces the intended smooth rainbow progression, not the naive HSV
/// ramp. Alpha is always 1.
pub fn height_color(h: f64) -> Rgba {
    let h = (h - h.floor()) * 6.0;
    let i = h.floor() as i32;
    let mut f = h - f64::from(i);
    if i & 1 == 0 {
        f = 1.0 - f;
    }

    // With s = v = 1: m = v*(1-s) = 0, n = v*(1-s*f) = 1-f.
    let m = 0.0;
    let n = (1.0 - f) as f32;

    match i {
        0 | 6 => Rgba::new(1.0, n, m, 1.0),
        1 => Rgba::new(n, 1.0, m, 1.0),
        2 => Rgba::new(m, 1.0, n, 1.0),
        3 => Rgba::new(m, n, 1.0, 1.0),
        4 => Rgba::new(n, m, 1.0, 1.0),
        5 => Rgba::new(1.0, m, n, 1.0),
        // unreachable after the wrap above
        _ => Rgba::new(1.0, 0.5, 0.5, 1.0),
    }
}
