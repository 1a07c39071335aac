//! False-color heatmap rendering.
//!
//! Luminance is normalized to [0, 1] and pushed through a fixed five-stop
//! gradient with per-channel linear interpolation. The mapping is
//! continuous at every stop, and the luminance of the output rises
//! monotonically with the input.

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::{GRADIENT_COLORS, GRADIENT_POSITIONS, LUMINANCE_MAX, PARALLEL_PIXEL_THRESHOLD};

/// Display-ready RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeatmapBuffer {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl HeatmapBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.rgba
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Fill with transparent black.
    pub fn clear(&mut self) {
        self.rgba.fill(0);
    }
}

/// Map a 0..255 luminance to [0, 1], clamping out-of-range and NaN to the ends.
#[inline]
pub fn normalize(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    (value / LUMINANCE_MAX).clamp(0.0, 1.0)
}

/// Gradient color at normalized position `t` (clamped to [0, 1]).
pub fn gradient_color(t: f32) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let last = GRADIENT_POSITIONS.len() - 2;
    let segment = GRADIENT_POSITIONS
        .windows(2)
        .position(|pair| t <= pair[1])
        .unwrap_or(last);

    let (p0, p1) = (GRADIENT_POSITIONS[segment], GRADIENT_POSITIONS[segment + 1]);
    let local = (t - p0) / (p1 - p0);
    let (c0, c1) = (GRADIENT_COLORS[segment], GRADIENT_COLORS[segment + 1]);

    let mut out = [0u8; 3];
    for ch in 0..3 {
        let a = c0[ch] as f32;
        let b = c1[ch] as f32;
        out[ch] = (a + (b - a) * local).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Render `intensity` into `out`. Alpha is always 255.
///
/// `out` must match the map's dimensions.
pub fn render_heatmap(intensity: &Array2<f32>, out: &mut HeatmapBuffer) {
    let (h, w) = intensity.dim();
    debug_assert_eq!((out.height, out.width), (h, w), "heatmap not sized to map");
    if w == 0 {
        return;
    }

    let row_bytes = w * 4;
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        out.rgba
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(row, dst)| render_row(intensity, row, dst));
    } else {
        for (row, dst) in out.rgba.chunks_mut(row_bytes).enumerate() {
            render_row(intensity, row, dst);
        }
    }
}

fn render_row(intensity: &Array2<f32>, row: usize, dst: &mut [u8]) {
    for (px, &value) in dst.chunks_exact_mut(4).zip(intensity.row(row).iter()) {
        let [r, g, b] = gradient_color(normalize(value));
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
}
