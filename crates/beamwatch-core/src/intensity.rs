//! Single-pass luminance extraction.
//!
//! One walk over the frame fills the intensity map, tracks the two brightest
//! pixels, and accumulates the sums the centroid needs. Nothing here
//! allocates, so the per-frame cost is one linear scan.

use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, SIGNAL_FLOOR};
use crate::frame::{FrameView, Point};

/// Perceptual luminance of an 8-bit RGB sample, 0..255.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32
}

/// One bright pixel: its row-major index and luminance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub value: f32,
}

impl Peak {
    pub fn position(&self, width: usize) -> Point {
        Point::from_index(self.index, width)
    }
}

/// The brightest and runner-up pixels of one frame.
///
/// Both start at luminance 0, and a pixel must strictly exceed a slot to
/// take it. On exact ties the first pixel in scan order keeps the slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeakSet {
    pub primary: Peak,
    pub secondary: Peak,
}

impl PeakSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. A new maximum demotes the old primary to secondary.
    #[inline]
    pub fn offer(&mut self, index: usize, value: f32) {
        if value > self.primary.value {
            self.secondary = self.primary;
            self.primary = Peak { index, value };
        } else if value > self.secondary.value {
            self.secondary = Peak { index, value };
        }
    }

    /// `secondary / primary`, or 0 for an all-black frame.
    pub fn ratio(&self) -> f32 {
        if self.primary.value > 0.0 {
            self.secondary.value / self.primary.value
        } else {
            0.0
        }
    }
}

/// Running sums for the intensity-weighted centroid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CentroidSums {
    pub sum_i: f64,
    pub sum_ix: f64,
    pub sum_iy: f64,
}

impl CentroidSums {
    #[inline]
    pub fn accumulate(&mut self, x: usize, y: usize, value: f32) {
        let weight = value as f64;
        self.sum_i += weight;
        self.sum_ix += weight * x as f64;
        self.sum_iy += weight * y as f64;
    }
}

/// Everything one extraction pass produces besides the intensity map itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extraction {
    pub width: usize,
    pub height: usize,
    pub peaks: PeakSet,
    pub sums: CentroidSums,
}

impl Extraction {
    pub fn primary_position(&self) -> Point {
        self.peaks.primary.position(self.width)
    }

    pub fn secondary_position(&self) -> Point {
        self.peaks.secondary.position(self.width)
    }
}

/// Convert `frame` to luminance in `map`, tracking peaks and centroid sums.
///
/// `map` must already have shape `(frame.height(), frame.width())`; callers
/// size it through [`FrameBuffer::ensure_size`](crate::frame::FrameBuffer::ensure_size).
/// Alpha is ignored.
pub fn extract(frame: &FrameView<'_>, map: &mut Array2<f32>) -> Extraction {
    let (w, h) = (frame.width(), frame.height());
    debug_assert_eq!(map.dim(), (h, w), "intensity map not sized to frame");

    let channels = frame.layout().channels();
    let mut peaks = PeakSet::new();
    let mut sums = CentroidSums::default();
    let (mut x, mut y) = (0usize, 0usize);

    for (index, (out, px)) in map
        .iter_mut()
        .zip(frame.samples().chunks_exact(channels))
        .enumerate()
    {
        let value = luminance(px[0], px[1], px[2]);
        *out = value;
        peaks.offer(index, value);
        if value > SIGNAL_FLOOR {
            sums.accumulate(x, y, value);
        }

        x += 1;
        if x == w {
            x = 0;
            y += 1;
        }
    }

    Extraction {
        width: w,
        height: h,
        peaks,
        sums,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_of_white_is_full_scale() {
        assert!((luminance(255, 255, 255) - 255.0).abs() < 1e-3);
    }

    #[test]
    fn offer_demotes_primary() {
        let mut peaks = PeakSet::new();
        peaks.offer(3, 50.0);
        peaks.offer(7, 120.0);
        assert_eq!(peaks.primary, Peak { index: 7, value: 120.0 });
        assert_eq!(peaks.secondary, Peak { index: 3, value: 50.0 });
    }

    #[test]
    fn offer_tie_keeps_first_seen() {
        let mut peaks = PeakSet::new();
        peaks.offer(1, 90.0);
        peaks.offer(2, 90.0);
        assert_eq!(peaks.primary.index, 1);
        assert_eq!(peaks.secondary.index, 2);
    }

    #[test]
    fn ratio_is_zero_for_black() {
        assert_eq!(PeakSet::new().ratio(), 0.0);
    }
}
