use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};
use crate::frame::{FrameView, PixelLayout};
use crate::source::FrameSource;

/// One Gaussian spot. `peak` is the gray level (0..255) at the spot centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotSpec {
    pub x: f32,
    pub y: f32,
    pub sigma: f32,
    pub peak: f32,
}

/// Renders `spots` into an RGBA frame on every poll.
///
/// Spots move `drift` pixels to the right per delivered frame. The first
/// `warmup` polls return nothing, mimicking a camera that is still starting.
pub struct SyntheticSource {
    spots: Vec<SpotSpec>,
    drift: f32,
    warmup: usize,
    width: usize,
    height: usize,
    frame: Vec<u8>,
    polls: usize,
    delivered: usize,
    open: bool,
}

impl SyntheticSource {
    pub fn new(spots: Vec<SpotSpec>) -> Self {
        Self {
            spots,
            drift: 0.0,
            warmup: 0,
            width: 0,
            height: 0,
            frame: Vec::new(),
            polls: 0,
            delivered: 0,
            open: false,
        }
    }

    pub fn with_drift(mut self, px_per_frame: f32) -> Self {
        self.drift = px_per_frame;
        self
    }

    pub fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup = polls;
        self
    }

    pub fn frames_delivered(&self) -> usize {
        self.delivered
    }

    fn render(&mut self) {
        let offset = self.drift * self.delivered as f32;
        let w = self.width;
        for (i, px) in self.frame.chunks_exact_mut(4).enumerate() {
            let x = (i % w) as f32;
            let y = (i / w) as f32;
            let mut level = 0.0f32;
            for spot in &self.spots {
                let dx = x - (spot.x + offset);
                let dy = y - spot.y;
                let two_s2 = 2.0 * spot.sigma * spot.sigma;
                level += if two_s2 > 0.0 {
                    spot.peak * (-(dx * dx + dy * dy) / two_s2).exp()
                } else if dx.abs() < 0.5 && dy.abs() < 0.5 {
                    spot.peak
                } else {
                    0.0
                };
            }
            let v = level.round().clamp(0.0, 255.0) as u8;
            px[0] = v;
            px[1] = v;
            px[2] = v;
            px[3] = 255;
        }
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(BeamError::SourceUnavailable(format!(
                "cannot render a {width}x{height} synthetic frame"
            )));
        }
        self.width = width;
        self.height = height;
        self.frame.clear();
        self.frame.resize(width * height * 4, 0);
        self.polls = 0;
        self.delivered = 0;
        self.open = true;
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<FrameView<'_>> {
        if !self.open {
            return None;
        }
        self.polls += 1;
        if self.polls <= self.warmup {
            return None;
        }
        self.render();
        self.delivered += 1;
        FrameView::new(self.width, self.height, PixelLayout::Rgba, &self.frame).ok()
    }

    fn close(&mut self) {
        self.open = false;
    }
}
