use ndarray::Array2;

use crate::error::{BeamError, Result};
use crate::heatmap::HeatmapBuffer;

/// Channel layout of an interleaved 8-bit pixel buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    #[default]
    Rgba,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Borrowed view of one video frame as handed out by a frame source.
///
/// The sample count is checked against the dimensions on construction, so
/// downstream code can index without bounds surprises.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: usize,
    height: usize,
    layout: PixelLayout,
    samples: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        layout: PixelLayout,
        samples: &'a [u8],
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BeamError::InvalidDimensions { width, height });
        }
        let expected = width * height * layout.channels();
        if samples.len() != expected {
            return Err(BeamError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn samples(&self) -> &'a [u8] {
        self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// A position in pixel coordinates (x = column, y = row).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position of the pixel at row-major `index` in an image `width` wide.
    /// A zero width maps everything to the origin.
    pub fn from_index(index: usize, width: usize) -> Self {
        if width == 0 {
            return Self::default();
        }
        Self {
            x: (index % width) as f32,
            y: (index / width) as f32,
        }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Per-run scratch buffers: the luminance map and the rendered heatmap.
///
/// Both are allocated once and overwritten every frame. They are only
/// reallocated when a frame arrives with different dimensions.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Luminance per pixel, shape = (height, width), values 0..255.
    pub intensity: Array2<f32>,
    pub heatmap: HeatmapBuffer,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            intensity: Array2::zeros((height, width)),
            heatmap: HeatmapBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.intensity.ncols()
    }

    pub fn height(&self) -> usize {
        self.intensity.nrows()
    }

    /// Reallocate both buffers if they do not match `width` x `height`.
    /// Returns `true` when a reallocation happened.
    pub fn ensure_size(&mut self, width: usize, height: usize) -> bool {
        if self.width() == width && self.height() == height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }
}
