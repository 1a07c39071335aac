#![allow(dead_code)]

use std::collections::VecDeque;

use beamwatch_core::error::{BeamError, Result};
use beamwatch_core::frame::{FrameView, PixelLayout};
use beamwatch_core::heatmap::HeatmapBuffer;
use beamwatch_core::monitor::MonitorStatus;
use beamwatch_core::overlay::OverlayCommand;
use beamwatch_core::sink::DisplaySink;
use beamwatch_core::source::ser::SER_HEADER_SIZE;
use beamwatch_core::source::FrameSource;

/// Gray RGBA frame, black except for the listed `(x, y, level)` pixels.
///
/// Gray pixels have luminance equal to their level (the weights sum to 1).
pub fn rgba_frame(width: usize, height: usize, pixels: &[(usize, usize, u8)]) -> Vec<u8> {
    let mut buf = vec![0u8; width * height * 4];
    for px in buf.chunks_exact_mut(4) {
        px[3] = 255;
    }
    for &(x, y, level) in pixels {
        let i = (y * width + x) * 4;
        buf[i] = level;
        buf[i + 1] = level;
        buf[i + 2] = level;
    }
    buf
}

/// Gray RGBA frame with every pixel at `level`.
pub fn uniform_frame(width: usize, height: usize, level: u8) -> Vec<u8> {
    let mut buf = vec![level; width * height * 4];
    for px in buf.chunks_exact_mut(4) {
        px[3] = 255;
    }
    buf
}

/// Frame source replaying a script. `None` entries are ticks without a
/// new frame; once the script runs out the last frame repeats.
pub struct ScriptedSource {
    pub width: usize,
    pub height: usize,
    pub script: VecDeque<Option<Vec<u8>>>,
    pub current: Vec<u8>,
    pub fail_open: bool,
    pub open: bool,
    pub open_calls: usize,
    pub close_calls: usize,
    pub polls: usize,
}

impl ScriptedSource {
    pub fn new(width: usize, height: usize, script: Vec<Option<Vec<u8>>>) -> Self {
        Self {
            width,
            height,
            script: script.into(),
            current: Vec::new(),
            fail_open: false,
            open: false,
            open_calls: 0,
            close_calls: 0,
            polls: 0,
        }
    }

    /// Source that always serves the same frame.
    pub fn repeating(width: usize, height: usize, frame: Vec<u8>) -> Self {
        Self::new(width, height, vec![Some(frame)])
    }

    pub fn failing() -> Self {
        let mut source = Self::new(1, 1, Vec::new());
        source.fail_open = true;
        source
    }
}

impl FrameSource for ScriptedSource {
    fn open(&mut self, _width: usize, _height: usize) -> Result<()> {
        self.open_calls += 1;
        if self.fail_open {
            return Err(BeamError::SourceUnavailable("permission denied".into()));
        }
        self.open = true;
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<FrameView<'_>> {
        if !self.open {
            return None;
        }
        self.polls += 1;
        match self.script.pop_front() {
            Some(Some(frame)) => self.current = frame,
            Some(None) => return None,
            None if self.current.is_empty() => return None,
            None => {}
        }
        FrameView::new(self.width, self.height, PixelLayout::Rgba, &self.current).ok()
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.open = false;
    }
}

/// Display sink that remembers what it was sent.
#[derive(Default)]
pub struct RecordingSink {
    pub heatmaps: usize,
    pub last_heatmap: Option<HeatmapBuffer>,
    pub last_overlay: Vec<OverlayCommand>,
    pub statuses: Vec<MonitorStatus>,
    pub clears: usize,
}

impl DisplaySink for RecordingSink {
    fn publish_heatmap(&mut self, heatmap: &HeatmapBuffer) {
        self.heatmaps += 1;
        self.last_heatmap = Some(heatmap.clone());
    }

    fn publish_overlay(&mut self, commands: &[OverlayCommand]) {
        self.last_overlay = commands.to_vec();
    }

    fn publish_status(&mut self, status: &MonitorStatus) {
        self.statuses.push(status.clone());
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.last_heatmap = None;
        self.last_overlay.clear();
    }
}

/// Build a SER file header.
///
/// `color_id`: 0=MONO, 100=RGB, 101=BGR.
pub fn build_ser_header(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0, read as little-endian
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&[0u8; 16]);

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete SER file from a header plus raw frame payloads.
pub fn build_ser(
    width: u32,
    height: u32,
    bit_depth: u32,
    color_id: i32,
    frames: &[Vec<u8>],
) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, bit_depth, frames.len(), color_id);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Write bytes to a temporary file kept alive by the returned handle.
pub fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}
