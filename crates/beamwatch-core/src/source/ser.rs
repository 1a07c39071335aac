use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use tracing::{debug, info};

use crate::error::{BeamError, Result};
use crate::frame::{FrameView, PixelLayout};
use crate::source::FrameSource;

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

const COLOR_ID_RGB: i32 = 100;
const COLOR_ID_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
}

impl SerHeader {
    /// Bytes per sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    /// Samples per pixel (1 for mono/Bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            COLOR_ID_RGB | COLOR_ID_BGR => 3,
            _ => 1,
        }
    }

    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_sample() * self.planes_per_pixel())
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
    frame_size: usize,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(BeamError::InvalidSer("File too small for SER header".into()));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(BeamError::InvalidSer("Missing LUCAM-RECORDER magic".into()));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let frame_size = header
            .frame_byte_size()
            .ok_or_else(|| BeamError::InvalidSer("Frame size overflows".into()))?;

        let expected = frame_size
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| BeamError::InvalidSer("Frame data size overflows".into()))?;
        if mmap.len() < expected {
            return Err(BeamError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            header,
            frame_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Raw bytes of frame `index` (zero-copy from the mapping).
    pub fn frame_raw(&self, index: usize) -> Option<&[u8]> {
        if index >= self.frame_count() {
            return None;
        }
        let offset = index
            .checked_mul(self.frame_size)?
            .checked_add(SER_HEADER_SIZE)?;
        self.mmap.get(offset..offset.checked_add(self.frame_size)?)
    }

    /// Decode frame `index` into interleaved RGB8 in `out`, reusing its allocation.
    pub fn decode_rgb8(&self, index: usize, out: &mut Vec<u8>) -> bool {
        let Some(raw) = self.frame_raw(index) else {
            return false;
        };
        let h = &self.header;
        let pixels = h.width as usize * h.height as usize;
        let bps = h.bytes_per_sample();
        let planes = h.planes_per_pixel();
        let shift = h.pixel_depth.saturating_sub(8);

        out.clear();
        out.resize(pixels * 3, 0);

        let sample = |i: usize| -> u8 {
            let idx = i * bps;
            if bps == 1 {
                raw[idx]
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                let v = if h.little_endian {
                    u16::from_le_bytes(pair)
                } else {
                    u16::from_be_bytes(pair)
                };
                (v >> shift).min(255) as u8
            }
        };

        for (p, dst) in out.chunks_exact_mut(3).enumerate() {
            if planes == 1 {
                let v = sample(p);
                dst.copy_from_slice(&[v, v, v]);
            } else {
                let (a, b, c) = (sample(p * 3), sample(p * 3 + 1), sample(p * 3 + 2));
                if h.color_id == COLOR_ID_BGR {
                    dst.copy_from_slice(&[c, b, a]);
                } else {
                    dst.copy_from_slice(&[a, b, c]);
                }
            }
        }
        true
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]);

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?;
    let height = cursor.read_i32::<LittleEndian>()?;
    let pixel_depth = cursor.read_i32::<LittleEndian>()?;
    let frame_count = cursor.read_i32::<LittleEndian>()?;

    if width <= 0 || height <= 0 {
        return Err(BeamError::InvalidDimensions {
            width: width.max(0) as usize,
            height: height.max(0) as usize,
        });
    }
    if !(1..=16).contains(&pixel_depth) {
        return Err(BeamError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Most capture tools write 0 here for little-endian data despite the
    // format description saying otherwise.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width: width as u32,
        height: height as u32,
        pixel_depth: pixel_depth as u32,
        frame_count: frame_count.max(0) as u32,
    })
}

/// Frame source stepping through a SER recording, one frame per poll.
pub struct SerSource {
    path: PathBuf,
    looped: bool,
    reader: Option<SerReader>,
    rgb: Vec<u8>,
    next: usize,
}

impl SerSource {
    pub fn new(path: PathBuf, looped: bool) -> Self {
        Self {
            path,
            looped,
            reader: None,
            rgb: Vec::new(),
            next: 0,
        }
    }

    pub fn frame_count(&self) -> Option<usize> {
        self.reader.as_ref().map(SerReader::frame_count)
    }
}

impl FrameSource for SerSource {
    fn open(&mut self, width: usize, height: usize) -> Result<()> {
        let reader = SerReader::open(&self.path).map_err(|e| {
            BeamError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        if reader.frame_count() == 0 {
            return Err(BeamError::SourceUnavailable(format!(
                "{}: recording holds no frames",
                self.path.display()
            )));
        }

        let (w, h) = (reader.header.width as usize, reader.header.height as usize);
        if (w, h) != (width, height) {
            debug!(requested = ?(width, height), actual = ?(w, h), "SER size differs from request");
        }
        info!(
            path = %self.path.display(),
            frames = reader.frame_count(),
            depth = reader.header.pixel_depth,
            "SER source opened"
        );
        self.reader = Some(reader);
        self.next = 0;
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<FrameView<'_>> {
        let reader = self.reader.as_ref()?;
        if self.next >= reader.frame_count() {
            if !self.looped {
                return None;
            }
            self.next = 0;
        }
        if !reader.decode_rgb8(self.next, &mut self.rgb) {
            return None;
        }
        self.next += 1;
        let (w, h) = (reader.header.width as usize, reader.header.height as usize);
        FrameView::new(w, h, PixelLayout::Rgb, &self.rgb).ok()
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
