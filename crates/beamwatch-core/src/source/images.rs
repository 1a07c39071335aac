use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{info, warn};

use crate::error::{BeamError, Result};
use crate::frame::{FrameView, PixelLayout};
use crate::source::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Image files in `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    paths.sort();
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Frame source decoding one image file per poll.
///
/// Files that fail to decode are skipped with a warning.
pub struct ImageSequenceSource {
    dir: PathBuf,
    looped: bool,
    paths: Vec<PathBuf>,
    next: usize,
    current: Option<RgbaImage>,
}

impl ImageSequenceSource {
    pub fn new(dir: PathBuf, looped: bool) -> Self {
        Self {
            dir,
            looped,
            paths: Vec::new(),
            next: 0,
            current: None,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self, _width: usize, _height: usize) -> Result<()> {
        let paths = list_images(&self.dir)
            .map_err(|e| BeamError::SourceUnavailable(format!("{}: {e}", self.dir.display())))?;
        if paths.is_empty() {
            return Err(BeamError::SourceUnavailable(format!(
                "{}: no image files",
                self.dir.display()
            )));
        }
        info!(dir = %self.dir.display(), count = paths.len(), "Image sequence opened");
        self.paths = paths;
        self.next = 0;
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<FrameView<'_>> {
        if self.paths.is_empty() {
            return None;
        }
        if self.next >= self.paths.len() {
            if !self.looped {
                return None;
            }
            self.next = 0;
        }

        let path = &self.paths[self.next];
        self.next += 1;
        match image::open(path) {
            Ok(img) => self.current = Some(img.to_rgba8()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable image");
                return None;
            }
        }

        let img = self.current.as_ref()?;
        FrameView::new(
            img.width() as usize,
            img.height() as usize,
            PixelLayout::Rgba,
            img.as_raw(),
        )
        .ok()
    }

    fn close(&mut self) {
        self.paths.clear();
        self.current = None;
    }
}
