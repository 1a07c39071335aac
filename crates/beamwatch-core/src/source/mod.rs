pub mod images;
pub mod ser;
pub mod synthetic;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::frame::FrameView;

pub use images::ImageSequenceSource;
pub use ser::SerSource;
pub use synthetic::{SpotSpec, SyntheticSource};

/// A producer of video frames with an open/close lifecycle.
///
/// Polling never blocks: a source that has nothing new returns `None` and
/// the caller tries again on its next tick.
pub trait FrameSource {
    /// Acquire the underlying device or file. `width` x `height` is the
    /// requested capture size; a source may deliver frames of another size.
    ///
    /// Failure means the source is unavailable and no frames will follow.
    fn open(&mut self, width: usize, height: usize) -> Result<()>;

    /// The latest frame, or `None` if no new frame is ready.
    fn poll_frame(&mut self) -> Option<FrameView<'_>>;

    /// Release the underlying device or file. Safe to call when not open.
    fn close(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self, width: usize, height: usize) -> Result<()> {
        (**self).open(width, height)
    }

    fn poll_frame(&mut self) -> Option<FrameView<'_>> {
        (**self).poll_frame()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Build the source described by `config`. Nothing is opened yet.
pub fn source_from_config(config: &SourceConfig) -> Box<dyn FrameSource> {
    match config {
        SourceConfig::Synthetic {
            spots,
            drift_px_per_frame,
        } => Box::new(SyntheticSource::new(spots.clone()).with_drift(*drift_px_per_frame)),
        SourceConfig::Ser { path, looped } => Box::new(SerSource::new(path.clone(), *looped)),
        SourceConfig::Images { dir, looped } => {
            Box::new(ImageSequenceSource::new(dir.clone(), *looped))
        }
    }
}
