use std::path::PathBuf;

use beamwatch_core::heatmap::HeatmapBuffer;
use beamwatch_core::overlay::OverlayCommand;
use beamwatch_core::sink::DisplaySink;
use beamwatch_core::MonitorStatus;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::render::composite;

/// Terminal display: status goes to the progress bar, frames optionally
/// to PNG snapshots with the overlay composited.
pub struct CliSink {
    pb: ProgressBar,
    snapshot_dir: Option<PathBuf>,
    snapshot_every: u64,
    frames: u64,
    scratch: Option<HeatmapBuffer>,
    snapshot_due: bool,
    pub snapshots_written: u64,
    pub status_changes: u64,
}

impl CliSink {
    pub fn new(pb: ProgressBar, snapshot_dir: Option<PathBuf>, snapshot_every: u64) -> Self {
        Self {
            pb,
            snapshot_dir,
            snapshot_every: snapshot_every.max(1),
            frames: 0,
            scratch: None,
            snapshot_due: false,
            snapshots_written: 0,
            status_changes: 0,
        }
    }

    fn write_snapshot(&mut self, heatmap: &HeatmapBuffer, commands: &[OverlayCommand]) {
        let Some(dir) = self.snapshot_dir.as_ref() else {
            return;
        };
        let path = dir.join(format!("frame_{:06}.png", self.frames));
        match composite(heatmap, commands).save(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Snapshot written");
                self.snapshots_written += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Snapshot failed"),
        }
    }
}

impl DisplaySink for CliSink {
    fn publish_heatmap(&mut self, heatmap: &HeatmapBuffer) {
        self.frames += 1;
        if self.snapshot_dir.is_none() || self.frames % self.snapshot_every != 0 {
            return;
        }
        match self.scratch.as_mut() {
            Some(buf) if buf.width() == heatmap.width() && buf.height() == heatmap.height() => {
                buf.as_rgba_mut().copy_from_slice(heatmap.as_rgba());
            }
            _ => self.scratch = Some(heatmap.clone()),
        }
        self.snapshot_due = true;
    }

    fn publish_overlay(&mut self, commands: &[OverlayCommand]) {
        if !std::mem::take(&mut self.snapshot_due) {
            return;
        }
        if let Some(heatmap) = self.scratch.take() {
            self.write_snapshot(&heatmap, commands);
            self.scratch = Some(heatmap);
        }
    }

    fn publish_status(&mut self, status: &MonitorStatus) {
        self.status_changes += 1;
        self.pb.println(format!("  status: {status}"));
        self.pb.set_message(status.to_string());
    }

    fn clear(&mut self) {
        self.snapshot_due = false;
    }
}
