//! The per-frame alignment loop.
//!
//! [`AlignmentMonitor`] owns the frame source, the display sink, the
//! refresh clock and every per-run buffer. Each clock tick pulls one frame
//! and runs it through extraction, classification and rendering before
//! returning; ticks never overlap and nothing is allocated once the
//! buffers have been sized.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::centroid::estimate_centroid;
use crate::classify::{classify, AlignmentState, Classification};
use crate::clock::{FrameClock, TickHandle};
use crate::config::{AlignConfig, MonitorConfig, OverlayStyle, TargetMode};
use crate::error::{BeamError, Result};
use crate::frame::{FrameBuffer, FrameView, Point};
use crate::heatmap::render_heatmap;
use crate::intensity::{extract, Extraction};
use crate::overlay::{build_overlay, OverlayCommand};
use crate::sink::DisplaySink;
use crate::source::FrameSource;

/// What the control surface shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Not running.
    #[default]
    Idle,
    /// Running, but no frame with signal has been seen yet.
    Waiting,
    Aligned,
    Misaligned,
    /// The frame source could not be opened.
    Error(String),
}

impl MonitorStatus {
    /// Short user-facing text.
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting for image",
            Self::Aligned => "aligned",
            Self::Misaligned => "misaligned",
            Self::Error(_) => "camera not available",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(detail) => write!(f, "{}: {detail}", self.message()),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl From<AlignmentState> for MonitorStatus {
    fn from(state: AlignmentState) -> Self {
        match state {
            AlignmentState::Idle => Self::Waiting,
            AlignmentState::Aligned => Self::Aligned,
            AlignmentState::Misaligned => Self::Misaligned,
        }
    }
}

/// Result of analysing a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Analysis {
    pub extraction: Extraction,
    pub classification: Classification,
    /// `None` when no pixel cleared the signal floor.
    pub centroid: Option<Point>,
}

/// Extract and classify one frame into `buffer`, resizing it if needed.
///
/// This is the scheduling-free core of a tick; the heatmap is not rendered.
pub fn analyze_frame(
    frame: &FrameView<'_>,
    config: &AlignConfig,
    buffer: &mut FrameBuffer,
) -> Analysis {
    buffer.ensure_size(frame.width(), frame.height());
    let extraction = extract(frame, &mut buffer.intensity);
    Analysis {
        extraction,
        classification: classify(&extraction, config),
        centroid: estimate_centroid(&extraction.sums),
    }
}

/// Buffers and outputs living for one run of the loop.
#[derive(Clone, Debug)]
pub struct RunState {
    pub buffer: FrameBuffer,
    pub overlay: Vec<OverlayCommand>,
    /// Analysis of the latest frame, `None` until one arrives.
    pub analysis: Option<Analysis>,
    /// Clock time at which the run started; drives the glow pulse.
    pub started_at: Duration,
}

impl RunState {
    pub fn new(width: usize, height: usize, started_at: Duration) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height),
            overlay: Vec::with_capacity(3),
            analysis: None,
            started_at,
        }
    }
}

/// Drives pull → analyse → render → publish once per clock tick.
pub struct AlignmentMonitor<S, D, C> {
    source: S,
    sink: D,
    clock: C,
    width: usize,
    height: usize,
    align: AlignConfig,
    style: OverlayStyle,
    /// `Some` exactly while running; the only-one-loop guard.
    registration: Option<TickHandle>,
    source_open: bool,
    tab_active: bool,
    pending_mode: Option<TargetMode>,
    run: Option<RunState>,
    status: MonitorStatus,
    ticks: u64,
    frames: u64,
}

impl<S, D, C> AlignmentMonitor<S, D, C>
where
    S: FrameSource,
    D: DisplaySink,
    C: FrameClock,
{
    pub fn new(source: S, sink: D, clock: C, config: &MonitorConfig) -> Self {
        Self {
            source,
            sink,
            clock,
            width: config.width,
            height: config.height,
            align: config.alignment.clone(),
            style: config.overlay.clone(),
            registration: None,
            source_open: false,
            tab_active: true,
            pending_mode: None,
            run: None,
            status: MonitorStatus::Idle,
            ticks: 0,
            frames: 0,
        }
    }

    /// Open the source and arm the tick registration.
    ///
    /// A no-op while already running or while the host view is inactive.
    /// Only an unavailable source is reported as an error; the status then
    /// carries the message and the loop stays stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.registration.is_some() {
            debug!("start ignored: already running");
            return Ok(());
        }
        if !self.tab_active {
            warn!("start ignored: view inactive");
            return Ok(());
        }
        if let Some(mode) = self.pending_mode.take() {
            self.align.mode = mode;
        }

        if let Err(e) = self.source.open(self.width, self.height) {
            let err = if matches!(e, BeamError::SourceUnavailable(_)) {
                e
            } else {
                BeamError::SourceUnavailable(e.to_string())
            };
            warn!(error = %err, "Frame source unavailable");
            self.set_status(MonitorStatus::Error(err.to_string()));
            return Err(err);
        }
        self.source_open = true;

        let now = self.clock.now();
        match self.run.as_mut() {
            Some(run) => {
                run.started_at = now;
                run.analysis = None;
            }
            None => self.run = Some(RunState::new(self.width, self.height, now)),
        }
        self.registration = Some(self.clock.register());

        info!(
            width = self.width,
            height = self.height,
            mode = %self.align.mode,
            "Alignment loop started"
        );
        self.set_status(MonitorStatus::Waiting);
        Ok(())
    }

    /// Cancel the tick registration, release the source and clear the
    /// display. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        let was_running = self.registration.is_some();
        if let Some(handle) = self.registration.take() {
            self.clock.cancel(handle);
        }
        if self.source_open {
            self.source.close();
            self.source_open = false;
        }
        if let Some(run) = self.run.as_mut() {
            run.analysis = None;
            run.overlay.clear();
        }
        self.sink.clear();
        self.set_status(MonitorStatus::Idle);
        if was_running {
            info!(ticks = self.ticks, frames = self.frames, "Alignment loop stopped");
        }
    }

    /// Host view visibility. Going inactive stops the loop; becoming active
    /// again only allows a later `start()`.
    pub fn set_tab_active(&mut self, active: bool) {
        self.tab_active = active;
        if !active {
            self.stop();
        }
    }

    /// Change the aligned-target mode. Applied immediately when stopped,
    /// otherwise at the next `start()`.
    pub fn set_mode(&mut self, mode: TargetMode) {
        if self.registration.is_some() {
            debug!(%mode, "Mode change deferred to next start");
            self.pending_mode = Some(mode);
        } else {
            self.align.mode = mode;
            self.pending_mode = None;
        }
    }

    /// Run every tick currently due. Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now();
        let mut processed = 0;
        while let Some(handle) = self.clock.next_due(now) {
            if self.registration != Some(handle) {
                continue;
            }
            self.tick();
            processed += 1;
        }
        processed
    }

    fn tick(&mut self) {
        self.ticks += 1;
        let Some(run) = self.run.as_mut() else {
            return;
        };
        // No frame yet: keep the current status and try again next tick.
        let Some(frame) = self.source.poll_frame() else {
            return;
        };

        let (w, h) = (frame.width(), frame.height());
        if (run.buffer.width(), run.buffer.height()) != (w, h) {
            warn!(width = w, height = h, "Frame size changed; buffers reallocated");
        }
        let analysis = analyze_frame(&frame, &self.align, &mut run.buffer);
        run.analysis = Some(analysis);

        render_heatmap(&run.buffer.intensity, &mut run.buffer.heatmap);
        let elapsed = self.clock.now().saturating_sub(run.started_at).as_secs_f64();
        build_overlay(&analysis.classification, elapsed, &self.style, &mut run.overlay);

        self.sink.publish_heatmap(&run.buffer.heatmap);
        self.sink.publish_overlay(&run.overlay);

        let state = analysis.classification.state;
        self.frames += 1;
        self.set_status(state.into());
    }

    fn set_status(&mut self, status: MonitorStatus) {
        if self.status == status {
            return;
        }
        debug!(from = %self.status, to = %status, "Status changed");
        self.sink.publish_status(&status);
        self.status = status;
    }

    pub fn is_running(&self) -> bool {
        self.registration.is_some()
    }

    pub fn is_tab_active(&self) -> bool {
        self.tab_active
    }

    pub fn status(&self) -> &MonitorStatus {
        &self.status
    }

    pub fn align_config(&self) -> &AlignConfig {
        &self.align
    }

    pub fn pending_mode(&self) -> Option<TargetMode> {
        self.pending_mode
    }

    /// Ticks handled since construction, including ones without a frame.
    pub fn ticks_processed(&self) -> u64 {
        self.ticks
    }

    /// Frames actually analysed since construction.
    pub fn frames_analyzed(&self) -> u64 {
        self.frames
    }

    /// Analysis of the most recent frame of the current run.
    pub fn last_analysis(&self) -> Option<&Analysis> {
        self.run.as_ref().and_then(|r| r.analysis.as_ref())
    }

    pub fn last_classification(&self) -> Option<&Classification> {
        self.last_analysis().map(|a| &a.classification)
    }

    /// Time since the current run started, zero when stopped.
    pub fn elapsed(&self) -> Duration {
        match (&self.run, self.registration) {
            (Some(run), Some(_)) => self.clock.now().saturating_sub(run.started_at),
            _ => Duration::ZERO,
        }
    }

    pub fn run_state(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
