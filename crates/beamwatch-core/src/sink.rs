use crate::heatmap::HeatmapBuffer;
use crate::monitor::MonitorStatus;
use crate::overlay::OverlayCommand;

/// Receiver of everything the monitor wants shown.
///
/// Buffers are lent for the duration of the call only; a sink that needs
/// them later must copy.
pub trait DisplaySink {
    fn publish_heatmap(&mut self, heatmap: &HeatmapBuffer);

    fn publish_overlay(&mut self, commands: &[OverlayCommand]);

    /// Called when the status changes, not every tick.
    fn publish_status(&mut self, _status: &MonitorStatus) {}

    /// Remove the displayed heatmap and overlay.
    fn clear(&mut self);
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn publish_heatmap(&mut self, heatmap: &HeatmapBuffer) {
        (**self).publish_heatmap(heatmap)
    }

    fn publish_overlay(&mut self, commands: &[OverlayCommand]) {
        (**self).publish_overlay(commands)
    }

    fn publish_status(&mut self, status: &MonitorStatus) {
        (**self).publish_status(status)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn publish_heatmap(&mut self, _heatmap: &HeatmapBuffer) {}
    fn publish_overlay(&mut self, _commands: &[OverlayCommand]) {}
    fn clear(&mut self) {}
}
