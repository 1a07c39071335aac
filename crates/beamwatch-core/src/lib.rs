pub mod centroid;
pub mod classify;
pub mod clock;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod heatmap;
pub mod intensity;
pub mod monitor;
pub mod overlay;
pub mod sink;
pub mod source;

pub use monitor::{analyze_frame, AlignmentMonitor, Analysis, MonitorStatus};
