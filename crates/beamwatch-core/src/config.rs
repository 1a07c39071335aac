use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_MISALIGNMENT_DISTANCE, DEFAULT_NOISE_FLOOR,
    DEFAULT_PULSE_AMPLITUDE, DEFAULT_PULSE_BASE_RADIUS, DEFAULT_RING_LINE_WIDTH,
    DEFAULT_RING_RADIUS, DEFAULT_SECONDARY_PEAK_RATIO,
};
use crate::error::{BeamError, Result};
use crate::overlay::Rgba;
use crate::source::synthetic::SpotSpec;

/// Which point the aligned-state indicator is drawn at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    /// The single brightest pixel.
    #[default]
    Brightest,
    /// The intensity-weighted centroid of all above-floor pixels.
    Centroid,
}

impl std::fmt::Display for TargetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brightest => write!(f, "Brightest Pixel"),
            Self::Centroid => write!(f, "Intensity Centroid"),
        }
    }
}

/// Thresholds for the dual-peak alignment rule.
///
/// The defaults were tuned on one camera/lens setup and are not physical
/// constants; expect to adjust them per rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// `secondary / primary` above this marks a second, separate spot.
    pub secondary_peak_ratio: f32,
    /// Peak separation in pixels above which two spots are misaligned.
    pub misalignment_distance: f32,
    /// Primary luminance (0..255) below which the frame is considered empty.
    pub noise_floor: f32,
    pub mode: TargetMode,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            secondary_peak_ratio: DEFAULT_SECONDARY_PEAK_RATIO,
            misalignment_distance: DEFAULT_MISALIGNMENT_DISTANCE,
            noise_floor: DEFAULT_NOISE_FLOOR,
            mode: TargetMode::Brightest,
        }
    }
}

impl AlignConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.secondary_peak_ratio >= 0.0 && self.secondary_peak_ratio <= 1.0) {
            return Err(BeamError::Config(format!(
                "secondary_peak_ratio must be in [0, 1], got {}",
                self.secondary_peak_ratio
            )));
        }
        if !(self.misalignment_distance >= 0.0) {
            return Err(BeamError::Config(format!(
                "misalignment_distance must be non-negative, got {}",
                self.misalignment_distance
            )));
        }
        if !(self.noise_floor >= 0.0) {
            return Err(BeamError::Config(format!(
                "noise_floor must be non-negative, got {}",
                self.noise_floor
            )));
        }
        Ok(())
    }
}

/// Geometry and colors of the status overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub ring_radius: f32,
    pub ring_line_width: f32,
    pub pulse_base_radius: f32,
    pub pulse_amplitude: f32,
    pub warning_color: Rgba,
    pub aligned_color: Rgba,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            ring_radius: DEFAULT_RING_RADIUS,
            ring_line_width: DEFAULT_RING_LINE_WIDTH,
            pulse_base_radius: DEFAULT_PULSE_BASE_RADIUS,
            pulse_amplitude: DEFAULT_PULSE_AMPLITUDE,
            warning_color: Rgba::new(239, 68, 68, 255),
            aligned_color: Rgba::new(34, 197, 94, 255),
        }
    }
}

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Gaussian spots rendered in memory.
    Synthetic {
        #[serde(default)]
        drift_px_per_frame: f32,
        spots: Vec<SpotSpec>,
    },
    /// Replay of a SER video recording.
    Ser {
        path: PathBuf,
        #[serde(default)]
        looped: bool,
    },
    /// Replay of a directory of still images, in file-name order.
    Images {
        dir: PathBuf,
        #[serde(default)]
        looped: bool,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Synthetic {
            spots: vec![SpotSpec {
                x: DEFAULT_FRAME_WIDTH as f32 / 2.0,
                y: DEFAULT_FRAME_HEIGHT as f32 / 2.0,
                sigma: 4.0,
                peak: 220.0,
            }],
            drift_px_per_frame: 0.0,
        }
    }
}

impl std::fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synthetic { spots, .. } => write!(f, "Synthetic ({} spots)", spots.len()),
            Self::Ser { path, .. } => write!(f, "SER {}", path.display()),
            Self::Images { dir, .. } => write!(f, "Images {}", dir.display()),
        }
    }
}

/// Full configuration of a monitoring session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Capture width requested from the source.
    pub width: usize,
    /// Capture height requested from the source.
    pub height: usize,
    pub alignment: AlignConfig,
    pub overlay: OverlayStyle,
    pub source: SourceConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            alignment: AlignConfig::default(),
            overlay: OverlayStyle::default(),
            source: SourceConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| BeamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BeamError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BeamError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.alignment.validate()
    }
}
