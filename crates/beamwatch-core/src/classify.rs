//! Dual-peak alignment rule.
//!
//! Each frame is judged on its own: there is no smoothing or hysteresis,
//! so a spot hovering on a threshold can flip between states frame to frame.

use crate::centroid::estimate_centroid;
use crate::config::{AlignConfig, TargetMode};
use crate::frame::Point;
use crate::intensity::Extraction;

/// Outcome of classifying one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignmentState {
    /// No meaningful signal in the frame.
    #[default]
    Idle,
    /// One concentrated bright region.
    Aligned,
    /// Two separated bright regions of comparable brightness.
    Misaligned,
}

impl std::fmt::Display for AlignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Aligned => write!(f, "aligned"),
            Self::Misaligned => write!(f, "misaligned"),
        }
    }
}

/// Points the overlay marks for a classification.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Targets {
    #[default]
    None,
    Single(Point),
    /// Primary then secondary peak.
    Pair(Point, Point),
}

impl Targets {
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Pair(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether `point` is one of the targets.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Self::None => false,
            Self::Single(a) => a == point,
            Self::Pair(a, b) => a == point || b == point,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Classification {
    pub state: AlignmentState,
    pub targets: Targets,
    /// `secondary / primary` luminance ratio.
    pub ratio: f32,
    /// Distance between primary and secondary peaks, in pixels.
    pub separation: f32,
}

/// Classify one frame from its extraction results.
///
/// Rules, first match wins:
/// 1. primary below the noise floor: `Idle`, nothing to mark.
/// 2. ratio above `secondary_peak_ratio` AND separation above
///    `misalignment_distance`: `Misaligned`, both peaks marked.
/// 3. otherwise `Aligned`, marked at the primary peak or the centroid
///    depending on `config.mode` (centroid falls back to the primary).
pub fn classify(extraction: &Extraction, config: &AlignConfig) -> Classification {
    let peaks = &extraction.peaks;
    if peaks.primary.value < config.noise_floor {
        return Classification::default();
    }

    let primary = extraction.primary_position();
    let secondary = extraction.secondary_position();
    let ratio = peaks.ratio();
    let separation = primary.distance(&secondary);

    if ratio > config.secondary_peak_ratio && separation > config.misalignment_distance {
        return Classification {
            state: AlignmentState::Misaligned,
            targets: Targets::Pair(primary, secondary),
            ratio,
            separation,
        };
    }

    let target = match config.mode {
        TargetMode::Brightest => primary,
        TargetMode::Centroid => estimate_centroid(&extraction.sums).unwrap_or(primary),
    };

    Classification {
        state: AlignmentState::Aligned,
        targets: Targets::Single(target),
        ratio,
        separation,
    }
}
