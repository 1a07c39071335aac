//! Status overlay as a list of drawing commands.
//!
//! The overlay is rebuilt from scratch every tick and always starts with
//! [`OverlayCommand::Clear`]. How the commands are rasterized is up to the
//! display sink.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::classify::{AlignmentState, Classification, Targets};
use crate::config::OverlayStyle;
use crate::frame::Point;

/// Alpha of the translucent fill inside a warning ring.
const RING_FILL_ALPHA: u8 = 64;

/// Alpha at the centre of the aligned glow.
const GLOW_CORE_ALPHA: u8 = 230;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayCommand {
    /// Erase whatever the previous tick drew.
    Clear,
    /// Stroked circle with a translucent fill.
    Ring {
        center: Point,
        radius: f32,
        line_width: f32,
        stroke: Rgba,
        fill: Rgba,
    },
    /// Filled disc fading linearly from `inner` at the centre to `outer` at `radius`.
    RadialGlow {
        center: Point,
        radius: f32,
        inner: Rgba,
        outer: Rgba,
    },
}

/// Glow radius `elapsed_secs` into the run: `base + amplitude * sin(pi * t)`.
///
/// One full breath takes two seconds. Never negative.
pub fn pulse_radius(style: &OverlayStyle, elapsed_secs: f64) -> f32 {
    let wave = (PI * elapsed_secs).sin() as f32;
    (style.pulse_base_radius + style.pulse_amplitude * wave).max(0.0)
}

/// Rebuild `out` for this tick's classification.
///
/// `out` is cleared and refilled in place so its allocation is reused.
pub fn build_overlay(
    classification: &Classification,
    elapsed_secs: f64,
    style: &OverlayStyle,
    out: &mut Vec<OverlayCommand>,
) {
    out.clear();
    out.push(OverlayCommand::Clear);

    match (classification.state, classification.targets) {
        (AlignmentState::Misaligned, Targets::Pair(a, b)) => {
            out.push(warning_ring(a, style));
            out.push(warning_ring(b, style));
        }
        (AlignmentState::Aligned, Targets::Single(center)) => {
            out.push(OverlayCommand::RadialGlow {
                center,
                radius: pulse_radius(style, elapsed_secs),
                inner: style.aligned_color.with_alpha(GLOW_CORE_ALPHA),
                outer: style.aligned_color.with_alpha(0),
            });
        }
        _ => {}
    }
}

fn warning_ring(center: Point, style: &OverlayStyle) -> OverlayCommand {
    OverlayCommand::Ring {
        center,
        radius: style.ring_radius,
        line_width: style.ring_line_width,
        stroke: style.warning_color,
        fill: style.warning_color.with_alpha(RING_FILL_ALPHA),
    }
}
