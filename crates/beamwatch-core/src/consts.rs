/// Minimum pixel count (h*w) to render heatmap rows with Rayon.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Rec. 709 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.2126;

/// Rec. 709 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.7152;

/// Rec. 709 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.0722;

/// Full-scale luminance of an 8-bit sample.
pub const LUMINANCE_MAX: f32 = 255.0;

/// Pixels at or below this luminance are treated as black and excluded
/// from the centroid sums. Not configurable.
pub const SIGNAL_FLOOR: f32 = 1.0;

/// Default primary-peak luminance below which a frame carries no signal.
pub const DEFAULT_NOISE_FLOOR: f32 = 5.0;

/// Default secondary/primary ratio above which two peaks count as separate spots.
pub const DEFAULT_SECONDARY_PEAK_RATIO: f32 = 0.45;

/// Default peak separation (pixels) above which two spots count as misaligned.
pub const DEFAULT_MISALIGNMENT_DISTANCE: f32 = 20.0;

/// Radius of the warning ring drawn at each peak of a misaligned frame.
pub const DEFAULT_RING_RADIUS: f32 = 14.0;

/// Stroke width of the warning ring.
pub const DEFAULT_RING_LINE_WIDTH: f32 = 3.0;

/// Resting radius of the aligned-state glow.
pub const DEFAULT_PULSE_BASE_RADIUS: f32 = 18.0;

/// Peak deviation of the aligned-state glow radius from its resting value.
pub const DEFAULT_PULSE_AMPLITUDE: f32 = 6.0;

/// Default display refresh rate driving the frame clock.
pub const DEFAULT_REFRESH_HZ: f64 = 60.0;

/// Default capture size requested from a frame source.
pub const DEFAULT_FRAME_WIDTH: usize = 640;
pub const DEFAULT_FRAME_HEIGHT: usize = 480;

/// Normalized positions of the heatmap gradient stops.
pub const GRADIENT_POSITIONS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Heatmap gradient colors, dark navy through blue and amber to warm white.
pub const GRADIENT_COLORS: [[u8; 3]; 5] = [
    [15, 23, 42],
    [37, 99, 235],
    [59, 130, 246],
    [250, 204, 21],
    [255, 237, 213],
];
