mod common;

use std::time::Duration;

use beamwatch_core::classify::{AlignmentState, Targets};
use beamwatch_core::clock::{FrameClock, ManualClock};
use beamwatch_core::config::{MonitorConfig, TargetMode};
use beamwatch_core::error::BeamError;
use beamwatch_core::frame::Point;
use beamwatch_core::overlay::OverlayCommand;
use beamwatch_core::{AlignmentMonitor, MonitorStatus};

use common::{rgba_frame, RecordingSink, ScriptedSource};

const W: usize = 64;
const H: usize = 48;

type TestMonitor = AlignmentMonitor<ScriptedSource, RecordingSink, ManualClock>;

fn config() -> MonitorConfig {
    MonitorConfig {
        width: W,
        height: H,
        ..MonitorConfig::default()
    }
}

fn monitor_with(source: ScriptedSource) -> TestMonitor {
    AlignmentMonitor::new(
        source,
        RecordingSink::default(),
        ManualClock::new(Duration::from_millis(16)),
        &config(),
    )
}

fn aligned_frame() -> Vec<u8> {
    rgba_frame(W, H, &[(20, 30, 200)])
}

fn misaligned_frame() -> Vec<u8> {
    rgba_frame(W, H, &[(5, 5, 200), (50, 40, 200)])
}

/// Advance one refresh period and run what is due.
fn step(monitor: &mut TestMonitor) -> usize {
    monitor.clock_mut().step();
    monitor.pump()
}

// ---------------------------------------------------------------------------
// Start and scheduling
// ---------------------------------------------------------------------------

#[test]
fn test_start_runs_one_tick_per_refresh() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.start().unwrap();
    assert!(monitor.is_running());
    assert_eq!(monitor.status(), &MonitorStatus::Waiting);

    let processed: usize = (0..10).map(|_| step(&mut monitor)).sum();
    assert_eq!(processed, 10);
    assert_eq!(monitor.ticks_processed(), 10);
    assert_eq!(monitor.frames_analyzed(), 10);
    assert_eq!(monitor.sink().heatmaps, 10);
}

#[test]
fn test_double_start_is_idempotent() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.start().unwrap();
    monitor.start().unwrap();

    assert_eq!(monitor.clock().registrations(), 1);
    assert_eq!(monitor.source().open_calls, 1);

    let processed: usize = (0..10).map(|_| step(&mut monitor)).sum();
    assert_eq!(processed, 10);
}

// ---------------------------------------------------------------------------
// Per-tick output
// ---------------------------------------------------------------------------

#[test]
fn test_aligned_frame_publishes_status_and_glow() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.start().unwrap();
    step(&mut monitor);

    assert_eq!(monitor.status(), &MonitorStatus::Aligned);
    assert_eq!(monitor.status().message(), "aligned");
    let c = monitor.last_classification().unwrap();
    assert_eq!(c.targets, Targets::Single(Point::new(20.0, 30.0)));

    let overlay = &monitor.sink().last_overlay;
    assert_eq!(overlay[0], OverlayCommand::Clear);
    assert!(matches!(overlay[1], OverlayCommand::RadialGlow { .. }));

    let heatmap = monitor.sink().last_heatmap.as_ref().unwrap();
    assert_eq!((heatmap.width(), heatmap.height()), (W, H));
}

#[test]
fn test_misaligned_frame_draws_rings() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, misaligned_frame()));
    monitor.start().unwrap();
    step(&mut monitor);

    assert_eq!(monitor.status(), &MonitorStatus::Misaligned);
    let rings = monitor
        .sink()
        .last_overlay
        .iter()
        .filter(|c| matches!(c, OverlayCommand::Ring { .. }))
        .count();
    assert_eq!(rings, 2);
}

#[test]
fn test_each_frame_classified_independently() {
    let script = vec![
        Some(aligned_frame()),
        Some(misaligned_frame()),
        Some(aligned_frame()),
    ];
    let mut monitor = monitor_with(ScriptedSource::new(W, H, script));
    monitor.start().unwrap();

    let mut states = Vec::new();
    for _ in 0..3 {
        step(&mut monitor);
        states.push(monitor.last_classification().unwrap().state);
    }
    assert_eq!(
        states,
        vec![
            AlignmentState::Aligned,
            AlignmentState::Misaligned,
            AlignmentState::Aligned
        ]
    );
}

#[test]
fn test_missing_frame_keeps_waiting() {
    let script = vec![None, None, Some(aligned_frame())];
    let mut monitor = monitor_with(ScriptedSource::new(W, H, script));
    monitor.start().unwrap();

    step(&mut monitor);
    step(&mut monitor);
    assert_eq!(monitor.status(), &MonitorStatus::Waiting);
    assert_eq!(monitor.status().message(), "waiting for image");
    assert_eq!(monitor.ticks_processed(), 2);
    assert_eq!(monitor.frames_analyzed(), 0);
    assert!(monitor.last_analysis().is_none());

    step(&mut monitor);
    assert_eq!(monitor.status(), &MonitorStatus::Aligned);
}

#[test]
fn test_dark_frame_reports_waiting() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, rgba_frame(W, H, &[])));
    monitor.start().unwrap();
    step(&mut monitor);
    assert_eq!(monitor.frames_analyzed(), 1);
    assert_eq!(monitor.status(), &MonitorStatus::Waiting);
    assert_eq!(monitor.sink().last_overlay, vec![OverlayCommand::Clear]);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_unavailable_source_reports_error_and_stays_stopped() {
    let mut monitor = monitor_with(ScriptedSource::failing());
    let err = monitor.start().unwrap_err();
    assert!(matches!(err, BeamError::SourceUnavailable(_)));

    assert!(!monitor.is_running());
    assert!(monitor.status().is_error());
    assert_eq!(monitor.status().message(), "camera not available");
    assert!(monitor.status().to_string().contains("permission denied"));
    assert_eq!(monitor.clock().registrations(), 0);
    assert_eq!(step(&mut monitor), 0);
}

#[test]
fn test_tab_inactive_stops_and_releases_source() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.start().unwrap();
    step(&mut monitor);

    monitor.set_tab_active(false);
    assert!(!monitor.is_running());
    assert_eq!(monitor.status(), &MonitorStatus::Idle);
    assert_eq!(monitor.source().close_calls, 1);
    assert_eq!(monitor.clock().registrations(), 0);
    assert!(monitor.sink().clears >= 1);
    assert!(monitor.sink().last_heatmap.is_none());

    // No tick fires after stop.
    assert_eq!(step(&mut monitor), 0);

    // Start is refused while inactive.
    monitor.start().unwrap();
    assert!(!monitor.is_running());
    assert_eq!(monitor.source().open_calls, 1);

    // Reactivating does not auto-start.
    monitor.set_tab_active(true);
    assert!(!monitor.is_running());
    monitor.start().unwrap();
    assert!(monitor.is_running());
    assert_eq!(monitor.source().open_calls, 2);
}

#[test]
fn test_stop_is_safe_to_repeat() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.stop();
    assert_eq!(monitor.source().close_calls, 0);

    monitor.start().unwrap();
    monitor.stop();
    monitor.stop();
    assert_eq!(monitor.source().close_calls, 1);
    assert_eq!(monitor.status(), &MonitorStatus::Idle);
    assert!(monitor.last_analysis().is_none());
}

// ---------------------------------------------------------------------------
// Buffers and mode
// ---------------------------------------------------------------------------

#[test]
fn test_frame_size_change_reallocates_buffers() {
    let (w2, h2) = (80, 30);
    let frame = rgba_frame(w2, h2, &[(70, 25, 200)]);
    let mut monitor = monitor_with(ScriptedSource::repeating(w2, h2, frame));
    monitor.start().unwrap();
    step(&mut monitor);

    assert_eq!(monitor.status(), &MonitorStatus::Aligned);
    let run = monitor.run_state().unwrap();
    assert_eq!(run.buffer.intensity.dim(), (h2, w2));
    assert_eq!(run.buffer.heatmap.width(), w2);
    let c = monitor.last_classification().unwrap();
    assert_eq!(c.targets, Targets::Single(Point::new(70.0, 25.0)));
}

#[test]
fn test_mode_change_deferred_while_running() {
    let frame = rgba_frame(W, H, &[(10, 10, 200), (14, 10, 200)]);
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, frame));
    monitor.start().unwrap();

    monitor.set_mode(TargetMode::Centroid);
    assert_eq!(monitor.align_config().mode, TargetMode::Brightest);
    assert_eq!(monitor.pending_mode(), Some(TargetMode::Centroid));
    step(&mut monitor);
    assert_eq!(
        monitor.last_classification().unwrap().targets,
        Targets::Single(Point::new(10.0, 10.0))
    );

    monitor.stop();
    monitor.start().unwrap();
    assert_eq!(monitor.align_config().mode, TargetMode::Centroid);
    step(&mut monitor);
    match monitor.last_classification().unwrap().targets {
        Targets::Single(p) => assert!((p.x - 12.0).abs() < 1e-4, "x={}", p.x),
        other => panic!("expected single target, got {other:?}"),
    }
}

#[test]
fn test_mode_change_applies_immediately_when_stopped() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.set_mode(TargetMode::Centroid);
    assert_eq!(monitor.align_config().mode, TargetMode::Centroid);
    assert_eq!(monitor.pending_mode(), None);
}

// ---------------------------------------------------------------------------
// Status and timing
// ---------------------------------------------------------------------------

#[test]
fn test_status_published_only_on_change() {
    let script = vec![
        Some(aligned_frame()),
        Some(aligned_frame()),
        Some(misaligned_frame()),
    ];
    let mut monitor = monitor_with(ScriptedSource::new(W, H, script));
    monitor.start().unwrap();
    for _ in 0..3 {
        step(&mut monitor);
    }
    monitor.stop();

    assert_eq!(
        monitor.sink().statuses,
        vec![
            MonitorStatus::Waiting,
            MonitorStatus::Aligned,
            MonitorStatus::Misaligned,
            MonitorStatus::Idle,
        ]
    );
}

#[test]
fn test_elapsed_runs_from_start() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.clock_mut().advance(Duration::from_secs(5));
    assert_eq!(monitor.elapsed(), Duration::ZERO);

    monitor.start().unwrap();
    for _ in 0..4 {
        step(&mut monitor);
    }
    assert_eq!(monitor.elapsed(), Duration::from_millis(64));

    monitor.stop();
    assert_eq!(monitor.elapsed(), Duration::ZERO);
}

#[test]
fn test_slow_host_does_not_catch_up() {
    let mut monitor = monitor_with(ScriptedSource::repeating(W, H, aligned_frame()));
    monitor.start().unwrap();
    monitor.clock_mut().advance(Duration::from_millis(500));
    assert_eq!(monitor.pump(), 1);
    assert_eq!(monitor.pump(), 0);
}
