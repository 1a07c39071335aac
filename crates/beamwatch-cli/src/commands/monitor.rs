use std::path::PathBuf;

use anyhow::{Context, Result};
use beamwatch_core::clock::{FrameClock, IntervalClock, ManualClock};
use beamwatch_core::config::{MonitorConfig, SourceConfig};
use beamwatch_core::consts::DEFAULT_REFRESH_HZ;
use beamwatch_core::source::{source_from_config, FrameSource};
use beamwatch_core::{AlignmentMonitor, MonitorStatus};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::ModeArg;
use crate::sink::CliSink;
use crate::summary::{print_monitor_report, print_monitor_summary};

#[derive(Args)]
pub struct MonitorArgs {
    /// TOML config file (see `beamwatch config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Replay a SER recording instead of the configured source
    #[arg(long, conflicts_with = "images")]
    pub ser: Option<PathBuf>,

    /// Replay a directory of images instead of the configured source
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Restart the recording when it runs out
    #[arg(long = "loop")]
    pub looped: bool,

    /// Number of refresh ticks to run
    #[arg(short = 'n', long, default_value = "300")]
    pub frames: u64,

    /// Refresh rate in Hz
    #[arg(long, default_value_t = DEFAULT_REFRESH_HZ)]
    pub fps: f64,

    /// Aligned-target mode, overriding the config
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Save composited heatmap snapshots into this directory
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// Save a snapshot every N analysed frames
    #[arg(long, default_value = "30")]
    pub snapshot_every: u64,

    /// Run ticks back to back instead of in real time
    #[arg(long)]
    pub fast: bool,
}

/// Frame tally of one monitoring session.
#[derive(Debug, Default)]
pub struct MonitorReport {
    pub ticks: u64,
    pub frames: u64,
    pub aligned: u64,
    pub misaligned: u64,
    pub waiting: u64,
    pub snapshots: u64,
    pub last_status: MonitorStatus,
}

pub fn run(args: &MonitorArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => MonitorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    if let Some(ref path) = args.ser {
        config.source = SourceConfig::Ser {
            path: path.clone(),
            looped: args.looped,
        };
    } else if let Some(ref dir) = args.images {
        config.source = SourceConfig::Images {
            dir: dir.clone(),
            looped: args.looped,
        };
    }
    if let Some(ref dir) = args.snapshot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let refresh = if args.fast {
        format!("{} Hz (fast replay)", args.fps)
    } else {
        format!("{} Hz", args.fps)
    };
    print_monitor_summary(&config, &refresh);

    let pb = ProgressBar::new(args.frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let sink = CliSink::new(pb.clone(), args.snapshot_dir.clone(), args.snapshot_every);
    let source = source_from_config(&config.source);

    let report = if args.fast {
        let clock = ManualClock::from_hz(args.fps);
        let mut monitor = AlignmentMonitor::new(source, sink, clock, &config);
        if let Some(mode) = args.mode {
            monitor.set_mode(mode.into());
        }
        drive(&mut monitor, args.frames, &pb, |c: &mut ManualClock| c.step())?
    } else {
        let clock = IntervalClock::from_hz(args.fps);
        let mut monitor = AlignmentMonitor::new(source, sink, clock, &config);
        if let Some(mode) = args.mode {
            monitor.set_mode(mode.into());
        }
        drive(&mut monitor, args.frames, &pb, |c: &mut IntervalClock| c.wait())?
    };

    pb.finish_with_message(report.last_status.to_string());
    print_monitor_report(&report);
    Ok(())
}

/// Run the loop for `ticks` refreshes, calling `advance` to let time pass
/// between pumps.
fn drive<S, C, F>(
    monitor: &mut AlignmentMonitor<S, CliSink, C>,
    ticks: u64,
    pb: &ProgressBar,
    mut advance: F,
) -> Result<MonitorReport>
where
    S: FrameSource,
    C: FrameClock,
    F: FnMut(&mut C),
{
    monitor.start().context("Camera not available")?;

    let mut report = MonitorReport::default();
    while monitor.ticks_processed() < ticks {
        advance(monitor.clock_mut());
        let before = monitor.frames_analyzed();
        if monitor.pump() == 0 || monitor.frames_analyzed() == before {
            pb.set_position(monitor.ticks_processed());
            continue;
        }
        match monitor.status() {
            MonitorStatus::Aligned => report.aligned += 1,
            MonitorStatus::Misaligned => report.misaligned += 1,
            _ => report.waiting += 1,
        }
        pb.set_position(monitor.ticks_processed());
    }

    report.ticks = monitor.ticks_processed();
    report.frames = monitor.frames_analyzed();
    report.last_status = monitor.status().clone();
    monitor.stop();
    report.snapshots = monitor.sink().snapshots_written;

    info!(
        ticks = report.ticks,
        frames = report.frames,
        status_changes = monitor.sink().status_changes,
        "Monitor session finished"
    );
    Ok(report)
}
