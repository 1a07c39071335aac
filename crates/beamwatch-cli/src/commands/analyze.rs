use std::path::PathBuf;

use anyhow::{Context, Result};
use beamwatch_core::analyze_frame;
use beamwatch_core::classify::Targets;
use beamwatch_core::config::MonitorConfig;
use beamwatch_core::frame::{FrameBuffer, FrameView, PixelLayout};
use beamwatch_core::heatmap::render_heatmap;
use beamwatch_core::overlay::build_overlay;
use clap::Args;

use super::ModeArg;
use crate::render::composite;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input image (PNG, JPEG, TIFF, BMP)
    pub file: PathBuf,

    /// TOML config file for thresholds and overlay style
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Aligned-target mode, overriding the config
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Save the heatmap with the overlay drawn on it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => MonitorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.alignment.mode = mode.into();
    }

    let img = image::open(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?
        .to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);
    let frame = FrameView::new(w, h, PixelLayout::Rgba, img.as_raw())?;

    let mut buffer = FrameBuffer::new(w, h);
    let analysis = analyze_frame(&frame, &config.alignment, &mut buffer);
    let peaks = analysis.extraction.peaks;
    let c = analysis.classification;

    println!("{}: {}x{}", args.file.display(), w, h);
    println!(
        "  Primary peak:    ({:.0}, {:.0})  value {:.1}",
        analysis.extraction.primary_position().x,
        analysis.extraction.primary_position().y,
        peaks.primary.value
    );
    println!(
        "  Secondary peak:  ({:.0}, {:.0})  value {:.1}",
        analysis.extraction.secondary_position().x,
        analysis.extraction.secondary_position().y,
        peaks.secondary.value
    );
    match analysis.centroid {
        Some(p) => println!("  Centroid:        ({:.2}, {:.2})", p.x, p.y),
        None => println!("  Centroid:        none (no signal)"),
    }
    println!("  Peak ratio:      {:.3}", c.ratio);
    println!("  Separation:      {:.1} px", c.separation);
    println!("  State:           {}", c.state);
    match c.targets {
        Targets::None => {}
        Targets::Single(p) => println!("  Target:          ({:.2}, {:.2})", p.x, p.y),
        Targets::Pair(a, b) => println!(
            "  Targets:         ({:.0}, {:.0}) and ({:.0}, {:.0})",
            a.x, a.y, b.x, b.y
        ),
    }

    if let Some(ref path) = args.output {
        render_heatmap(&buffer.intensity, &mut buffer.heatmap);
        let mut overlay = Vec::new();
        build_overlay(&c, 0.0, &config.overlay, &mut overlay);
        composite(&buffer.heatmap, &overlay)
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Heatmap saved to {}", path.display());
    }

    Ok(())
}
