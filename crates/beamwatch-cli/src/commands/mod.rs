pub mod analyze;
pub mod config;
pub mod monitor;

use clap::ValueEnum;
use beamwatch_core::config::TargetMode;

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Brightest,
    Centroid,
}

impl From<ModeArg> for TargetMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Brightest => TargetMode::Brightest,
            ModeArg::Centroid => TargetMode::Centroid,
        }
    }
}
