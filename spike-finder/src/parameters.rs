use anyhow::{Error, anyhow};
use clap::{Parser, Subcommand};
use spike_detection::{RandomDetector, SlopeDetector, SpikeDetector};
use std::str::FromStr;

/// Width and height, in pixels, of the saved plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlotSize {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl FromStr for PlotSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split(',').collect::<Vec<_>>().as_slice() {
            [width, height] => Ok(PlotSize {
                width: u32::from_str(width.trim())?,
                height: u32::from_str(height.trim())?,
            }),
            _ => Err(anyhow!(
                "Incorrect number of parameters in plot size, expected pattern '*,*', got '{s}'"
            )),
        }
    }
}

impl From<PlotSize> for (u32, u32) {
    fn from(size: PlotSize) -> Self {
        (size.width, size.height)
    }
}

#[derive(Default, Debug, Clone, Parser)]
pub(crate) struct RandomParameters {
    /// Seed for the random number generator, for reproducible guesses
    #[clap(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Default)]
pub(crate) enum Mode {
    #[default]
    #[clap(
        about = "Detects spikes from runs of steep slopes, locating each peak within 0.8 ms. This is the default."
    )]
    Slope,
    #[clap(
        about = "Reports randomly chosen sample times, ignoring the signal. A baseline for scoring."
    )]
    Random(RandomParameters),
}

impl Mode {
    pub(crate) fn detector(&self) -> Box<dyn SpikeDetector> {
        match self {
            Mode::Slope => Box::new(SlopeDetector),
            Mode::Random(RandomParameters { seed: Some(seed) }) => {
                Box::new(RandomDetector::from_seed(*seed))
            }
            Mode::Random(RandomParameters { seed: None }) => Box::new(RandomDetector::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spike_detection::DetectorKind;

    #[test]
    fn plot_size() {
        assert_eq!(
            PlotSize::from_str("640, 480").unwrap(),
            PlotSize {
                width: 640,
                height: 480
            }
        );
        assert!(PlotSize::from_str("640").is_err());
        assert!(PlotSize::from_str("640,480,3").is_err());
        assert!(PlotSize::from_str("640,-1").is_err());
    }

    #[test]
    fn detector_for_mode() {
        assert_eq!(Mode::default().detector().kind(), DetectorKind::Slope);
        assert_eq!(
            Mode::Random(RandomParameters { seed: Some(1) })
                .detector()
                .kind(),
            DetectorKind::Random
        );
    }
}
