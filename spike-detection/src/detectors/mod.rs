pub mod random_detector;
pub mod slope_detector;

use spikefinder_common::{Real, Time, Voltage};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::warn;

pub use random_detector::RandomDetector;
pub use slope_detector::{SlopeDetector, detect};

#[derive(Debug, Error, PartialEq)]
pub enum DetectionError {
    #[error("Can't run - the vectors aren't the same length! time: {time}, voltage: {voltage}")]
    InputLengthMismatch { time: usize, voltage: usize },
    #[error("Sample interval must be positive and finite, got {0}")]
    InvalidSampleInterval(Real),
}

/// Ascending, duplicate-free spike times, or the reason the detector could not run.
pub type DetectionResult = Result<Vec<Time>, DetectionError>;

#[derive(Clone, Copy, Debug, PartialEq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DetectorKind {
    Slope,
    Random,
}

/// Anything which turns a recording into a list of spike times.
pub trait SpikeDetector {
    fn kind(&self) -> DetectorKind;

    /// Detects spikes in the signal given by the paired `time` and `voltage` slices.
    fn detect(&mut self, time: &[Time], voltage: &[Voltage]) -> DetectionResult;
}

/// Both detectors refuse to run on unpaired input.
pub(crate) fn check_lengths(time: &[Time], voltage: &[Voltage]) -> Result<(), DetectionError> {
    if time.len() == voltage.len() {
        Ok(())
    } else {
        let error = DetectionError::InputLengthMismatch {
            time: time.len(),
            voltage: voltage.len(),
        };
        warn!("{error}");
        Err(error)
    }
}
