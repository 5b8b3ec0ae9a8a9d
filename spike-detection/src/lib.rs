//! This crate provides tools for finding action potentials (spikes) in an
//! extracellular voltage recording, and for scoring the result against known spike times.
//!
//! A recording takes the form of two equal length slices, `time` (in seconds) and
//! `voltage` (in microvolts). Typical usage of this crate may look like:
//! ```rust
//! use spike_detection::{detect, score, JITTER};
//!
//! let time: Vec<f64> = (0..101).map(|i| i as f64 * 0.001).collect();
//! let mut voltage = vec![0.0; 101];
//! voltage[49] = 250.0;
//! voltage[50] = 500.0;
//! voltage[51] = 250.0;
//!
//! let spikes = detect(&time, &voltage).expect("time and voltage are paired");
//! assert_eq!(spikes, vec![time[50]]);
//!
//! let result = score(&spikes, &[0.0, time[50]], JITTER).expect("answers span a non-zero time");
//! assert_eq!(result.matched, 1);
//! ```

pub mod detectors;
pub mod peak;
pub mod scoring;
pub mod stats;
pub mod waveform;

pub use detectors::{
    DetectionError, DetectionResult, DetectorKind, RandomDetector, SlopeDetector, SpikeDetector,
    detect,
};
pub use peak::resolve_local_peak;
pub use scoring::{DetectorScore, Evaluation, JITTER, ScoringError, score};
pub use waveform::{WAVEFORM_HALF_WIDTH, WaveformError, Waveforms, extract_waveforms};
