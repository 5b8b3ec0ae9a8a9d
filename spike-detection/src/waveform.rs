//! Aligned snippets of the signal around each detected spike.
use spikefinder_common::{Real, Time, Voltage};
use thiserror::Error;
use tracing::warn;

/// Half width, in seconds, of the snippet taken around each spike for display.
pub const WAVEFORM_HALF_WIDTH: Time = 0.003;

#[derive(Debug, Error, PartialEq)]
pub enum WaveformError {
    #[error("Cannot cut waveforms from unpaired signal, time: {time}, voltage: {voltage}")]
    InputLengthMismatch { time: usize, voltage: usize },
    #[error("Cannot cut waveforms, sample interval must be positive and finite, got {0}")]
    InvalidSampleInterval(Real),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveforms {
    /// Time of each snippet sample relative to the spike, shared by every snippet.
    pub offsets: Vec<Time>,
    /// One snippet per spike, each the same length as `offsets`.
    pub snippets: Vec<Vec<Voltage>>,
}

/// Index of the sample whose time is nearest to `target`, `time` being ascending.
pub fn nearest_index(time: &[Time], target: Time) -> Option<usize> {
    let after = time.partition_point(|&t| t < target);
    let before = after.checked_sub(1);
    match (before, time.get(after)) {
        (Some(before), Some(&next)) => {
            let prev = *time.get(before)?;
            Some(if target - prev <= next - target { before } else { after })
        }
        (Some(before), None) => Some(before),
        (None, Some(_)) => Some(after),
        (None, None) => None,
    }
}

/// `num` evenly spaced values from `start` to `stop` inclusive.
fn linspace(start: Real, stop: Real, num: usize) -> Vec<Real> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as Real;
            (0..num).map(|i| start + step * i as Real).collect()
        }
    }
}

/// Cuts `half_width` seconds either side of each spike out of `voltage`.
///
/// Each snippet holds `2 * (n / 2)` samples where `n = floor(2 * half_width / dt)`,
/// starting `n / 2` samples before the sample nearest the spike time.
/// Samples which fall outside the recording are zero.
///
/// `n / 2` is capped at the length of the recording, in which case the offsets
/// span only that many samples either side of the spike.
pub fn extract_waveforms(
    time: &[Time],
    voltage: &[Voltage],
    spikes: &[Time],
    half_width: Time,
) -> Result<Waveforms, WaveformError> {
    if time.len() != voltage.len() {
        let error = WaveformError::InputLengthMismatch {
            time: time.len(),
            voltage: voltage.len(),
        };
        warn!("{error}");
        return Err(error);
    }
    let sample_interval = match (time.first(), time.get(1)) {
        (Some(first), Some(second)) => second - first,
        _ => return Ok(Waveforms::default()),
    };
    if !(sample_interval.is_finite() && sample_interval > 0.0) {
        return Err(WaveformError::InvalidSampleInterval(sample_interval));
    }

    let requested = ((2.0 * half_width / sample_interval).floor() as usize) / 2;
    let half = requested.min(voltage.len());
    let extent = if half < requested {
        half as Real * sample_interval
    } else {
        half_width
    };
    let snippets = spikes
        .iter()
        .filter_map(|&spike| nearest_index(time, spike))
        .map(|peak| {
            (0..2 * half)
                .map(|offset| {
                    (peak + offset)
                        .checked_sub(half)
                        .and_then(|index| voltage.get(index))
                        .copied()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(Waveforms {
        offsets: linspace(-extent, extent, 2 * half),
        snippets,
    })
}
