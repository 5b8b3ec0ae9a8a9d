use super::{DetectionError, DetectionResult, DetectorKind, SpikeDetector, check_lengths};
use crate::{
    peak::resolve_local_peak,
    stats::{first_differences, signed_extreme, standard_deviation},
};
use spikefinder_common::{Real, Time, Voltage};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Half width, in seconds, of the window searched for the true peak of a candidate.
pub const PEAK_SEARCH_HALF_WIDTH: Time = 0.0008;

/// Number of consecutive steep slopes which make up a candidate event.
pub const SLOPE_RUN_LENGTH: usize = 3;

/// The slope threshold is this many standard deviations of the whole signal.
pub const SLOPE_DEVIATIONS: Real = 2.0;

/// Thresholds derived from the whole recording, computed once per call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Thresholds {
    /// Minimum magnitude of a peak, half the magnitude of the largest sample.
    pub(crate) peak: Voltage,
    /// Minimum magnitude of a slope for it to count towards a run.
    pub(crate) slope: Real,
    /// Half width of the peak search window, in samples.
    pub(crate) spread: usize,
}

impl Thresholds {
    pub(crate) fn from_signal(time: &[Time], voltage: &[Voltage]) -> Result<Self, DetectionError> {
        let sample_interval = match (time.first(), time.get(1)) {
            (Some(first), Some(second)) => second - first,
            _ => Real::NAN,
        };
        if !(sample_interval.is_finite() && sample_interval > 0.0) {
            return Err(DetectionError::InvalidSampleInterval(sample_interval));
        }

        Ok(Self {
            peak: signed_extreme(voltage).unwrap_or_default().abs() / 2.0,
            slope: SLOPE_DEVIATIONS * standard_deviation(voltage).unwrap_or_default(),
            spread: (PEAK_SEARCH_HALF_WIDTH / sample_interval).floor() as usize,
        })
    }
}

/// Tracks consecutive slopes whose magnitude strictly exceeds the threshold.
/// Every slope which completes a run of at least `length` reports its own index,
/// so a run of `length + k` slopes reports `k + 1` overlapping candidates.
#[derive(Default, Clone)]
struct SlopeRun {
    threshold: Real,
    length: usize,
    count: usize,
}

impl SlopeRun {
    fn new(threshold: Real, length: usize) -> Self {
        Self {
            threshold,
            length,
            ..Default::default()
        }
    }

    fn signal(&mut self, index: usize, slope: Real) -> Option<usize> {
        if slope.abs() > self.threshold {
            self.count += 1;
            (self.count >= self.length).then_some(index)
        } else {
            self.count = 0;
            None
        }
    }
}

/// Detects action potentials from their steep flanks.
///
/// A candidate is found wherever three consecutive first differences all exceed twice
/// the standard deviation of the signal. The candidate is centred on the last of the
/// three slopes, and the true peak is taken to be the sign-preserving extreme within
/// 0.8 ms either side of it (see [resolve_local_peak]). The peak is kept if its
/// magnitude exceeds half that of the largest sample in the recording.
///
/// The scan does not skip ahead after a candidate, so the same peak is usually found
/// several times; these collapse to a single spike time.
///
/// Returns the spike times in ascending order, or
/// [DetectionError::InputLengthMismatch] if `time` and `voltage` are not paired.
#[instrument(skip_all, level = "debug", fields(samples = voltage.len()))]
pub fn detect(time: &[Time], voltage: &[Voltage]) -> DetectionResult {
    check_lengths(time, voltage)?;
    if voltage.len() <= SLOPE_RUN_LENGTH {
        return Ok(Vec::new());
    }

    let thresholds = Thresholds::from_signal(time, voltage)?;
    debug!(
        peak_threshold = thresholds.peak,
        slope_threshold = thresholds.slope,
        spread = thresholds.spread,
        "Derived thresholds"
    );

    let mut run = SlopeRun::new(thresholds.slope, SLOPE_RUN_LENGTH);
    let peaks: BTreeSet<usize> = first_differences(voltage)
        .into_iter()
        .enumerate()
        .filter_map(|(index, slope)| run.signal(index, slope))
        .filter_map(|centre| resolve_local_peak(voltage, centre, thresholds.spread))
        .filter(|&peak| voltage.get(peak).is_some_and(|v| v.abs() > thresholds.peak))
        .collect();

    debug!("Detected {} spikes", peaks.len());
    Ok(peaks
        .into_iter()
        .filter_map(|index| time.get(index).copied())
        .collect())
}

/// [SpikeDetector] wrapper around [detect].
#[derive(Default, Clone, Debug)]
pub struct SlopeDetector;

impl SpikeDetector for SlopeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Slope
    }

    fn detect(&mut self, time: &[Time], voltage: &[Voltage]) -> DetectionResult {
        detect(time, voltage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn uniform_time(len: usize, sample_interval: Time) -> Vec<Time> {
        (0..len).map(|i| i as Time * sample_interval).collect()
    }

    /// A symmetric spike rising in `rise` equal steps to `height` at `index`.
    fn add_spike(voltage: &mut [Voltage], index: usize, height: Voltage, rise: usize) {
        for step in 0..=rise {
            let value = height * (rise - step) as Voltage / rise as Voltage;
            voltage[index - step] += value;
            if step != 0 {
                voltage[index + step] += value;
            }
        }
    }

    fn noisy_recording(seed: u64) -> (Vec<Time>, Vec<Voltage>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 10.0).unwrap();
        let time = uniform_time(20_000, 3.4375e-5);
        let mut voltage: Vec<Voltage> = (0..time.len()).map(|_| noise.sample(&mut rng)).collect();
        for index in (500..19_500).step_by(1_500) {
            add_spike(&mut voltage, index, 400.0, 4);
        }
        (time, voltage)
    }

    #[test]
    fn mismatched_lengths() {
        let time = uniform_time(10, 0.001);
        let voltage = vec![0.0; 9];
        assert_eq!(
            detect(&time, &voltage),
            Err(DetectionError::InputLengthMismatch {
                time: 10,
                voltage: 9
            })
        );
        assert!(detect(&time[..2], &[]).is_err());
    }

    #[test]
    fn flat_signal_has_no_spikes() {
        for len in [0, 1, 2, 3, 4, 5, 101, 1000] {
            let time = uniform_time(len, 0.001);
            let voltage = vec![0.0; len];
            assert_eq!(detect(&time, &voltage), Ok(vec![]), "len = {len}");
        }
    }

    #[test]
    fn short_signal_is_not_scanned() {
        assert_eq!(detect(&[0.0, 0.0, 0.0], &[0.0, 500.0, 0.0]), Ok(vec![]));
    }

    #[test]
    fn invalid_sample_interval() {
        let time = vec![0.0; 5];
        let voltage = vec![0.0, 100.0, -100.0, 100.0, 0.0];
        assert_eq!(
            detect(&time, &voltage),
            Err(DetectionError::InvalidSampleInterval(0.0))
        );
    }

    #[test]
    fn triangular_pulse() {
        let time = uniform_time(101, 0.001);
        let mut voltage = vec![0.0; 101];
        voltage[49] = 250.0;
        voltage[50] = 500.0;
        voltage[51] = 250.0;
        // The candidate centred on index 51 resolves to 250, which does not exceed the
        // 250 threshold, so only the true peak survives.
        assert_eq!(detect(&time, &voltage), Ok(vec![time[50]]));
    }

    #[test]
    fn overlapping_runs_collapse_to_one_spike() {
        let time = uniform_time(1000, 1e-4);
        let mut voltage = vec![0.0; 1000];
        add_spike(&mut voltage, 500, 400.0, 5);
        assert_eq!(detect(&time, &voltage), Ok(vec![time[500]]));
    }

    #[test]
    fn negative_spikes_are_found_at_their_trough() {
        let time = uniform_time(1000, 1e-4);
        let mut voltage = vec![0.0; 1000];
        add_spike(&mut voltage, 200, -400.0, 5);
        add_spike(&mut voltage, 700, 400.0, 5);
        assert_eq!(detect(&time, &voltage), Ok(vec![time[200], time[700]]));
    }

    #[test]
    fn spike_at_start_with_oversized_window() {
        let time = uniform_time(20, 1e-5);
        let mut voltage = vec![0.0; 20];
        voltage[1] = 500.0;
        voltage[2] = -500.0;
        voltage[3] = 500.0;
        assert_eq!(detect(&time, &voltage), Ok(vec![time[2]]));
    }

    #[test]
    fn spike_at_end_with_oversized_window() {
        let time = uniform_time(20, 1e-5);
        let mut voltage = vec![0.0; 20];
        voltage[16] = 500.0;
        voltage[17] = -500.0;
        voltage[18] = 500.0;
        assert_eq!(detect(&time, &voltage), Ok(vec![time[17]]));
    }

    #[test]
    fn spike_on_last_sample() {
        let time = uniform_time(200, 1e-4);
        let mut voltage = vec![0.0; 200];
        voltage[197] = 300.0;
        voltage[198] = 600.0;
        voltage[199] = 900.0;
        let spikes = detect(&time, &voltage).unwrap();
        assert_eq!(spikes, vec![time[199]]);
    }

    #[test]
    fn noisy_recording_finds_every_spike() {
        let (time, voltage) = noisy_recording(7);
        let spikes = detect(&time, &voltage).unwrap();
        let expected: Vec<_> = (500..19_500).step_by(1_500).map(|i| time[i]).collect();
        assert_eq!(spikes, expected);
    }

    #[test]
    fn deterministic() {
        let (time, voltage) = noisy_recording(11);
        let first = detect(&time, &voltage);
        let second = SlopeDetector.detect(&time, &voltage);
        assert_eq!(first, second);
    }

    #[test]
    fn scaling_up_does_not_lose_spikes() {
        let (time, voltage) = noisy_recording(3);
        let unscaled = detect(&time, &voltage).unwrap().len();
        for k in [1.0, 2.0, 4.0] {
            let scaled: Vec<_> = voltage.iter().map(|v| v * k).collect();
            assert!(detect(&time, &scaled).unwrap().len() >= unscaled, "k = {k}");
        }
    }

    #[test]
    fn slope_run_reports_overlapping_candidates() {
        let mut run = SlopeRun::new(1.0, 3);
        let slopes = [2.0, -2.0, 2.0, 2.0, 1.0, 2.0, 2.0, 2.0];
        let candidates: Vec<_> = slopes
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| run.signal(i, s))
            .collect();
        assert_eq!(candidates, vec![2, 3, 7]);
    }

    #[test]
    fn thresholds() {
        let voltage = [0.0, -6.0, 2.0, 0.0];
        // 0.8 ms spans 8.08 and 7.92 of these intervals
        let thresholds = Thresholds::from_signal(&uniform_time(4, 0.99e-4), &voltage).unwrap();
        assert_eq!(thresholds.peak, 3.0);
        // mean -1, squared deviations 1, 25, 9, 1
        assert_approx_eq!(thresholds.slope, 6.0);
        assert_eq!(thresholds.spread, 8);

        let thresholds = Thresholds::from_signal(&uniform_time(4, 1.01e-4), &voltage).unwrap();
        assert_eq!(thresholds.spread, 7);
    }
}
