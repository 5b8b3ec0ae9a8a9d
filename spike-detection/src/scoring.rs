//! Compares detected spike times against known answers.
use spikefinder_common::{Real, Time};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::instrument;

/// Default tolerance, in seconds, either side of a true spike within which a detection counts.
pub const JITTER: Time = 0.0025;

/// A detector passes if strictly more than this percentage of true spikes are found...
pub const PERCENT_TRUE_SPIKES_PASS: Real = 90.0;

/// ...and it reports strictly fewer than this many excess spikes per second.
pub const FALSE_SPIKE_RATE_PASS: Real = 2.5;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Cannot score against an empty set of true spike times")]
    EmptyGroundTruth,
    #[error("True spike times span zero seconds, so no false spike rate can be computed")]
    ZeroDuration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Evaluation {
    #[strum(to_string = "PASS")]
    Pass,
    #[strum(to_string = "FAIL")]
    Fail,
}

impl Evaluation {
    fn from_test(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectorScore {
    /// Percentage of true spikes which were matched by a detection.
    pub percent_true_spikes: Real,
    /// Excess detections per second of recording, net of missed spikes.
    pub false_spike_rate: Real,
    /// Number of true spikes matched.
    pub matched: usize,
    /// Number of true spikes.
    pub actual: usize,
    /// Number of distinct detected times.
    pub detected: usize,
    /// Distinct detections which matched no true spike.
    pub false_positives: usize,
}

impl DetectorScore {
    pub fn percent_true_spikes_evaluation(&self) -> Evaluation {
        Evaluation::from_test(self.percent_true_spikes > PERCENT_TRUE_SPIKES_PASS)
    }

    pub fn false_spike_rate_evaluation(&self) -> Evaluation {
        Evaluation::from_test(self.false_spike_rate < FALSE_SPIKE_RATE_PASS)
    }

    pub fn overall_evaluation(&self) -> Evaluation {
        Evaluation::from_test(
            self.percent_true_spikes_evaluation() == Evaluation::Pass
                && self.false_spike_rate_evaluation() == Evaluation::Pass,
        )
    }
}

impl Display for DetectorScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Action Potential Detector Performance:")?;
        writeln!(
            f,
            "     Correct number of action potentials = {}",
            self.actual
        )?;
        writeln!(
            f,
            "     {}: Percent True Spikes = {:.6}",
            self.percent_true_spikes_evaluation(),
            self.percent_true_spikes
        )?;
        writeln!(
            f,
            "     {}: False Spike Rate = {:.6} spikes/s",
            self.false_spike_rate_evaluation(),
            self.false_spike_rate
        )?;
        writeln!(f)?;
        write!(f, "Overall Evaluation: {}", self.overall_evaluation())
    }
}

fn sorted(times: &[Time]) -> Vec<Time> {
    let mut times = times.to_vec();
    times.sort_by(Time::total_cmp);
    times
}

/// Scores `detected` spike times against the `actual` ones.
///
/// Each true spike claims the earliest unclaimed detection lying within `jitter` of it.
/// Repeated detection times count once when matching, but the false spike rate is
/// computed from the number of detections as given, over the span of the true spikes.
#[instrument(skip_all, level = "debug", fields(detected = detected.len(), actual = actual.len()))]
pub fn score(
    detected: &[Time],
    actual: &[Time],
    jitter: Time,
) -> Result<DetectorScore, ScoringError> {
    let actual_sorted = sorted(actual);
    let (first, last) = match (actual_sorted.first(), actual_sorted.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ScoringError::EmptyGroundTruth),
    };
    let duration = last - first;
    if duration <= 0.0 {
        return Err(ScoringError::ZeroDuration);
    }

    let mut distinct = sorted(detected);
    distinct.dedup();

    let mut claimed = vec![false; distinct.len()];
    let mut matched = 0;
    for spike in &actual_sorted {
        let start = distinct.partition_point(|&time| time < spike - jitter);
        let candidate = (start..distinct.len())
            .take_while(|&index| {
                distinct
                    .get(index)
                    .is_some_and(|&time| time <= spike + jitter)
            })
            .find(|&index| claimed.get(index).is_some_and(|&taken| !taken));
        if let Some(flag) = candidate.and_then(|index| claimed.get_mut(index)) {
            *flag = true;
            matched += 1;
        }
    }

    Ok(DetectorScore {
        percent_true_spikes: 100.0 * matched as Real / actual.len() as Real,
        false_spike_rate: (detected.len() as Real - actual.len() as Real) / duration,
        matched,
        actual: actual.len(),
        detected: distinct.len(),
        false_positives: distinct.len() - matched,
    })
}
