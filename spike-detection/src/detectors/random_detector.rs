use super::{DetectionResult, DetectorKind, SpikeDetector, check_lengths};
use rand::{Rng, SeedableRng, rngs::StdRng};
use spikefinder_common::{Time, Voltage};
use tracing::{debug, instrument};

/// Roughly one spike is guessed per this many samples, at most.
const SAMPLES_PER_GUESS: usize = 10_000;

/// A deliberately poor detector which ignores the voltage entirely and reports
/// randomly chosen sample times. Useful as a baseline for the scorer.
#[derive(Clone, Debug)]
pub struct RandomDetector {
    rng: StdRng,
}

impl RandomDetector {
    /// A detector seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible detector.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SpikeDetector for RandomDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Random
    }

    #[instrument(skip_all, level = "debug", fields(samples = voltage.len()))]
    fn detect(&mut self, time: &[Time], voltage: &[Voltage]) -> DetectionResult {
        check_lengths(time, voltage)?;
        if time.is_empty() {
            return Ok(Vec::new());
        }

        let num_guesses = self.rng.random_range(0..time.len()) / SAMPLES_PER_GUESS;
        debug!("Guessing {num_guesses} spikes");

        let mut spikes: Vec<Time> = (0..num_guesses)
            .filter_map(|_| time.get(self.rng.random_range(0..time.len())).copied())
            .collect();
        spikes.sort_by(Time::total_cmp);
        spikes.dedup();
        Ok(spikes)
    }
}
