//! Whole-signal statistics from which the detector derives its thresholds.
use itertools::{Itertools, MinMaxResult};
use spikefinder_common::Real;

/// Returns the sample of greatest magnitude, keeping its sign.
///
/// The maximum is chosen only if its magnitude strictly exceeds that of the minimum,
/// so a symmetric signal resolves to its (negative) minimum.
/// Returns `None` for an empty slice.
pub fn signed_extreme(values: &[Real]) -> Option<Real> {
    match values.iter().copied().minmax_by(Real::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some(value),
        MinMaxResult::MinMax(min, max) => Some(if max.abs() > min.abs() { max } else { min }),
    }
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn standard_deviation(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as Real;
    let mean = values.iter().sum::<Real>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<Real>() / n;
    Some(variance.sqrt())
}

/// First differences `values[i + 1] - values[i]`.
pub fn first_differences(values: &[Real]) -> Vec<Real> {
    values
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next - prev)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn extreme_of_empty_is_none() {
        assert_eq!(signed_extreme(&[]), None);
    }

    #[test]
    fn extreme_keeps_sign() {
        assert_eq!(signed_extreme(&[1.0, -5.0, 3.0]), Some(-5.0));
        assert_eq!(signed_extreme(&[1.0, -2.0, 3.0]), Some(3.0));
        assert_eq!(signed_extreme(&[7.0]), Some(7.0));
    }

    #[test]
    fn extreme_tie_prefers_minimum() {
        assert_eq!(signed_extreme(&[4.0, 0.0, -4.0]), Some(-4.0));
    }

    #[test]
    fn standard_deviation_is_population() {
        assert_eq!(standard_deviation(&[]), None);
        assert_approx_eq!(
            standard_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap_or_default(),
            2.0
        );
        assert_eq!(standard_deviation(&[0.0; 16]), Some(0.0));
    }

    #[test]
    fn differences() {
        assert_eq!(first_differences(&[1.0, 3.0, 2.0, 2.0]), vec![2.0, -1.0, 0.0]);
        assert!(first_differences(&[1.0]).is_empty());
        assert!(first_differences(&[]).is_empty());
    }
}
