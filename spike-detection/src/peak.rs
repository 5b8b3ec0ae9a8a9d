use crate::stats::signed_extreme;
use spikefinder_common::Real;
use std::ops::Range;

/// The clamped range of samples `center - half_window ..= center + half_window`.
/// Returns `None` if `center` is not a valid index of a signal of length `len`.
pub(crate) fn clamped_window(
    len: usize,
    center: usize,
    half_window: usize,
) -> Option<Range<usize>> {
    (center < len).then(|| {
        let start = center.saturating_sub(half_window);
        let end = center.saturating_add(half_window).saturating_add(1).min(len);
        start..end
    })
}

/// Locates the true peak of a candidate event.
///
/// Searches the window of `half_window` samples either side of `center_index`
/// (clamped at the ends of `voltage`) for its sign-preserving extreme, then returns the
/// index of the sample holding that value which lies nearest to `center_index`.
/// Equidistant candidates resolve to the earlier sample.
///
/// Returns `None` only if `center_index` lies outside `voltage`.
pub fn resolve_local_peak(
    voltage: &[Real],
    center_index: usize,
    half_window: usize,
) -> Option<usize> {
    let window = clamped_window(voltage.len(), center_index, half_window)?;
    let samples = voltage.get(window.clone())?;
    let extreme = signed_extreme(samples)?;

    window
        .zip(samples)
        .filter(|&(_, &value)| value == extreme)
        .map(|(index, _)| index)
        .min_by_key(|&index| index.abs_diff(center_index))
}
