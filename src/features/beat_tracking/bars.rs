//! Bar grid construction
//!
//! Groups consecutive beats into bars of a fixed number of beats.

use crate::analysis::result::Bar;

/// Group a beat grid into bars of `numerator` beats
///
/// A bar is emitted for every window start `i = 0, n, 2n, ...` with
/// `i + n < beats.len()`, so each bar is closed by the downbeat of the next.
/// Should the closing beat ever be missing, the end is synthesized as the last
/// beat plus `end_padding`. Bar numbers start at 1.
///
/// Returns an empty list when `numerator` is 0 or there are no beats.
///
/// # Example
///
/// ```
/// use chordsketch::features::beat_tracking::bars::bars_from_beats;
///
/// let beats = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
/// let bars = bars_from_beats(&beats, 4, 2.0);
/// assert_eq!(bars.len(), 1);
/// assert_eq!((bars[0].index, bars[0].start, bars[0].end), (1, 0.0, 2.0));
/// ```
pub fn bars_from_beats(beats: &[f32], numerator: u32, end_padding: f32) -> Vec<Bar> {
    let n = numerator as usize;
    let Some(&last_beat) = beats.last() else {
        return vec![];
    };
    if n == 0 {
        log::warn!("Cannot build bars with numerator 0");
        return vec![];
    }

    log::debug!("Building bars from {} beats, {} beats per bar", beats.len(), n);

    (0..beats.len().saturating_sub(n))
        .step_by(n)
        .map(|i| Bar {
            index: (i / n + 1) as u32,
            start: beats[i],
            end: beats.get(i + n).copied().unwrap_or(last_beat + end_padding),
        })
        .collect()
}
