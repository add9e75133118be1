//! Tempo from a beat grid

/// Tempo in BPM from the median beat interval
///
/// Returns 0.0 when fewer than two beats (or no positive interval) exist.
pub fn tempo_from_beats(beats: &[f32]) -> f32 {
    let mut intervals: Vec<f32> = beats
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .collect();

    if intervals.is_empty() {
        return 0.0;
    }

    intervals.sort_by(f32::total_cmp);
    let mid = intervals.len() / 2;
    let median = if intervals.len() % 2 == 0 {
        (intervals[mid - 1] + intervals[mid]) / 2.0
    } else {
        intervals[mid]
    };

    60.0 / median
}
