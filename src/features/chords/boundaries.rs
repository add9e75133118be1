//! Chord boundary quantization
//!
//! Snaps chord boundaries onto nearby beats and repairs whatever that breaks.
//! Each segment's start depends on the repaired end of the one before it, so
//! the segments are processed as a single left-to-right fold.

use crate::analysis::result::ChordSegment;
use crate::config::AnalysisConfig;

/// Snaps chord boundaries onto the beat grid
#[derive(Debug, Clone, Copy)]
pub struct BoundaryQuantizer {
    /// Maximum snapping distance in seconds; negative disables snapping
    pub tolerance: f32,
    /// Length given to a segment whose end collapsed onto its start
    pub min_duration: f32,
}

impl BoundaryQuantizer {
    /// Create a quantizer
    pub fn new(tolerance: f32, min_duration: f32) -> Self {
        Self {
            tolerance,
            min_duration,
        }
    }

    /// Create a quantizer from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.snap_tolerance, config.min_segment_duration)
    }

    /// Quantize a chord sequence
    ///
    /// For every segment, in order:
    /// 1. both boundaries are clamped into `[0, duration]`
    /// 2. each boundary within `tolerance` of its nearest beat moves onto it,
    ///    and is clamped again
    /// 3. an end at or before the start becomes `start + min_duration`, or the
    ///    beat that end is snapped to if that still lies after the start
    /// 4. the start is raised to the previous segment's end (and step 3 reapplied)
    ///
    /// Ends never exceed `duration`; a segment left with no room before
    /// `duration` is dropped. The output is ordered, non-overlapping, has
    /// `end > start` everywhere, and quantizing it again returns it unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use chordsketch::analysis::result::{ChordLabel, ChordSegment};
    /// use chordsketch::features::chords::BoundaryQuantizer;
    ///
    /// let chords = vec![
    ///     ChordSegment::new(0.03, 0.52, ChordLabel::NoChord),
    ///     ChordSegment::new(0.45, 1.2, ChordLabel::NoChord),
    /// ];
    /// let snapped = BoundaryQuantizer::new(0.08, 1e-3).quantize(&chords, &[0.0, 0.5, 1.0], 2.0);
    /// assert_eq!((snapped[0].start, snapped[0].end), (0.0, 0.5));
    /// assert_eq!((snapped[1].start, snapped[1].end), (0.5, 1.2));
    /// ```
    pub fn quantize(&self, chords: &[ChordSegment], beats: &[f32], duration: f32) -> Vec<ChordSegment> {
        if chords.is_empty() {
            return vec![];
        }

        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            log::warn!("Invalid quantization duration {}, no chords kept", duration);
            return vec![];
        };

        let mut grid: Vec<f32> = beats.iter().copied().filter(|b| b.is_finite()).collect();
        grid.sort_by(f32::total_cmp);

        if self.tolerance < 0.0 {
            log::warn!("Negative snap tolerance {}, boundaries left unsnapped", self.tolerance);
            grid.clear();
        }

        log::debug!(
            "Quantizing {} chord segments to {} beats (tolerance {:.3}s, duration {:.2}s)",
            chords.len(),
            grid.len(),
            self.tolerance,
            duration
        );

        let mut out = Vec::with_capacity(chords.len());
        let mut last_end = 0.0f32;
        for chord in chords {
            let mut start = self.snap_within(chord.start, &grid, duration);
            let mut end = self.snap_within(chord.end, &grid, duration);
            if end <= start {
                end = self.reopen(start, &grid, duration);
            }

            start = start.max(last_end);
            if end <= start {
                end = self.reopen(start, &grid, duration);
            }
            end = end.min(duration);

            if end <= start {
                log::trace!(
                    "Dropping {} segment at {:.3}s: no room before {:.3}s",
                    chord.label,
                    start,
                    duration
                );
                continue;
            }

            out.push(ChordSegment::new(start, end, chord.label));
            last_end = end;
        }

        out
    }

    /// End for a segment whose end collapsed onto `start`
    ///
    /// `start + min_duration`, unless that lands within tolerance of a later
    /// beat, in which case the end goes onto the beat.
    fn reopen(&self, start: f32, grid: &[f32], duration: f32) -> f32 {
        let nudged = start + self.min_duration;
        let snapped = self.snap_within(nudged, grid, duration);
        if snapped > start {
            snapped
        } else {
            nudged
        }
    }

    /// Clamp into `[0, duration]`, snap, clamp again
    fn snap_within(&self, t: f32, grid: &[f32], duration: f32) -> f32 {
        let t = t.clamp(0.0, duration);
        let snapped = match nearest_beat(grid, t) {
            Some(beat) if (beat - t).abs() <= self.tolerance => beat,
            _ => t,
        };
        snapped.clamp(0.0, duration)
    }
}

impl Default for BoundaryQuantizer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Beat closest to `t` in a sorted grid; the earlier beat wins a tie
fn nearest_beat(grid: &[f32], t: f32) -> Option<f32> {
    let idx = grid.partition_point(|&b| b < t);
    let before = idx.checked_sub(1).map(|i| grid[i]);
    let after = grid.get(idx).copied();
    match (before, after) {
        (Some(b), Some(a)) => Some(if t - b <= a - t { b } else { a }),
        (b, a) => b.or(a),
    }
}

/// Merge neighbouring segments that touch and carry the same label
pub fn merge_repeated_labels(chords: &[ChordSegment]) -> Vec<ChordSegment> {
    let mut out: Vec<ChordSegment> = Vec::with_capacity(chords.len());
    for chord in chords {
        match out.last_mut() {
            Some(prev) if prev.label == chord.label && prev.end == chord.start => {
                prev.end = chord.end;
            }
            _ => out.push(*chord),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::{ChordLabel, ChordQuality};

    fn seg(start: f32, end: f32) -> ChordSegment {
        ChordSegment::new(start, end, ChordLabel::chord(0, ChordQuality::Major))
    }

    fn assert_well_formed(chords: &[ChordSegment]) {
        for c in chords {
            assert!(c.end > c.start, "degenerate segment {:?}", c);
        }
        for pair in chords.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap {:?}", pair);
        }
    }

    #[test]
    fn test_snaps_within_tolerance_only() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let out = q.quantize(&[seg(0.05, 0.9)], &[0.0, 0.5, 1.0], 2.0);
        assert_eq!((out[0].start, out[0].end), (0.0, 0.9));

        let out = q.quantize(&[seg(0.1, 0.95)], &[0.0, 0.5, 1.0], 2.0);
        assert_eq!((out[0].start, out[0].end), (0.1, 1.0));
    }

    #[test]
    fn test_clamps_to_duration() {
        let q = BoundaryQuantizer::default();
        let out = q.quantize(&[seg(-0.5, 3.5)], &[], 3.0);
        assert_eq!((out[0].start, out[0].end), (0.0, 3.0));
    }

    #[test]
    fn test_collapsed_segment_gets_min_duration() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        // Both boundaries snap onto the beat at 1.0
        let out = q.quantize(&[seg(0.97, 1.03)], &[0.0, 1.0, 2.0], 3.0);
        assert_eq!(out[0].start, 1.0);
        assert!((out[0].end - 1.001).abs() < 1e-6);
    }

    #[test]
    fn test_overlap_is_repaired() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let out = q.quantize(&[seg(0.0, 1.4), seg(1.2, 2.0), seg(1.3, 1.35)], &[], 3.0);
        assert_eq!(out[1].start, 1.4);
        assert_eq!(out[2].start, 2.0);
        assert_well_formed(&out);
    }

    #[test]
    fn test_segment_without_room_is_dropped() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let out = q.quantize(&[seg(0.0, 2.0), seg(2.0, 2.5)], &[], 2.0);
        assert_eq!(out.len(), 1);
        assert_well_formed(&out);
    }

    #[test]
    fn test_negative_tolerance_disables_snapping() {
        let q = BoundaryQuantizer::new(-1.0, 1e-3);
        let out = q.quantize(&[seg(0.01, 0.49)], &[0.0, 0.5], 1.0);
        assert_eq!((out[0].start, out[0].end), (0.01, 0.49));
    }

    #[test]
    fn test_idempotent() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let beats = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        let chords = vec![
            seg(0.02, 0.55),
            seg(0.47, 0.49),
            seg(0.6, 1.07),
            seg(1.0, 1.0),
            seg(1.3, 2.2),
            seg(2.45, 2.9),
        ];
        let once = q.quantize(&chords, &beats, 2.8);
        let twice = q.quantize(&once, &beats, 2.8);
        assert_well_formed(&once);
        assert_eq!(once, twice);

        // The raised start leaves an end that falls just inside the tolerance of 1.0
        let chords = vec![seg(0.0, 0.9195), seg(0.5, 0.6)];
        let once = q.quantize(&chords, &[0.0, 1.0], 2.0);
        let twice = q.quantize(&once, &[0.0, 1.0], 2.0);
        assert_well_formed(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_repaired_end_snaps_to_beat() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let out = q.quantize(&[seg(0.0, 0.9195), seg(0.5, 0.6)], &[0.0, 1.0], 2.0);
        assert_eq!(out.len(), 2);
        assert_eq!((out[1].start, out[1].end), (0.9195, 1.0));

        // A repaired end that snaps back onto the start keeps the minimum length
        let out = q.quantize(&[seg(0.0, 1.0), seg(0.5, 0.6)], &[0.0, 1.0], 2.0);
        assert_eq!(out[1].start, 1.0);
        assert!((out[1].end - 1.001).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_end_is_snapped_once() {
        let q = BoundaryQuantizer::new(0.08, 1e-3);
        let beats = [0.0, 0.5, 0.97, 1.5];
        let once = q.quantize(&[seg(0.0, 1.3)], &beats, 1.0);
        assert_eq!((once[0].start, once[0].end), (0.0, 0.97));
        assert_eq!(q.quantize(&once, &beats, 1.0), once);
    }

    #[test]
    fn test_nearest_beat() {
        let grid = [0.0, 1.0, 2.0];
        assert_eq!(nearest_beat(&grid, 0.4), Some(0.0));
        assert_eq!(nearest_beat(&grid, 0.5), Some(0.0));
        assert_eq!(nearest_beat(&grid, 0.6), Some(1.0));
        assert_eq!(nearest_beat(&grid, 7.0), Some(2.0));
        assert_eq!(nearest_beat(&grid, -3.0), Some(0.0));
        assert_eq!(nearest_beat(&[], 1.0), None);
    }

    #[test]
    fn test_merge_repeated_labels() {
        let minor = ChordLabel::chord(9, ChordQuality::Minor);
        let chords = vec![
            seg(0.0, 0.5),
            seg(0.5, 1.0),
            ChordSegment::new(1.0, 1.5, minor),
            seg(1.5, 2.0),
            seg(2.1, 2.5),
        ];
        let merged = merge_repeated_labels(&chords);
        assert_eq!(merged.len(), 4);
        assert_eq!((merged[0].start, merged[0].end), (0.0, 1.0));
        assert_eq!(merged[1].label, minor);
    }
}
