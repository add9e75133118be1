//! Note segmentation of a pitch contour
//!
//! Walks the contour frame by frame with a two-state machine:
//!
//! | state  | frame                      | action                                   |
//! |--------|----------------------------|------------------------------------------|
//! | Silent | unvoiced / undefined f0    | stay silent                              |
//! | Silent | voiced                     | open a note at this frame                |
//! | InNote | unvoiced / undefined f0    | close the note at this frame             |
//! | InNote | voiced, same rounded pitch | continue                                 |
//! | InNote | voiced, new rounded pitch  | close at this frame, open a new note     |
//!
//! A note still open after the last frame is closed at the last frame's time.
//! Silence always closes a note, even if the next voiced frame has the same
//! pitch.

use crate::analysis::result::MelodyNote;
use crate::error::AnalysisError;
use crate::io::PitchContour;

/// MIDI note number of A4
const A4_MIDI: f32 = 69.0;

/// Frequency of A4 in Hz
const A4_HZ: f32 = 440.0;

/// Fractional MIDI note number of a frequency
pub fn hz_to_midi(freq: f32) -> f32 {
    A4_MIDI + 12.0 * (freq / A4_HZ).log2()
}

/// Frequency of a (fractional) MIDI note number
pub fn midi_to_hz(midi: f32) -> f32 {
    A4_HZ * 2.0f32.powf((midi - A4_MIDI) / 12.0)
}

#[derive(Debug, Clone, Copy)]
enum State {
    Silent,
    InNote { start: f32, midi: u8 },
}

/// Segment a pitch contour into note events
///
/// # Errors
///
/// Returns `AnalysisError::UpstreamFeature` if the contour tracks differ in
/// length or its frame times are not ordered.
///
/// # Example
///
/// ```
/// use chordsketch::features::melody::{midi_to_hz, segment_melody};
/// use chordsketch::io::PitchContour;
///
/// let contour = PitchContour {
///     times: vec![0.0, 0.1, 0.2, 0.3],
///     frequencies: [60.0, 60.0, 62.0, 62.0].iter().map(|&m| Some(midi_to_hz(m))).collect(),
///     voiced: vec![true; 4],
/// };
/// let notes = segment_melody(&contour)?;
/// assert_eq!(notes.len(), 2);
/// assert_eq!((notes[0].start, notes[0].end, notes[0].midi), (0.0, 0.2, 60));
/// assert_eq!((notes[1].start, notes[1].end, notes[1].midi), (0.2, 0.3, 62));
/// # Ok::<(), chordsketch::AnalysisError>(())
/// ```
pub fn segment_melody(contour: &PitchContour) -> Result<Vec<MelodyNote>, AnalysisError> {
    contour.validate()?;

    log::debug!("Segmenting melody from {} contour frames", contour.times.len());

    let mut notes = Vec::new();
    let mut state = State::Silent;

    let frames = contour
        .times
        .iter()
        .zip(contour.frequencies.iter())
        .zip(contour.voiced.iter());

    for ((&time, &freq), &voiced) in frames {
        let pitch = if voiced { freq.and_then(frame_pitch) } else { None };

        state = match (state, pitch) {
            (State::Silent, None) => State::Silent,
            (State::Silent, Some(midi)) => State::InNote { start: time, midi },
            (State::InNote { start, midi }, None) => {
                close_note(&mut notes, start, time, midi);
                State::Silent
            }
            (State::InNote { start, midi }, Some(next)) if next == midi => {
                State::InNote { start, midi }
            }
            (State::InNote { start, midi }, Some(next)) => {
                close_note(&mut notes, start, time, midi);
                State::InNote {
                    start: time,
                    midi: next,
                }
            }
        };
    }

    if let (State::InNote { start, midi }, Some(&last)) = (state, contour.times.last()) {
        close_note(&mut notes, start, last, midi);
    }

    log::debug!("Segmented {} melody notes", notes.len());
    Ok(notes)
}

/// Rounded MIDI pitch of a voiced frame, `None` for an unusable frequency
fn frame_pitch(freq: f32) -> Option<u8> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    Some(hz_to_midi(freq).round_ties_even().clamp(0.0, 127.0) as u8)
}

fn close_note(notes: &mut Vec<MelodyNote>, start: f32, end: f32, midi: u8) {
    // A note opened on the final frame has no length
    if end > start {
        notes.push(MelodyNote::new(start, end, midi));
    } else {
        log::trace!("Skipping zero-length note {} at {:.3}s", midi, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(times: &[f32], midis: &[Option<f32>]) -> PitchContour {
        PitchContour {
            times: times.to_vec(),
            frequencies: midis.iter().map(|m| m.map(midi_to_hz)).collect(),
            voiced: midis.iter().map(|m| m.is_some()).collect(),
        }
    }

    #[test]
    fn test_pitch_change_splits_note() {
        let c = contour(
            &[0.0, 0.1, 0.2, 0.3],
            &[Some(60.0), Some(60.0), Some(62.0), Some(62.0)],
        );
        let notes = segment_melody(&c).unwrap();
        assert_eq!(
            notes,
            vec![MelodyNote::new(0.0, 0.2, 60), MelodyNote::new(0.2, 0.3, 62)]
        );
    }

    #[test]
    fn test_silence_is_never_merged() {
        let c = contour(
            &[0.0, 0.1, 0.2, 0.3],
            &[Some(60.0), None, Some(60.0), Some(60.0)],
        );
        let notes = segment_melody(&c).unwrap();
        assert_eq!(
            notes,
            vec![MelodyNote::new(0.0, 0.1, 60), MelodyNote::new(0.2, 0.3, 60)]
        );
    }

    #[test]
    fn test_small_deviation_stays_in_note() {
        let c = contour(&[0.0, 0.1, 0.2], &[Some(60.0), Some(60.3), Some(59.8)]);
        let notes = segment_melody(&c).unwrap();
        assert_eq!(notes, vec![MelodyNote::new(0.0, 0.2, 60)]);
    }

    #[test]
    fn test_voiced_flag_without_frequency_is_silence() {
        let c = PitchContour {
            times: vec![0.0, 0.1, 0.2],
            frequencies: vec![Some(midi_to_hz(64.0)), None, Some(f32::NAN)],
            voiced: vec![true, true, true],
        };
        let notes = segment_melody(&c).unwrap();
        assert_eq!(notes, vec![MelodyNote::new(0.0, 0.1, 64)]);
    }

    #[test]
    fn test_unvoiced_frequency_is_ignored() {
        let c = PitchContour {
            times: vec![0.0, 0.1, 0.2],
            frequencies: vec![Some(440.0); 3],
            voiced: vec![false, false, false],
        };
        assert!(segment_melody(&c).unwrap().is_empty());
    }

    #[test]
    fn test_note_opened_on_last_frame_is_dropped() {
        let c = contour(&[0.0, 0.1, 0.2], &[Some(60.0), Some(60.0), Some(67.0)]);
        let notes = segment_melody(&c).unwrap();
        assert_eq!(notes, vec![MelodyNote::new(0.0, 0.2, 60)]);
    }

    #[test]
    fn test_malformed_contour_is_an_error() {
        let c = PitchContour {
            times: vec![0.0, 0.1],
            frequencies: vec![Some(440.0)],
            voiced: vec![true, true],
        };
        assert!(matches!(
            segment_melody(&c),
            Err(AnalysisError::UpstreamFeature(_))
        ));
    }

    #[test]
    fn test_empty_contour() {
        assert!(segment_melody(&PitchContour::default()).unwrap().is_empty());
    }

    #[test]
    fn test_hz_to_midi() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-5);
        assert!((hz_to_midi(261.6256) - 60.0).abs() < 1e-3);
        assert!((midi_to_hz(81.0) - 880.0).abs() < 1e-2);
    }
}
