//! Key detection algorithm
//!
//! Averages the chroma matrix into one profile and picks the maximum dot
//! product against the 24 Krumhansl-Kessler key templates. No smoothing and
//! no per-frame weighting.

use super::{templates::KeyTemplates, KeyDetectionResult};
use crate::analysis::result::{Key, Mode};
use crate::error::AnalysisError;
use crate::io::{ChromaMatrix, N_PITCH_CLASSES};

/// Detect musical key from a chroma matrix
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientData` if the matrix has no frames.
///
/// # Example
///
/// ```
/// use chordsketch::analysis::result::{Key, Mode};
/// use chordsketch::features::key::{detect_key, KeyTemplates};
/// use chordsketch::io::ChromaMatrix;
///
/// let templates = KeyTemplates::new();
/// let frames = vec![templates.major_template(2); 10]; // D major profile
/// let chroma = ChromaMatrix::from_frames(frames, 22050, 512)?;
///
/// let result = detect_key(&chroma, &templates)?;
/// assert_eq!(result.key, Key::new(2, Mode::Major));
/// # Ok::<(), chordsketch::AnalysisError>(())
/// ```
pub fn detect_key(
    chroma: &ChromaMatrix,
    templates: &KeyTemplates,
) -> Result<KeyDetectionResult, AnalysisError> {
    log::debug!("Detecting key from {} chroma frames", chroma.len());

    let profile = chroma
        .mean_profile()
        .ok_or_else(|| AnalysisError::InsufficientData("Empty chroma matrix".to_string()))?;

    Ok(detect_key_from_profile(&profile, templates))
}

/// Detect musical key from an averaged pitch-class profile
///
/// Hypotheses are examined tonic by tonic (C first), major before minor, and
/// only a strictly greater score replaces the current best, so exact ties go
/// to the earliest examined key.
pub fn detect_key_from_profile(
    profile: &[f32; N_PITCH_CLASSES],
    templates: &KeyTemplates,
) -> KeyDetectionResult {
    let mut scores = Vec::with_capacity(2 * N_PITCH_CLASSES);
    for tonic in 0..N_PITCH_CLASSES {
        let major = dot(profile, &templates.major_template(tonic));
        scores.push((Key::new(tonic as u8, Mode::Major), major));

        let minor = dot(profile, &templates.minor_template(tonic));
        scores.push((Key::new(tonic as u8, Mode::Minor), minor));
    }

    let (key, score) = scores
        .iter()
        .skip(1)
        .fold(scores[0], |best, &candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    log::debug!("Detected key {} (score {:.4})", key, score);

    KeyDetectionResult { key, score, scores }
}

fn dot(a: &[f32; N_PITCH_CLASSES], b: &[f32; N_PITCH_CLASSES]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::key::templates::{rotate, KK_MINOR_PROFILE};

    #[test]
    fn test_recovers_every_major_rotation() {
        let templates = KeyTemplates::new();
        for r in 0..12 {
            let profile = templates.major_template(r);
            let result = detect_key_from_profile(&profile, &templates);
            assert_eq!(result.key, Key::new(r as u8, Mode::Major), "rotation {}", r);
        }
    }

    #[test]
    fn test_recovers_minor_key() {
        let templates = KeyTemplates::new();
        // A minor, unnormalized: scaling does not change the argmax
        let profile = rotate(&KK_MINOR_PROFILE, 9);
        let result = detect_key_from_profile(&profile, &templates);
        assert_eq!(result.key, Key::new(9, Mode::Minor));
        assert_eq!(result.key.name(), "Am");
    }

    #[test]
    fn test_scores_cover_all_hypotheses_in_order() {
        let templates = KeyTemplates::new();
        let result = detect_key_from_profile(&[1.0; 12], &templates);
        assert_eq!(result.scores.len(), 24);
        assert_eq!(result.scores[0].0, Key::new(0, Mode::Major));
        assert_eq!(result.scores[1].0, Key::new(0, Mode::Minor));
        assert_eq!(result.scores[23].0, Key::new(11, Mode::Minor));
    }

    #[test]
    fn test_silent_profile_keeps_first_hypothesis() {
        let templates = KeyTemplates::new();
        let result = detect_key_from_profile(&[0.0; 12], &templates);
        assert_eq!(result.key, Key::new(0, Mode::Major));
    }

    #[test]
    fn test_empty_chroma_is_insufficient() {
        let chroma = ChromaMatrix::from_frames(vec![], 22050, 512).unwrap();
        let result = detect_key(&chroma, &KeyTemplates::new());
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_averages_frames() {
        let templates = KeyTemplates::new();
        // Half the frames silent, half in E major: the mean is still E major
        let mut frames = vec![[0.0f32; 12]; 5];
        frames.extend(vec![templates.major_template(4); 5]);
        let chroma = ChromaMatrix::from_frames(frames, 22050, 512).unwrap();
        let result = detect_key(&chroma, &templates).unwrap();
        assert_eq!(result.key, Key::new(4, Mode::Major));
    }
}
