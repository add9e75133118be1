//! Extracted feature containers
//!
//! These hold the output of the upstream feature extractors (chroma, f0 /
//! voicing, loudness, beat tracking). Nothing here computes features; the
//! containers only validate shape so the inference stages can trust them.

use crate::analysis::result::MelodyNote;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of pitch classes per chroma frame
pub const N_PITCH_CLASSES: usize = 12;

/// Frame-indexed pitch-class energies, tagged with the frame rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChromaMatrixRepr")]
pub struct ChromaMatrix {
    frames: Vec<[f32; N_PITCH_CLASSES]>,
    sample_rate: u32,
    hop_size: usize,
}

#[derive(Deserialize)]
struct ChromaMatrixRepr {
    frames: Vec<Vec<f32>>,
    sample_rate: u32,
    hop_size: usize,
}

impl TryFrom<ChromaMatrixRepr> for ChromaMatrix {
    type Error = AnalysisError;

    fn try_from(repr: ChromaMatrixRepr) -> Result<Self, Self::Error> {
        ChromaMatrix::new(repr.frames, repr.sample_rate, repr.hop_size)
    }
}

impl ChromaMatrix {
    /// Build a chroma matrix from per-frame vectors
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the sample rate or hop size is
    /// zero, a frame does not have 12 elements, or an energy is negative or
    /// not finite.
    pub fn new(
        frames: Vec<Vec<f32>>,
        sample_rate: u32,
        hop_size: usize,
    ) -> Result<Self, AnalysisError> {
        let mut fixed = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let arr: [f32; N_PITCH_CLASSES] = frame.as_slice().try_into().map_err(|_| {
                AnalysisError::InvalidInput(format!(
                    "Chroma vector at index {} has {} elements, expected {}",
                    i,
                    frame.len(),
                    N_PITCH_CLASSES
                ))
            })?;
            fixed.push(arr);
        }
        Self::from_frames(fixed, sample_rate, hop_size)
    }

    /// Build a chroma matrix from fixed-size frames
    pub fn from_frames(
        frames: Vec<[f32; N_PITCH_CLASSES]>,
        sample_rate: u32,
        hop_size: usize,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate: 0".to_string()));
        }
        if hop_size == 0 {
            return Err(AnalysisError::InvalidInput("Invalid hop size: 0".to_string()));
        }
        for (i, frame) in frames.iter().enumerate() {
            if let Some(v) = frame.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(AnalysisError::InvalidInput(format!(
                    "Chroma frame {} holds invalid energy {}",
                    i, v
                )));
            }
        }
        Ok(Self {
            frames,
            sample_rate,
            hop_size,
        })
    }

    /// All frames
    pub fn frames(&self) -> &[[f32; N_PITCH_CLASSES]] {
        &self.frames
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when there are no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sample rate of the analysed signal in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples between consecutive frames
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop_size as f32
    }

    /// Index of the frame containing time `t` (floor), negative times map to 0
    ///
    /// The index may lie beyond the last frame.
    pub fn time_to_frame(&self, t: f32) -> usize {
        if !(t > 0.0) {
            return 0;
        }
        (t * self.frame_rate()).floor() as usize
    }

    /// Mean of the frames in `range` (clipped to the matrix), `None` if empty
    pub fn mean_over(&self, range: Range<usize>) -> Option<[f32; N_PITCH_CLASSES]> {
        let end = range.end.min(self.frames.len());
        let start = range.start.min(end);
        let slice = &self.frames[start..end];
        if slice.is_empty() {
            return None;
        }

        let mut mean = [0.0f32; N_PITCH_CLASSES];
        for frame in slice {
            for (acc, v) in mean.iter_mut().zip(frame.iter()) {
                *acc += v;
            }
        }
        let n = slice.len() as f32;
        for v in mean.iter_mut() {
            *v /= n;
        }
        Some(mean)
    }

    /// Mean over all frames, `None` if the matrix is empty
    pub fn mean_profile(&self) -> Option<[f32; N_PITCH_CLASSES]> {
        self.mean_over(0..self.frames.len())
    }
}

/// Per-frame fundamental frequency contour with voicing flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchContour {
    /// Frame times in seconds
    pub times: Vec<f32>,
    /// Fundamental frequency in Hz, `None` where undefined
    pub frequencies: Vec<Option<f32>>,
    /// Voicing decision per frame
    pub voiced: Vec<bool>,
}

impl PitchContour {
    /// Check that all three tracks line up and times never go backwards
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let n = self.times.len();
        if self.frequencies.len() != n || self.voiced.len() != n {
            return Err(AnalysisError::UpstreamFeature(format!(
                "Pitch contour length mismatch: {} times, {} frequencies, {} voicing flags",
                n,
                self.frequencies.len(),
                self.voiced.len()
            )));
        }
        if self.times.iter().any(|t| !t.is_finite()) {
            return Err(AnalysisError::UpstreamFeature(
                "Pitch contour contains non-finite frame times".to_string(),
            ));
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Err(AnalysisError::UpstreamFeature(
                "Pitch contour frame times are not ordered".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-frame RMS loudness
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoudnessEnvelope {
    /// Frame times in seconds
    pub times: Vec<f32>,
    /// Linear RMS amplitude per frame
    pub rms: Vec<f32>,
}

impl LoudnessEnvelope {
    /// Check that times and levels line up
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.times.len() != self.rms.len() {
            return Err(AnalysisError::UpstreamFeature(format!(
                "Loudness envelope length mismatch: {} times, {} levels",
                self.times.len(),
                self.rms.len()
            )));
        }
        Ok(())
    }
}

/// Everything the upstream extractors produced for one recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Beat times in seconds
    #[serde(default)]
    pub beats: Vec<f32>,

    /// Tempo reported by the beat tracker, in BPM
    #[serde(default)]
    pub tempo: Option<f32>,

    /// Recording duration in seconds, if known
    #[serde(default)]
    pub duration: Option<f32>,

    /// Pitch-class energies
    #[serde(default)]
    pub chroma: Option<ChromaMatrix>,

    /// f0 / voicing contour
    #[serde(default)]
    pub pitch_contour: Option<PitchContour>,

    /// Loudness envelope
    #[serde(default)]
    pub loudness: Option<LoudnessEnvelope>,

    /// Melody notes from a second, independent transcription source
    #[serde(default)]
    pub alternate_melody: Option<Vec<MelodyNote>>,
}

impl FeatureSet {
    /// Beat times as a strictly increasing grid
    ///
    /// Non-finite entries are dropped, the rest sorted and deduplicated.
    pub fn beat_grid(&self) -> Vec<f32> {
        let mut grid: Vec<f32> = self.beats.iter().copied().filter(|t| t.is_finite()).collect();
        grid.sort_by(f32::total_cmp);
        grid.dedup();
        if grid.len() != self.beats.len() {
            log::warn!(
                "Beat grid repaired: {} input beats, {} usable",
                self.beats.len(),
                grid.len()
            );
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chroma_rejects_wrong_dimensions() {
        let result = ChromaMatrix::new(vec![vec![0.0; 12], vec![0.0; 11]], 22050, 512);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_chroma_rejects_negative_energy() {
        let mut frame = vec![0.0; 12];
        frame[3] = -0.5;
        assert!(ChromaMatrix::new(vec![frame], 22050, 512).is_err());
    }

    #[test]
    fn test_chroma_rejects_zero_rates() {
        assert!(ChromaMatrix::new(vec![], 0, 512).is_err());
        assert!(ChromaMatrix::new(vec![], 22050, 0).is_err());
    }

    #[test]
    fn test_time_to_frame() {
        let chroma = ChromaMatrix::new(vec![vec![0.0; 12]; 4], 100, 10).unwrap();
        assert_eq!(chroma.frame_rate(), 10.0);
        assert_eq!(chroma.time_to_frame(0.0), 0);
        assert_eq!(chroma.time_to_frame(-1.0), 0);
        assert_eq!(chroma.time_to_frame(0.25), 2);
        assert_eq!(chroma.time_to_frame(5.0), 50);
    }

    #[test]
    fn test_mean_over_clips_range() {
        let mut a = [0.0f32; 12];
        a[0] = 1.0;
        let mut b = [0.0f32; 12];
        b[0] = 3.0;
        let chroma = ChromaMatrix::from_frames(vec![a, b], 100, 10).unwrap();

        let mean = chroma.mean_over(0..10).unwrap();
        assert_eq!(mean[0], 2.0);
        assert!(chroma.mean_over(5..9).is_none());
        assert_eq!(chroma.mean_profile().unwrap()[0], 2.0);
    }

    #[test]
    fn test_pitch_contour_validation() {
        let contour = PitchContour {
            times: vec![0.0, 0.1],
            frequencies: vec![Some(440.0)],
            voiced: vec![true, true],
        };
        assert!(matches!(contour.validate(), Err(AnalysisError::UpstreamFeature(_))));

        let contour = PitchContour {
            times: vec![0.2, 0.1],
            frequencies: vec![None, None],
            voiced: vec![false, false],
        };
        assert!(contour.validate().is_err());
    }

    #[test]
    fn test_beat_grid_sanitized() {
        let features = FeatureSet {
            beats: vec![1.0, 0.5, f32::NAN, 1.0, 1.5],
            ..Default::default()
        };
        assert_eq!(features.beat_grid(), vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_chroma_deserialize_validates() {
        let bad = r#"{"frames": [[1.0, 2.0]], "sample_rate": 22050, "hop_size": 512}"#;
        assert!(serde_json::from_str::<ChromaMatrix>(bad).is_err());

        let good = r#"{"frames": [[1,0,0,0,0,0,0,0,0,0,0,0]], "sample_rate": 22050, "hop_size": 512}"#;
        let chroma: ChromaMatrix = serde_json::from_str(good).unwrap();
        assert_eq!(chroma.len(), 1);
    }
}
