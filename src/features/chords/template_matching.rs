//! Beat-synchronous triad template matching
//!
//! For each beat interval the chroma frames inside it are averaged and the
//! mean vector is classified with [`classify_triad`].

use super::templates::classify_triad;
use super::{require_frames, ChordStrategy};
use crate::analysis::arbiter::Provenance;
use crate::analysis::result::{ChordLabel, ChordSegment};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::ChromaMatrix;

/// Triad template matching over beat-averaged chroma
#[derive(Debug, Clone, Copy)]
pub struct TemplateMatcher {
    /// Total mean energy below which an interval is labelled "N"
    pub min_energy: f32,
}

impl TemplateMatcher {
    /// Create a matcher with the given silence threshold
    pub fn new(min_energy: f32) -> Self {
        Self { min_energy }
    }

    /// Create a matcher from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.min_chord_energy)
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ChordStrategy for TemplateMatcher {
    fn provenance(&self) -> Provenance {
        Provenance::TemplateMatching
    }

    fn recognize(
        &self,
        chroma: &ChromaMatrix,
        beats: &[f32],
    ) -> Result<Vec<ChordSegment>, AnalysisError> {
        if beats.len() < 2 {
            log::debug!("Template matching skipped: {} beats", beats.len());
            return Ok(vec![]);
        }
        require_frames(chroma)?;

        log::debug!(
            "Template matching {} beat intervals over {} chroma frames",
            beats.len() - 1,
            chroma.len()
        );

        let chords = beats
            .windows(2)
            .map(|w| {
                let first = chroma.time_to_frame(w[0]);
                // Beats closer together than one frame still read the frame they fall in
                let last = chroma.time_to_frame(w[1]).max(first.saturating_add(1));
                let label = match chroma.mean_over(first..last) {
                    Some(mean) => classify_triad(&mean, self.min_energy),
                    // Interval lies beyond the analysed frames
                    None => ChordLabel::NoChord,
                };
                ChordSegment::new(w[0], w[1], label)
            })
            .collect();

        Ok(chords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 frames per second
    fn chroma_from(frames: Vec<[f32; 12]>) -> ChromaMatrix {
        ChromaMatrix::from_frames(frames, 100, 10).unwrap()
    }

    fn triad(notes: &[usize]) -> [f32; 12] {
        let mut v = [0.0f32; 12];
        for &n in notes {
            v[n] = 1.0;
        }
        v
    }

    #[test]
    fn test_one_segment_per_interval() {
        // 0.0-0.5 s C major, 0.5-1.0 s A minor
        let mut frames = vec![triad(&[0, 4, 7]); 5];
        frames.extend(vec![triad(&[9, 0, 4]); 5]);
        let chroma = chroma_from(frames);

        let chords = TemplateMatcher::default()
            .recognize(&chroma, &[0.0, 0.5, 1.0])
            .unwrap();

        let labels: Vec<String> = chords.iter().map(|c| c.label.to_string()).collect();
        assert_eq!(labels, vec!["C:Maj", "A:Min"]);
        assert_eq!((chords[1].start, chords[1].end), (0.5, 1.0));
    }

    #[test]
    fn test_silence_is_no_chord() {
        let chroma = chroma_from(vec![[0.0; 12]; 10]);
        let chords = TemplateMatcher::default()
            .recognize(&chroma, &[0.0, 0.5, 1.0])
            .unwrap();
        assert!(chords.iter().all(|c| c.label.is_no_chord()));
    }

    #[test]
    fn test_interval_past_last_frame_is_no_chord() {
        let chroma = chroma_from(vec![triad(&[0, 4, 7]); 5]);
        let chords = TemplateMatcher::default()
            .recognize(&chroma, &[0.0, 0.5, 1.0, 1.5])
            .unwrap();
        assert_eq!(chords.len(), 3);
        assert_eq!(chords[0].label.to_string(), "C:Maj");
        assert!(chords[1].label.is_no_chord());
        assert!(chords[2].label.is_no_chord());
    }

    #[test]
    fn test_far_beats_are_no_chord() {
        let chroma = chroma_from(vec![triad(&[0, 4, 7]); 5]);
        let chords = TemplateMatcher::default()
            .recognize(&chroma, &[1e30, 2e30])
            .unwrap();
        assert_eq!(chords.len(), 1);
        assert!(chords[0].label.is_no_chord());
    }

    #[test]
    fn test_too_few_beats() {
        let chroma = chroma_from(vec![triad(&[0, 4, 7]); 5]);
        let matcher = TemplateMatcher::default();
        assert!(matcher.recognize(&chroma, &[]).unwrap().is_empty());
        assert!(matcher.recognize(&chroma, &[0.2]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_chroma_degrades_in_run() {
        let chroma = chroma_from(vec![]);
        let matcher = TemplateMatcher::default();
        assert!(matcher.recognize(&chroma, &[0.0, 0.5]).is_err());

        let result = matcher.run(Some(&chroma), &[0.0, 0.5]);
        assert_eq!(result.count(), 0);
        assert_eq!(result.provenance, Provenance::TemplateMatching);
        assert_eq!(matcher.run(None, &[0.0, 0.5]).count(), 0);
    }
}
