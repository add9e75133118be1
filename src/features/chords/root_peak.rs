//! Root-only chord baseline
//!
//! Reads the single chroma frame at each beat and takes its strongest pitch
//! class as the chord root. The quality is always major: it is a placeholder,
//! nothing is tested.

use super::{require_frames, ChordStrategy};
use crate::analysis::arbiter::Provenance;
use crate::analysis::result::{ChordLabel, ChordQuality, ChordSegment};
use crate::error::AnalysisError;
use crate::io::ChromaMatrix;

/// Chroma peak at the beat frame, labelled `<root>:Maj`
#[derive(Debug, Clone, Copy, Default)]
pub struct RootPeak;

impl ChordStrategy for RootPeak {
    fn provenance(&self) -> Provenance {
        Provenance::RootPeak
    }

    fn recognize(
        &self,
        chroma: &ChromaMatrix,
        beats: &[f32],
    ) -> Result<Vec<ChordSegment>, AnalysisError> {
        if beats.len() < 2 {
            return Ok(vec![]);
        }
        require_frames(chroma)?;

        log::debug!("Root-peak labelling of {} beat intervals", beats.len() - 1);

        let last_frame = chroma.len() - 1;
        let chords = beats
            .windows(2)
            .map(|w| {
                let frame = &chroma.frames()[chroma.time_to_frame(w[0]).min(last_frame)];
                let root = peak_class(frame);
                ChordSegment::new(w[0], w[1], ChordLabel::chord(root as u8, ChordQuality::Major))
            })
            .collect();

        Ok(chords)
    }
}

/// Index of the strongest pitch class; the lowest index wins a tie
fn peak_class(frame: &[f32; 12]) -> usize {
    (1..frame.len()).fold(0, |best, i| if frame[i] > frame[best] { i } else { best })
}
