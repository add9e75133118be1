//! Chord recognition modules
//!
//! Label each beat interval with a chord:
//! - Triad template matching over beat-averaged chroma (primary)
//! - Chroma peak at the beat, root only (fast baseline)
//! - Boundary quantization onto the beat grid

pub mod boundaries;
pub mod root_peak;
pub mod template_matching;
pub mod templates;

pub use boundaries::{merge_repeated_labels, BoundaryQuantizer};
pub use root_peak::RootPeak;
pub use template_matching::TemplateMatcher;

use crate::analysis::arbiter::{Provenance, StrategyResult};
use crate::analysis::result::ChordSegment;
use crate::error::AnalysisError;
use crate::io::ChromaMatrix;

/// A chord recognition strategy
///
/// Implementations emit one segment per beat interval, spanning
/// `beats[i]..beats[i + 1]`, and return an empty sequence when fewer than two
/// beats are given.
pub trait ChordStrategy {
    /// Tag identifying this strategy's results
    fn provenance(&self) -> Provenance;

    /// Label every beat interval
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::UpstreamFeature` when the chroma matrix holds
    /// no frames to read from.
    fn recognize(
        &self,
        chroma: &ChromaMatrix,
        beats: &[f32],
    ) -> Result<Vec<ChordSegment>, AnalysisError>;

    /// Run the strategy, degrading any failure to an empty result
    fn run(&self, chroma: Option<&ChromaMatrix>, beats: &[f32]) -> StrategyResult<ChordSegment> {
        let Some(chroma) = chroma else {
            log::warn!("{:?}: no chroma available, no chords produced", self.provenance());
            return StrategyResult::empty(self.provenance());
        };
        match self.recognize(chroma, beats) {
            Ok(chords) => StrategyResult::new(self.provenance(), chords),
            Err(e) => {
                log::warn!("{:?} chord recognition failed: {}", self.provenance(), e);
                StrategyResult::empty(self.provenance())
            }
        }
    }
}

fn require_frames(chroma: &ChromaMatrix) -> Result<(), AnalysisError> {
    if chroma.is_empty() {
        return Err(AnalysisError::UpstreamFeature(
            "Chroma matrix has no frames".to_string(),
        ));
    }
    Ok(())
}
