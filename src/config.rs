//! Configuration parameters for structure inference
//!
//! Every fallback value used anywhere in the pipeline lives here and is passed
//! explicitly to the stage that needs it.

use crate::analysis::arbiter::ArbitrationPolicy;
use crate::analysis::result::TimeSignature;
use crate::features::beat_tracking::time_signature::TimeSignatureMethod;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Meter
    /// Time signature reported when the beat grid is too short to infer one
    /// (default: 4/4 with confidence 0.5)
    pub default_time_signature: TimeSignature,

    /// Time signature estimator variant (default: Autocorrelation)
    pub time_signature_method: TimeSignatureMethod,

    /// Minimum number of beats before meter inference is attempted (default: 8)
    pub min_beats_for_meter: usize,

    // Bars
    /// Padding in seconds used to synthesize the end of a bar that has no
    /// closing beat (default: 2.0)
    pub bar_end_padding: f32,

    // Chords
    /// Total beat-averaged chroma energy below which a segment is labelled
    /// "N" (default: 0.1)
    pub min_chord_energy: f32,

    /// Maximum distance in seconds for snapping a chord boundary onto a beat
    /// (default: 0.08). Negative values disable snapping.
    pub snap_tolerance: f32,

    /// Duration given to a segment whose end collapsed onto its start
    /// (default: 1e-3 seconds)
    pub min_segment_duration: f32,

    /// Merge adjacent touching chord segments that share a label
    /// (default: false, one segment per beat)
    pub merge_repeated_chords: bool,

    // Dynamics
    /// Dynamic range in dB below the loudest frame; quieter frames are
    /// floored to `-dynamics_range_db` (default: 80.0)
    pub dynamics_range_db: f32,

    // Arbitration
    /// Rule used to pick between the primary and fallback results of each
    /// category (default: LargerCount)
    pub arbitration: ArbitrationPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_time_signature: TimeSignature::common_time(),
            time_signature_method: TimeSignatureMethod::Autocorrelation,
            min_beats_for_meter: 8,
            bar_end_padding: 2.0,
            min_chord_energy: 0.1,
            snap_tolerance: 0.08,
            min_segment_duration: 1e-3,
            merge_repeated_chords: false,
            dynamics_range_db: 80.0,
            arbitration: ArbitrationPolicy::LargerCount,
        }
    }
}
