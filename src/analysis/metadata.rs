//! Analysis diagnostics

use super::arbiter::Provenance;
use serde::{Deserialize, Serialize};

/// Counts, provenance and timing of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDiagnostics {
    /// Crate version that produced the record
    pub algorithm_version: String,

    /// Number of input beats
    pub beats_count: usize,

    /// Number of bars built
    pub bars_count: usize,

    /// Chord segments before quantization
    pub chords_raw_count: usize,

    /// Chord segments after quantization
    pub chords_snapped_count: usize,

    /// Melody notes in the record
    pub melody_notes_count: usize,

    /// Dynamics samples in the record
    pub dynamics_count: usize,

    /// Strategy whose chords were kept
    pub chord_source: Provenance,

    /// Source whose melody was kept
    pub melody_source: Provenance,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,

    /// Stages that degraded to an empty or default result, and why
    pub warnings: Vec<String>,
}

impl Default for AnalysisDiagnostics {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            beats_count: 0,
            bars_count: 0,
            chords_raw_count: 0,
            chords_snapped_count: 0,
            melody_notes_count: 0,
            dynamics_count: 0,
            chord_source: Provenance::TemplateMatching,
            melody_source: Provenance::PitchContour,
            processing_time_ms: 0.0,
            warnings: vec![],
        }
    }
}
