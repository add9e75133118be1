//! # Chordsketch
//!
//! Structure inference for recorded music: turns low-level features produced
//! by upstream extractors (beat times, chroma, pitch contour, loudness) into
//! discrete, time-bounded musical labels.
//!
//! ## Features
//!
//! - **Meter**: time signature (beats per bar) from beat-interval periodicity, bar grid
//! - **Key Detection**: Krumhansl-Kessler template matching on the averaged chroma profile
//! - **Chords**: beat-synchronous triad matching, a root-peak baseline, and
//!   boundary quantization onto the beat grid
//! - **Melody**: note segmentation of an f0 / voicing contour
//! - **Dynamics**: loudness trace in dB relative to the loudest frame
//!
//! ## Quick Start
//!
//! ```
//! use chordsketch::{analyze_features, AnalysisConfig, FeatureSet};
//!
//! let features = FeatureSet {
//!     beats: (0..16).map(|i| i as f32 * 0.5).collect(),
//!     ..Default::default()
//! };
//!
//! let record = analyze_features(&features, &AnalysisConfig::default());
//! println!("Tempo: {:.1} BPM, {}", record.tempo, record.time_signature.name());
//! assert_eq!(record.bars.len(), 5);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! FeatureSet → beat grid ─┬→ meter / bars / key ──────────────┐
//!                         ├→ chord strategies → arbiter → quantizer ─┼→ AnalysisRecord
//!                         └→ melody sources → arbiter ─────────┘
//! ```
//!
//! No stage is fatal: a stage whose inputs are missing or malformed logs a
//! warning, records it in the diagnostics and contributes an empty or default
//! value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;

// Re-export main types
pub use analysis::arbiter::{ArbitrationPolicy, Provenance};
pub use analysis::metadata::AnalysisDiagnostics;
pub use analysis::result::{
    AnalysisRecord, Bar, ChordLabel, ChordQuality, ChordSegment, DynamicsSample, Key, MelodyNote,
    Mode, TimeSignature,
};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use io::{ChromaMatrix, FeatureSet, LoudnessEnvelope, PitchContour};

use analysis::arbiter::{arbitrate, ChosenResult, StrategyResult};
use features::beat_tracking::{bars_from_beats, detect_time_signature};
use features::chords::{merge_repeated_labels, BoundaryQuantizer, ChordStrategy, RootPeak, TemplateMatcher};
use features::dynamics::dynamics_from_loudness;
use features::key::{detect_key, KeyTemplates};
use features::melody::segment_melody;
use features::period::tempo_from_beats;

/// Main analysis function
///
/// Infers meter, bars, key, chords, melody and dynamics from a feature set.
/// Infallible: every degraded stage is reported in
/// `record.diagnostics.warnings` and falls back to its documented empty or
/// default value.
///
/// # Arguments
///
/// * `features` - Upstream features for one recording
/// * `config` - Analysis configuration parameters
///
/// # Example
///
/// ```
/// use chordsketch::{analyze_features, AnalysisConfig, FeatureSet};
///
/// let record = analyze_features(&FeatureSet::default(), &AnalysisConfig::default());
/// assert!(record.chords.is_empty());
/// assert_eq!(record.time_signature.numerator, 4);
/// assert!(record.key.is_none());
/// ```
pub fn analyze_features(features: &FeatureSet, config: &AnalysisConfig) -> AnalysisRecord {
    use std::time::Instant;
    let start_time = Instant::now();

    let beats = features.beat_grid();
    log::debug!("Starting structure inference: {} beats", beats.len());

    let (structure, (chords, melody)) = join(
        || infer_structure(&beats, features, config),
        || {
            join(
                || recognize_chords(&beats, features, config),
                || transcribe_melody(features, config),
            )
        },
    );

    let mut warnings = Vec::new();
    if beats.len() < 2 {
        warnings.push(format!("Only {} usable beats", beats.len()));
    }
    warnings.extend(structure.warnings);
    warnings.extend(chords.warnings);
    warnings.extend(melody.warnings);

    let chord_source = chords.chosen.provenance();
    let chords_raw = chords.chosen.into_items();

    let duration = record_duration(features, &beats, &chords_raw);

    let mut chords_snapped = BoundaryQuantizer::from_config(config).quantize(&chords_raw, &beats, duration);
    if config.merge_repeated_chords {
        chords_snapped = merge_repeated_labels(&chords_snapped);
    }

    let dynamics = match &features.loudness {
        Some(envelope) => dynamics_from_loudness(envelope, config.dynamics_range_db).unwrap_or_else(|e| {
            log::warn!("Dynamics unavailable: {}", e);
            warnings.push(format!("Dynamics: {}", e));
            vec![]
        }),
        None => vec![],
    };

    let tempo = match features.tempo {
        Some(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
        _ => tempo_from_beats(&beats),
    };

    let melody_source = melody.chosen.provenance();
    let melody_notes = melody.chosen.into_items();

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Structure inference complete: {} bars, {} chords ({:?}), {} notes ({:?}) in {:.2} ms",
        structure.bars.len(),
        chords_snapped.len(),
        chord_source,
        melody_notes.len(),
        melody_source,
        processing_time_ms
    );

    let diagnostics = AnalysisDiagnostics {
        beats_count: beats.len(),
        bars_count: structure.bars.len(),
        chords_raw_count: chords_raw.len(),
        chords_snapped_count: chords_snapped.len(),
        melody_notes_count: melody_notes.len(),
        dynamics_count: dynamics.len(),
        chord_source,
        melody_source,
        processing_time_ms,
        warnings,
        ..Default::default()
    };

    AnalysisRecord {
        tempo,
        beats,
        time_signature: structure.time_signature,
        key: structure.key,
        chords: chords_snapped,
        chords_raw,
        melody_notes,
        dynamics,
        beats_per_bar: structure.time_signature.numerator,
        bars: structure.bars,
        duration,
        diagnostics,
    }
}

/// Meter, bars and key
struct Structure {
    time_signature: TimeSignature,
    bars: Vec<Bar>,
    key: Option<Key>,
    warnings: Vec<String>,
}

/// A category result picked by the arbiter
struct Arbitrated<T> {
    chosen: ChosenResult<T>,
    warnings: Vec<String>,
}

fn infer_structure(beats: &[f32], features: &FeatureSet, config: &AnalysisConfig) -> Structure {
    let mut warnings = Vec::new();

    let time_signature = detect_time_signature(beats, config);
    let bars = bars_from_beats(beats, time_signature.numerator, config.bar_end_padding);

    let key = match &features.chroma {
        Some(chroma) => match detect_key(chroma, &KeyTemplates::new()) {
            Ok(result) => {
                log::debug!("Detected key {} (score {:.4})", result.key.name(), result.score);
                Some(result.key)
            }
            Err(e) => {
                log::warn!("Key unavailable: {}", e);
                warnings.push(format!("Key: {}", e));
                None
            }
        },
        None => {
            warnings.push("Key: no chroma".to_string());
            None
        }
    };

    Structure {
        time_signature,
        bars,
        key,
        warnings,
    }
}

fn recognize_chords(
    beats: &[f32],
    features: &FeatureSet,
    config: &AnalysisConfig,
) -> Arbitrated<ChordSegment> {
    let mut warnings = Vec::new();
    let chroma = features.chroma.as_ref();
    if chroma.is_none() {
        warnings.push("Chords: no chroma".to_string());
    }

    let primary = TemplateMatcher::from_config(config).run(chroma, beats);
    let fallback = RootPeak.run(chroma, beats);
    if chroma.is_some_and(|c| c.is_empty()) {
        warnings.push("Chords: chroma matrix has no frames".to_string());
    }

    Arbitrated {
        chosen: arbitrate(primary, fallback, &config.arbitration),
        warnings,
    }
}

fn transcribe_melody(features: &FeatureSet, config: &AnalysisConfig) -> Arbitrated<MelodyNote> {
    let mut warnings = Vec::new();

    let primary = match &features.pitch_contour {
        Some(contour) => match segment_melody(contour) {
            Ok(notes) => StrategyResult::new(Provenance::PitchContour, notes),
            Err(e) => {
                log::warn!("Melody segmentation failed: {}", e);
                warnings.push(format!("Melody: {}", e));
                StrategyResult::empty(Provenance::PitchContour)
            }
        },
        None => {
            warnings.push("Melody: no pitch contour".to_string());
            StrategyResult::empty(Provenance::PitchContour)
        }
    };

    let fallback = StrategyResult::new(
        Provenance::AlternateSource,
        features.alternate_melody.clone().unwrap_or_default(),
    );

    Arbitrated {
        chosen: arbitrate(primary, fallback, &config.arbitration),
        warnings,
    }
}

/// Explicit duration when supplied, else the furthest beat or raw chord end
fn record_duration(features: &FeatureSet, beats: &[f32], chords_raw: &[ChordSegment]) -> f32 {
    if let Some(duration) = features.duration.filter(|d| d.is_finite() && *d > 0.0) {
        return duration;
    }
    chords_raw
        .iter()
        .map(|c| c.end)
        .chain(beats.last().copied())
        .filter(|t| t.is_finite())
        .fold(0.0, f32::max)
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_features_degrade_to_defaults() {
        let record = analyze_features(&FeatureSet::default(), &AnalysisConfig::default());
        assert_eq!(record.tempo, 0.0);
        assert_eq!(record.duration, 0.0);
        assert!(record.bars.is_empty());
        assert!(record.chords.is_empty());
        assert!(record.melody_notes.is_empty());
        assert!(record.dynamics.is_empty());
        assert_eq!(record.time_signature, TimeSignature::common_time());
        assert!(!record.diagnostics.warnings.is_empty());
    }

    #[test]
    fn test_tempo_from_features_wins() {
        let features = FeatureSet {
            beats: vec![0.0, 0.5, 1.0],
            tempo: Some(121.5),
            ..Default::default()
        };
        let record = analyze_features(&features, &AnalysisConfig::default());
        assert_eq!(record.tempo, 121.5);

        let features = FeatureSet {
            tempo: None,
            ..features
        };
        let record = analyze_features(&features, &AnalysisConfig::default());
        assert!((record.tempo - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_record_duration() {
        let chords = vec![ChordSegment::new(0.0, 4.5, ChordLabel::NoChord)];
        let features = FeatureSet::default();
        assert_eq!(record_duration(&features, &[0.0, 3.0], &chords), 4.5);
        assert_eq!(record_duration(&features, &[0.0, 5.0], &chords), 5.0);

        let features = FeatureSet {
            duration: Some(10.0),
            ..Default::default()
        };
        assert_eq!(record_duration(&features, &[0.0, 5.0], &chords), 10.0);
    }
}
