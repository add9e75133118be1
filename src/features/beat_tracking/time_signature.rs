//! Time signature detection
//!
//! Infers how many beats make up a bar from the periodicity of beat-to-beat
//! intervals. Only the numerator is inferred; the denominator is always 4.
//!
//! # Algorithm (autocorrelation variant)
//!
//! 1. Compute beat intervals and subtract their mean
//! 2. Autocorrelate the centered intervals (non-negative lags)
//! 3. For each candidate numerator `n` in 3, 4, 6, 8, average the
//!    autocorrelation at lags `n, 2n, ..., 8n` that fit in the sequence
//! 4. The highest average wins
//!
//! The group-variance variant instead sums consecutive groups of `n`
//! intervals and prefers the `n` (3 or 4) whose bar lengths vary least.
//!
//! # Example
//!
//! ```
//! use chordsketch::features::beat_tracking::time_signature::{
//!     estimate_time_signature, TimeSignatureMethod,
//! };
//!
//! // Long-short-medium-medium pattern repeating every four beats
//! let pattern = [0.6f32, 0.4, 0.5, 0.5];
//! let mut beats = vec![0.0f32];
//! for i in 0..17 {
//!     let last = *beats.last().unwrap();
//!     beats.push(last + pattern[i % 4]);
//! }
//!
//! let ts = estimate_time_signature(&beats, TimeSignatureMethod::Autocorrelation, 8)?;
//! assert_eq!(ts.numerator, 4);
//! # Ok::<(), chordsketch::AnalysisError>(())
//! ```

use crate::analysis::result::TimeSignature;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::period::autocorrelation::autocorrelation;

/// Candidate numerators for the autocorrelation variant, in tie-break order
const AUTOCORR_CANDIDATES: [u32; 4] = [3, 4, 6, 8];

/// Candidate numerators for the group-variance variant, in tie-break order
const VARIANCE_CANDIDATES: [u32; 2] = [3, 4];

/// Number of bar periods sampled per candidate
const MAX_PERIODS: usize = 8;

/// Added to the standard deviation before inverting it
const VARIANCE_EPSILON: f32 = 1e-6;

/// Upper bound on reported confidence
const MAX_CONFIDENCE: f32 = 0.99;

/// Time signature estimator variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSignatureMethod {
    /// Autocorrelation of centered beat intervals (candidates 3, 4, 6, 8)
    #[default]
    Autocorrelation,
    /// Inverse spread of grouped interval sums (candidates 3, 4)
    GroupVariance,
}

/// Detect the time signature, falling back to the configured default
///
/// Never fails: too few beats yields `config.default_time_signature`.
pub fn detect_time_signature(beats: &[f32], config: &AnalysisConfig) -> TimeSignature {
    match estimate_time_signature(beats, config.time_signature_method, config.min_beats_for_meter)
    {
        Ok(ts) => ts,
        Err(e) => {
            log::debug!("Time signature defaulted to {}: {}", config.default_time_signature.name(), e);
            config.default_time_signature
        }
    }
}

/// Estimate the time signature from a beat grid
///
/// # Arguments
///
/// * `beats` - Beat times in seconds (sorted)
/// * `method` - Estimator variant
/// * `min_beats` - Minimum number of beats required (typically 8)
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientData` when there are fewer than
/// `min_beats` beats or too few intervals for any candidate grouping.
pub fn estimate_time_signature(
    beats: &[f32],
    method: TimeSignatureMethod,
    min_beats: usize,
) -> Result<TimeSignature, AnalysisError> {
    log::debug!("Estimating time signature from {} beats ({:?})", beats.len(), method);

    if beats.len() < min_beats.max(2) {
        return Err(AnalysisError::InsufficientData(format!(
            "{} beats, need at least {}",
            beats.len(),
            min_beats
        )));
    }

    let intervals: Vec<f32> = beats.windows(2).map(|w| w[1] - w[0]).collect();

    match method {
        TimeSignatureMethod::Autocorrelation => estimate_by_autocorrelation(&intervals),
        TimeSignatureMethod::GroupVariance => estimate_by_group_variance(&intervals),
    }
}

fn estimate_by_autocorrelation(intervals: &[f32]) -> Result<TimeSignature, AnalysisError> {
    let n = intervals.len();
    let mean = intervals.iter().sum::<f32>() / n as f32;
    let centered: Vec<f32> = intervals.iter().map(|&x| x - mean).collect();

    let acf = autocorrelation(&centered);
    let energy = acf[0];

    // Strict `>` over the fixed candidate order: on an exact tie the earlier
    // (smaller) numerator is kept. A perfectly regular grid scores 0 everywhere
    // and resolves to 3.
    let mut best: Option<(u32, f32)> = None;
    for &numerator in AUTOCORR_CANDIDATES.iter() {
        let Some(score) = periodic_score(&acf, numerator as usize) else {
            continue;
        };
        log::trace!("Numerator {} scored {:.6}", numerator, score);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((numerator, score));
        }
    }

    let (numerator, score) = best.ok_or_else(|| {
        AnalysisError::InsufficientData("interval sequence shorter than every candidate".to_string())
    })?;

    let confidence = if energy > 0.0 {
        (score / energy).clamp(0.0, MAX_CONFIDENCE)
    } else {
        0.0
    };
    Ok(TimeSignature::new(numerator, Some(confidence)))
}

/// Mean autocorrelation at lags `k * period` for `k = 1..=MAX_PERIODS`
fn periodic_score(acf: &[f32], period: usize) -> Option<f32> {
    let samples: Vec<f32> = (1..=MAX_PERIODS)
        .map(|k| k * period)
        .take_while(|&lag| lag < acf.len())
        .map(|lag| acf[lag])
        .collect();

    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f32>() / samples.len() as f32)
    }
}

fn estimate_by_group_variance(intervals: &[f32]) -> Result<TimeSignature, AnalysisError> {
    // Strict `>`: on an exact tie the earlier candidate is kept.
    let mut best: Option<(u32, f32)> = None;
    for &numerator in VARIANCE_CANDIDATES.iter() {
        // The trailing group may be partial
        let bar_lengths: Vec<f32> = intervals
            .chunks(numerator as usize)
            .map(|group| group.iter().sum())
            .collect();
        if bar_lengths.len() < 2 {
            continue;
        }
        let score = 1.0 / (std_dev(&bar_lengths) + VARIANCE_EPSILON);
        log::trace!("Numerator {} scored {:.3}", numerator, score);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((numerator, score));
        }
    }

    let (numerator, score) = best.ok_or_else(|| {
        AnalysisError::InsufficientData("too few intervals to group".to_string())
    })?;

    let confidence = (score / 10.0).clamp(0.0, MAX_CONFIDENCE);
    Ok(TimeSignature::new(numerator, Some(confidence)))
}

/// Population standard deviation
fn std_dev(values: &[f32]) -> f32 {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    variance.sqrt()
}
