//! Loudness trace
//!
//! Converts a per-frame RMS envelope into levels in dB relative to the loudest
//! frame.

use crate::analysis::result::DynamicsSample;
use crate::error::AnalysisError;
use crate::io::LoudnessEnvelope;

/// Smallest amplitude considered, -100 dBFS
const AMPLITUDE_FLOOR: f32 = 1e-5;

/// Convert an RMS envelope into a dB trace
///
/// Each level is `20 * log10(max(rms, 1e-5) / peak)`, floored at `-range_db`,
/// so the loudest frame sits at 0 dB. Non-finite levels count as silence.
///
/// # Errors
///
/// Returns `AnalysisError::UpstreamFeature` if times and levels differ in
/// length, and `AnalysisError::Configuration` for a negative or non-finite
/// dynamic range.
pub fn dynamics_from_loudness(
    envelope: &LoudnessEnvelope,
    range_db: f32,
) -> Result<Vec<DynamicsSample>, AnalysisError> {
    envelope.validate()?;

    if !range_db.is_finite() || range_db < 0.0 {
        return Err(AnalysisError::Configuration(format!(
            "Dynamic range must be a non-negative number of dB, got {}",
            range_db
        )));
    }

    if envelope.rms.is_empty() {
        return Ok(vec![]);
    }

    let amplitude = |rms: f32| if rms.is_finite() { rms.max(AMPLITUDE_FLOOR) } else { AMPLITUDE_FLOOR };
    let peak = envelope
        .rms
        .iter()
        .map(|&r| amplitude(r))
        .fold(AMPLITUDE_FLOOR, f32::max);
    let peak_db = 20.0 * peak.log10();

    log::debug!(
        "Dynamics over {} frames, peak {:.2} dBFS, range {:.1} dB",
        envelope.rms.len(),
        peak_db,
        range_db
    );

    Ok(envelope
        .times
        .iter()
        .zip(envelope.rms.iter())
        .map(|(&time, &rms)| DynamicsSample {
            time,
            level_db: (20.0 * amplitude(rms).log10() - peak_db).max(-range_db),
        })
        .collect())
}
