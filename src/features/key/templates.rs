//! Krumhansl-Kessler key templates
//!
//! Defines tonal profiles for 24 keys (12 major + 12 minor) as rotations of
//! two reference profiles normalized to sum to 1.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use crate::io::N_PITCH_CLASSES;

/// Krumhansl-Kessler probe-tone ratings for C major
pub const KK_MAJOR_PROFILE: [f32; N_PITCH_CLASSES] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler probe-tone ratings for C minor
pub const KK_MINOR_PROFILE: [f32; N_PITCH_CLASSES] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key templates for all 24 keys
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    major: [f32; N_PITCH_CLASSES],
    minor: [f32; N_PITCH_CLASSES],
}

impl KeyTemplates {
    /// Create new key templates with Krumhansl-Kessler profiles
    pub fn new() -> Self {
        Self {
            major: normalize(KK_MAJOR_PROFILE),
            minor: normalize(KK_MINOR_PROFILE),
        }
    }

    /// Major profile with its tonic at `tonic` (0 = C)
    pub fn major_template(&self, tonic: usize) -> [f32; N_PITCH_CLASSES] {
        rotate(&self.major, tonic)
    }

    /// Minor profile with its tonic at `tonic` (0 = C)
    pub fn minor_template(&self, tonic: usize) -> [f32; N_PITCH_CLASSES] {
        rotate(&self.minor, tonic)
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(profile: [f32; N_PITCH_CLASSES]) -> [f32; N_PITCH_CLASSES] {
    let sum: f32 = profile.iter().sum();
    profile.map(|v| v / sum)
}

/// Shift a profile up by `steps` semitones: `out[i] = profile[i - steps]`
pub(crate) fn rotate(
    profile: &[f32; N_PITCH_CLASSES],
    steps: usize,
) -> [f32; N_PITCH_CLASSES] {
    let steps = steps % N_PITCH_CLASSES;
    std::array::from_fn(|i| profile[(i + N_PITCH_CLASSES - steps) % N_PITCH_CLASSES])
}
