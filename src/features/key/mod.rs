//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Kessler templates (24 keys)
//! - Template matching against the averaged chroma profile

pub mod detector;
pub mod templates;

pub use detector::{detect_key, detect_key_from_profile};
pub use templates::KeyTemplates;

use crate::analysis::result::Key;

/// Key detection result
#[derive(Debug, Clone)]
pub struct KeyDetectionResult {
    /// Detected key (best match)
    pub key: Key,

    /// Dot product of the profile with the winning template
    pub score: f32,

    /// All 24 key scores in examination order (C major, C minor, C# major, ...)
    pub scores: Vec<(Key, f32)>,
}
