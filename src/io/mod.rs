//! Input feature containers
//!
//! Typed, validated holders for the features produced by upstream extractors.

pub mod features;

pub use features::{ChromaMatrix, FeatureSet, LoudnessEnvelope, PitchContour, N_PITCH_CLASSES};
