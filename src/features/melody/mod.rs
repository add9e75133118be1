//! Melody transcription
//!
//! Turn a monophonic f0 / voicing contour into discrete note events.

pub mod segmenter;

pub use segmenter::{hz_to_midi, midi_to_hz, segment_melody};
