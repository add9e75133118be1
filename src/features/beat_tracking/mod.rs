//! Beat grid structure
//!
//! Derive metrical structure from an existing beat grid:
//! - Bar grouping
//! - Time signature (beats per bar) inference

pub mod bars;
pub mod time_signature;

pub use bars::bars_from_beats;
pub use time_signature::{detect_time_signature, estimate_time_signature, TimeSignatureMethod};
