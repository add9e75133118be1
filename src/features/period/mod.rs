//! Periodicity helpers
//!
//! - FFT autocorrelation
//! - Tempo from beat intervals

pub mod autocorrelation;
pub mod tempo;

pub use autocorrelation::autocorrelation;
pub use tempo::tempo_from_beats;
