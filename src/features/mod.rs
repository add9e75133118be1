//! Structure inference modules
//!
//! Each module turns one kind of upstream feature into musical labels:
//! - Beat grid structure (time signature, bars)
//! - Tempo from beat intervals
//! - Key detection
//! - Chord recognition and boundary quantization
//! - Melody note segmentation
//! - Loudness trace

pub mod beat_tracking;
pub mod chords;
pub mod dynamics;
pub mod key;
pub mod melody;
pub mod period;
