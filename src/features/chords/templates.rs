//! Binary triad templates
//!
//! Major and minor triads as 12-bin indicator vectors rooted on C; the other
//! roots are rotations.

use crate::analysis::result::{ChordLabel, ChordQuality};
use crate::features::key::templates::rotate;
use crate::io::N_PITCH_CLASSES;

/// Root, major third, fifth
pub const MAJOR_TRIAD: [f32; N_PITCH_CLASSES] = [1., 0., 0., 0., 1., 0., 0., 1., 0., 0., 0., 0.];

/// Root, minor third, fifth
pub const MINOR_TRIAD: [f32; N_PITCH_CLASSES] = [1., 0., 0., 1., 0., 0., 0., 1., 0., 0., 0., 0.];

/// Classify a beat-averaged chroma vector as a triad
///
/// Vectors whose total energy is below `min_energy` are labelled "N".
/// Otherwise the 24 root/quality hypotheses are scored by dot product, roots
/// in ascending order with major examined before minor; a later hypothesis
/// must score strictly higher to win, so ties keep the earliest one.
pub fn classify_triad(chroma: &[f32; N_PITCH_CLASSES], min_energy: f32) -> ChordLabel {
    let energy: f32 = chroma.iter().sum();
    if !(energy >= min_energy) {
        return ChordLabel::NoChord;
    }

    let mut best = ChordLabel::NoChord;
    let mut best_score = f32::NEG_INFINITY;
    for root in 0..N_PITCH_CLASSES {
        for (quality, template) in [
            (ChordQuality::Major, &MAJOR_TRIAD),
            (ChordQuality::Minor, &MINOR_TRIAD),
        ] {
            let rotated = rotate(template, root);
            let score: f32 = chroma.iter().zip(rotated.iter()).map(|(c, t)| c * t).sum();
            if score > best_score {
                best_score = score;
                best = ChordLabel::chord(root as u8, quality);
            }
        }
    }
    best
}
