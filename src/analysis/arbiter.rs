//! Result arbitration
//!
//! Chords and melody each come from two independent sources. The arbiter is a
//! pure function `(primary, fallback, policy) -> chosen` so the selection rule
//! can be swapped without touching the strategies.
//!
//! The default rule, [`ArbitrationPolicy::LargerCount`], keeps whichever result
//! holds more elements. It has no confidence grounding at all: a recognizer
//! that emits more segments is not necessarily more accurate.
//! [`ArbitrationPolicy::PrimaryUnlessEmpty`] only falls back on an empty
//! primary.

use serde::{Deserialize, Serialize};

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Triad template matching over beat-averaged chroma
    TemplateMatching,
    /// Chroma peak at each beat, root only
    RootPeak,
    /// Segmentation of the f0 / voicing contour
    PitchContour,
    /// Notes supplied by an external melody source
    AlternateSource,
}

/// Output of one strategy, tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult<T> {
    /// Producing strategy
    pub provenance: Provenance,
    /// Produced elements
    pub items: Vec<T>,
}

impl<T> StrategyResult<T> {
    /// Wrap a strategy's output
    pub fn new(provenance: Provenance, items: Vec<T>) -> Self {
        Self { provenance, items }
    }

    /// A strategy that produced nothing
    pub fn empty(provenance: Provenance) -> Self {
        Self::new(provenance, Vec::new())
    }

    /// Number of produced elements
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Outcome of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Keep the primary result
    Primary,
    /// Replace it with the fallback result
    Fallback,
}

/// A rule deciding between a primary and a fallback result
pub trait SelectionPolicy {
    /// Decide from the element counts of both results
    fn choose(&self, primary_count: usize, fallback_count: usize) -> Choice;
}

/// Fallback wins only when it has strictly more elements
#[derive(Debug, Clone, Copy, Default)]
pub struct LargerCount;

impl SelectionPolicy for LargerCount {
    fn choose(&self, primary_count: usize, fallback_count: usize) -> Choice {
        if fallback_count > primary_count {
            Choice::Fallback
        } else {
            Choice::Primary
        }
    }
}

/// Fallback is used only when the primary produced nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryUnlessEmpty;

impl SelectionPolicy for PrimaryUnlessEmpty {
    fn choose(&self, primary_count: usize, fallback_count: usize) -> Choice {
        if primary_count == 0 && fallback_count > 0 {
            Choice::Fallback
        } else {
            Choice::Primary
        }
    }
}

/// Configurable selection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArbitrationPolicy {
    /// See [`LargerCount`]
    #[default]
    LargerCount,
    /// See [`PrimaryUnlessEmpty`]
    PrimaryUnlessEmpty,
}

impl SelectionPolicy for ArbitrationPolicy {
    fn choose(&self, primary_count: usize, fallback_count: usize) -> Choice {
        match self {
            ArbitrationPolicy::LargerCount => LargerCount.choose(primary_count, fallback_count),
            ArbitrationPolicy::PrimaryUnlessEmpty => {
                PrimaryUnlessEmpty.choose(primary_count, fallback_count)
            }
        }
    }
}

/// The selected result plus what it was selected against
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenResult<T> {
    /// Which side won
    pub choice: Choice,
    /// The winning result
    pub result: StrategyResult<T>,
    /// Element count of the primary result
    pub primary_count: usize,
    /// Element count of the fallback result
    pub fallback_count: usize,
}

impl<T> ChosenResult<T> {
    /// Provenance of the winning result
    pub fn provenance(&self) -> Provenance {
        self.result.provenance
    }

    /// Consume into the winning elements
    pub fn into_items(self) -> Vec<T> {
        self.result.items
    }
}

/// Select between two strategy results
///
/// # Example
///
/// ```
/// use chordsketch::analysis::arbiter::{arbitrate, Choice, LargerCount, Provenance, StrategyResult};
///
/// let primary = StrategyResult::new(Provenance::TemplateMatching, vec![1, 2]);
/// let fallback = StrategyResult::new(Provenance::RootPeak, vec![1, 2, 3]);
/// let chosen = arbitrate(primary, fallback, &LargerCount);
/// assert_eq!(chosen.choice, Choice::Fallback);
/// assert_eq!(chosen.provenance(), Provenance::RootPeak);
/// ```
pub fn arbitrate<T, P>(
    primary: StrategyResult<T>,
    fallback: StrategyResult<T>,
    policy: &P,
) -> ChosenResult<T>
where
    P: SelectionPolicy + ?Sized,
{
    let primary_count = primary.count();
    let fallback_count = fallback.count();
    let choice = policy.choose(primary_count, fallback_count);

    log::debug!(
        "Arbitration {:?}({}) vs {:?}({}) -> {:?}",
        primary.provenance,
        primary_count,
        fallback.provenance,
        fallback_count,
        choice
    );

    let result = match choice {
        Choice::Primary => primary,
        Choice::Fallback => fallback,
    };

    ChosenResult {
        choice,
        result,
        primary_count,
        fallback_count,
    }
}
