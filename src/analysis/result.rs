//! Analysis result types
//!
//! Everything here is created fresh per analysis call. Segment-like types
//! serialize as compact tuples (`[start, end, label]`, `[index, start, end]`,
//! ...) so the record keeps the field layout downstream consumers expect.

use super::metadata::AnalysisDiagnostics;
use crate::error::AnalysisError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Pitch-class names, index 0 = C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Key tonic spellings, index 0 = C (Eb, Ab and Bb written flat)
pub const KEY_TONIC_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Name of a pitch class (index taken modulo 12)
pub fn pitch_class_name(pitch_class: usize) -> &'static str {
    NOTE_NAMES[pitch_class % 12]
}

/// Parse a pitch-class name, accepting sharp and flat spellings
///
/// # Example
///
/// ```
/// use chordsketch::analysis::result::pitch_class_from_name;
///
/// assert_eq!(pitch_class_from_name("C#"), Some(1));
/// assert_eq!(pitch_class_from_name("Db"), Some(1));
/// assert_eq!(pitch_class_from_name("H"), None);
/// ```
pub fn pitch_class_from_name(name: &str) -> Option<u8> {
    let pc = match name {
        "C" | "B#" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" | "Fb" => 4,
        "F" | "E#" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" | "Cb" => 11,
        _ => return None,
    };
    Some(pc)
}

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

impl Mode {
    /// Lowercase mode name ("major" / "minor")
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl FromStr for Mode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Mode::Major),
            "minor" => Ok(Mode::Minor),
            other => Err(AnalysisError::InvalidInput(format!("Unknown mode '{}'", other))),
        }
    }
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// Tonic pitch class (0 = C, 1 = C#, ..., 11 = B)
    pub tonic: u8,
    /// Major or minor
    pub mode: Mode,
}

impl Key {
    /// Create a key; the tonic is reduced modulo 12
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Tonic name (e.g., "F#", "Bb")
    pub fn tonic_name(&self) -> &'static str {
        KEY_TONIC_NAMES[self.tonic as usize % 12]
    }

    /// Get key name in musical notation (e.g., "C", "Am", "F#", "Ebm")
    ///
    /// # Example
    ///
    /// ```
    /// use chordsketch::analysis::result::{Key, Mode};
    ///
    /// assert_eq!(Key::new(0, Mode::Major).name(), "C");
    /// assert_eq!(Key::new(9, Mode::Minor).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self.mode {
            Mode::Major => self.tonic_name().to_string(),
            Mode::Minor => format!("{}m", self.tonic_name()),
        }
    }

    /// Build a key from a tonic name and mode
    pub fn from_name(tonic_name: &str, mode: Mode) -> Option<Self> {
        pitch_class_from_name(tonic_name).map(|pc| Key::new(pc, mode))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode.as_str())
    }
}

/// Wire form of a key: `{tonic_name, mode}`, both empty when unknown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KeyRepr {
    tonic_name: String,
    mode: String,
}

impl From<Key> for KeyRepr {
    fn from(key: Key) -> Self {
        Self {
            tonic_name: key.tonic_name().to_string(),
            mode: key.mode.as_str().to_string(),
        }
    }
}

impl TryFrom<KeyRepr> for Key {
    type Error = AnalysisError;

    fn try_from(repr: KeyRepr) -> Result<Self, Self::Error> {
        let mode: Mode = repr.mode.parse()?;
        Key::from_name(&repr.tonic_name, mode).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("Unknown tonic '{}'", repr.tonic_name))
        })
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        KeyRepr::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = KeyRepr::deserialize(deserializer)?;
        Key::try_from(repr).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional key: `None` becomes `{"tonic_name": "", "mode": ""}`
pub(crate) mod optional_key {
    use super::{Key, KeyRepr};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(key: &Option<Key>, serializer: S) -> Result<S::Ok, S::Error> {
        key.map(KeyRepr::from)
            .unwrap_or_default()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Key>, D::Error> {
        let repr = KeyRepr::deserialize(deserializer)?;
        if repr.tonic_name.is_empty() {
            return Ok(None);
        }
        Key::try_from(repr)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Musical time signature (only the numerator is ever inferred)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats per bar
    pub numerator: u32,
    /// Always 4
    pub denominator: u32,
    /// Confidence of the inferred numerator (0.0-0.99), absent when not scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TimeSignature {
    /// The only denominator this crate reports
    pub const DENOMINATOR: u32 = 4;

    /// Create a time signature over a quarter-note denominator
    pub fn new(numerator: u32, confidence: Option<f32>) -> Self {
        Self {
            numerator,
            denominator: Self::DENOMINATOR,
            confidence,
        }
    }

    /// 4/4 with confidence 0.5, the fallback when meter cannot be inferred
    pub fn common_time() -> Self {
        Self::new(4, Some(0.5))
    }

    /// Beats per bar
    pub fn beats_per_bar(&self) -> u32 {
        self.numerator
    }

    /// Get name as string (e.g., "4/4", "3/4", "6/4")
    pub fn name(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

/// A bar derived from the beat grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u32, f32, f32)", into = "(u32, f32, f32)")]
pub struct Bar {
    /// 1-based bar number
    pub index: u32,
    /// Bar start in seconds
    pub start: f32,
    /// Bar end in seconds
    pub end: f32,
}

impl From<(u32, f32, f32)> for Bar {
    fn from((index, start, end): (u32, f32, f32)) -> Self {
        Self { index, start, end }
    }
}

impl From<Bar> for (u32, f32, f32) {
    fn from(bar: Bar) -> Self {
        (bar.index, bar.start, bar.end)
    }
}

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    /// Root, major third, fifth
    Major,
    /// Root, minor third, fifth
    Minor,
}

impl ChordQuality {
    /// Label suffix ("Maj" / "Min")
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "Maj",
            ChordQuality::Minor => "Min",
        }
    }
}

/// Chord label: `<root>:<quality>` or `N` for no detected harmony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordLabel {
    /// Silence or noise
    NoChord,
    /// A triad
    Chord {
        /// Root pitch class (0-11)
        root: u8,
        /// Triad quality
        quality: ChordQuality,
    },
}

impl ChordLabel {
    /// Build a triad label; the root is reduced modulo 12
    pub fn chord(root: u8, quality: ChordQuality) -> Self {
        ChordLabel::Chord {
            root: root % 12,
            quality,
        }
    }

    /// True for the "N" label
    pub fn is_no_chord(&self) -> bool {
        matches!(self, ChordLabel::NoChord)
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordLabel::NoChord => write!(f, "N"),
            ChordLabel::Chord { root, quality } => {
                write!(f, "{}:{}", pitch_class_name(*root as usize), quality.suffix())
            }
        }
    }
}

impl FromStr for ChordLabel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "N" {
            return Ok(ChordLabel::NoChord);
        }
        let invalid = || AnalysisError::InvalidInput(format!("Invalid chord label '{}'", s));
        let (root, quality) = s.split_once(':').ok_or_else(invalid)?;
        let root = pitch_class_from_name(root).ok_or_else(invalid)?;
        let quality = match quality {
            "Maj" | "maj" => ChordQuality::Major,
            "Min" | "min" => ChordQuality::Minor,
            _ => return Err(invalid()),
        };
        Ok(ChordLabel::chord(root, quality))
    }
}

impl Serialize for ChordLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChordLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A labelled chord span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32, ChordLabel)", into = "(f32, f32, ChordLabel)")]
pub struct ChordSegment {
    /// Segment start in seconds
    pub start: f32,
    /// Segment end in seconds
    pub end: f32,
    /// Chord label
    pub label: ChordLabel,
}

impl ChordSegment {
    /// Create a chord segment
    pub fn new(start: f32, end: f32, label: ChordLabel) -> Self {
        Self { start, end, label }
    }

    /// Segment length in seconds
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}

impl From<(f32, f32, ChordLabel)> for ChordSegment {
    fn from((start, end, label): (f32, f32, ChordLabel)) -> Self {
        Self { start, end, label }
    }
}

impl From<ChordSegment> for (f32, f32, ChordLabel) {
    fn from(seg: ChordSegment) -> Self {
        (seg.start, seg.end, seg.label)
    }
}

/// A melody note event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32, u8)", into = "(f32, f32, u8)")]
pub struct MelodyNote {
    /// Note onset in seconds
    pub start: f32,
    /// Note release in seconds
    pub end: f32,
    /// MIDI note number
    pub midi: u8,
}

impl MelodyNote {
    /// Create a melody note
    pub fn new(start: f32, end: f32, midi: u8) -> Self {
        Self { start, end, midi }
    }
}

impl From<(f32, f32, u8)> for MelodyNote {
    fn from((start, end, midi): (f32, f32, u8)) -> Self {
        Self { start, end, midi }
    }
}

impl From<MelodyNote> for (f32, f32, u8) {
    fn from(note: MelodyNote) -> Self {
        (note.start, note.end, note.midi)
    }
}

/// A loudness sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct DynamicsSample {
    /// Time in seconds
    pub time: f32,
    /// Level in dB relative to the loudest frame (<= 0)
    pub level_db: f32,
}

impl From<(f32, f32)> for DynamicsSample {
    fn from((time, level_db): (f32, f32)) -> Self {
        Self { time, level_db }
    }
}

impl From<DynamicsSample> for (f32, f32) {
    fn from(sample: DynamicsSample) -> Self {
        (sample.time, sample.level_db)
    }
}

/// Complete analysis record
///
/// Owned by the call that produced it and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Tempo in BPM
    pub tempo: f32,

    /// Beat times in seconds
    pub beats: Vec<f32>,

    /// Inferred time signature
    pub time_signature: TimeSignature,

    /// Inferred key, `None` when no pitch-class data was usable
    #[serde(with = "optional_key")]
    pub key: Option<Key>,

    /// Chord segments snapped to the beat grid
    pub chords: Vec<ChordSegment>,

    /// Chord segments as produced by the selected recognizer
    pub chords_raw: Vec<ChordSegment>,

    /// Melody note events
    pub melody_notes: Vec<MelodyNote>,

    /// Loudness trace
    pub dynamics: Vec<DynamicsSample>,

    /// Bar grid
    pub bars: Vec<Bar>,

    /// Beats per bar used to build the bar grid (the time signature numerator)
    pub beats_per_bar: u32,

    /// Analysed duration in seconds
    pub duration: f32,

    /// Counts, provenance and timing
    pub diagnostics: AnalysisDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name() {
        assert_eq!(Key::new(0, Mode::Major).name(), "C");
        assert_eq!(Key::new(6, Mode::Major).name(), "F#");
        assert_eq!(Key::new(9, Mode::Minor).name(), "Am");
        assert_eq!(Key::new(13, Mode::Minor).name(), "C#m");
    }

    #[test]
    fn test_key_tonic_spelling() {
        assert_eq!(Key::new(3, Mode::Major).name(), "Eb");
        assert_eq!(Key::new(8, Mode::Major).name(), "Ab");
        assert_eq!(Key::new(10, Mode::Minor).name(), "Bbm");
        assert_eq!(Key::new(1, Mode::Major).name(), "C#");

        let json = serde_json::to_value(Key::new(8, Mode::Minor)).unwrap();
        assert_eq!(json, serde_json::json!({"tonic_name": "Ab", "mode": "minor"}));
        let back: Key = serde_json::from_value(json).unwrap();
        assert_eq!(back, Key::new(8, Mode::Minor));
    }

    #[test]
    fn test_key_from_name_accepts_flats() {
        assert_eq!(Key::from_name("Eb", Mode::Major), Some(Key::new(3, Mode::Major)));
        assert_eq!(Key::from_name("Bb", Mode::Minor), Some(Key::new(10, Mode::Minor)));
        assert_eq!(Key::from_name("X", Mode::Major), None);
    }

    #[test]
    fn test_key_wire_form() {
        let json = serde_json::to_value(Key::new(7, Mode::Minor)).unwrap();
        assert_eq!(json, serde_json::json!({"tonic_name": "G", "mode": "minor"}));

        let back: Key = serde_json::from_value(json).unwrap();
        assert_eq!(back, Key::new(7, Mode::Minor));
    }

    #[test]
    fn test_chord_label_display() {
        assert_eq!(ChordLabel::chord(7, ChordQuality::Major).to_string(), "G:Maj");
        assert_eq!(ChordLabel::chord(9, ChordQuality::Minor).to_string(), "A:Min");
        assert_eq!(ChordLabel::NoChord.to_string(), "N");
    }

    #[test]
    fn test_chord_label_parse() {
        assert_eq!("N".parse::<ChordLabel>().unwrap(), ChordLabel::NoChord);
        assert_eq!(
            "Bb:Min".parse::<ChordLabel>().unwrap(),
            ChordLabel::chord(10, ChordQuality::Minor)
        );
        assert!("G".parse::<ChordLabel>().is_err());
        assert!("G:dim".parse::<ChordLabel>().is_err());
    }

    #[test]
    fn test_segment_tuple_wire_form() {
        let seg = ChordSegment::new(0.5, 1.0, ChordLabel::chord(0, ChordQuality::Major));
        assert_eq!(serde_json::to_string(&seg).unwrap(), r#"[0.5,1.0,"C:Maj"]"#);

        let bar = Bar { index: 1, start: 0.0, end: 2.0 };
        assert_eq!(serde_json::to_string(&bar).unwrap(), "[1,0.0,2.0]");

        let note = MelodyNote::new(0.25, 0.5, 60);
        assert_eq!(serde_json::to_string(&note).unwrap(), "[0.25,0.5,60]");
    }

    #[test]
    fn test_time_signature_name() {
        assert_eq!(TimeSignature::new(3, None).name(), "3/4");
        assert_eq!(TimeSignature::common_time().name(), "4/4");
        assert_eq!(TimeSignature::common_time().beats_per_bar(), 4);
    }

    #[test]
    fn test_time_signature_omits_missing_confidence() {
        let json = serde_json::to_value(TimeSignature::new(6, None)).unwrap();
        assert_eq!(json, serde_json::json!({"numerator": 6, "denominator": 4}));
    }
}
