//! Example: Infer structure from extracted features
//!
//! Usage:
//!   cargo run --example analyze_features -- [--json] <features1.json> <features2.json> ...
//!
//! Each input is a serialized `FeatureSet` (beats, chroma, pitch contour,
//! loudness) produced by an upstream extractor.

use chordsketch::{analyze_features, AnalysisConfig, FeatureSet};
use std::env;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut json = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("Usage: analyze_features [--json] <features.json> ...");
        std::process::exit(2);
    }

    let config = AnalysisConfig::default();

    for path in &paths {
        let features: FeatureSet = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let record = analyze_features(&features, &config);

        if json {
            println!("{}", serde_json::to_string(&record)?);
            continue;
        }

        println!("{}:", path);
        println!("  Tempo: {:.2} BPM", record.tempo);
        println!(
            "  Time signature: {} (confidence: {:.2})",
            record.time_signature.name(),
            record.time_signature.confidence.unwrap_or(0.0)
        );
        match &record.key {
            Some(key) => println!("  Key: {}", key.name()),
            None => println!("  Key: unknown"),
        }
        println!("  Bars: {}", record.bars.len());
        println!(
            "  Chords: {} ({:?})",
            record.chords.len(),
            record.diagnostics.chord_source
        );
        for chord in record.chords.iter().take(8) {
            println!("    {:>7.2} - {:>7.2}  {}", chord.start, chord.end, chord.label);
        }
        println!(
            "  Melody notes: {} ({:?})",
            record.melody_notes.len(),
            record.diagnostics.melody_source
        );
        println!("  Duration: {:.2} s", record.duration);
        println!("  Processing time: {:.2} ms", record.diagnostics.processing_time_ms);
        for warning in &record.diagnostics.warnings {
            println!("  Warning: {}", warning);
        }
    }

    Ok(())
}
