//! Split a continuous DJ mix recording into individual track files.
//!
//! Loads the mix, profiles its loudness, finds pauses between tracks, shows
//! a preview of the split points, and (after confirmation) exports one audio
//! file per track plus a metadata batch.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;

use mixsplit::detectors::silence;
use mixsplit::{
    decode, loudness, Defaults, SegmentExporter, SilenceConfig, TrackTitle, WavEncoder,
};
use tracing_subscriber::EnvFilter;

fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn print_usage() {
    println!("DJ Mix Splitter");
    println!("===============");
    println!();
    println!("Detects pauses in a continuous mix recording and exports each track");
    println!("as its own WAV file, with split timestamps saved as JSON and text.");
    println!();
    println!("Usage: split_mix [OPTIONS] <MIX_FILE>");
    println!();
    println!("Options:");
    println!("  --threshold <DB>      Loudness below this counts as a pause (default: -35)");
    println!("  --min-pause <MS>      Pause must last this long (default: 2000)");
    println!("  --window-ms <MS>      Loudness window size (default: 100)");
    println!("  --min-segment <MS>    Minimum track length (default: 10000)");
    println!("  --output <DIR>, -o    Output directory (default: split_tracks)");
    println!("  --titles <JSON>       Tracklist file: [{{\"artist\": ..., \"title\": ...}}]");
    println!("  --dump                Print the loudness curve (tab-separated) and exit");
    println!("  --yes, -y             Export without asking for confirmation");
    println!("  --save-defaults       Save the given options as defaults and exit");
    println!("  --verbose, -v         Show detailed analysis logging");
    println!();
    println!("Examples:");
    println!("  split_mix funeralmix.mp3");
    println!("  split_mix --threshold -45 --min-pause 1500 -o tracks mix.wav");
}

fn arg_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse::<T>().ok())
}

fn load_titles(path: &str) -> Result<Vec<TrackTitle>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn confirm_export(num_segments: usize) -> bool {
    print!(
        "\nExport all {} segments as separate files? (y/n): ",
        num_segments
    );
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let dump = args.iter().any(|a| a == "--dump");
    let assume_yes = args.iter().any(|a| a == "--yes" || a == "-y");
    let save_defaults = args.iter().any(|a| a == "--save-defaults");

    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut config = SilenceConfig::default();
    match Defaults::load() {
        Ok(defaults) => defaults.apply_to(&mut config),
        Err(e) => eprintln!("Warning: ignoring defaults file: {}", e),
    }

    let threshold_db = arg_value::<f64>(&args, "--threshold");
    let min_pause_ms = arg_value::<u64>(&args, "--min-pause");
    let window_ms = arg_value::<u64>(&args, "--window-ms");
    let min_segment_ms = arg_value::<u64>(&args, "--min-segment");

    if let Some(v) = threshold_db {
        config.threshold_db = v;
    }
    if let Some(v) = min_pause_ms {
        config.min_pause_ms = v;
    }
    if let Some(v) = window_ms {
        config.window_ms = v;
    }
    if let Some(v) = min_segment_ms {
        config.min_segment_ms = v;
    }

    let output_dir = args
        .iter()
        .position(|a| a == "--output" || a == "-o")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "split_tracks".to_string());

    let titles_path = args
        .iter()
        .position(|a| a == "--titles")
        .and_then(|i| args.get(i + 1))
        .cloned();

    if save_defaults {
        let defaults = Defaults {
            threshold_db,
            min_pause_ms,
            window_ms,
            min_segment_ms,
            output_dir: Some(output_dir),
        };
        match defaults.save() {
            Ok(()) => {
                println!("Defaults saved");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error: failed to save defaults: {}", e);
                process::exit(1);
            }
        }
    }

    let option_flags = [
        "--threshold",
        "--min-pause",
        "--window-ms",
        "--min-segment",
        "--output",
        "-o",
        "--titles",
    ];

    let mix_file = args
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, a)| !a.starts_with('-'))
        .find(|(i, _)| !option_flags.contains(&args[i - 1].as_str()))
        .map(|(_, a)| a.clone());

    let mix_file = match mix_file {
        Some(f) => f,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    if !Path::new(&mix_file).exists() {
        eprintln!("Error: File not found: {}", mix_file);
        process::exit(1);
    }

    let titles = match titles_path {
        Some(p) => match load_titles(&p) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: cannot read tracklist {}: {}", p, e);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    println!("DJ Mix Splitter");
    println!("===============");
    println!("File: {}", mix_file);
    println!();

    let timeline = match decode::load(Path::new(&mix_file)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let duration_sec = timeline.duration_ms() / 1000;
    println!(
        "Audio: {}Hz, {}ch, duration: {} ({}s)",
        timeline.sample_rate(),
        timeline.num_channels(),
        format_timestamp(duration_sec),
        duration_sec
    );
    println!(
        "Detection: threshold {} dBFS, pause >= {}ms, window {}ms, min track {}ms",
        config.threshold_db, config.min_pause_ms, config.window_ms, config.min_segment_ms
    );
    println!();

    if dump {
        let curve = match loudness::profile(&timeline, config.window_ms) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
        println!("# offset_ms\tloudness_db");
        for s in curve.samples() {
            println!("{}\t{:.2}", s.offset_ms, s.db);
        }
        process::exit(0);
    }

    let split_points = match silence::split_on_silence(&timeline, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let segments = split_points.segments();
    println!("Split Preview:");
    for seg in &segments {
        let start = seg.start_ms / 1000;
        let end = seg.end_ms / 1000;
        let name = titles
            .get(seg.index)
            .map(|t| format!(" - {} - {}", t.artist, t.title))
            .unwrap_or_default();
        println!(
            "  Track {}: {}s -> {}s ({} seconds){}",
            seg.track(),
            start,
            end,
            end - start,
            name
        );
    }

    if segments.len() <= 1 {
        println!();
        println!("No pauses detected; the whole mix would export as one track.");
        println!("Tips:");
        println!("  - Try raising --threshold (current: {})", config.threshold_db);
        println!("  - Try lowering --min-pause (current: {})", config.min_pause_ms);
        println!("  - Use --dump to inspect the loudness curve");
    }

    if !assume_yes && !confirm_export(segments.len()) {
        println!("\nExport canceled. You can adjust parameters and re-run.");
        process::exit(0);
    }

    let encoder = WavEncoder;
    let exporter = SegmentExporter::new(&encoder, PathBuf::from(&output_dir));
    let cancel = AtomicBool::new(false);

    match exporter.export_all(&timeline, &split_points, &titles, &cancel) {
        Ok(metadata) => {
            println!();
            for m in &metadata {
                println!("Exported: {}", m.log_line());
            }
            println!();
            println!("All tracks and timestamp logs saved to: {}", output_dir);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
