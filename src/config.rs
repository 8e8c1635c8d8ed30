//! Detection configuration: explicit per-strategy value objects, plus an
//! optional defaults file so frequently used thresholds don't have to be
//! retyped on every run.
//!
//! There is no global mutable configuration; every detector call receives its
//! own config value.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::decibel::SILENCE_FLOOR_DB;
use crate::error::{Result, SplitError};

/// Configuration for silence-run detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceConfig {
    /// Loudness window size in milliseconds
    pub window_ms: u64,
    /// Anything below this dBFS counts as a pause
    pub threshold_db: f64,
    /// How long the loudness must stay low to emit a candidate
    pub min_pause_ms: u64,
    /// Minimum spacing between kept split points
    pub min_segment_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            window_ms: 100,
            threshold_db: -35.0,
            min_pause_ms: 2000,
            min_segment_ms: 10000,
        }
    }
}

impl SilenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(SplitError::InvalidConfig(
                "loudness window must be positive".to_string(),
            ));
        }
        if self.min_pause_ms == 0 {
            return Err(SplitError::InvalidConfig(
                "minimum pause duration must be positive".to_string(),
            ));
        }
        if !self.threshold_db.is_finite()
            || self.threshold_db <= SILENCE_FLOOR_DB
            || self.threshold_db >= 0.0
        {
            return Err(SplitError::InvalidConfig(format!(
                "silence threshold must lie between {} and 0 dBFS, got {}",
                SILENCE_FLOOR_DB, self.threshold_db
            )));
        }
        Ok(())
    }
}

/// Configuration for beat-gap splitting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatGapConfig {
    /// Minimum beat-to-beat gap, in seconds, that triggers a split
    pub min_gap_sec: f64,
}

impl Default for BeatGapConfig {
    fn default() -> Self {
        Self { min_gap_sec: 0.0 }
    }
}

impl BeatGapConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_gap_sec.is_finite() || self.min_gap_sec < 0.0 {
            return Err(SplitError::InvalidConfig(format!(
                "minimum beat gap must be non-negative, got {}",
                self.min_gap_sec
            )));
        }
        Ok(())
    }
}

/// Configuration for tempo-change detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoChangeConfig {
    /// Length of one tempo analysis window, in seconds
    pub window_seconds: f64,
    /// Minimum |BPM delta| between adjacent windows that triggers a split
    pub tempo_delta_threshold: f64,
    /// Minimum distance past the last emitted split, in seconds
    pub min_segment_seconds: f64,
}

impl Default for TempoChangeConfig {
    fn default() -> Self {
        Self {
            window_seconds: 10.0,
            tempo_delta_threshold: 10.0,
            min_segment_seconds: 30.0,
        }
    }
}

impl TempoChangeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.window_seconds.is_finite() || self.window_seconds <= 0.0 {
            return Err(SplitError::InvalidConfig(
                "tempo window must be positive".to_string(),
            ));
        }
        if !self.tempo_delta_threshold.is_finite() || self.tempo_delta_threshold <= 0.0 {
            return Err(SplitError::InvalidConfig(
                "tempo delta threshold must be positive".to_string(),
            ));
        }
        if !self.min_segment_seconds.is_finite() || self.min_segment_seconds < 0.0 {
            return Err(SplitError::InvalidConfig(
                "minimum segment duration must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hop length used when sampling onset-strength curves (matches the beat
/// tracker's default analysis hop)
pub const DEFAULT_HOP_LENGTH: usize = 512;

/// Saved defaults that can override the built-in values
/// (`~/.config/mixsplit/defaults.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_db: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pause_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_segment_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

impl Defaults {
    /// Get the defaults file path (~/.config/mixsplit/defaults.toml)
    pub fn path() -> std::result::Result<PathBuf, io::Error> {
        let home = std::env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set")
        })?;
        Ok(Path::new(&home)
            .join(".config")
            .join("mixsplit")
            .join("defaults.toml"))
    }

    /// Load saved defaults; a missing file yields the empty defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Defaults::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| SplitError::InvalidConfig(format!("bad defaults file: {e}")))
    }

    /// Save these defaults, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SplitError::InvalidConfig(format!("cannot serialize defaults: {e}")))?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Apply these defaults on top of a silence config; explicit fields win.
    pub fn apply_to(&self, config: &mut SilenceConfig) {
        if let Some(v) = self.threshold_db {
            config.threshold_db = v;
        }
        if let Some(v) = self.min_pause_ms {
            config.min_pause_ms = v;
        }
        if let Some(v) = self.window_ms {
            config.window_ms = v;
        }
        if let Some(v) = self.min_segment_ms {
            config.min_segment_ms = v;
        }
    }
}
