//! # Quiz Configuration
//!
//! Settings for a quiz run, read from YAML. Every key is optional:
//!
//! ```yaml
//! total-questions: 15
//! reward: 250
//! note-duration: 0.5
//! min-duration: 0.2
//! max-duration: 0.8
//! lead-in: 0.2
//! reference-gap: 1.0
//! reference-note: do4
//! retry-on-incorrect: false
//! asset-dir: sounds
//! asset-extension: wav
//! seed: 42
//! ```
//!
//! Durations are in seconds. `note-duration` is clamped into
//! `[min-duration, max-duration]` rather than rejected, the same way the
//! duration control in the quiz only moves within its range.

use crate::error::QuizError;
use crate::note::{normalize, CanonicalNote};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOTAL_QUESTIONS: u32 = 15;
pub const DEFAULT_REWARD: u32 = 250;
pub const DEFAULT_NOTE_DURATION: f64 = 0.5;
pub const MIN_NOTE_DURATION: f64 = 0.2;
pub const MAX_NOTE_DURATION: f64 = 0.8;
pub const DEFAULT_LEAD_IN: f64 = 0.2;
pub const DEFAULT_REFERENCE_GAP: f64 = 1.0;

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    pub total_questions: Option<u32>,
    pub reward: Option<u32>,
    pub note_duration: Option<f64>,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    pub lead_in: Option<f64>,
    pub reference_gap: Option<f64>,
    pub reference_note: Option<String>,
    pub retry_on_incorrect: Option<bool>,
    pub asset_dir: Option<PathBuf>,
    pub asset_extension: Option<String>,
    pub seed: Option<u64>,
}

/// Validated quiz settings
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub total_questions: u32,
    pub reward: u32,
    pub note_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    /// Delay before the reference note sounds
    pub lead_in: f64,
    /// Silence between the reference note and the first question note
    pub reference_gap: f64,
    pub reference_note: CanonicalNote,
    /// Keep the same question after a wrong answer instead of moving on
    pub retry_on_incorrect: bool,
    pub asset_dir: PathBuf,
    pub asset_extension: String,
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            reward: DEFAULT_REWARD,
            note_duration: DEFAULT_NOTE_DURATION,
            min_duration: MIN_NOTE_DURATION,
            max_duration: MAX_NOTE_DURATION,
            lead_in: DEFAULT_LEAD_IN,
            reference_gap: DEFAULT_REFERENCE_GAP,
            reference_note: CanonicalNote::new(
                crate::note::Letter::C,
                crate::note::Accidental::Natural,
                crate::note::DEFAULT_OCTAVE,
            ),
            retry_on_incorrect: false,
            asset_dir: PathBuf::from("sounds"),
            asset_extension: "wav".to_string(),
            seed: None,
        }
    }
}

impl QuizConfig {
    /// Parse a YAML document. An empty document yields the defaults.
    ///
    /// # Example
    /// ```rust
    /// use dictation::QuizConfig;
    ///
    /// let config = QuizConfig::from_yaml_str("total-questions: 5\nnote-duration: 2.0")?;
    /// assert_eq!(config.total_questions, 5);
    /// assert_eq!(config.note_duration, 0.8); // clamped
    /// # Ok::<(), dictation::QuizError>(())
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self, QuizError> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| QuizError::ConfigError(e.to_string()))?
        };
        Self::from_raw(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, QuizError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, QuizError> {
        let defaults = Self::default();

        let reference_note = match raw.reference_note {
            Some(ref token) => normalize(token).map_err(|e| {
                QuizError::ConfigError(format!("reference-note: {}", e))
            })?,
            None => defaults.reference_note,
        };

        let mut config = Self {
            total_questions: raw.total_questions.unwrap_or(defaults.total_questions),
            reward: raw.reward.unwrap_or(defaults.reward),
            note_duration: raw.note_duration.unwrap_or(defaults.note_duration),
            min_duration: raw.min_duration.unwrap_or(defaults.min_duration),
            max_duration: raw.max_duration.unwrap_or(defaults.max_duration),
            lead_in: raw.lead_in.unwrap_or(defaults.lead_in),
            reference_gap: raw.reference_gap.unwrap_or(defaults.reference_gap),
            reference_note,
            retry_on_incorrect: raw.retry_on_incorrect.unwrap_or(defaults.retry_on_incorrect),
            asset_dir: raw.asset_dir.unwrap_or(defaults.asset_dir),
            asset_extension: raw.asset_extension.unwrap_or(defaults.asset_extension),
            seed: raw.seed,
        };
        config.validate()?;
        config.note_duration = config.clamp_duration(config.note_duration);
        Ok(config)
    }

    /// Check ranges and consistency.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.total_questions == 0 {
            return Err(QuizError::ConfigError(
                "total-questions must be at least 1".to_string(),
            ));
        }
        if self.total_questions.checked_mul(self.reward).is_none() {
            return Err(QuizError::ConfigError(format!(
                "total-questions {} x reward {} overflows the score",
                self.total_questions, self.reward
            )));
        }
        for (name, value) in [
            ("note-duration", self.note_duration),
            ("min-duration", self.min_duration),
            ("max-duration", self.max_duration),
            ("lead-in", self.lead_in),
            ("reference-gap", self.reference_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuizError::ConfigError(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        if self.min_duration <= 0.0 || self.min_duration > self.max_duration {
            return Err(QuizError::ConfigError(format!(
                "duration range {}..{} is empty",
                self.min_duration, self.max_duration
            )));
        }
        let ext = self.asset_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(QuizError::ConfigError(format!(
                "invalid asset-extension '{}'",
                self.asset_extension
            )));
        }
        Ok(())
    }

    /// Clamp a note duration into the allowed range.
    pub fn clamp_duration(&self, seconds: f64) -> f64 {
        seconds.clamp(self.min_duration, self.max_duration)
    }

    /// Highest reachable score: every question answered correctly
    pub fn max_score(&self) -> u32 {
        self.total_questions.saturating_mul(self.reward)
    }

    /// Path of the clip for an asset key
    pub fn asset_path(&self, key: &str) -> PathBuf {
        self.asset_dir.join(format!(
            "{}.{}",
            key,
            self.asset_extension.trim_start_matches('.')
        ))
    }
}
