//! # Dictation
//!
//! A melodic dictation ear-training quiz: listen to four notes, name them.
//!
//! ## Modules
//! - `note` - Note normalization, display form and asset keys
//! - `question` - Built-in question pool and note palette
//! - `session` - The quiz state machine and grading
//! - `playback` - Schedules, clip cache, sequencer and audio sinks
//! - `config` - YAML configuration
//! - `error` - Error types
//!
//! ## Example
//! ```rust
//! use dictation::{answers_match, normalize, to_display};
//!
//! assert_eq!(normalize("fa#")?.to_string(), "F#4");
//! assert_eq!(to_display(&normalize("re5")?), "Re5");
//! assert!(answers_match(&["do", "re"], &["C4", "D"])?);
//! # Ok::<(), dictation::QuizError>(())
//! ```

pub mod config;
pub mod error;
pub mod note;
pub mod playback;
pub mod question;
pub mod session;

pub use config::QuizConfig;
pub use error::*;
pub use note::{
    display_sequence, normalize, normalize_all, sharpen_token, to_asset_key, to_display,
    Accidental, CanonicalNote, Letter,
};
pub use question::{builtin_pool, Question, NOTE_PALETTE, QUESTION_POOL};
pub use session::{answers_match, Phase, QuizReport, QuizSession, Verdict};

use playback::{build_schedule, PlaybackSchedule, ScheduleTiming};

/// Schedule for a question line such as `"do re mi fa"`, using the reference
/// note and timing from `config`.
///
/// ```rust
/// use dictation::{schedule_question, QuizConfig};
///
/// let schedule = schedule_question("si3 do5 re5 sol", &QuizConfig::default())?;
/// assert_eq!(schedule.events.len(), 5);
/// assert_eq!(schedule.events[1].asset_key, "B3");
/// # Ok::<(), dictation::QuizError>(())
/// ```
pub fn schedule_question(line: &str, config: &QuizConfig) -> Result<PlaybackSchedule, QuizError> {
    let question = Question::parse(line)?;
    let timing = ScheduleTiming::from_config(config, config.note_duration);
    Ok(build_schedule(
        &config.reference_note,
        question.notes(),
        &timing,
    ))
}
