//! # Question Pool
//!
//! The fixed set of four-note dictation questions, the note palette offered to
//! the student, and the audio clips that playback needs.
//!
//! Questions are written in Latin notation exactly as a teacher would dictate
//! them: `"do re mi fa"`, `"si3 do5 re5 sol"`. Octave 4 is implicit.
//!
//! ## Entry Points
//! - [`QUESTION_POOL`] - The built-in questions
//! - [`Question::parse()`] - Parse and validate one question line
//! - [`builtin_pool()`] - All built-in questions, parsed
//! - [`required_asset_keys()`] - Audio clips a pool (plus the reference note) needs

use crate::error::QuizError;
use crate::note::{normalize, normalize_all, to_asset_key, CanonicalNote};
use std::collections::BTreeSet;
use std::fmt;

/// Number of notes in every question and answer
pub const NOTES_PER_QUESTION: usize = 4;

/// Built-in dictation questions. Repeats are intentional: they weight the draw.
pub const QUESTION_POOL: &[&str] = &[
    "do re mi fa",
    "fa sol la si",
    "re do si sol",
    "do si3 do re",
    "fa mi fa sol",
    "re mi fa la",
    "do re mi do",
    "fa sol la fa",
    "fa mi re fa",
    "si3 do5 re5 sol",
    "do si do re",
    "fa mi fa la",
    "re5 si sol re5",
    "sol la si re5",
    "do mi re si3",
    "fa la sol re5",
    "si3 sol fa re",
    "sol la sol re5",
    "do mi re mi",
    "la la do5 la",
    "re5 si sol fa",
    "re fa la re5",
    "mi do re mi",
    "sol fa mi re",
    "mi re do mi",
    "sol la sol fa#",
    "do re mi sol",
    "sol fa# sol la",
    "mi do mi sol",
    "sol la si re5",
    "mi sol mi do",
    "do5 sol fa mi",
    "sol la sol fa",
    "si la sol fa",
    "sol do5 si la",
    "re fa mi re",
    "sol mi fa fa#",
    "re mi fa mi",
    "do si3 do re",
    "re mi fa sol",
    "do re mi fa",
    "re5 do5 si la",
    "re5 do4 si do5",
    "mi sol fa# fa",
    "la do5 si la",
    "mi fa sol la",
    "fa mi re mi",
    "re mi fa la",
    "sol la si re5",
];

/// Note buttons offered to the student, lowest to highest (B3 through D5)
pub const NOTE_PALETTE: &[&str] = &[
    "si3", "do4", "re4", "mi4", "fa4", "sol4", "la4", "si4", "do5", "re5",
];

/// Clips loaded at startup: the palette range plus the sharps it can produce
pub const PRELOAD_NOTES: &[&str] = &[
    "B3", "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", "C5",
    "C#5", "D5",
];

/// An immutable four-note question.
///
/// Keeps the tokens as written (for echoing back) and their canonical notes
/// (for grading and playback).
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    tokens: Vec<String>,
    notes: Vec<CanonicalNote>,
}

impl Question {
    /// Parse a whitespace-separated line of exactly four note tokens.
    ///
    /// # Example
    /// ```rust
    /// use dictation::Question;
    ///
    /// let q = Question::parse("si3 do5 re5 sol")?;
    /// assert_eq!(q.to_string(), "Si3, Do5, Re5, Sol");
    /// # Ok::<(), dictation::QuizError>(())
    /// ```
    pub fn parse(line: &str) -> Result<Self, QuizError> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.len() != NOTES_PER_QUESTION {
            return Err(QuizError::InvalidQuestion {
                question: line.to_string(),
                reason: format!(
                    "expected {} notes, found {}",
                    NOTES_PER_QUESTION,
                    tokens.len()
                ),
            });
        }
        let notes = normalize_all(&tokens).map_err(|e| QuizError::InvalidQuestion {
            question: line.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { tokens, notes })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn notes(&self) -> &[CanonicalNote] {
        &self.notes
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::note::display_sequence(&self.notes))
    }
}

/// Parse every line of a question pool.
pub fn parse_pool<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Question>, QuizError> {
    lines.iter().map(|l| Question::parse(l.as_ref())).collect()
}

/// The built-in pool, parsed.
pub fn builtin_pool() -> Result<Vec<Question>, QuizError> {
    parse_pool(QUESTION_POOL)
}

/// Asset keys needed to play every question in `pool` after `reference`,
/// sorted and without duplicates.
pub fn required_asset_keys(pool: &[Question], reference: &CanonicalNote) -> Vec<String> {
    let mut keys: BTreeSet<String> = pool
        .iter()
        .flat_map(|q| q.notes().iter().map(to_asset_key))
        .collect();
    keys.insert(to_asset_key(reference));
    keys.into_iter().collect()
}

/// Asset keys for [`PRELOAD_NOTES`].
pub fn preload_asset_keys() -> Result<Vec<String>, QuizError> {
    PRELOAD_NOTES
        .iter()
        .map(|n| normalize(n).map(|note| to_asset_key(&note)))
        .collect()
}
