//! # Error Types
//!
//! This module defines all error types for the dictation quiz.
//!
//! Note errors carry the offending token so callers can report exactly what
//! could not be read. Session errors are recoverable: an incomplete answer or
//! a finished session never corrupts state.
//!
//! ## Error Types
//! - `MalformedNote` - Token is empty or its octave digit is misplaced
//! - `UnrecognizedNote` - Token has a valid shape but an unknown note name
//! - `IncompleteAnswer` - Answer submitted before all notes were entered
//! - `SessionFinished` - Operation attempted after the last question
//! - `InvalidQuestion` - A question does not have exactly four valid notes
//! - `AssetLoad` - An audio clip could not be read or decoded
//! - `ConfigError` - Invalid YAML configuration
//! - `Io` - Filesystem errors
//!
//! ## Usage
//! ```rust
//! use dictation::{normalize, QuizError};
//!
//! match normalize("ut4") {
//!     Ok(note) => println!("{}", note),
//!     Err(QuizError::UnrecognizedNote { token }) => {
//!         eprintln!("Unknown note name: {}", token);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    /// The token is empty, or has a digit that is not the trailing octave.
    ///
    /// # Example
    /// ```
    /// # use dictation::QuizError;
    /// let err = QuizError::MalformedNote { token: "4do".to_string() };
    /// assert_eq!(err.to_string(), "Malformed note: '4do'");
    /// ```
    #[error("Malformed note: '{token}'")]
    MalformedNote { token: String },

    /// The note name is neither an English letter nor a Latin syllable.
    ///
    /// # Example
    /// ```
    /// # use dictation::QuizError;
    /// let err = QuizError::UnrecognizedNote { token: "ut".to_string() };
    /// assert_eq!(err.to_string(), "Unrecognized note name: 'ut'");
    /// ```
    #[error("Unrecognized note name: '{token}'")]
    UnrecognizedNote { token: String },

    /// The answer was submitted with fewer notes than the question has.
    ///
    /// # Example
    /// ```
    /// # use dictation::QuizError;
    /// let err = QuizError::IncompleteAnswer { entered: 2, required: 4 };
    /// assert_eq!(err.to_string(), "You must enter all 4 notes (entered 2)");
    /// ```
    #[error("You must enter all {required} notes (entered {entered})")]
    IncompleteAnswer { entered: usize, required: usize },

    #[error("The quiz is finished")]
    SessionFinished,

    #[error("Invalid question '{question}': {reason}")]
    InvalidQuestion { question: String, reason: String },

    /// An audio clip could not be loaded. Playback treats this as a silent note.
    #[error("Could not load audio clip '{key}': {message}")]
    AssetLoad { key: String, message: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
