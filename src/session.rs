//! # Quiz Session
//!
//! The state machine of one dictation quiz.
//!
//! ## Lifecycle
//! ```text
//! new() ──start()──► AwaitingAnswer ──submit_answer()──► AwaitingAnswer (next or retry)
//!                          │                                   │
//!                          └──────── next_question() ──────────┴──► Terminal
//! ```
//!
//! A session asks `total_questions` questions drawn uniformly at random, with
//! replacement, from its pool. Each question is graded by normalizing both the
//! question and the answer and comparing them note by note, in order.
//!
//! ## Wrong Answers
//! With `retry_on_incorrect` the student stays on the same question with an
//! empty answer. Without it the wrong answer uses up the question and the next
//! one is drawn, so the session always ends after `total_questions` submits.
//!
//! ## Example
//! ```rust
//! use dictation::{Question, QuizConfig, QuizSession};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let pool = vec![Question::parse("do re mi fa")?];
//! let mut session = QuizSession::new(QuizConfig::default(), pool, StdRng::seed_from_u64(1))?;
//! session.start()?;
//!
//! for token in ["do", "re", "mi", "fa"] {
//!     session.append_note(token)?;
//! }
//! let verdict = session.submit_answer()?;
//! assert!(verdict.correct);
//! assert_eq!(session.score(), 250);
//! assert_eq!(session.question_number(), 2);
//! # Ok::<(), dictation::QuizError>(())
//! ```

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::note::{display_sequence, normalize, normalize_all, sharpen_token, CanonicalNote};
use crate::question::{Question, NOTES_PER_QUESTION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Observable state of a session.
///
/// Grading happens synchronously inside [`QuizSession::submit_answer`], so there
/// is no separate validating state to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Created but `start()` not called yet
    NotStarted,
    /// A question is on screen and the answer is being entered
    AwaitingAnswer,
    /// All questions asked; no more answers accepted
    Terminal,
}

/// Result of grading one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub correct: bool,
    pub expected: Vec<CanonicalNote>,
    pub given: Vec<CanonicalNote>,
    /// Score after this answer
    pub score: u32,
    /// Whether a new question was drawn (or the session ended)
    pub advanced: bool,
    pub finished: bool,
}

impl Verdict {
    /// The correct sequence as shown to the student: "Fa, Sol, La, Si"
    pub fn expected_display(&self) -> String {
        display_sequence(&self.expected)
    }

    /// The student's sequence as shown to the student
    pub fn given_display(&self) -> String {
        display_sequence(&self.given)
    }
}

/// End-of-quiz summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub score: u32,
    pub max_score: u32,
    pub questions_asked: u32,
    pub correct_answers: u32,
}

/// Compare two token sequences after normalization.
///
/// Sequences match only if they have the same length and the same notes in
/// the same order; this is dictation, not a set match.
///
/// ```rust
/// use dictation::answers_match;
///
/// assert!(answers_match(&["do", "re", "mi", "fa"], &["C", "D4", "mi4", "FA"])?);
/// assert!(!answers_match(&["do", "re", "mi", "fa"], &["re", "do", "mi", "fa"])?);
/// # Ok::<(), dictation::QuizError>(())
/// ```
pub fn answers_match<S: AsRef<str>, T: AsRef<str>>(
    question: &[S],
    answer: &[T],
) -> Result<bool, QuizError> {
    let expected = normalize_all(question)?;
    let given = normalize_all(answer)?;
    Ok(expected == given)
}

/// One quiz: question counter, score, current question and answer buffer.
pub struct QuizSession<R: Rng = StdRng> {
    config: QuizConfig,
    pool: Vec<Question>,
    rng: R,
    phase: Phase,
    question_number: u32,
    current: Option<Question>,
    answer: Vec<String>,
    sharp_pending: bool,
    score: u32,
    correct_answers: u32,
    note_duration: f64,
}

impl QuizSession<StdRng> {
    /// Build a session whose random draws follow `config.seed`, or are
    /// seeded from the OS when no seed is configured.
    pub fn from_config(config: QuizConfig, pool: Vec<Question>) -> Result<Self, QuizError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, pool, rng)
    }
}

impl<R: Rng> QuizSession<R> {
    pub fn new(config: QuizConfig, pool: Vec<Question>, rng: R) -> Result<Self, QuizError> {
        config.validate()?;
        if pool.is_empty() {
            return Err(QuizError::ConfigError("question pool is empty".to_string()));
        }
        let note_duration = config.clamp_duration(config.note_duration);
        Ok(Self {
            config,
            pool,
            rng,
            phase: Phase::NotStarted,
            question_number: 0,
            current: None,
            answer: Vec::with_capacity(NOTES_PER_QUESTION),
            sharp_pending: false,
            score: 0,
            correct_answers: 0,
            note_duration,
        })
    }

    /// Reset counters and draw the first question.
    pub fn start(&mut self) -> Result<(), QuizError> {
        self.phase = Phase::AwaitingAnswer;
        self.question_number = 0;
        self.score = 0;
        self.correct_answers = 0;
        self.current = None;
        log::debug!(
            "Starting quiz: {} questions from a pool of {}",
            self.config.total_questions,
            self.pool.len()
        );
        self.next_question()
    }

    /// Draw the next question, or end the quiz once every question was asked.
    ///
    /// Also used to skip a question after a wrong answer.
    ///
    /// # Errors
    /// [`QuizError::SessionFinished`] if the session is already terminal.
    pub fn next_question(&mut self) -> Result<(), QuizError> {
        if self.phase == Phase::Terminal {
            return Err(QuizError::SessionFinished);
        }
        self.answer.clear();
        self.sharp_pending = false;

        if self.question_number >= self.config.total_questions {
            self.phase = Phase::Terminal;
            self.current = None;
            log::debug!(
                "Quiz finished: {} / {}",
                self.score,
                self.config.max_score()
            );
            return Ok(());
        }

        let index = self.rng.gen_range(0..self.pool.len());
        self.current = Some(self.pool[index].clone());
        self.question_number += 1;
        self.phase = Phase::AwaitingAnswer;
        log::debug!(
            "Question {} of {}: pool entry {}",
            self.question_number,
            self.config.total_questions,
            index
        );
        Ok(())
    }

    /// Add a note to the answer.
    ///
    /// Returns `Ok(false)` without changing anything when the answer is
    /// already complete or the quiz is not accepting answers. When the sharp
    /// toggle is on, the note is entered sharp and the toggle turns off.
    ///
    /// # Errors
    /// Propagates normalization errors; the token is not added.
    pub fn append_note(&mut self, token: &str) -> Result<bool, QuizError> {
        if self.phase != Phase::AwaitingAnswer || self.answer.len() >= NOTES_PER_QUESTION {
            return Ok(false);
        }
        let token = if self.sharp_pending {
            sharpen_token(token)
        } else {
            token.trim().to_string()
        };
        normalize(&token)?;
        self.sharp_pending = false;
        self.answer.push(token);
        Ok(true)
    }

    /// Flip the "next note is sharp" toggle and return its new state.
    pub fn toggle_sharp(&mut self) -> bool {
        if self.phase == Phase::AwaitingAnswer {
            self.sharp_pending = !self.sharp_pending;
        }
        self.sharp_pending
    }

    pub fn clear_answer(&mut self) {
        self.answer.clear();
    }

    /// Grade the answer against the current question.
    ///
    /// # Errors
    /// - [`QuizError::IncompleteAnswer`] if fewer than four notes were entered
    ///   (nothing changes)
    /// - [`QuizError::SessionFinished`] if the quiz is over
    pub fn submit_answer(&mut self) -> Result<Verdict, QuizError> {
        let question = match (&self.phase, &self.current) {
            (Phase::AwaitingAnswer, Some(question)) => question,
            _ => return Err(QuizError::SessionFinished),
        };
        if self.answer.len() != NOTES_PER_QUESTION {
            return Err(QuizError::IncompleteAnswer {
                entered: self.answer.len(),
                required: NOTES_PER_QUESTION,
            });
        }

        let expected = question.notes().to_vec();
        let given = normalize_all(&self.answer)?;
        let correct = expected == given;

        if correct {
            self.score += self.config.reward;
            self.correct_answers += 1;
        }
        log::debug!(
            "Question {} answered {}: expected [{}], got [{}]",
            self.question_number,
            if correct { "correctly" } else { "incorrectly" },
            display_sequence(&expected),
            display_sequence(&given)
        );

        let advanced = correct || !self.config.retry_on_incorrect;
        if advanced {
            self.next_question()?;
        } else {
            self.answer.clear();
            self.sharp_pending = false;
        }

        Ok(Verdict {
            correct,
            expected,
            given,
            score: self.score,
            advanced,
            finished: self.phase == Phase::Terminal,
        })
    }

    /// Set the time between question notes, clamped to the configured range.
    pub fn set_note_duration(&mut self, seconds: f64) -> f64 {
        self.note_duration = self.config.clamp_duration(seconds);
        self.note_duration
    }

    pub fn note_duration(&self) -> f64 {
        self.note_duration
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.config.max_score()
    }

    /// 1-based number of the current question (0 before `start()`)
    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    pub fn total_questions(&self) -> u32 {
        self.config.total_questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Tokens entered so far, as entered (with any sharp applied)
    pub fn answer(&self) -> &[String] {
        &self.answer
    }

    /// The answer so far in display form
    pub fn answer_display(&self) -> Result<String, QuizError> {
        Ok(display_sequence(&normalize_all(&self.answer)?))
    }

    pub fn sharp_pending(&self) -> bool {
        self.sharp_pending
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn report(&self) -> QuizReport {
        QuizReport {
            score: self.score,
            max_score: self.config.max_score(),
            questions_asked: self.question_number,
            correct_answers: self.correct_answers,
        }
    }
}
