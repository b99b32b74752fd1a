//! # Note Normalization
//!
//! Converts free-form note tokens into one canonical representation.
//!
//! ## Accepted Notation
//! - **Latin solfège**: `do re mi fa sol la si` (and the truncated `so`)
//! - **English letters**: `C D E F G A B`
//! - **Octave**: a single trailing digit, `4` when omitted
//! - **Sharp**: `#` anywhere in the token (`fa#4`, `fa4#` and `fa#` are equivalent)
//!
//! Tokens are case-insensitive and surrounding whitespace is ignored.
//!
//! ## Three Representations
//! A [`CanonicalNote`] is rendered three different ways:
//!
//! | Form        | Function              | `fa#4` | `re5` | `do` |
//! |-------------|-----------------------|--------|-------|------|
//! | Canonical   | `Display`             | `F#4`  | `D5`  | `C4` |
//! | Display     | [`to_display()`]      | `Fa#`  | `Re5` | `Do` |
//! | Asset key   | [`to_asset_key()`]    | `Fs4`  | `D5`  | `C4` |
//!
//! The canonical form is what gets compared. The display form hides the
//! reference octave (4) and is only meant for people. The asset key spells the
//! sharp as `s` so it can be used in file names and URLs.
//!
//! ## Example
//! ```rust
//! use dictation::{normalize, to_asset_key, to_display};
//!
//! let note = normalize("fa#4")?;
//! assert_eq!(note.to_string(), "F#4");
//! assert_eq!(to_display(&note), "Fa#");
//! assert_eq!(to_asset_key(&note), "Fs4");
//! # Ok::<(), dictation::QuizError>(())
//! ```

use crate::error::QuizError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Octave assumed when a token has none, and hidden in display form.
pub const DEFAULT_OCTAVE: u8 = 4;

/// Note letters C through B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Parse an upper-case English letter name ("C", "D", ...)
    pub fn from_english(name: &str) -> Option<Self> {
        match name {
            "C" => Some(Letter::C),
            "D" => Some(Letter::D),
            "E" => Some(Letter::E),
            "F" => Some(Letter::F),
            "G" => Some(Letter::G),
            "A" => Some(Letter::A),
            "B" => Some(Letter::B),
            _ => None,
        }
    }

    /// Parse an upper-case Latin syllable ("DO", "RE", ...)
    ///
    /// "SO" is accepted as a truncated "SOL".
    pub fn from_latin(syllable: &str) -> Option<Self> {
        match syllable {
            "DO" => Some(Letter::C),
            "RE" => Some(Letter::D),
            "MI" => Some(Letter::E),
            "FA" => Some(Letter::F),
            "SOL" | "SO" => Some(Letter::G),
            "LA" => Some(Letter::A),
            "SI" => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Latin syllable used in messages shown to the student
    pub fn latin(self) -> &'static str {
        match self {
            Letter::C => "Do",
            Letter::D => "Re",
            Letter::E => "Mi",
            Letter::F => "Fa",
            Letter::G => "Sol",
            Letter::A => "La",
            Letter::B => "Si",
        }
    }

    /// Semitone offset from C
    fn semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }
}

/// Accidentals that occur in dictation questions. Flats are never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
}

/// A normalized note: letter, accidental and octave.
///
/// Two notes are equal only if all three fields match; this is the only
/// comparison used when grading answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalNote {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: u8,
}

impl CanonicalNote {
    pub fn new(letter: Letter, accidental: Accidental, octave: u8) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    pub fn is_sharp(&self) -> bool {
        self.accidental == Accidental::Sharp
    }

    /// MIDI note number (C4 = 60)
    pub fn midi_note(&self) -> u8 {
        let sharp = if self.is_sharp() { 1 } else { 0 };
        (self.octave + 1) * 12 + self.letter.semitone() + sharp
    }
}

impl fmt::Display for CanonicalNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        if self.is_sharp() {
            write!(f, "#")?;
        }
        write!(f, "{}", self.octave)
    }
}

impl FromStr for CanonicalNote {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Normalize a note token into a [`CanonicalNote`].
///
/// # Algorithm
/// 1. Trim and upper-case the token
/// 2. A single `#`, anywhere in the token, marks the note as sharp and is removed
/// 3. A token without digits gets the default octave `4`
/// 4. The trailing digit is the octave; the rest is the note name
/// 5. The name is read as an English letter, then as a Latin syllable
///
/// The octave digit is not range-checked.
///
/// # Errors
/// - [`QuizError::MalformedNote`] for an empty token, more than one `#`, or a digit
///   that is not trailing
/// - [`QuizError::UnrecognizedNote`] when the name is neither a letter nor a syllable
///
/// # Example
/// ```rust
/// use dictation::{normalize, Accidental, Letter};
///
/// let note = normalize(" Sol#5 ")?;
/// assert_eq!(note.letter, Letter::G);
/// assert_eq!(note.accidental, Accidental::Sharp);
/// assert_eq!(note.octave, 5);
/// # Ok::<(), dictation::QuizError>(())
/// ```
pub fn normalize(token: &str) -> Result<CanonicalNote, QuizError> {
    let trimmed = token.trim();
    let mut upper = trimmed.to_uppercase();
    if upper.is_empty() {
        return Err(QuizError::MalformedNote {
            token: trimmed.to_string(),
        });
    }

    let accidental = match upper.matches('#').count() {
        0 => Accidental::Natural,
        1 => {
            upper.retain(|c| c != '#');
            Accidental::Sharp
        }
        _ => {
            return Err(QuizError::MalformedNote {
                token: trimmed.to_string(),
            })
        }
    };

    if !upper.chars().any(|c| c.is_ascii_digit()) {
        upper.push(char::from(b'0' + DEFAULT_OCTAVE));
    }

    let octave = match upper.chars().last().and_then(|c| c.to_digit(10)) {
        Some(digit) => digit as u8,
        None => {
            return Err(QuizError::MalformedNote {
                token: trimmed.to_string(),
            })
        }
    };

    // The trailing character is an ASCII digit, so this is a char boundary
    let base = &upper[..upper.len() - 1];
    let letter = Letter::from_english(base)
        .or_else(|| Letter::from_latin(base))
        .ok_or_else(|| QuizError::UnrecognizedNote {
            token: trimmed.to_string(),
        })?;

    Ok(CanonicalNote::new(letter, accidental, octave))
}

/// Normalize every token of a sequence, failing on the first bad token.
pub fn normalize_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<CanonicalNote>, QuizError> {
    tokens.iter().map(|t| normalize(t.as_ref())).collect()
}

/// Render a note for the student: Latin syllable, sharp marker, and the
/// octave digit unless it is the reference octave.
///
/// ```rust
/// use dictation::{normalize, to_display};
///
/// assert_eq!(to_display(&normalize("do4")?), "Do");
/// assert_eq!(to_display(&normalize("re5")?), "Re5");
/// assert_eq!(to_display(&normalize("si3")?), "Si3");
/// # Ok::<(), dictation::QuizError>(())
/// ```
pub fn to_display(note: &CanonicalNote) -> String {
    let mut text = note.letter.latin().to_string();
    if note.is_sharp() {
        text.push('#');
    }
    if note.octave != DEFAULT_OCTAVE {
        text.push_str(&note.octave.to_string());
    }
    text
}

/// Join a sequence of notes in display form: "Fa, Sol, La, Si"
pub fn display_sequence(notes: &[CanonicalNote]) -> String {
    notes.iter().map(to_display).collect::<Vec<_>>().join(", ")
}

/// File-name-safe key for a note's audio clip. Sharps are spelled `s`.
///
/// ```rust
/// use dictation::{normalize, to_asset_key};
///
/// assert_eq!(to_asset_key(&normalize("fa#4")?), "Fs4");
/// assert_eq!(to_asset_key(&normalize("si3")?), "B3");
/// # Ok::<(), dictation::QuizError>(())
/// ```
pub fn to_asset_key(note: &CanonicalNote) -> String {
    let mut key = String::with_capacity(3);
    key.push(note.letter.as_char());
    if note.is_sharp() {
        key.push('s');
    }
    key.push_str(&note.octave.to_string());
    key
}

/// Apply the "next note is sharp" toggle to a palette token.
///
/// The `#` goes right before the octave digit (`si3` → `si#3`); a token
/// without an octave gets the default one (`do` → `do#4`).
pub fn sharpen_token(token: &str) -> String {
    let trimmed = token.trim();
    match trimmed.char_indices().last() {
        Some((idx, c)) if c.is_ascii_digit() => {
            format!("{}#{}", &trimmed[..idx], &trimmed[idx..])
        }
        _ => format!("{}#{}", trimmed, DEFAULT_OCTAVE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYLLABLES: [(&str, Letter); 7] = [
        ("do", Letter::C),
        ("re", Letter::D),
        ("mi", Letter::E),
        ("fa", Letter::F),
        ("sol", Letter::G),
        ("la", Letter::A),
        ("si", Letter::B),
    ];

    #[test]
    fn test_default_octave() {
        let note = normalize("do").unwrap();
        assert_eq!(note, CanonicalNote::new(Letter::C, Accidental::Natural, 4));
        assert_eq!(note.to_string(), "C4");
    }

    #[test]
    fn test_english_letters() {
        assert_eq!(normalize("C#4").unwrap().to_string(), "C#4");
        assert_eq!(normalize("b3").unwrap().to_string(), "B3");
        assert_eq!(normalize("g").unwrap().to_string(), "G4");
    }

    #[test]
    fn test_latin_syllables_all_octaves_and_accidentals() {
        for (syllable, letter) in SYLLABLES {
            for octave in 3..=5u8 {
                let natural = CanonicalNote::new(letter, Accidental::Natural, octave);
                let sharp = CanonicalNote::new(letter, Accidental::Sharp, octave);

                let plain = format!("{}{}", syllable, octave);
                assert_eq!(normalize(&plain).unwrap(), natural, "{}", plain);
                assert_eq!(normalize(&plain.to_uppercase()).unwrap(), natural);

                let before = format!("{}#{}", syllable, octave);
                let after = format!("{}{}#", syllable, octave);
                assert_eq!(normalize(&before).unwrap(), sharp, "{}", before);
                assert_eq!(normalize(&after).unwrap(), sharp, "{}", after);
                assert_eq!(normalize(&before.to_uppercase()).unwrap(), sharp);
            }
        }
    }

    #[test]
    fn test_sharp_without_octave_matches_explicit_octave() {
        assert_eq!(normalize("fa#").unwrap(), normalize("FA#4").unwrap());
        assert_eq!(normalize("fa#").unwrap(), normalize("fa4#").unwrap());
    }

    #[test]
    fn test_so_alias() {
        assert_eq!(normalize("so").unwrap(), normalize("sol").unwrap());
        assert_eq!(normalize("SO5").unwrap().to_string(), "G5");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize("  la5\t").unwrap().to_string(), "A5");
    }

    #[test]
    fn test_octave_not_bounds_checked() {
        assert_eq!(normalize("do0").unwrap().octave, 0);
        assert_eq!(normalize("si9").unwrap().octave, 9);
    }

    #[test]
    fn test_idempotent_on_canonical_output() {
        for token in ["do", "fa#4", "si3", "C#4", "re5", "sol#", "la4#"] {
            let once = normalize(token).unwrap();
            let twice = normalize(&once.to_string()).unwrap();
            assert_eq!(once, twice, "{}", token);
        }
    }

    #[test]
    fn test_unrecognized_name() {
        match normalize("ut4") {
            Err(QuizError::UnrecognizedNote { token }) => assert_eq!(token, "ut4"),
            other => panic!("expected UnrecognizedNote, got {:?}", other),
        }
        assert!(matches!(normalize("H"), Err(QuizError::UnrecognizedNote { .. })));
        assert!(matches!(normalize("#"), Err(QuizError::UnrecognizedNote { .. })));
        assert!(matches!(normalize("do44"), Err(QuizError::UnrecognizedNote { .. })));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(normalize(""), Err(QuizError::MalformedNote { .. })));
        assert!(matches!(normalize("   "), Err(QuizError::MalformedNote { .. })));
        assert!(matches!(normalize("4do"), Err(QuizError::MalformedNote { .. })));
    }

    #[test]
    fn test_double_sharp_rejected() {
        for token in ["do##4", "#fa#", "fa#4#", "C##"] {
            match normalize(token) {
                Err(QuizError::MalformedNote { token: t }) => assert_eq!(t, token),
                other => panic!("expected MalformedNote for {}, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_every_letter_round_trips() {
        for letter in Letter::ALL {
            for accidental in [Accidental::Natural, Accidental::Sharp] {
                let note = CanonicalNote::new(letter, accidental, 4);
                assert_eq!(normalize(&note.to_string()).unwrap(), note);
                assert_eq!(normalize(&to_display(&note)).unwrap(), note);
                assert_eq!(Letter::from_latin(&letter.latin().to_uppercase()), Some(letter));
            }
        }
    }

    #[test]
    fn test_display_hides_reference_octave() {
        assert_eq!(to_display(&normalize("do4").unwrap()), "Do");
        assert_eq!(to_display(&normalize("re5").unwrap()), "Re5");
        assert_eq!(to_display(&normalize("fa#").unwrap()), "Fa#");
        assert_eq!(to_display(&normalize("G#3").unwrap()), "Sol#3");
    }

    #[test]
    fn test_display_sequence() {
        let notes = normalize_all(&["fa", "sol", "la", "si"]).unwrap();
        assert_eq!(display_sequence(&notes), "Fa, Sol, La, Si");
        assert_eq!(display_sequence(&[]), "");
    }

    #[test]
    fn test_asset_keys() {
        assert_eq!(to_asset_key(&normalize("fa#4").unwrap()), "Fs4");
        assert_eq!(to_asset_key(&normalize("do#5").unwrap()), "Cs5");
        assert_eq!(to_asset_key(&normalize("A#").unwrap()), "As4");
        assert_eq!(to_asset_key(&normalize("si3").unwrap()), "B3");
    }

    #[test]
    fn test_midi_note() {
        assert_eq!(normalize("do4").unwrap().midi_note(), 60);
        assert_eq!(normalize("si3").unwrap().midi_note(), 59);
        assert_eq!(normalize("fa#4").unwrap().midi_note(), 66);
        assert_eq!(normalize("re5").unwrap().midi_note(), 74);
    }

    #[test]
    fn test_sharpen_token() {
        assert_eq!(sharpen_token("si3"), "si#3");
        assert_eq!(sharpen_token("fa4"), "fa#4");
        assert_eq!(sharpen_token("do"), "do#4");
        assert_eq!(normalize(&sharpen_token("sol4")).unwrap().to_string(), "G#4");
    }

    #[test]
    fn test_from_str() {
        let note: CanonicalNote = "mi5".parse().unwrap();
        assert_eq!(note.to_string(), "E5");
        assert!("xx".parse::<CanonicalNote>().is_err());
    }
}
