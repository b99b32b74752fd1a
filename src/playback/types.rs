//! Playback data type definitions

use crate::note::CanonicalNote;
use serde::Serialize;

/// A decoded audio clip, mixed down to mono
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl Clip {
    /// Length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// What an event is for
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The pitch anchor played before every question
    Reference,
    /// One of the question's notes
    Question,
}

/// One note to sound at a given time
///
/// # Fields
/// - `start_time`: Seconds from the play request
/// - `duration`: Length of the note's slot; the next event starts no earlier
/// - `index`: Position in the question (0-3); 0 for the reference note
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackEvent {
    pub note: CanonicalNote,
    pub asset_key: String,
    pub kind: EventKind,
    pub index: usize,
    pub start_time: f64,
    pub duration: f64,
}

impl PlaybackEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// All events for one play request, ordered by start time
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSchedule {
    pub events: Vec<PlaybackEvent>,
    /// Time at which the last slot ends
    pub total_duration: f64,
}
