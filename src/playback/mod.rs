//! # Playback Module
//!
//! Turn a question into timed audio and send it somewhere.
//!
//! ## Purpose
//! Every question is played the same way:
//! 1. **Reference note** - a fixed pitch (C4 by default) as an anchor
//! 2. **Gap** - a fixed silence
//! 3. **Question notes** - the four notes back to back, one per slot
//!
//! Slots never overlap: a clip longer than its slot is cut at the slot end.
//!
//! ## Sub-modules
//! - `types` - Clip, PlaybackEvent, PlaybackSchedule type definitions
//! - `engine` - Schedule generation and the sequencer that walks it
//! - `cache` - Decoded clips keyed by asset key, loaded at most once
//! - `sink` - Where clips go: a WAV renderer or the log
//!
//! ## Key Types
//! - [`PlaybackSchedule`] - Ordered events with start times in seconds
//! - [`ClipCache`] - Lazy (or preloaded) cache of decoded clips
//! - [`AudioSink`] - Receives each clip at its scheduled time
//! - [`Clock`] - How the sequencer waits between events
//!
//! ## Example
//! ```rust
//! use dictation::playback::{build_schedule, ScheduleTiming};
//! use dictation::{normalize, normalize_all};
//!
//! let reference = normalize("do4")?;
//! let question = normalize_all(&["do", "re", "mi", "fa"])?;
//! let schedule = build_schedule(&reference, &question, &ScheduleTiming::default());
//!
//! assert_eq!(schedule.events.len(), 5);
//! assert_eq!(schedule.events[0].asset_key, "C4");
//! assert_eq!(schedule.events[1].start_time, 1.2);
//! assert_eq!(schedule.events[2].start_time, 1.7);
//! # Ok::<(), dictation::QuizError>(())
//! ```
//!
//! ## Degraded Mode
//! A clip that cannot be loaded is logged and skipped. The note is silent
//! but the rest of the question still plays and the quiz goes on.

mod cache;
mod engine;
mod sink;
mod types;


pub use cache::{decode_wav, ClipCache, ClipLoader, WavDirectoryLoader};
pub use engine::{
    build_schedule, play_schedule, render_schedule, Clock, PlaybackSummary, ScheduleTiming,
    SystemClock, VirtualClock,
};
pub use sink::{AudioSink, LogSink, WavRenderSink};
pub use types::{Clip, EventKind, PlaybackEvent, PlaybackSchedule};
