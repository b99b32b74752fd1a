//! Schedule generation and sequencing
//!
//! [`build_schedule`] computes when every note sounds; [`play_schedule`]
//! walks a schedule in order, waiting on a [`Clock`] and handing clips to an
//! [`AudioSink`].

use super::cache::{ClipCache, ClipLoader};
use super::sink::{AudioSink, WavRenderSink};
use super::types::{EventKind, PlaybackEvent, PlaybackSchedule};
use crate::config::{
    QuizConfig, DEFAULT_LEAD_IN, DEFAULT_NOTE_DURATION, DEFAULT_REFERENCE_GAP,
};
use crate::error::QuizError;
use crate::note::{to_asset_key, CanonicalNote};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Timing of a play request, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleTiming {
    /// Delay before the reference note
    pub lead_in: f64,
    /// From the reference note to the first question note
    pub reference_gap: f64,
    /// Slot of each question note
    pub note_duration: f64,
}

impl Default for ScheduleTiming {
    fn default() -> Self {
        Self {
            lead_in: DEFAULT_LEAD_IN,
            reference_gap: DEFAULT_REFERENCE_GAP,
            note_duration: DEFAULT_NOTE_DURATION,
        }
    }
}

impl ScheduleTiming {
    /// Timing from a configuration, with the note duration chosen by the student
    pub fn from_config(config: &QuizConfig, note_duration: f64) -> Self {
        Self {
            lead_in: config.lead_in,
            reference_gap: config.reference_gap,
            note_duration: config.clamp_duration(note_duration),
        }
    }
}

/// Build the schedule for one question.
///
/// The reference note starts at `lead_in` and owns the slot up to the first
/// question note. Question note `i` starts at
/// `lead_in + reference_gap + i * note_duration` and owns one `note_duration`.
pub fn build_schedule(
    reference: &CanonicalNote,
    question: &[CanonicalNote],
    timing: &ScheduleTiming,
) -> PlaybackSchedule {
    let mut events = Vec::with_capacity(question.len() + 1);

    events.push(PlaybackEvent {
        note: *reference,
        asset_key: to_asset_key(reference),
        kind: EventKind::Reference,
        index: 0,
        start_time: timing.lead_in,
        duration: timing.reference_gap,
    });

    let first_note = timing.lead_in + timing.reference_gap;
    for (i, note) in question.iter().enumerate() {
        events.push(PlaybackEvent {
            note: *note,
            asset_key: to_asset_key(note),
            kind: EventKind::Question,
            index: i,
            start_time: first_note + i as f64 * timing.note_duration,
            duration: timing.note_duration,
        });
    }

    let total_duration = events.last().map_or(0.0, PlaybackEvent::end_time);
    log::debug!(
        "Built schedule: {} events, {:.2}s total, {:.2}s per note",
        events.len(),
        total_duration,
        timing.note_duration
    );

    PlaybackSchedule {
        events,
        total_duration,
    }
}

/// Source of time for the sequencer
pub trait Clock {
    /// Time since the clock was created
    fn elapsed(&self) -> Duration;

    /// Block until `duration` has passed
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock time; sleeps the current thread
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that advances instantly. Used for offline rendering and tests.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Clock for VirtualClock {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
        self.sleeps.push(duration);
    }
}

/// What happened during one play request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSummary {
    /// Asset keys sent to the sink, in order
    pub played: Vec<String>,
    /// Asset keys that could not be loaded or played
    pub skipped: Vec<String>,
}

impl PlaybackSummary {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Play a schedule from start to finish.
///
/// Waits on `clock` until each event's start time (measured from the call),
/// fetches the clip through `cache` and hands it to `sink`. After the last
/// event the call waits out its slot, so a following request never overlaps.
///
/// Load and sink failures are logged and the note is skipped; playback is
/// never aborted. The call blocks until the whole schedule has elapsed and
/// cannot be cancelled.
pub fn play_schedule<L, C, S>(
    schedule: &PlaybackSchedule,
    cache: &mut ClipCache<L>,
    clock: &mut C,
    sink: &mut S,
) -> PlaybackSummary
where
    L: ClipLoader,
    C: Clock,
    S: AudioSink,
{
    let origin = clock.elapsed();
    let mut summary = PlaybackSummary::default();

    for event in &schedule.events {
        wait_until(clock, origin, event.start_time);

        let clip = match cache.get(&event.asset_key) {
            Ok(clip) => clip,
            Err(e) => {
                log::warn!("Skipping note {}: {}", event.note, e);
                summary.skipped.push(event.asset_key.clone());
                continue;
            }
        };

        match sink.play(event, &clip) {
            Ok(()) => summary.played.push(event.asset_key.clone()),
            Err(e) => {
                log::warn!("Sink failed on note {}: {}", event.note, e);
                summary.skipped.push(event.asset_key.clone());
            }
        }
    }

    wait_until(clock, origin, schedule.total_duration);
    summary
}

/// Render a schedule offline into a WAV file at `output`.
///
/// Missing clips leave silent slots, as in [`play_schedule`]. Only writing the
/// file can fail; the cache keeps every clip it loaded either way.
pub fn render_schedule<L: ClipLoader>(
    schedule: &PlaybackSchedule,
    cache: &mut ClipCache<L>,
    sample_rate: u32,
    output: &Path,
) -> Result<PlaybackSummary, QuizError> {
    let mut sink = WavRenderSink::new(sample_rate);
    let summary = play_schedule(schedule, cache, &mut VirtualClock::new(), &mut sink);
    sink.extend_to(schedule.total_duration);
    sink.write_wav(output)?;
    Ok(summary)
}

fn wait_until<C: Clock>(clock: &mut C, origin: Duration, seconds: f64) {
    let target = origin + Duration::from_secs_f64(seconds.max(0.0));
    let now = clock.elapsed();
    if target > now {
        clock.sleep(target - now);
    }
}
