//! Audio sinks
//!
//! A sink receives each clip at its scheduled time. [`WavRenderSink`] mixes
//! the clips into a buffer that can be written as a WAV file; [`LogSink`]
//! only records what would have sounded.

use super::types::{Clip, EventKind, PlaybackEvent};
use crate::error::QuizError;
use std::path::Path;

/// Receives clips from the sequencer
pub trait AudioSink {
    fn play(&mut self, event: &PlaybackEvent, clip: &Clip) -> Result<(), QuizError>;
}

/// Logs every note instead of sounding it
#[derive(Debug, Default)]
pub struct LogSink {
    played: Vec<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioSink for LogSink {
    fn play(&mut self, event: &PlaybackEvent, clip: &Clip) -> Result<(), QuizError> {
        let label = match event.kind {
            EventKind::Reference => "reference".to_string(),
            EventKind::Question => format!("note {}", event.index + 1),
        };
        log::info!(
            "{:>6.2}s {} {} ({:.2}s clip)",
            event.start_time,
            label,
            event.note,
            clip.duration()
        );
        self.played.push(event.asset_key.clone());
        Ok(())
    }
}

/// Mixes clips into a mono buffer at their scheduled times.
///
/// Each clip is cut at the end of its slot so notes never overlap. Clips with
/// a different sample rate are rejected rather than resampled.
#[derive(Debug)]
pub struct WavRenderSink {
    sample_rate: u32,
    buffer: Vec<f32>,
}

impl WavRenderSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            buffer: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    /// Pad with silence up to `seconds`
    pub fn extend_to(&mut self, seconds: f64) {
        let len = self.frames(seconds);
        if len > self.buffer.len() {
            self.buffer.resize(len, 0.0);
        }
    }

    /// Write the mix as 16-bit mono PCM
    pub fn write_wav(&self, path: &Path) -> Result<(), QuizError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let to_io = |e: hound::Error| match e {
            hound::Error::IoError(io) => QuizError::Io(io),
            other => QuizError::Io(std::io::Error::new(std::io::ErrorKind::Other, other)),
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(to_io)?;
        for sample in &self.buffer {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value).map_err(to_io)?;
        }
        writer.finalize().map_err(to_io)?;
        log::debug!(
            "Wrote {} samples ({:.2}s) to {}",
            self.buffer.len(),
            self.buffer.len() as f64 / self.sample_rate as f64,
            path.display()
        );
        Ok(())
    }

    fn frames(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sample_rate as f64).round() as usize
    }
}

impl AudioSink for WavRenderSink {
    fn play(&mut self, event: &PlaybackEvent, clip: &Clip) -> Result<(), QuizError> {
        if clip.sample_rate != self.sample_rate {
            return Err(QuizError::AssetLoad {
                key: event.asset_key.clone(),
                message: format!(
                    "sample rate {} Hz does not match render rate {} Hz",
                    clip.sample_rate, self.sample_rate
                ),
            });
        }

        let start = self.frames(event.start_time);
        let slot_end = self.frames(event.end_time());
        let len = clip.samples.len().min(slot_end.saturating_sub(start));
        self.extend_to(event.end_time());

        for (out, sample) in self.buffer[start..start + len]
            .iter_mut()
            .zip(&clip.samples[..len])
        {
            *out += sample;
        }
        Ok(())
    }
}
