//! Decoded clip cache
//!
//! Clips are looked up by asset key (`C4`, `Fs4`, ...). Each key is decoded at
//! most once; later requests share the same [`Arc<Clip>`]. Failed loads are
//! not remembered, so a clip that appears on disk later is picked up.

use super::types::Clip;
use crate::error::QuizError;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads the clip for an asset key
pub trait ClipLoader {
    fn load(&self, key: &str) -> Result<Clip, QuizError>;
}

/// Reads `{dir}/{key}.wav` files
#[derive(Debug, Clone)]
pub struct WavDirectoryLoader {
    dir: PathBuf,
    extension: String,
}

impl WavDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, self.extension))
    }
}

impl ClipLoader for WavDirectoryLoader {
    fn load(&self, key: &str) -> Result<Clip, QuizError> {
        if !self.extension.eq_ignore_ascii_case("wav") {
            return Err(QuizError::AssetLoad {
                key: key.to_string(),
                message: format!("unsupported clip format '.{}'", self.extension),
            });
        }
        let path = self.path_for(key);
        let file = std::fs::File::open(&path).map_err(|e| QuizError::AssetLoad {
            key: key.to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;
        decode_wav(std::io::BufReader::new(file)).map_err(|e| match e {
            QuizError::AssetLoad { message, .. } => QuizError::AssetLoad {
                key: key.to_string(),
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }
}

/// Decode WAV data into a mono [`Clip`] with samples in `[-1.0, 1.0]`.
///
/// Integer PCM of any bit depth and 32-bit float are accepted; channels are
/// averaged.
pub fn decode_wav<R: Read>(reader: R) -> Result<Clip, QuizError> {
    let decode_err = |e: hound::Error| QuizError::AssetLoad {
        key: String::new(),
        message: e.to_string(),
    };

    let reader = hound::WavReader::new(reader).map_err(decode_err)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err)?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(decode_err)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Clip {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Decoded clips keyed by asset key. No eviction: the palette is small.
pub struct ClipCache<L> {
    loader: L,
    clips: HashMap<String, Arc<Clip>>,
    loads: usize,
}

impl<L: ClipLoader> ClipCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            clips: HashMap::new(),
            loads: 0,
        }
    }

    /// The clip for `key`, decoding it on first use.
    pub fn get(&mut self, key: &str) -> Result<Arc<Clip>, QuizError> {
        if let Some(clip) = self.clips.get(key) {
            return Ok(Arc::clone(clip));
        }
        self.loads += 1;
        let clip = Arc::new(self.loader.load(key)?);
        log::debug!(
            "Loaded clip {}: {:.2}s at {} Hz",
            key,
            clip.duration(),
            clip.sample_rate
        );
        self.clips.insert(key.to_string(), Arc::clone(&clip));
        Ok(clip)
    }

    /// Load every key up front. Returns the keys that failed; each failure is
    /// logged and does not stop the others.
    pub fn preload<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<String> {
        let mut failed = Vec::new();
        for key in keys {
            if let Err(e) = self.get(key.as_ref()) {
                log::warn!("{}", e);
                failed.push(key.as_ref().to_string());
            }
        }
        log::debug!(
            "Preloaded {} of {} clips",
            keys.len() - failed.len(),
            keys.len()
        );
        failed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.clips.contains_key(key)
    }

    /// Number of cached clips
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Number of times the loader was called (hits do not count)
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
