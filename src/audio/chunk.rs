use std::io::Cursor;

use tracing::info;

use super::decode::{decode, DecodedAudio};
use super::ChunkingError;

/// Chunking limits
#[derive(Debug, Clone)]
pub struct ChunkSettings {
    /// Upper bound on a single chunk, set by the transcription API's limits
    pub max_chunk_seconds: f64,
    /// How far back from the nominal boundary to look for a quiet cut point
    pub silence_lookback_seconds: f64,
    /// Width of the energy window used to score candidate cut points
    pub silence_frame_ms: u64,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            max_chunk_seconds: 600.0, // 10 minutes
            silence_lookback_seconds: 5.0,
            silence_frame_ms: 100,
        }
    }
}

/// One bounded-duration slice of a recording, WAV-encoded
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Position in the source recording; contiguous from 0
    pub sequence_index: usize,
    pub byte_payload: Vec<u8>,
    pub duration_seconds: f64,
}

/// Splits a recording into consecutive, non-overlapping chunks no longer
/// than `max_chunk_seconds`; the final chunk may be shorter.
///
/// Cut points prefer the quietest short window near the nominal boundary so
/// words are not truncated mid-sample. Ties go to the boundary itself, so
/// audio with no quiet point degrades to exact fixed-duration cuts.
pub struct AudioChunker {
    settings: ChunkSettings,
}

impl AudioChunker {
    pub fn new(settings: ChunkSettings) -> Self {
        Self { settings }
    }

    /// Decode raw audio bytes and split them. `extension` is a format hint.
    pub fn chunk_bytes(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
    ) -> Result<Vec<AudioChunk>, ChunkingError> {
        let audio = decode(bytes, extension)?;
        self.chunk(&audio)
    }

    pub fn chunk(&self, audio: &DecodedAudio) -> Result<Vec<AudioChunk>, ChunkingError> {
        let channels = audio.channels as usize;
        let total_frames = audio.frame_count();
        if total_frames == 0 {
            return Err(ChunkingError::EmptyAudio);
        }

        let frames_per_chunk =
            (self.settings.max_chunk_seconds * audio.sample_rate as f64) as usize;
        if frames_per_chunk == 0 {
            return Err(ChunkingError::Encode(format!(
                "max_chunk_seconds too small: {}",
                self.settings.max_chunk_seconds
            )));
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < total_frames {
            let nominal_end = (start + frames_per_chunk).min(total_frames);
            let end = if nominal_end == total_frames {
                total_frames
            } else {
                self.cut_point(audio, start, nominal_end)
            };

            let payload = encode_wav(
                &audio.samples[start * channels..end * channels],
                audio.sample_rate,
                audio.channels,
            )?;

            chunks.push(AudioChunk {
                sequence_index: chunks.len(),
                byte_payload: payload,
                duration_seconds: (end - start) as f64 / audio.sample_rate as f64,
            });

            start = end;
        }

        info!(
            "split {:.1}s recording into {} chunk(s)",
            audio.duration_seconds(),
            chunks.len()
        );

        Ok(chunks)
    }

    /// Pick a cut point in (start, nominal_end]: the end of the quietest
    /// energy window within the look-back range, latest window winning ties.
    fn cut_point(&self, audio: &DecodedAudio, start: usize, nominal_end: usize) -> usize {
        let channels = audio.channels as usize;
        let frame_len =
            (audio.sample_rate as u64 * self.settings.silence_frame_ms / 1000) as usize;
        if frame_len == 0 {
            return nominal_end;
        }

        let lookback =
            (self.settings.silence_lookback_seconds * audio.sample_rate as f64) as usize;
        let search_start = nominal_end.saturating_sub(lookback).max(start + frame_len);
        if search_start > nominal_end.saturating_sub(frame_len) {
            return nominal_end;
        }

        let mut best_end = nominal_end;
        let mut best_energy = f64::MAX;

        let mut window_end = nominal_end;
        loop {
            let window_start = window_end - frame_len;
            let energy =
                mean_amplitude(&audio.samples[window_start * channels..window_end * channels]);
            if energy < best_energy {
                best_energy = energy;
                best_end = window_end;
            }
            if window_start < search_start {
                break;
            }
            window_end = window_start;
        }

        best_end
    }
}

fn mean_amplitude(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64).abs()).sum();
    sum / samples.len() as f64
}

/// Encode a PCM slice as an in-memory WAV file
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>, ChunkingError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, spec)
            .map_err(|e| ChunkingError::Encode(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| ChunkingError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| ChunkingError::Encode(e.to_string()))?;
    }

    Ok(bytes)
}
