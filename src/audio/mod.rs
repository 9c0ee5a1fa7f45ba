//! Audio decoding and chunking
//!
//! Voice messages arrive as compressed bytes (the platform records M4A;
//! uploads may be MP3, OGG, FLAC or WAV). This module decodes them to PCM
//! and splits long recordings into bounded-duration WAV chunks the
//! transcription API will accept, cutting at quiet moments where possible.

pub mod chunk;
pub mod decode;

pub use chunk::{AudioChunk, AudioChunker, ChunkSettings};
pub use decode::{decode, DecodedAudio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Corrupt or unsupported input format
    #[error("could not decode audio: {0}")]
    UnreadableAudio(String),

    /// Zero-length input or a stream with no samples
    #[error("audio contained no samples")]
    EmptyAudio,

    #[error("failed to encode chunk: {0}")]
    Encode(String),
}
