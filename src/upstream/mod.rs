//! Clients for the external speech-to-text and summarization services
//!
//! Both upstreams are plain HTTP APIs:
//! - a Whisper-compatible `/audio/transcriptions` endpoint (multipart WAV in,
//!   JSON text out), called once per audio chunk with bounded fan-out
//! - an OpenAI-compatible `/chat/completions` endpoint for the meeting
//!   summary
//!
//! All transport failures are converted to typed errors at this boundary and
//! retried through one shared bounded-backoff helper.

pub mod retry;
pub mod summary;
pub mod transcription;

pub use retry::{with_retry, RetryPolicy, RetryableError};
pub use summary::{ChatSummaryClient, Summarizer, SummaryError, SummaryResult};
pub use transcription::{
    transcribe_all, ChunkTranscript, SpeechToText, TranscribeOptions, Transcript,
    TranscriptionError, WhisperClient,
};
