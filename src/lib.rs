pub mod audio;
pub mod auth;
pub mod config;
pub mod document;
pub mod http;
pub mod line;
pub mod pipeline;
pub mod upstream;

pub use audio::{AudioChunk, AudioChunker, ChunkSettings, ChunkingError, DecodedAudio};
pub use auth::{AuthError, Session, SessionStore};
pub use config::Config;
pub use http::{create_router, AppState};
pub use line::{LineClient, MessagingError, WebhookEvent, WebhookPayload};
pub use pipeline::{JobError, JobOutcome};
pub use upstream::{
    ChatSummaryClient, RetryPolicy, SpeechToText, Summarizer, SummaryError, SummaryResult,
    Transcript, TranscriptionError, WhisperClient,
};
