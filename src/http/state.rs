use std::sync::Arc;

use anyhow::Result;
use chrono::FixedOffset;

use crate::audio::{AudioChunker, ChunkSettings};
use crate::auth::SessionStore;
use crate::config::Config;
use crate::line::LineClient;
use crate::upstream::{ChatSummaryClient, RetryPolicy, TranscribeOptions, WhisperClient};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub line: Arc<LineClient>,
    pub chunker: Arc<AudioChunker>,
    pub stt: Arc<WhisperClient>,
    pub summarizer: Arc<ChatSummaryClient>,
    pub transcribe_options: TranscribeOptions,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let offset = FixedOffset::east_opt(config.auth.utc_offset_hours * 3600)
            .ok_or_else(|| {
                anyhow::anyhow!("invalid utc_offset_hours: {}", config.auth.utc_offset_hours)
            })?;

        let sessions = SessionStore::new(config.auth.session_ttl_secs, offset);
        let line = LineClient::new(&config.line)?;
        let chunker = AudioChunker::new(ChunkSettings {
            max_chunk_seconds: config.audio.max_chunk_seconds,
            silence_lookback_seconds: config.audio.silence_lookback_seconds,
            ..ChunkSettings::default()
        });
        let stt = WhisperClient::new(&config.transcription)?;
        let summarizer = ChatSummaryClient::new(&config.summary)?;
        let transcribe_options = TranscribeOptions {
            concurrency: config.transcription.concurrency,
            retry: RetryPolicy::new(
                config.transcription.max_retries,
                config.transcription.retry_delay_ms,
            ),
        };

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            line: Arc::new(line),
            chunker: Arc::new(chunker),
            stt: Arc::new(stt),
            summarizer: Arc::new(summarizer),
            transcribe_options,
        })
    }
}
