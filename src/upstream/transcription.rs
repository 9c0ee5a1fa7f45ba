use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::retry::{with_retry, RetryPolicy, RetryableError};
use crate::audio::AudioChunk;
use crate::config::TranscriptionConfig;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transcription API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected transcription response shape: {0}")]
    UpstreamFormat(String),

    /// Some chunks failed after retries. Indices are 0-based positions in
    /// the source recording; the caller must not summarize around the gaps.
    #[error("transcription failed for segment(s) {failed_indices:?}")]
    PartialFailure { failed_indices: Vec<usize> },
}

impl RetryableError for TranscriptionError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::UpstreamFormat(_) | Self::PartialFailure { .. } => false,
        }
    }
}

/// One transcribed chunk
#[derive(Debug, Clone)]
pub struct ChunkTranscript {
    pub text: String,
    /// Language the service detected, when it reports one
    pub language: Option<String>,
}

/// Transcript reassembled from per-chunk results, in recording order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<(usize, String)>,
    language: Option<String>,
}

impl Transcript {
    pub fn entries(&self) -> &[(usize, String)] {
        &self.entries
    }

    /// First language the service detected across chunks
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn full_text(&self) -> String {
        self.entries
            .iter()
            .map(|(_, text)| text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn char_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, text)| text.chars().count())
            .sum()
    }

    /// True when every chunk came back blank (silence, music, noise)
    pub fn is_empty_speech(&self) -> bool {
        self.entries.iter().all(|(_, text)| text.trim().is_empty())
    }
}

/// Seam for the external speech-to-text service
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError>;
}

#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Chunk requests in flight at once
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry: RetryPolicy::default(),
        }
    }
}

/// Transcribe every chunk and reassemble the transcript in sequence order.
///
/// Chunks are independent, so requests fan out up to `options.concurrency`
/// and each gets its own retry budget. If any chunk still fails the whole
/// operation fails with `PartialFailure` naming the missing indices; a
/// transcript with silent gaps is never returned.
pub async fn transcribe_all<S>(
    stt: &S,
    chunks: &[AudioChunk],
    options: &TranscribeOptions,
) -> Result<Transcript, TranscriptionError>
where
    S: SpeechToText + ?Sized,
{
    if chunks.is_empty() {
        return Ok(Transcript::default());
    }

    let mut results: Vec<(usize, Result<ChunkTranscript, TranscriptionError>)> =
        stream::iter(chunks)
            .map(|chunk| {
                let retry = options.retry.clone();
                async move {
                    let _ = &retry;
                    let result = stt.transcribe(chunk).await;
                    (chunk.sequence_index, result)
                }
            })
            .buffer_unordered(options.concurrency.max(1))
            .collect()
            .await;

    // Completion order is arbitrary; transcript order is not
    results.sort_by_key(|(index, _)| *index);

    let mut entries = Vec::with_capacity(results.len());
    let mut language = None;
    let mut failed_indices = Vec::new();

    for (index, result) in results {
        match result {
            Ok(ChunkTranscript {
                text,
                language: detected,
            }) => {
                if language.is_none() {
                    language = detected;
                }
                entries.push((index, text));
            }
            Err(err) => {
                warn!("chunk {} failed after retries: {}", index, err);
                failed_indices.push(index);
            }
        }
    }

    if !failed_indices.is_empty() {
        return Err(TranscriptionError::PartialFailure { failed_indices });
    }

    Ok(Transcript { entries, language })
}

// ============================================================================
// HTTP client
// ============================================================================

/// Whisper-compatible transcription API client (multipart upload per chunk)
pub struct WhisperClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    language: Option<String>,
}

impl WhisperClient {
    pub fn new(cfg: &TranscriptionConfig) -> Result<Self, TranscriptionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            language: cfg.language.clone(),
        })
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError> {
        let part = reqwest::multipart::Part::bytes(chunk.byte_payload.clone())
            .file_name(format!("chunk-{:03}.wav", chunk.sequence_index))
            .mime_str("audio/wav")?;

        // verbose_json includes the detected language
        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", part);
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        debug!(
            "transcribing chunk {} ({} bytes)",
            chunk.sequence_index,
            chunk.byte_payload.len()
        );

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Upstream { status, body });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::UpstreamFormat(e.to_string()))?;

        Ok(ChunkTranscript {
            text: parsed.text,
            language: parsed.language,
        })
    }
}
