//! The audio processing job: chunk, transcribe, summarize
//!
//! Runs after the webhook has already been acknowledged; the caller pushes
//! the outcome (or the failure message) to the user afterwards.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::audio::{AudioChunker, ChunkingError};
use crate::upstream::{
    transcribe_all, SpeechToText, Summarizer, SummaryError, SummaryResult, TranscribeOptions,
    TranscriptionError,
};

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error("summarization failed: {source}")]
    Summary {
        source: SummaryError,
        /// The transcript is still delivered when only the summary fails
        transcript: String,
    },
}

#[derive(Debug)]
pub enum JobOutcome {
    Summarized {
        summary: SummaryResult,
        duration_seconds: f64,
        language: Option<String>,
    },
    /// Every chunk transcribed to blank text (silence, music, noise)
    NoSpeech,
}

/// Run one recording through the full pipeline.
///
/// Chunk results are joined before summarization starts; a partial
/// transcript is never summarized.
pub async fn transcribe_and_summarize(
    chunker: &AudioChunker,
    stt: &dyn SpeechToText,
    summarizer: &dyn Summarizer,
    audio: &[u8],
    extension: Option<&str>,
    options: &TranscribeOptions,
) -> Result<JobOutcome, JobError> {
    let job_id = Uuid::new_v4();
    info!("job {}: processing {} audio bytes", job_id, audio.len());

    let chunks = chunker.chunk_bytes(audio, extension)?;
    let duration_seconds: f64 = chunks.iter().map(|c| c.duration_seconds).sum();
    info!(
        "job {}: {} chunk(s), {:.1}s total",
        job_id,
        chunks.len(),
        duration_seconds
    );

    let transcript = transcribe_all(stt, &chunks, options).await?;
    if transcript.is_empty_speech() {
        info!("job {}: no speech detected", job_id);
        return Ok(JobOutcome::NoSpeech);
    }

    let full_text = transcript.full_text();
    let language = transcript.language().map(|l| l.to_string());
    info!(
        "job {}: transcript ready ({} chars, language={})",
        job_id,
        full_text.chars().count(),
        language.as_deref().unwrap_or("unknown")
    );

    let summary = summarizer
        .summarize(&full_text, language.as_deref())
        .await
        .map_err(|source| JobError::Summary {
            source,
            transcript: full_text.clone(),
        })?;

    info!(
        "job {}: summary ready ({} chars)",
        job_id,
        summary.text.chars().count()
    );

    Ok(JobOutcome::Summarized {
        summary,
        duration_seconds,
        language,
    })
}

impl JobError {
    /// The plain-language reply for this failure. Raw transport errors never
    /// reach the user.
    pub fn user_message(&self) -> String {
        match self {
            JobError::Chunking(_) => {
                "Could not process the audio. The recording may be corrupted or in an \
                 unsupported format. Please try recording again."
                    .to_string()
            }
            JobError::Transcription(TranscriptionError::PartialFailure { failed_indices }) => {
                let segments: Vec<String> = failed_indices
                    .iter()
                    .map(|index| (index + 1).to_string())
                    .collect();
                format!(
                    "Transcription incomplete: segment(s) {} of the recording could not be \
                     transcribed, so no summary was generated. Please try sending the \
                     recording again.",
                    segments.join(", ")
                )
            }
            JobError::Transcription(_) => {
                "Transcription failed. This can happen when the audio quality is too low or \
                 the service is busy. Please try again in a moment."
                    .to_string()
            }
            JobError::Summary {
                source: SummaryError::InputTooLarge { .. },
                transcript,
            } => format!(
                "The recording is too long to summarize in one pass, but here's the \
                 transcript:\n\n{}",
                transcript
            ),
            JobError::Summary { transcript, .. } => format!(
                "Summary generation failed, but here's the transcript:\n\n{}",
                transcript
            ),
        }
    }
}
