// Tests for the transcription fan-out: ordering, retries, and the
// partial-failure contract. The speech-to-text service is mocked through
// the SpeechToText trait; no network is involved.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use voice_minutes::audio::AudioChunk;
use voice_minutes::upstream::{
    transcribe_all, ChunkTranscript, RetryPolicy, SpeechToText, TranscribeOptions,
    TranscriptionError,
};

fn chunk(index: usize) -> AudioChunk {
    AudioChunk {
        sequence_index: index,
        byte_payload: vec![0u8; 16],
        duration_seconds: 1.0,
    }
}

fn options(concurrency: usize, max_retries: u32) -> TranscribeOptions {
    TranscribeOptions {
        concurrency,
        // 1ms base delay keeps retry tests fast
        retry: RetryPolicy::new(max_retries, 1),
    }
}

/// Answers later chunks sooner, so completion order is reversed
struct ReversedLatency;

#[async_trait]
impl SpeechToText for ReversedLatency {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError> {
        let delay_ms = 40 - 15 * chunk.sequence_index.min(2) as u64;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(ChunkTranscript {
            text: format!("segment {}", chunk.sequence_index),
            language: Some("en".to_string()),
        })
    }
}

#[tokio::test]
async fn transcript_is_reassembled_in_sequence_order() {
    let chunks: Vec<AudioChunk> = (0..3).map(chunk).collect();

    let transcript = transcribe_all(&ReversedLatency, &chunks, &options(3, 0))
        .await
        .expect("all chunks succeed");

    assert_eq!(
        transcript.full_text(),
        "segment 0\n\nsegment 1\n\nsegment 2"
    );
    assert_eq!(transcript.language(), Some("en"));
    let indices: Vec<usize> = transcript.entries().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

/// Fails a fixed set of indices with a retryable error, every attempt
struct FailsIndices(Vec<usize>);

#[async_trait]
impl SpeechToText for FailsIndices {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError> {
        if self.0.contains(&chunk.sequence_index) {
            Err(TranscriptionError::Upstream {
                status: 503,
                body: "service unavailable".to_string(),
            })
        } else {
            Ok(ChunkTranscript {
                text: format!("segment {}", chunk.sequence_index),
                language: None,
            })
        }
    }
}

#[tokio::test]
async fn persistent_chunk_failure_reports_partial_failure() {
    let chunks: Vec<AudioChunk> = (0..3).map(chunk).collect();

    let result = transcribe_all(&FailsIndices(vec![1]), &chunks, &options(2, 1)).await;

    match result {
        Err(TranscriptionError::PartialFailure { failed_indices }) => {
            assert_eq!(failed_indices, vec![1]);
        }
        other => panic!("expected PartialFailure, got {:?}", other.map(|t| t.full_text())),
    }
}

#[tokio::test]
async fn multiple_failures_are_all_reported_in_order() {
    let chunks: Vec<AudioChunk> = (0..4).map(chunk).collect();

    let result = transcribe_all(&FailsIndices(vec![2, 0]), &chunks, &options(4, 0)).await;

    match result {
        Err(TranscriptionError::PartialFailure { failed_indices }) => {
            assert_eq!(failed_indices, vec![0, 2]);
        }
        other => panic!("expected PartialFailure, got {:?}", other.map(|t| t.full_text())),
    }
}

/// Fails with a retryable 500 on the first two attempts, then succeeds
struct FlakyTwice {
    attempts: AtomicUsize,
}

#[async_trait]
impl SpeechToText for FlakyTwice {
    async fn transcribe(&self, chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < 2 {
            Err(TranscriptionError::Upstream {
                status: 500,
                body: "internal error".to_string(),
            })
        } else {
            Ok(ChunkTranscript {
                text: format!("segment {}", chunk.sequence_index),
                language: None,
            })
        }
    }
}

#[tokio::test]
async fn transient_errors_are_retried_within_budget() {
    let stt = FlakyTwice {
        attempts: AtomicUsize::new(0),
    };
    let chunks = vec![chunk(0)];

    let transcript = transcribe_all(&stt, &chunks, &options(1, 2))
        .await
        .expect("third attempt succeeds");

    assert_eq!(transcript.full_text(), "segment 0");
    assert_eq!(stt.attempts.load(Ordering::SeqCst), 3);
}

/// Always fails with a client error that must not be retried
struct RejectedUpload {
    attempts: AtomicUsize,
}

#[async_trait]
impl SpeechToText for RejectedUpload {
    async fn transcribe(&self, _chunk: &AudioChunk) -> Result<ChunkTranscript, TranscriptionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TranscriptionError::Upstream {
            status: 400,
            body: "unsupported file".to_string(),
        })
    }
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let stt = RejectedUpload {
        attempts: AtomicUsize::new(0),
    };
    let chunks = vec![chunk(0)];

    let result = transcribe_all(&stt, &chunks, &options(1, 2)).await;

    assert!(matches!(
        result,
        Err(TranscriptionError::PartialFailure { .. })
    ));
    assert_eq!(stt.attempts.load(Ordering::SeqCst), 1, "no retry on a 400");
}

#[tokio::test]
async fn empty_chunk_list_yields_empty_transcript() {
    let transcript = transcribe_all(&ReversedLatency, &[], &options(1, 0))
        .await
        .expect("empty input is not an error");

    assert!(transcript.is_empty_speech());
    assert_eq!(transcript.full_text(), "");
}
