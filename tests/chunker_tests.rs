// Integration tests for audio chunking.
//
// Fixtures are synthesized in memory as WAV bytes; the chunker decodes
// them, splits on duration (preferring quiet cut points), and re-encodes
// each chunk as WAV.

use anyhow::Result;
use std::io::Cursor;
use tempfile::TempDir;
use voice_minutes::audio::{AudioChunker, ChunkSettings, ChunkingError};

const SAMPLE_RATE: u32 = 8000;

fn wav_bytes(samples: &[i16]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(bytes)
}

fn tone(duration_secs: f64, amplitude: i16) -> Vec<i16> {
    vec![amplitude; (duration_secs * SAMPLE_RATE as f64) as usize]
}

fn chunker(max_chunk_seconds: f64) -> AudioChunker {
    AudioChunker::new(ChunkSettings {
        max_chunk_seconds,
        silence_lookback_seconds: 2.0,
        silence_frame_ms: 100,
    })
}

#[test]
fn ninety_seconds_splits_into_two_chunks() -> Result<()> {
    let audio = wav_bytes(&tone(90.0, 1000))?;

    let chunks = chunker(60.0).chunk_bytes(&audio, Some("wav"))?;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].sequence_index, 0);
    assert_eq!(chunks[1].sequence_index, 1);
    // Uniform audio has no quiet point, so the cut lands exactly on the limit
    assert!((chunks[0].duration_seconds - 60.0).abs() < 1e-6);
    assert!((chunks[1].duration_seconds - 30.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn chunk_count_is_ceil_of_duration_over_limit() -> Result<()> {
    let audio = wav_bytes(&tone(125.0, 1000))?;

    let chunks = chunker(60.0).chunk_bytes(&audio, Some("wav"))?;

    assert_eq!(chunks.len(), 3, "ceil(125/60) chunks expected");
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.sequence_index, i, "indices must be contiguous");
    }
    assert!((chunks[0].duration_seconds - 60.0).abs() < 1e-6);
    assert!((chunks[1].duration_seconds - 60.0).abs() < 1e-6);
    assert!((chunks[2].duration_seconds - 5.0).abs() < 1e-6);

    let total: f64 = chunks.iter().map(|c| c.duration_seconds).sum();
    assert!((total - 125.0).abs() < 1e-6, "no samples lost or duplicated");
    Ok(())
}

#[test]
fn short_recording_stays_in_one_chunk() -> Result<()> {
    let audio = wav_bytes(&tone(30.0, 1000))?;

    let chunks = chunker(60.0).chunk_bytes(&audio, Some("wav"))?;

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].sequence_index, 0);
    assert!((chunks[0].duration_seconds - 30.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn cut_prefers_a_quiet_gap_near_the_boundary() -> Result<()> {
    // 10s of speech-level audio with a silent gap at 7.0s-7.2s. With an 8s
    // limit and a 2s look-back, the cut should land inside the gap instead
    // of at 8.0s.
    let mut samples = tone(10.0, 2000);
    let gap_start = (7.0 * SAMPLE_RATE as f64) as usize;
    let gap_end = (7.2 * SAMPLE_RATE as f64) as usize;
    for sample in &mut samples[gap_start..gap_end] {
        *sample = 0;
    }
    let audio = wav_bytes(&samples)?;

    let chunks = chunker(8.0).chunk_bytes(&audio, Some("wav"))?;

    assert_eq!(chunks.len(), 2);
    assert!(
        chunks[0].duration_seconds > 6.9 && chunks[0].duration_seconds <= 7.2,
        "cut should land in the quiet gap, got {:.2}s",
        chunks[0].duration_seconds
    );

    let total: f64 = chunks.iter().map(|c| c.duration_seconds).sum();
    assert!((total - 10.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn chunk_payloads_are_valid_wav_files() -> Result<()> {
    let audio = wav_bytes(&tone(90.0, 1000))?;
    let chunks = chunker(60.0).chunk_bytes(&audio, Some("wav"))?;

    let temp_dir = TempDir::new()?;
    for chunk in &chunks {
        let path = temp_dir
            .path()
            .join(format!("chunk-{}.wav", chunk.sequence_index));
        std::fs::write(&path, &chunk.byte_payload)?;

        let reader = hound::WavReader::open(&path)?;
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(
            reader.len() as f64 / SAMPLE_RATE as f64,
            chunk.duration_seconds
        );
    }
    Ok(())
}

#[test]
fn corrupt_input_fails_with_unreadable_audio() {
    let result = chunker(60.0).chunk_bytes(b"definitely not audio bytes", Some("m4a"));

    assert!(matches!(result, Err(ChunkingError::UnreadableAudio(_))));
}

#[test]
fn empty_input_fails_with_empty_audio() {
    let result = chunker(60.0).chunk_bytes(&[], Some("m4a"));

    assert!(matches!(result, Err(ChunkingError::EmptyAudio)));
}
