//! Reply formatting for the messaging platform
//!
//! Builds the text the user actually sees: the summary document with its
//! header, the canned prompts, and the splitting of long texts into
//! platform-sized parts.

use chrono::{DateTime, FixedOffset, Utc};

pub const WELCOME: &str = "Authentication successful. Send a voice message or upload an audio file and I'll reply with a meeting summary.";

pub const ALREADY_AUTHENTICATED: &str =
    "You're already authenticated. Send a voice message to transcribe.";

pub const UNAUTHENTICATED_PROMPT: &str = "Please enter today's password to use this bot.\n\nFormat: meetingMMDD\nExample: meeting0203 (for Feb 3rd)";

pub const INVALID_PASSWORD: &str = "Incorrect password. Please try again.";

pub const PROCESSING: &str = "Audio received. Transcribing and summarizing now; long recordings can take a few minutes.";

pub const NO_SPEECH: &str =
    "No speech detected in the audio. Please try again with a clearer recording.";

pub const DOWNLOAD_FAILED: &str =
    "Could not download the voice message. Please try sending it again.";

/// Formats the audio-file guidance shown when a non-audio file arrives.
pub fn unsupported_file_message(file_name: &str) -> String {
    format!(
        "Please send an audio file.\n\nSupported formats: M4A, MP3, WAV, OGG, FLAC\n\nReceived: {}",
        file_name
    )
}

/// Prepend the summary header (local timestamp, recording duration).
pub fn format_summary(
    summary: &str,
    duration_seconds: Option<f64>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> String {
    let local = now.with_timezone(&offset);
    let mut header = format!("Meeting Summary\n{}\n", local.format("%Y-%m-%d %H:%M"));

    if let Some(duration) = duration_seconds {
        let minutes = (duration / 60.0) as u64;
        let seconds = (duration % 60.0) as u64;
        header.push_str(&format!("Duration: {}m {}s\n", minutes, seconds));
    }

    header.push_str(&"-".repeat(20));
    header.push_str("\n\n");
    header.push_str(summary);
    header
}

/// Split long text into parts below the platform's per-message limit,
/// breaking on line boundaries where possible. Multi-part output gets
/// "Part i/n" prefixes so reading order survives delivery.
pub fn split_for_messaging(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for line in text.split('\n') {
        for piece in hard_split(line, max_chars) {
            let piece_chars = piece.chars().count();
            if current_chars + piece_chars + 1 > max_chars && !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
                current_chars = 0;
            }
            current.push_str(&piece);
            current.push('\n');
            current_chars += piece_chars + 1;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    if chunks.is_empty() {
        return vec![text.trim_end().to_string()];
    }

    if chunks.len() > 1 {
        let total = chunks.len();
        chunks = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| format!("Part {}/{}\n\n{}", i + 1, total, chunk))
            .collect();
    }

    chunks
}

/// A single line longer than the cap is cut mid-line as a last resort.
fn hard_split(line: &str, max_chars: usize) -> Vec<String> {
    if line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}
