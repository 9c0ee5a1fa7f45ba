use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::retry::{with_retry, RetryPolicy, RetryableError};
use crate::config::SummaryConfig;

/// System prompt for meeting summarization. The summary must come back in
/// the transcript's own language (the bot serves Chinese and English users).
const SYSTEM_PROMPT: &str = "You are an expert meeting summarizer. You analyze meeting transcripts and produce well-organized summaries.

Instructions:
1. Analyze the transcript carefully to identify key information
2. Write the summary in the SAME LANGUAGE as the transcript; for mixed-language transcripts use the dominant language
3. Be concise but comprehensive
4. Extract action items even when they are not labelled as such
5. Identify decisions made during the meeting
6. Note follow-up items and next steps";

const OUTPUT_FORMAT: &str = "## Required Output Format:

# 會議摘要 / Meeting Summary

**日期/Date:** [from the transcript, or \"Not specified\"]
**參與者/Attendees:** [if mentioned, otherwise \"Not explicitly mentioned\"]

## 重點討論 / Key Discussion Points
[main topics as bullet points]

## 決議事項 / Decisions Made
[decisions reached during the meeting]

## 待辦事項 / Action Items
[format: - [Action] (Owner: [Name])]

## 後續步驟 / Next Steps
[follow-ups or plans for the next meeting]";

#[derive(Debug, Error)]
pub enum SummaryError {
    /// Input exceeds the model's context budget; checked before any request
    /// is sent, never silently truncated
    #[error("transcript too large to summarize: {chars} chars (limit {max_chars})")]
    InputTooLarge { chars: usize, max_chars: usize },

    /// Network-level failure reaching the service
    #[error("summary service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("summary API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected summary response shape: {0}")]
    UpstreamFormat(String),
}

impl RetryableError for SummaryError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::InputTooLarge { .. } | Self::UpstreamFormat(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub text: String,
    /// Characters of transcript the summary was produced from
    pub source_transcript_length: usize,
}

/// Seam for the external summarization service
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        transcript: &str,
        language_hint: Option<&str>,
    ) -> Result<SummaryResult, SummaryError>;
}

// ============================================================================
// HTTP client
// ============================================================================

/// OpenAI-compatible chat-completions client with a fixed summary prompt
pub struct ChatSummaryClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_input_chars: usize,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatSummaryClient {
    pub fn new(cfg: &SummaryConfig) -> Result<Self, SummaryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| SummaryError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            max_input_chars: cfg.max_input_chars,
            retry: RetryPolicy::new(cfg.max_retries, cfg.retry_delay_ms),
        })
    }

    fn build_prompt(transcript: &str, language_hint: Option<&str>) -> String {
        let mut prompt = String::new();
        if let Some(language) = language_hint {
            prompt.push_str(&format!("[Detected language: {}]\n\n", language));
        }
        prompt.push_str(
            "Please analyze this meeting transcript and create a structured summary.\n\n",
        );
        prompt.push_str("## Transcript:\n");
        prompt.push_str(transcript);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT);
        prompt
    }

    async fn request_summary(&self, prompt: &str) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Upstream { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::UpstreamFormat(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            info!(
                "summary tokens: {} prompt / {} completion",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SummaryError::UpstreamFormat("response contained no choices".to_string()))
    }
}

#[async_trait]
impl Summarizer for ChatSummaryClient {
    async fn summarize(
        &self,
        transcript: &str,
        language_hint: Option<&str>,
    ) -> Result<SummaryResult, SummaryError> {
        let chars = transcript.chars().count();
        if chars > self.max_input_chars {
            return Err(SummaryError::InputTooLarge {
                chars,
                max_chars: self.max_input_chars,
            });
        }

        let prompt = Self::build_prompt(transcript, language_hint);
        info!("requesting summary for {} transcript chars", chars);

        let text = with_retry(&self.retry, "summarization", || {
            self.request_summary(&prompt)
        })
        .await?;

        Ok(SummaryResult {
            text,
            source_transcript_length: chars,
        })
    }
}
