use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::LineConfig;
use crate::document;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("platform API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Reply/push API client for the messaging platform.
///
/// Outbound text longer than the platform's message limit is split into
/// ordered parts before sending.
pub struct LineClient {
    http: reqwest::Client,
    access_token: String,
    api_base: String,
    blob_base: String,
    max_message_chars: usize,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

impl LineClient {
    pub fn new(cfg: &LineConfig) -> Result<Self, MessagingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            access_token: cfg.channel_access_token.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            blob_base: cfg.blob_base.trim_end_matches('/').to_string(),
            max_message_chars: cfg.max_message_chars,
        })
    }

    /// Reply using the event's one-shot token. The reply API caps a call at
    /// five messages; anything longer should go through `push`.
    pub async fn reply(&self, reply_token: &str, text: &str) -> Result<(), MessagingError> {
        let parts = document::split_for_messaging(text, self.max_message_chars);
        let messages: Vec<TextMessage> = parts
            .iter()
            .take(5)
            .map(|part| TextMessage {
                kind: "text",
                text: part,
            })
            .collect();

        self.post_json(
            "/v2/bot/message/reply",
            &ReplyRequest {
                reply_token,
                messages,
            },
        )
        .await
    }

    /// Push text to a user, one part per call, preserving reading order.
    pub async fn push(&self, user_id: &str, text: &str) -> Result<(), MessagingError> {
        let parts = document::split_for_messaging(text, self.max_message_chars);
        for part in &parts {
            self.post_json(
                "/v2/bot/message/push",
                &PushRequest {
                    to: user_id,
                    messages: vec![TextMessage {
                        kind: "text",
                        text: part,
                    }],
                },
            )
            .await?;
        }
        Ok(())
    }

    /// Download the binary content of a voice or file message.
    pub async fn fetch_message_content(
        &self,
        message_id: &str,
    ) -> Result<Vec<u8>, MessagingError> {
        let url = format!("{}/v2/bot/message/{}/content", self.blob_base, message_id);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        info!("downloaded message content: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<(), MessagingError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Api { status, body });
        }

        Ok(())
    }
}
