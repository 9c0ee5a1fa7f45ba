use serde::Deserialize;

/// Webhook envelope delivered by the platform
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// "message", "follow", "unfollow"; only "message" is handled
    #[serde(rename = "type")]
    pub event_type: String,
    /// One-shot token for the reply API
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Message payload variants this bot reacts to. Anything else (stickers,
/// images, locations) deserializes as `Unsupported` and is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text {
        id: String,
        text: String,
    },
    /// Voice message recorded in the app; content is fetched by message id
    Audio {
        id: String,
        #[serde(default)]
        duration: Option<u64>,
    },
    /// Uploaded file; only audio extensions are accepted downstream
    File {
        id: String,
        #[serde(default, rename = "fileName")]
        file_name: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}
