use super::state::AppState;
use crate::auth::AuthError;
use crate::document;
use crate::line::{signature, MessageContent, WebhookEvent, WebhookPayload};
use crate::pipeline::{self, JobOutcome};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

const SIGNATURE_HEADER: &str = "x-line-signature";

/// Uploaded files must carry one of these extensions to be processed
const AUDIO_EXTENSIONS: &[&str] = &[
    "m4a", "mp3", "wav", "ogg", "flac", "mp4", "mpeg", "mpga", "webm",
];

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active_sessions = state.sessions.active_count(Utc::now()).await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            active_sessions,
        }),
    )
}

/// POST /callback
///
/// Platform webhook endpoint. The signature covers the raw body, so it is
/// verified before any JSON parsing. The platform expects a fast 200; the
/// heavy audio work is spawned off this handler and the final result goes
/// out via the push API.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !signature::verify(&state.config.line.channel_secret, &body, header) {
        warn!("webhook rejected: invalid signature");
        return (StatusCode::UNAUTHORIZED, "invalid signature");
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("webhook rejected: undecodable payload: {}", e);
            return (StatusCode::BAD_REQUEST, "bad request");
        }
    };

    info!("webhook accepted: {} event(s)", payload.events.len());

    for event in payload.events {
        dispatch_event(&state, event).await;
    }

    (StatusCode::OK, "OK")
}

// ============================================================================
// Event dispatch
// ============================================================================

async fn dispatch_event(state: &AppState, event: WebhookEvent) {
    if event.event_type != "message" {
        return;
    }

    let user_id = event.source.and_then(|source| source.user_id);
    let (user_id, reply_token, message) = match (user_id, event.reply_token, event.message) {
        (Some(user_id), Some(reply_token), Some(message)) => (user_id, reply_token, message),
        _ => return,
    };

    match message {
        MessageContent::Text { text, .. } => {
            handle_text(state, &user_id, &reply_token, text.trim()).await;
        }
        // Voice messages recorded in the app are always M4A
        MessageContent::Audio { id, .. } => {
            handle_audio(state, &user_id, &reply_token, &id, "m4a").await;
        }
        MessageContent::File { id, file_name } => {
            handle_file(state, &user_id, &reply_token, &id, file_name.as_deref()).await;
        }
        MessageContent::Unsupported => {}
    }
}

/// Text messages only matter for password authentication.
async fn handle_text(state: &AppState, user_id: &str, reply_token: &str, text: &str) {
    let now = Utc::now();

    if state.sessions.is_authenticated(user_id, now).await {
        send_reply(state, reply_token, document::ALREADY_AUTHENTICATED).await;
        return;
    }

    match state.sessions.authenticate(user_id, text, now).await {
        Ok(_) => {
            info!("user authenticated");
            send_reply(state, reply_token, document::WELCOME).await;
        }
        Err(AuthError::InvalidPassword) => {
            send_reply(state, reply_token, document::INVALID_PASSWORD).await;
        }
    }
}

async fn handle_audio(
    state: &AppState,
    user_id: &str,
    reply_token: &str,
    message_id: &str,
    extension: &str,
) {
    let now = Utc::now();
    if !state.sessions.is_authenticated(user_id, now).await {
        send_reply(state, reply_token, document::UNAUTHENTICATED_PROMPT).await;
        return;
    }

    info!("audio message accepted, queueing job");
    send_reply(state, reply_token, document::PROCESSING).await;

    let state = state.clone();
    let user_id = user_id.to_string();
    let message_id = message_id.to_string();
    let extension = extension.to_string();
    tokio::spawn(async move {
        process_audio_job(state, user_id, message_id, extension).await;
    });
}

/// Uploaded files go through the same pipeline once the extension checks out.
async fn handle_file(
    state: &AppState,
    user_id: &str,
    reply_token: &str,
    message_id: &str,
    file_name: Option<&str>,
) {
    let now = Utc::now();
    if !state.sessions.is_authenticated(user_id, now).await {
        send_reply(state, reply_token, document::UNAUTHENTICATED_PROMPT).await;
        return;
    }

    let name = file_name.unwrap_or("").to_lowercase();
    let extension = name.rsplit('.').next().unwrap_or("");
    if !AUDIO_EXTENSIONS.contains(&extension) {
        send_reply(
            state,
            reply_token,
            &document::unsupported_file_message(file_name.unwrap_or("(unnamed)")),
        )
        .await;
        return;
    }

    handle_audio(state, user_id, reply_token, message_id, extension).await;
}

// ============================================================================
// Background job
// ============================================================================

async fn process_audio_job(state: AppState, user_id: String, message_id: String, extension: String) {
    let audio = match state.line.fetch_message_content(&message_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("content download failed: {}", e);
            send_push(&state, &user_id, document::DOWNLOAD_FAILED).await;
            return;
        }
    };

    let result = pipeline::transcribe_and_summarize(
        &state.chunker,
        state.stt.as_ref(),
        state.summarizer.as_ref(),
        &audio,
        Some(&extension),
        &state.transcribe_options,
    )
    .await;

    match result {
        Ok(JobOutcome::Summarized {
            summary,
            duration_seconds,
            ..
        }) => {
            let text = document::format_summary(
                &summary.text,
                Some(duration_seconds),
                Utc::now(),
                state.sessions.utc_offset(),
            );
            send_push(&state, &user_id, &text).await;
        }
        Ok(JobOutcome::NoSpeech) => {
            send_push(&state, &user_id, document::NO_SPEECH).await;
        }
        Err(e) => {
            error!("audio job failed: {}", e);
            send_push(&state, &user_id, &e.user_message()).await;
        }
    }
}

// ============================================================================
// Send helpers
// ============================================================================

async fn send_reply(state: &AppState, reply_token: &str, text: &str) {
    if let Err(e) = state.line.reply(reply_token, text).await {
        error!("reply failed: {}", e);
    }
}

async fn send_push(state: &AppState, user_id: &str, text: &str) {
    if let Err(e) = state.line.push(user_id, text).await {
        error!("push failed: {}", e);
    }
}
