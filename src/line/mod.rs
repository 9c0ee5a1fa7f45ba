//! Messaging platform boundary
//!
//! Everything that talks to the messaging platform lives here:
//! - webhook signature verification (HMAC-SHA256 over the raw body)
//! - typed webhook event payloads
//! - the reply/push/content-download API client

pub mod client;
pub mod events;
pub mod signature;

pub use client::{LineClient, MessagingError};
pub use events::{EventSource, MessageContent, WebhookEvent, WebhookPayload};
