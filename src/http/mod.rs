//! HTTP surface for the bot
//!
//! Two routes:
//! - POST /callback - signed webhook events from the messaging platform
//! - GET /health - health check with the active session count

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
