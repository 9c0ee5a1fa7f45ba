//! Daily-password authentication and per-user sessions
//!
//! Access to the bot is gated by a password that rotates every day
//! (`meetingMMDD` in the deployment timezone). A correct password opens a
//! session for that user; sessions expire on a TTL and never survive the
//! local midnight, so yesterday's password is useless today.

mod password;
mod session;

pub use password::{expected_password, validate};
pub use session::{AuthError, Session, SessionStore};
