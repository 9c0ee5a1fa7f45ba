use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use super::password;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid password")]
    InvalidPassword,
}

/// An authenticated user session
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Tracks which users are authenticated and until when.
///
/// One session per user id. Expiry is lazy: expired entries are treated as
/// absent on lookup, no background sweep runs. All decisions take `now` as a
/// parameter so tests control the clock.
pub struct SessionStore {
    ttl: Duration,
    offset: FixedOffset,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64, offset: FixedOffset) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            offset,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's date in the deployment timezone; passwords rotate on this.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Validate the password for `now`'s local date and create or refresh the
    /// user's session. The check and the write happen under one writer lock,
    /// so concurrent submissions for the same user cannot interleave.
    pub async fn authenticate(
        &self,
        user_id: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let mut sessions = self.sessions.write().await;

        if !password::validate(candidate, self.local_date(now)) {
            return Err(AuthError::InvalidPassword);
        }

        let session = Session {
            user_id: user_id.to_string(),
            authenticated_at: now,
            expires_at: self.expiry_for(now),
        };
        sessions.insert(user_id.to_string(), session.clone());

        info!("session opened, valid until {}", session.expires_at);
        Ok(session)
    }

    /// True iff the user has a session and `now` is before its expiry.
    pub async fn is_authenticated(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(user_id)
            .is_some_and(|session| now < session.expires_at)
    }

    /// Number of live sessions, for the health endpoint.
    pub async fn active_count(&self, now: DateTime<Utc>) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|session| now < session.expires_at)
            .count()
    }

    /// Sessions end at the TTL or the next local midnight, whichever comes
    /// first: an authentication never carries into the next day's password.
    fn expiry_for(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl_expiry = now + self.ttl;
        match self.next_local_midnight(now) {
            Some(midnight) => ttl_expiry.min(midnight),
            None => ttl_expiry,
        }
    }

    fn next_local_midnight(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = now.with_timezone(&self.offset);
        let midnight = local.date_naive().succ_opt()?.and_hms_opt(0, 0, 0)?;
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
