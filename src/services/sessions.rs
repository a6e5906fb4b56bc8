//! Per-session visit counter

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;

/// Session-scoped state. Entries are created on first use and expire
/// together with the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Count this visit and return how many came before it
    async fn record_visit(&self, session_id: Uuid) -> AppResult<i64>;
}

/// Key holding the visit counter of a session
pub fn visits_key(session_id: Uuid) -> String {
    format!("session:{}:num_visits", session_id)
}
