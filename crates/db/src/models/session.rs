//! Browser sessions.

use serde::Serialize;
use sqlx::FromRow;
use scholar_core::types::{DbId, Timestamp};

/// A row from the `sessions` table. Session data is never exposed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: Option<DbId>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub last_used_at: Timestamp,
    pub remember: bool,
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub session_id: String,
    pub user_id: Option<DbId>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub remember: bool,
}
