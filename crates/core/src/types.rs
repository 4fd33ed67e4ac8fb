/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Context id used for site-wide records (no journal).
pub const CONTEXT_ID_NONE: DbId = 0;
