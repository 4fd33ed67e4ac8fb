//! Public identifiers stored per object.

use serde::Serialize;
use sqlx::FromRow;
use scholar_core::types::DbId;

/// A row from the `pub_object_identifiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PubObjectIdentifier {
    pub id: DbId,
    pub context_id: DbId,
    pub assoc_type: i64,
    pub assoc_id: DbId,
    pub pub_id_type: String,
    pub pub_id: String,
}
