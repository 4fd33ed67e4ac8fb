//! Data object tombstone rows.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::FromRow;
use scholar_core::tombstone::DataObjectTombstone;
use scholar_core::types::{DbId, Timestamp};

/// A row from the `data_object_tombstones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TombstoneRow {
    pub id: DbId,
    pub data_object_id: DbId,
    pub date_deleted: Timestamp,
    pub set_spec: String,
    pub set_name: String,
    pub oai_identifier: String,
}

/// A row from the `data_object_tombstone_oai_set_objects` table.
#[derive(Debug, Clone, FromRow)]
pub struct SetObjectRow {
    pub tombstone_id: DbId,
    pub assoc_type: i64,
    pub assoc_id: DbId,
}

impl TombstoneRow {
    pub fn with_set_objects(self, set_objects: BTreeMap<i64, DbId>) -> DataObjectTombstone {
        DataObjectTombstone {
            id: Some(self.id),
            data_object_id: self.data_object_id,
            date_deleted: Some(self.date_deleted),
            set_spec: self.set_spec,
            set_name: self.set_name,
            oai_identifier: self.oai_identifier,
            oai_set_objects_ids: set_objects,
        }
    }
}
