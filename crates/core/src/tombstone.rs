//! Tombstones for deleted objects that OAI harvesters have already seen.
//!
//! When a published object is deleted, a tombstone keeps its OAI identifier
//! and set membership so harvesters can be told it is gone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assoc::AssocType;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObjectTombstone {
    /// `None` until stored.
    pub id: Option<DbId>,
    /// Id of the deleted object.
    pub data_object_id: DbId,
    pub date_deleted: Option<Timestamp>,
    /// OAI `setSpec`, e.g. `"jcs:ART"`.
    pub set_spec: String,
    pub set_name: String,
    pub oai_identifier: String,
    /// Objects that defined the deleted object's OAI set: assoc type code -> id.
    pub oai_set_objects_ids: BTreeMap<i64, DbId>,
}

impl DataObjectTombstone {
    pub fn new(
        data_object_id: DbId,
        set_spec: impl Into<String>,
        set_name: impl Into<String>,
        oai_identifier: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            data_object_id,
            date_deleted: None,
            set_spec: set_spec.into(),
            set_name: set_name.into(),
            oai_identifier: oai_identifier.into(),
            oai_set_objects_ids: BTreeMap::new(),
        }
    }

    /// Set the deletion date to now.
    pub fn stamp_date_deleted(&mut self) {
        self.date_deleted = Some(chrono::Utc::now());
    }

    /// Id of the set object of the given type, if recorded.
    pub fn oai_set_object_id(&self, assoc_type: AssocType) -> Option<DbId> {
        self.oai_set_objects_ids.get(&assoc_type.code()).copied()
    }

    /// Record (or replace) the set object of the given type.
    pub fn set_oai_set_object_id(&mut self, assoc_type: AssocType, assoc_id: DbId) {
        self.oai_set_objects_ids.insert(assoc_type.code(), assoc_id);
    }

    pub fn set_oai_set_objects_ids(&mut self, ids: BTreeMap<i64, DbId>) {
        self.oai_set_objects_ids = ids;
    }
}
