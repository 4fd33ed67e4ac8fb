//! Controlled vocabulary and entry rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use scholar_core::controlled_vocab::ControlledVocabEntry;
use scholar_core::types::DbId;

/// A row from the `controlled_vocabs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ControlledVocab {
    pub id: DbId,
    pub symbolic: String,
    pub assoc_type: i64,
    pub assoc_id: DbId,
}

/// A row from the `controlled_vocab_entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub id: DbId,
    pub controlled_vocab_id: DbId,
    pub seq: Option<f64>,
}

impl EntryRow {
    pub fn with_values(self, values: BTreeMap<String, String>) -> ControlledVocabEntry {
        ControlledVocabEntry {
            id: self.id,
            controlled_vocab_id: self.controlled_vocab_id,
            seq: self.seq.unwrap_or_default(),
            values,
        }
    }
}

/// One page of entries plus the total across all pages.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPage {
    pub items: Vec<ControlledVocabEntry>,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntry {
    pub seq: Option<f64>,
    /// Locale -> term.
    pub values: BTreeMap<String, String>,
}
