//! Subeditor assignments to sections and categories.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use scholar_core::assoc::AssocType;
use scholar_core::types::DbId;

/// A row from the `subeditor_submission_group` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct SubeditorAssignment {
    pub context_id: DbId,
    pub assoc_type: i64,
    pub assoc_id: DbId,
    pub user_id: DbId,
}

/// Groups a subeditor can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionGroup {
    Section,
    Category,
}

impl SubmissionGroup {
    /// Parse the URL segment (`section` or `category`).
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "section" => Some(Self::Section),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn assoc_type(self) -> AssocType {
        match self {
            Self::Section => AssocType::Section,
            Self::Category => AssocType::Category,
        }
    }
}

/// Request payload for assigning a subeditor.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignSubeditor {
    pub group: SubmissionGroup,
    pub assoc_id: DbId,
    pub user_id: DbId,
}
