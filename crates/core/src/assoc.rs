//! Association type codes.
//!
//! Many tables link a row to "some other object" through an
//! `(assoc_type, assoc_id)` pair. The numeric codes are persisted and must
//! never change.

use serde::{Deserialize, Serialize};

/// Kinds of objects a row can be associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssocType {
    Journal,
    Issue,
    SubmissionFile,
    Representation,
    Announcement,
    Chapter,
    Category,
    Section,
    User,
    Submission,
    QueuedPayment,
    Publication,
}

impl AssocType {
    pub const ALL: [AssocType; 12] = [
        AssocType::Journal,
        AssocType::Issue,
        AssocType::SubmissionFile,
        AssocType::Representation,
        AssocType::Announcement,
        AssocType::Chapter,
        AssocType::Category,
        AssocType::Section,
        AssocType::User,
        AssocType::Submission,
        AssocType::QueuedPayment,
        AssocType::Publication,
    ];

    /// The persisted numeric code.
    pub const fn code(self) -> i64 {
        match self {
            AssocType::Journal => 0x0000100,
            AssocType::Issue => 0x0000103,
            AssocType::SubmissionFile => 0x0000203,
            AssocType::Representation => 0x0000209,
            AssocType::Announcement => 0x000020A,
            AssocType::Chapter => 0x000020C,
            AssocType::Category => 0x000020D,
            AssocType::Section => 0x0000212,
            AssocType::User => 0x0001000,
            AssocType::Submission => 0x0100009,
            AssocType::QueuedPayment => 0x010000B,
            AssocType::Publication => 0x010000C,
        }
    }

    /// Look up a type by its persisted code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Code stored in `subeditor_submission_group.assoc_type` for rows migrated
/// from the old `section_editors` table.
pub const ASSOC_TYPE_SECTION: i64 = AssocType::Section.code();
