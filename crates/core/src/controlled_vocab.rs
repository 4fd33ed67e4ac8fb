//! Controlled vocabularies: managed lists of terms attached to an object.
//!
//! A vocabulary is identified by `(symbolic, assoc_type, assoc_id)`; its
//! entries are ordered by `seq` and carry one localized value per locale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Symbolic name (and entry setting name) of the submission-agency vocabulary.
pub const CONTROLLED_VOCAB_SUBMISSION_AGENCY: &str = "submissionAgency";

/// An entry in a controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlledVocabEntry {
    pub id: DbId,
    pub controlled_vocab_id: DbId,
    pub seq: f64,
    /// Locale -> term.
    pub values: BTreeMap<String, String>,
}

impl ControlledVocabEntry {
    pub fn value(&self, locale: &str) -> Option<&str> {
        self.values.get(locale).map(String::as_str)
    }
}

/// A funding or sponsoring agency named on a submission.
pub type SubmissionAgency = ControlledVocabEntry;

/// Paging window: `count` rows per page, `page` counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRange {
    pub count: i64,
    pub page: i64,
}

/// Largest page size a caller may request.
pub const MAX_RANGE_COUNT: i64 = 500;

/// Largest page number a caller may request.
pub const MAX_RANGE_PAGE: i64 = 1_000_000;

impl ResultRange {
    pub fn new(count: i64, page: i64) -> Self {
        Self { count, page }
    }

    /// SQL `LIMIT`, clamped to `1..=MAX_RANGE_COUNT`.
    pub fn limit(&self) -> i64 {
        self.count.clamp(1, MAX_RANGE_COUNT)
    }

    /// SQL `OFFSET`; pages below 1 are treated as the first page.
    /// Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }
}

/// Trim and de-duplicate terms, keeping first occurrence order.
///
/// Comparison is case-insensitive; blank terms are dropped.
pub fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_limit_and_offset() {
        let range = ResultRange::new(25, 3);
        assert_eq!(range.limit(), 25);
        assert_eq!(range.offset(), 50);
    }

    #[test]
    fn range_is_clamped() {
        assert_eq!(ResultRange::new(0, 1).limit(), 1);
        assert_eq!(ResultRange::new(10_000, 1).limit(), MAX_RANGE_COUNT);
        assert_eq!(ResultRange::new(10, 0).offset(), 0);
        assert_eq!(ResultRange::new(10, -4).offset(), 0);
    }

    #[test]
    fn offset_saturates_on_huge_pages() {
        assert_eq!(ResultRange::new(10, i64::MAX).offset(), i64::MAX);
        assert_eq!(ResultRange::new(500, MAX_RANGE_PAGE).offset(), 499_999_500);
    }

    #[test]
    fn terms_are_trimmed_and_deduplicated() {
        let terms = normalize_terms(["  NSF ", "nsf", "", "Wellcome Trust", "  "]);
        assert_eq!(terms, vec!["NSF".to_string(), "Wellcome Trust".to_string()]);
    }
}
