//! Repository for controlled vocabularies and submission-agency entries.

use std::collections::BTreeMap;

use sqlx::PgPool;
use scholar_core::controlled_vocab::{
    normalize_terms, ResultRange, SubmissionAgency, CONTROLLED_VOCAB_SUBMISSION_AGENCY,
};
use scholar_core::types::DbId;

use crate::models::controlled_vocab::{ControlledVocab, CreateEntry, EntryPage, EntryRow};
use crate::repositories::settings::CONTROLLED_VOCAB_ENTRY_SETTINGS;

/// Column list for `controlled_vocabs` queries.
const VOCAB_COLUMNS: &str = "controlled_vocab_id AS id, symbolic, assoc_type, assoc_id";

/// Column list for `controlled_vocab_entries` queries.
const ENTRY_COLUMNS: &str = "controlled_vocab_entry_id AS id, controlled_vocab_id, seq";

/// Looks up and creates vocabularies by `(symbolic, assoc_type, assoc_id)`.
pub struct ControlledVocabRepo;

impl ControlledVocabRepo {
    pub async fn find(
        pool: &PgPool,
        symbolic: &str,
        assoc_type: i64,
        assoc_id: DbId,
    ) -> Result<Option<ControlledVocab>, sqlx::Error> {
        let query = format!(
            "SELECT {VOCAB_COLUMNS} FROM controlled_vocabs \
             WHERE symbolic = $1 AND assoc_type = $2 AND assoc_id = $3"
        );
        sqlx::query_as::<_, ControlledVocab>(&query)
            .bind(symbolic)
            .bind(assoc_type)
            .bind(assoc_id)
            .fetch_optional(pool)
            .await
    }

    /// Return the vocabulary, creating it if it does not exist yet.
    pub async fn get_or_create(
        pool: &PgPool,
        symbolic: &str,
        assoc_type: i64,
        assoc_id: DbId,
    ) -> Result<ControlledVocab, sqlx::Error> {
        let query = format!(
            "INSERT INTO controlled_vocabs (symbolic, assoc_type, assoc_id) VALUES ($1, $2, $3) \
             ON CONFLICT (symbolic, assoc_type, assoc_id) DO UPDATE SET symbolic = EXCLUDED.symbolic \
             RETURNING {VOCAB_COLUMNS}"
        );
        sqlx::query_as::<_, ControlledVocab>(&query)
            .bind(symbolic)
            .bind(assoc_type)
            .bind(assoc_id)
            .fetch_one(pool)
            .await
    }

    /// Delete a vocabulary. Entries and their settings cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM controlled_vocabs WHERE controlled_vocab_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Entries of submission-agency vocabularies.
pub struct SubmissionAgencyEntryRepo;

impl SubmissionAgencyEntryRepo {
    /// Entries of a vocabulary ordered by `seq`, optionally one page of them.
    ///
    /// `total` always counts every entry of the vocabulary.
    pub async fn get_by_controlled_vocab_id(
        pool: &PgPool,
        controlled_vocab_id: DbId,
        range: Option<ResultRange>,
    ) -> Result<EntryPage, sqlx::Error> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM controlled_vocab_entries WHERE controlled_vocab_id = $1",
        )
        .bind(controlled_vocab_id)
        .fetch_one(pool)
        .await?;

        let rows = match range {
            Some(range) => {
                let query = format!(
                    "SELECT {ENTRY_COLUMNS} FROM controlled_vocab_entries \
                     WHERE controlled_vocab_id = $1 \
                     ORDER BY seq, controlled_vocab_entry_id \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, EntryRow>(&query)
                    .bind(controlled_vocab_id)
                    .bind(range.limit())
                    .bind(range.offset())
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {ENTRY_COLUMNS} FROM controlled_vocab_entries \
                     WHERE controlled_vocab_id = $1 \
                     ORDER BY seq, controlled_vocab_entry_id"
                );
                sqlx::query_as::<_, EntryRow>(&query)
                    .bind(controlled_vocab_id)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(EntryPage {
            items: with_values(pool, rows).await?,
            total,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SubmissionAgency>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM controlled_vocab_entries WHERE controlled_vocab_entry_id = $1"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;
        Ok(with_values(pool, rows).await?.pop())
    }

    /// Add an entry. Without a `seq` it goes after the last entry.
    pub async fn insert(
        pool: &PgPool,
        controlled_vocab_id: DbId,
        input: &CreateEntry,
    ) -> Result<SubmissionAgency, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO controlled_vocab_entries (controlled_vocab_id, seq) \
             VALUES ($1, COALESCE($2, (SELECT COALESCE(MAX(seq), 0) + 1 \
                                       FROM controlled_vocab_entries WHERE controlled_vocab_id = $1))) \
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(controlled_vocab_id)
            .bind(input.seq)
            .fetch_one(&mut *tx)
            .await?;

        CONTROLLED_VOCAB_ENTRY_SETTINGS
            .set_localized(&mut tx, row.id, CONTROLLED_VOCAB_SUBMISSION_AGENCY, &input.values)
            .await?;

        tx.commit().await?;
        let values = input
            .values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(row.with_values(values))
    }

    /// Replace the given locales' values of an entry.
    pub async fn update_values(
        pool: &PgPool,
        id: DbId,
        values: &BTreeMap<String, String>,
    ) -> Result<Option<SubmissionAgency>, sqlx::Error> {
        let exists: Option<DbId> = sqlx::query_scalar(
            "SELECT controlled_vocab_entry_id FROM controlled_vocab_entries \
             WHERE controlled_vocab_entry_id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let mut tx = pool.begin().await?;
        CONTROLLED_VOCAB_ENTRY_SETTINGS
            .set_localized(&mut tx, id, CONTROLLED_VOCAB_SUBMISSION_AGENCY, values)
            .await?;
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM controlled_vocab_entries WHERE controlled_vocab_entry_id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Agency names of an object, per locale, in entry order.
    pub async fn agencies(
        pool: &PgPool,
        assoc_type: i64,
        assoc_id: DbId,
    ) -> Result<BTreeMap<String, Vec<String>>, sqlx::Error> {
        let Some(vocab) =
            ControlledVocabRepo::find(pool, CONTROLLED_VOCAB_SUBMISSION_AGENCY, assoc_type, assoc_id)
                .await?
        else {
            return Ok(BTreeMap::new());
        };

        let page = Self::get_by_controlled_vocab_id(pool, vocab.id, None).await?;
        let mut by_locale: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in page.items {
            for (locale, value) in entry.values {
                by_locale.entry(locale).or_default().push(value);
            }
        }
        Ok(by_locale)
    }

    /// Replace every agency of an object. Each term becomes one entry;
    /// terms are trimmed and de-duplicated per locale.
    pub async fn replace_agencies(
        pool: &PgPool,
        assoc_type: i64,
        assoc_id: DbId,
        agencies: &BTreeMap<String, Vec<String>>,
    ) -> Result<BTreeMap<String, Vec<String>>, sqlx::Error> {
        let vocab = ControlledVocabRepo::get_or_create(
            pool,
            CONTROLLED_VOCAB_SUBMISSION_AGENCY,
            assoc_type,
            assoc_id,
        )
        .await?;

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM controlled_vocab_entries WHERE controlled_vocab_id = $1")
            .bind(vocab.id)
            .execute(&mut *tx)
            .await?;

        let mut seq = 0.0_f64;
        for (locale, terms) in agencies {
            for term in normalize_terms(terms) {
                seq += 1.0;
                let entry_id: DbId = sqlx::query_scalar(
                    "INSERT INTO controlled_vocab_entries (controlled_vocab_id, seq) \
                     VALUES ($1, $2) RETURNING controlled_vocab_entry_id",
                )
                .bind(vocab.id)
                .bind(seq)
                .fetch_one(&mut *tx)
                .await?;
                let values = BTreeMap::from([(locale.clone(), term)]);
                CONTROLLED_VOCAB_ENTRY_SETTINGS
                    .set_localized(&mut tx, entry_id, CONTROLLED_VOCAB_SUBMISSION_AGENCY, &values)
                    .await?;
            }
        }
        tx.commit().await?;

        Self::agencies(pool, assoc_type, assoc_id).await
    }
}

async fn with_values(pool: &PgPool, rows: Vec<EntryRow>) -> Result<Vec<SubmissionAgency>, sqlx::Error> {
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let mut settings = CONTROLLED_VOCAB_ENTRY_SETTINGS.load(pool, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let values = settings
                .remove(&row.id)
                .and_then(|mut s| s.remove(CONTROLLED_VOCAB_SUBMISSION_AGENCY))
                .unwrap_or_default();
            row.with_values(values)
        })
        .collect())
}
