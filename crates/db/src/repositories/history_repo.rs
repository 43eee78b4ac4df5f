//! Repository for the `history_entries` table.
//!
//! Entries are independent inserts — no update-in-place, no locking.
//! "Most recent" queries lean on the
//! `(subject_type, subject_id, happened_at DESC)` index.

use sqlx::PgPool;

use atrium_core::history::{HistoryStatus, SubjectRef};

use crate::models::history::{CreateHistoryEntry, HistoryEntry};

/// Column list for `history_entries` SELECT queries.
const COLUMNS: &str = "\
    id, subject_type, subject_id, status, actor_id, message, happened_at";

/// Column list for INSERT (excludes auto-generated `id` and `happened_at`).
const INSERT_COLUMNS: &str = "subject_type, subject_id, status, actor_id, message";

/// Render a status slice to the TEXT[] bind value for `status = ANY($n)`.
fn status_strings(statuses: &[HistoryStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Provides append and query operations for history entries.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append one entry. The subject reference is not validated.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateHistoryEntry,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO history_entries ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(&entry.subject_type)
            .bind(entry.subject_id)
            .bind(&entry.status)
            .bind(entry.actor_id)
            .bind(&entry.message)
            .fetch_one(pool)
            .await
    }

    /// Most recent entry for a subject, optionally restricted to a status
    /// set. An empty slice means "any status". Ties on `happened_at` break
    /// on the higher id (later insert).
    pub async fn get_last(
        pool: &PgPool,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<Option<HistoryEntry>, sqlx::Error> {
        if statuses.is_empty() {
            let query = format!(
                "SELECT {COLUMNS} FROM history_entries \
                 WHERE subject_type = $1 AND subject_id = $2 \
                 ORDER BY happened_at DESC, id DESC \
                 LIMIT 1"
            );
            sqlx::query_as::<_, HistoryEntry>(&query)
                .bind(&subject.content_type)
                .bind(subject.id)
                .fetch_optional(pool)
                .await
        } else {
            let query = format!(
                "SELECT {COLUMNS} FROM history_entries \
                 WHERE subject_type = $1 AND subject_id = $2 AND status = ANY($3) \
                 ORDER BY happened_at DESC, id DESC \
                 LIMIT 1"
            );
            sqlx::query_as::<_, HistoryEntry>(&query)
                .bind(&subject.content_type)
                .bind(subject.id)
                .bind(status_strings(statuses))
                .fetch_optional(pool)
                .await
        }
    }

    /// Whether any entry exists for the subject, with the same filter
    /// semantics as [`get_last`](Self::get_last).
    pub async fn has_been(
        pool: &PgPool,
        subject: &SubjectRef,
        statuses: &[HistoryStatus],
    ) -> Result<bool, sqlx::Error> {
        if statuses.is_empty() {
            sqlx::query_scalar(
                "SELECT EXISTS( \
                    SELECT 1 FROM history_entries \
                    WHERE subject_type = $1 AND subject_id = $2)",
            )
            .bind(&subject.content_type)
            .bind(subject.id)
            .fetch_one(pool)
            .await
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS( \
                    SELECT 1 FROM history_entries \
                    WHERE subject_type = $1 AND subject_id = $2 AND status = ANY($3))",
            )
            .bind(&subject.content_type)
            .bind(subject.id)
            .bind(status_strings(statuses))
            .fetch_one(pool)
            .await
        }
    }

    /// Remove every entry for a subject. Returns the number removed.
    pub async fn delete_for(pool: &PgPool, subject: &SubjectRef) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM history_entries WHERE subject_type = $1 AND subject_id = $2",
        )
        .bind(&subject.content_type)
        .bind(subject.id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a subject's entries, newest first.
    pub async fn list_for(
        pool: &PgPool,
        subject: &SubjectRef,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM history_entries \
             WHERE subject_type = $1 AND subject_id = $2 \
             ORDER BY happened_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(&subject.content_type)
            .bind(subject.id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
