//! Repository for the `content_items` table.

use sqlx::PgPool;

use atrium_core::content::normalize_keywords;
use atrium_core::history::SubjectRef;
use atrium_core::types::{DbId, Timestamp};

use crate::models::content::{ContentItem, CreateContentItem, UpdateContentItem};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `content_items` SELECT queries.
const COLUMNS: &str = "\
    id, content_type, title, keywords, creator_id, changed_by_id, \
    parent_group_id, is_tmp, state, publish_from, publish_to, \
    publish_notified, unpublish_notified, remove_after_publish_to, \
    created_at, updated_at";

/// Column list for INSERT (excludes auto-generated and flag columns).
const INSERT_COLUMNS: &str = "\
    content_type, title, keywords, creator_id, changed_by_id, \
    parent_group_id, is_tmp, state, publish_from, publish_to, \
    remove_after_publish_to";

// ---------------------------------------------------------------------------
// ContentRepo
// ---------------------------------------------------------------------------

/// Provides CRUD and sweep queries for content items.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a new content item.
    ///
    /// Keywords are normalized on the way in (quote stripping, entry cap);
    /// `changed_by_id` starts out equal to the creator.
    pub async fn insert(
        pool: &PgPool,
        dto: &CreateContentItem,
    ) -> Result<ContentItem, sqlx::Error> {
        let keywords = dto.keywords.as_deref().map(normalize_keywords);

        let query = format!(
            "INSERT INTO content_items ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(&dto.content_type)
            .bind(&dto.title)
            .bind(keywords)
            .bind(dto.creator_id)
            .bind(dto.creator_id)
            .bind(dto.parent_group_id)
            .bind(dto.is_tmp)
            .bind(dto.state_or_default())
            .bind(dto.publish_from)
            .bind(dto.publish_to)
            .bind(dto.remove_after_publish_to)
            .fetch_one(pool)
            .await
    }

    /// Find a content item by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<ContentItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_items WHERE id = $1");
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a content item by its polymorphic subject key.
    pub async fn find_by_subject(
        pool: &PgPool,
        subject: &SubjectRef,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM content_items WHERE id = $1 AND content_type = $2");
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(subject.id)
            .bind(&subject.content_type)
            .fetch_optional(pool)
            .await
    }

    /// Whether a row exists for the subject.
    pub async fn exists(pool: &PgPool, subject: &SubjectRef) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM content_items WHERE id = $1 AND content_type = $2)",
        )
        .bind(subject.id)
        .bind(&subject.content_type)
        .fetch_one(pool)
        .await
    }

    /// Patch a content item. Returns the updated row, or `None` if absent.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateContentItem,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let mut sets: Vec<String> = vec!["updated_at = now()".to_string()];
        let mut bind_idx = 2u32; // $1 is id
        let mut bind_values: Vec<BindValue> = Vec::new();

        if let Some(ref title) = dto.title {
            sets.push(format!("title = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(title.clone()));
        }

        if let Some(ref keywords) = dto.keywords {
            sets.push(format!("keywords = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(normalize_keywords(keywords)));
        }

        if let Some(ref state) = dto.state {
            sets.push(format!("state = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(state.clone()));
        }

        if let Some(is_tmp) = dto.is_tmp {
            sets.push(format!("is_tmp = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Bool(is_tmp));
        }

        if let Some(changed_by) = dto.changed_by_id {
            sets.push(format!("changed_by_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::BigInt(changed_by));
        }

        if let Some(remove) = dto.remove_after_publish_to {
            sets.push(format!("remove_after_publish_to = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(BindValue::Bool(remove));
        }

        let query = format!(
            "UPDATE content_items SET {} WHERE id = $1 RETURNING {COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, ContentItem>(&query).bind(id);
        for val in &bind_values {
            match val {
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Bool(v) => q = q.bind(*v),
                BindValue::BigInt(v) => q = q.bind(*v),
            }
        }

        q.fetch_optional(pool).await
    }

    /// Replace both publish window bounds (passing `None` clears a bound).
    pub async fn set_publish_window(
        pool: &PgPool,
        id: DbId,
        publish_from: Option<Timestamp>,
        publish_to: Option<Timestamp>,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let query = format!(
            "UPDATE content_items \
             SET publish_from = $2, publish_to = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .bind(publish_from)
            .bind(publish_to)
            .fetch_optional(pool)
            .await
    }

    /// Set the denormalized notification flags directly on the row.
    ///
    /// Does not touch `updated_at` — this bypasses the save pipeline by
    /// design. Returns the number of rows updated (0 if the row is gone,
    /// which callers treat as a no-op).
    pub async fn mark_notified(
        pool: &PgPool,
        subject: &SubjectRef,
        publish_notified: Option<bool>,
        unpublish_notified: Option<bool>,
    ) -> Result<u64, sqlx::Error> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx = 3u32; // $1 is id, $2 is content_type
        let mut bind_values: Vec<bool> = Vec::new();

        if let Some(flag) = publish_notified {
            sets.push(format!("publish_notified = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(flag);
        }

        if let Some(flag) = unpublish_notified {
            sets.push(format!("unpublish_notified = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(flag);
        }

        if sets.is_empty() {
            return Ok(0);
        }

        let query = format!(
            "UPDATE content_items SET {} WHERE id = $1 AND content_type = $2",
            sets.join(", ")
        );

        let mut q = sqlx::query(&query).bind(subject.id).bind(&subject.content_type);
        for flag in &bind_values {
            q = q.bind(*flag);
        }

        Ok(q.execute(pool).await?.rows_affected())
    }

    /// Remove a content item. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, subject: &SubjectRef) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_items WHERE id = $1 AND content_type = $2")
            .bind(subject.id)
            .bind(&subject.content_type)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Sweep queries
    // -----------------------------------------------------------------------

    /// Rows whose publish window has opened but whose publish event has not
    /// gone out yet.
    pub async fn due_for_publish(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE publish_notified = FALSE \
               AND publish_from IS NOT NULL AND publish_from < $1 \
               AND (publish_to IS NULL OR publish_to > $1) \
             ORDER BY publish_from"
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Rows with a closed or not-yet-open bounded window whose unpublish
    /// event has not gone out yet.
    pub async fn due_for_unpublish(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE unpublish_notified = FALSE \
               AND publish_to IS NOT NULL \
               AND (publish_to < $1 OR publish_from > $1) \
             ORDER BY publish_to"
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Expired rows flagged for removal once their window has closed.
    pub async fn due_for_removal(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE remove_after_publish_to = TRUE \
               AND publish_to IS NOT NULL AND publish_to < $1 \
             ORDER BY publish_to"
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built update queries.
enum BindValue {
    Text(String),
    Bool(bool),
    BigInt(i64),
}
