/// Tag model and database operations
///
/// Tags have an implicit lifecycle: they are created on first use when a
/// bookmark write names them, renamed or recolored explicitly, and deleted
/// explicitly (their links cascade). There is no standalone create endpoint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     color VARCHAR(32),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// -- UNIQUE (user_id, name)
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tag model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Tag name, unique per user
    pub name: String,

    /// Optional display color
    pub color: Option<String>,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

/// Tag with its bookmark count, served by the ranked listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCount {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub count: i64,
}

/// Input for updating a tag (rename and/or recolor)
#[derive(Debug, Clone, Default)]
pub struct UpdateTag {
    /// New name
    pub name: Option<String>,

    /// New color
    pub color: Option<String>,
}

/// Search hit returned by the global search endpoint
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagSearchHit {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    /// Finds a tag by `(user_id, name)`, creating it if absent
    ///
    /// Safe against concurrent first use of the same name: the insert uses
    /// `ON CONFLICT DO NOTHING` and falls back to a re-select when another
    /// writer won the race. Callers invoking this for several names within
    /// one request must await each call in turn rather than joining futures,
    /// so a name repeated in a single payload resolves to one tag.
    pub async fn find_or_create(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        if let Some(tag) = Self::find_by_name(pool, user_id, name).await? {
            return Ok(tag);
        }

        let inserted = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO NOTHING
            RETURNING id, user_id, name, color, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(tag) => Ok(tag),
            // Lost the race; the winner's row must exist now.
            None => Self::find_by_name(pool, user_id, name)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Finds a tag by name, scoped to its owner
    pub async fn find_by_name(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, color, created_at FROM tags \
             WHERE user_id = $1 AND name = $2",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, color, created_at FROM tags \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Lists the user's tags ranked by usage (bookmark count desc, then name)
    pub async fn list_with_counts(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TagWithCount>, sqlx::Error> {
        let tags = sqlx::query_as::<_, TagWithCount>(
            r#"
            SELECT t.id, t.name, t.color, t.created_at,
                   COUNT(bt.bookmark_id) AS count
            FROM tags t
            LEFT JOIN bookmark_tags bt ON bt.tag_id = t.id
            WHERE t.user_id = $1
            GROUP BY t.id
            ORDER BY count DESC, t.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Substring search over tag names
    pub async fn search_by_name(
        pool: &PgPool,
        user_id: Uuid,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, color, created_at FROM tags \
             WHERE user_id = $1 AND name ILIKE $2 \
             ORDER BY name LIMIT $3",
        )
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Renames and/or recolors a tag
    ///
    /// Returns None if the tag isn't owned by the user. A rename onto an
    /// existing name surfaces as a unique-constraint error mapped to 409.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTag,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.name.is_none() && data.color.is_none() {
            return Self::find_by_id_and_user(pool, id, user_id).await;
        }

        let mut assignments = Vec::new();
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            assignments.push(format!("name = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            assignments.push(format!("color = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tags SET {} WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, name, color, created_at",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Tag>(&query).bind(id).bind(user_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }

        let tag = q.fetch_optional(pool).await?;

        Ok(tag)
    }

    /// Deletes a tag; its bookmark links cascade
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Substring search for the global search endpoint
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<TagSearchHit>, sqlx::Error> {
        let hits = sqlx::query_as::<_, TagSearchHit>(
            "SELECT id, name FROM tags \
             WHERE user_id = $1 AND name ILIKE $2 \
             ORDER BY name LIMIT $3",
        )
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tag_default_is_empty() {
        let update = UpdateTag::default();
        assert!(update.name.is_none());
        assert!(update.color.is_none());
    }

    #[test]
    fn test_tag_serializes_camel_case() {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "rust".to_string(),
            color: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("userId"));
        assert!(json.contains("createdAt"));
    }

    // Integration tests for find_or_create and ranking live in
    // linkstash-api/tests/
}
