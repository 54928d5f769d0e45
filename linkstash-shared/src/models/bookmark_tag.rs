/// Bookmark/tag join rows
///
/// The join table carries no payload: a row means "this bookmark has this
/// tag". Rows cascade-delete with either parent, which is what makes tag
/// deletion and guarded bookmark deletion cheap.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bookmark_tags (
///     bookmark_id UUID NOT NULL REFERENCES bookmarks(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (bookmark_id, tag_id)
/// );
/// ```
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A bookmark/tag link row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkTag {
    pub bookmark_id: Uuid,
    pub tag_id: Uuid,
}

/// Tag data embedded in bookmark responses
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

/// Tag data joined with the bookmark it belongs to, used when loading tags
/// for a page of bookmarks in one query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookmarkTagRow {
    pub bookmark_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl BookmarkTag {
    /// Links a bookmark to a set of tags
    ///
    /// `ON CONFLICT DO NOTHING` absorbs duplicates, so a tag name repeated in
    /// one request payload links once.
    pub async fn link_many(
        pool: &PgPool,
        bookmark_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO bookmark_tags (bookmark_id, tag_id) \
             SELECT $1, UNNEST($2::uuid[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(bookmark_id)
        .bind(tag_ids)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes every tag link for a bookmark
    ///
    /// First half of the replace-tag-set operation on update.
    pub async fn clear_for_bookmark(pool: &PgPool, bookmark_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM bookmark_tags WHERE bookmark_id = $1")
            .bind(bookmark_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Loads the tags attached to one bookmark
    pub async fn tags_for_bookmark(
        pool: &PgPool,
        bookmark_id: Uuid,
    ) -> Result<Vec<TagRef>, sqlx::Error> {
        let tags = sqlx::query_as::<_, TagRef>(
            r#"
            SELECT t.id, t.name, t.color
            FROM bookmark_tags bt
            INNER JOIN tags t ON t.id = bt.tag_id
            WHERE bt.bookmark_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(bookmark_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Loads the tags for a whole page of bookmarks in one query
    ///
    /// Returned rows carry their bookmark id so the caller can group them.
    pub async fn tags_for_bookmarks(
        pool: &PgPool,
        bookmark_ids: &[Uuid],
    ) -> Result<Vec<BookmarkTagRow>, sqlx::Error> {
        if bookmark_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, BookmarkTagRow>(
            r#"
            SELECT bt.bookmark_id, t.id, t.name, t.color
            FROM bookmark_tags bt
            INNER JOIN tags t ON t.id = bt.tag_id
            WHERE bt.bookmark_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(bookmark_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_ref_serializes_camel_case() {
        let tag = TagRef {
            id: Uuid::new_v4(),
            name: "rust".to_string(),
            color: Some("#dea584".to_string()),
        };

        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("\"name\":\"rust\""));
        assert!(json.contains("\"color\":\"#dea584\""));
    }

    // Integration tests for linking live in linkstash-api/tests/
}
