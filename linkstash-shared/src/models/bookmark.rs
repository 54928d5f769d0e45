/// Bookmark model and database operations
///
/// Bookmarks are the core entity. The rules that matter:
///
/// - `(user_id, url)` is unique: one bookmark per URL per user. The handler
///   checks first for a friendly 409, and the unique index catches the
///   check/insert race.
/// - `domain` is derived from the URL at write time, never sent by clients.
/// - Deletion is a two-step flow through the archived system collection:
///
/// ```text
/// unsorted-or-other ⇄ archived → deleted
///       archive/unarchive    delete (guarded)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bookmarks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     url TEXT NOT NULL,
///     title VARCHAR(500) NOT NULL,
///     description TEXT,
///     note TEXT,
///     cover TEXT,
///     domain VARCHAR(255),
///     is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
///     collection_id UUID REFERENCES collections(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// -- UNIQUE (user_id, url)
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const BOOKMARK_COLUMNS: &str = "id, user_id, url, title, description, note, cover, domain, \
     is_favorite, collection_id, created_at, updated_at";

/// Bookmark model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Unique bookmark ID
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Bookmarked URL, unique per user
    pub url: String,

    /// Title; falls back to the URL's hostname when nothing better is known
    pub title: String,

    /// Page description from the caller or the metadata fetch
    pub description: Option<String>,

    /// Free-form user note
    pub note: Option<String>,

    /// Cover image URL
    pub cover: Option<String>,

    /// Hostname derived from the URL at write time
    pub domain: Option<String>,

    /// Favorite flag
    pub is_favorite: bool,

    /// Containing collection; NULL after its collection is deleted
    pub collection_id: Option<Uuid>,

    /// When the bookmark was created
    pub created_at: DateTime<Utc>,

    /// When the bookmark was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a bookmark
#[derive(Debug, Clone)]
pub struct CreateBookmark {
    /// Owner
    pub user_id: Uuid,

    /// Bookmarked URL
    pub url: String,

    /// Title (caller-supplied or hostname fallback; never empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional note
    pub note: Option<String>,

    /// Optional cover image URL
    pub cover: Option<String>,

    /// Hostname derived from the URL
    pub domain: Option<String>,

    /// Favorite flag
    pub is_favorite: bool,

    /// Target collection (resolved by the handler; the user's unsorted
    /// collection when the caller names none)
    pub collection_id: Option<Uuid>,
}

/// Input for updating a bookmark
///
/// Only non-None fields are written. `collection_id` uses the double-Option
/// pattern: `Some(None)` clears it, `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookmark {
    /// New title
    pub title: Option<String>,

    /// New URL; the handler re-derives `domain` alongside
    pub url: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New note
    pub note: Option<String>,

    /// New cover URL
    pub cover: Option<String>,

    /// New domain (set together with url)
    pub domain: Option<String>,

    /// New favorite flag
    pub is_favorite: Option<bool>,

    /// New collection; `Some(None)` detaches the bookmark
    pub collection_id: Option<Option<Uuid>>,
}

/// Filters for the bookmark listing endpoint
#[derive(Debug, Clone, Default)]
pub struct BookmarkFilter {
    /// Only bookmarks in this collection
    pub collection_id: Option<Uuid>,

    /// Only favorites (or only non-favorites)
    pub is_favorite: Option<bool>,

    /// Case-insensitive substring match on title; `%`/`_` are escaped before
    /// the pattern is built
    pub search: Option<String>,

    /// Bookmark must carry ALL of these tags
    pub tag_ids: Vec<Uuid>,
}

/// Sort orders for the listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkSort {
    /// Newest first (default)
    #[default]
    CreatedDesc,

    /// Oldest first
    CreatedAsc,

    /// Title A→Z
    TitleAsc,

    /// Title Z→A
    TitleDesc,
}

impl BookmarkSort {
    /// ORDER BY clause for this sort
    ///
    /// `id` breaks created_at ties so pagination stays stable.
    fn order_clause(&self) -> &'static str {
        match self {
            BookmarkSort::CreatedDesc => "created_at DESC, id",
            BookmarkSort::CreatedAsc => "created_at ASC, id",
            BookmarkSort::TitleAsc => "title ASC, id",
            BookmarkSort::TitleDesc => "title DESC, id",
        }
    }
}

/// Search hit returned by the global search endpoint
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkSearchHit {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub domain: Option<String>,
}

/// Escapes LIKE wildcards in user-supplied search text
///
/// Without this, a search for "100%" matches everything starting with "100".
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Appends the filter's WHERE fragments to `sql`, continuing from
/// `bind_count` binds already consumed, and returns the new count.
///
/// The caller must bind values in the same order:
/// collection_id, is_favorite, search pattern, tag_ids, tag count.
fn push_filter_sql(sql: &mut String, filter: &BookmarkFilter, mut bind_count: usize) -> usize {
    if filter.collection_id.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND collection_id = ${}", bind_count));
    }
    if filter.is_favorite.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND is_favorite = ${}", bind_count));
    }
    if filter.search.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND title ILIKE ${}", bind_count));
    }
    if !filter.tag_ids.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT bookmark_id FROM bookmark_tags \
             WHERE tag_id = ANY(${}) \
             GROUP BY bookmark_id \
             HAVING COUNT(DISTINCT tag_id) = ${})",
            bind_count + 1,
            bind_count + 2
        ));
        bind_count += 2;
    }
    bind_count
}

impl Bookmark {
    /// Creates a bookmark
    ///
    /// # Errors
    ///
    /// A duplicate `(user_id, url)` surfaces as a unique-constraint database
    /// error; callers map it to a 409.
    pub async fn create(pool: &PgPool, data: CreateBookmark) -> Result<Self, sqlx::Error> {
        let bookmark = sqlx::query_as::<_, Bookmark>(&format!(
            "INSERT INTO bookmarks \
             (user_id, url, title, description, note, cover, domain, is_favorite, collection_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BOOKMARK_COLUMNS}"
        ))
        .bind(data.user_id)
        .bind(data.url)
        .bind(data.title)
        .bind(data.description)
        .bind(data.note)
        .bind(data.cover)
        .bind(data.domain)
        .bind(data.is_favorite)
        .bind(data.collection_id)
        .fetch_one(pool)
        .await?;

        Ok(bookmark)
    }

    /// Finds a bookmark by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let bookmark = sqlx::query_as::<_, Bookmark>(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(bookmark)
    }

    /// Checks whether the user already has a bookmark for this URL
    pub async fn url_exists(pool: &PgPool, user_id: Uuid, url: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bookmarks WHERE user_id = $1 AND url = $2)",
        )
        .bind(user_id)
        .bind(url)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Checks whether another bookmark (different id) of the same user
    /// already has this URL; the update dedup check
    pub async fn url_taken_by_other(
        pool: &PgPool,
        user_id: Uuid,
        url: &str,
        exclude_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bookmarks \
             WHERE user_id = $1 AND url = $2 AND id != $3)",
        )
        .bind(user_id)
        .bind(url)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates a bookmark
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    /// Returns None if the bookmark isn't owned by the user.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateBookmark,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE bookmarks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", url = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.note.is_some() {
            bind_count += 1;
            query.push_str(&format!(", note = ${}", bind_count));
        }
        if data.cover.is_some() {
            bind_count += 1;
            query.push_str(&format!(", cover = ${}", bind_count));
        }
        if data.domain.is_some() {
            bind_count += 1;
            query.push_str(&format!(", domain = ${}", bind_count));
        }
        if data.is_favorite.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_favorite = ${}", bind_count));
        }
        if data.collection_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", collection_id = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {BOOKMARK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Bookmark>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(url) = data.url {
            q = q.bind(url);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(note) = data.note {
            q = q.bind(note);
        }
        if let Some(cover) = data.cover {
            q = q.bind(cover);
        }
        if let Some(domain) = data.domain {
            q = q.bind(domain);
        }
        if let Some(is_favorite) = data.is_favorite {
            q = q.bind(is_favorite);
        }
        if let Some(collection_id) = data.collection_id {
            q = q.bind(collection_id);
        }

        let bookmark = q.fetch_optional(pool).await?;

        Ok(bookmark)
    }

    /// Overwrites title/description/cover with freshly fetched metadata
    ///
    /// This is the deferred half of the creation flow. The WHERE guard makes
    /// it a no-op when the bookmark was deleted while the fetch was in
    /// flight; zero rows affected is success.
    pub async fn apply_metadata(
        pool: &PgPool,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        cover: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bookmarks \
             SET title = $2, description = $3, cover = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(cover)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Moves a bookmark into a collection (the archive/unarchive transition)
    ///
    /// Returns None if the bookmark isn't owned by the user.
    pub async fn set_collection(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let bookmark = sqlx::query_as::<_, Bookmark>(&format!(
            "UPDATE bookmarks SET collection_id = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {BOOKMARK_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(collection_id)
        .fetch_optional(pool)
        .await?;

        Ok(bookmark)
    }

    /// Moves a batch of bookmarks into a collection, returning the ids that
    /// were actually moved (ids not owned by the user are skipped)
    pub async fn set_collection_bulk(
        pool: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
        collection_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let moved: Vec<(Uuid,)> = sqlx::query_as(
            "UPDATE bookmarks SET collection_id = $3, updated_at = NOW() \
             WHERE user_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(user_id)
        .bind(ids)
        .bind(collection_id)
        .fetch_all(pool)
        .await?;

        Ok(moved.into_iter().map(|(id,)| id).collect())
    }

    /// Hard-deletes a bookmark; tag links cascade
    ///
    /// The archive guard (only archived bookmarks may be deleted) is enforced
    /// by the handler before this runs.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists bookmarks matching the filter, sorted and paginated
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &BookmarkFilter,
        sort: BookmarkSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut sql = format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = $1");
        let bind_count = push_filter_sql(&mut sql, filter, 1);
        sql.push_str(&format!(
            " ORDER BY {} LIMIT ${} OFFSET ${}",
            sort.order_clause(),
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Bookmark>(&sql).bind(user_id);

        if let Some(collection_id) = filter.collection_id {
            q = q.bind(collection_id);
        }
        if let Some(is_favorite) = filter.is_favorite {
            q = q.bind(is_favorite);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", escape_like(search)));
        }
        if !filter.tag_ids.is_empty() {
            q = q.bind(filter.tag_ids.clone());
            q = q.bind(filter.tag_ids.len() as i64);
        }

        let bookmarks = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(bookmarks)
    }

    /// Counts bookmarks matching the filter (for pagination metadata)
    pub async fn count(
        pool: &PgPool,
        user_id: Uuid,
        filter: &BookmarkFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut sql = String::from("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1");
        push_filter_sql(&mut sql, filter, 1);

        let mut q = sqlx::query_scalar::<_, i64>(&sql).bind(user_id);

        if let Some(collection_id) = filter.collection_id {
            q = q.bind(collection_id);
        }
        if let Some(is_favorite) = filter.is_favorite {
            q = q.bind(is_favorite);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", escape_like(search)));
        }
        if !filter.tag_ids.is_empty() {
            q = q.bind(filter.tag_ids.clone());
            q = q.bind(filter.tag_ids.len() as i64);
        }

        q.fetch_one(pool).await
    }

    /// Substring search over title/url/description for the global search
    /// endpoint
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<BookmarkSearchHit>, sqlx::Error> {
        let hits = sqlx::query_as::<_, BookmarkSearchHit>(
            r#"
            SELECT id, title, url, domain
            FROM bookmarks
            WHERE user_id = $1
              AND (title ILIKE $2 OR url ILIKE $2 OR description ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
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
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_sort_order_clauses() {
        assert_eq!(BookmarkSort::CreatedDesc.order_clause(), "created_at DESC, id");
        assert_eq!(BookmarkSort::CreatedAsc.order_clause(), "created_at ASC, id");
        assert_eq!(BookmarkSort::TitleAsc.order_clause(), "title ASC, id");
        assert_eq!(BookmarkSort::TitleDesc.order_clause(), "title DESC, id");
    }

    #[test]
    fn test_sort_default_is_created_desc() {
        assert_eq!(BookmarkSort::default(), BookmarkSort::CreatedDesc);
    }

    #[test]
    fn test_sort_deserializes_from_snake_case() {
        let sort: BookmarkSort = serde_json::from_str("\"title_asc\"").unwrap();
        assert_eq!(sort, BookmarkSort::TitleAsc);
    }

    #[test]
    fn test_filter_sql_numbering() {
        let filter = BookmarkFilter {
            collection_id: Some(Uuid::new_v4()),
            is_favorite: Some(true),
            search: Some("rust".to_string()),
            tag_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
        };

        let mut sql = String::from("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1");
        let bind_count = push_filter_sql(&mut sql, &filter, 1);

        assert_eq!(bind_count, 6);
        assert!(sql.contains("collection_id = $2"));
        assert!(sql.contains("is_favorite = $3"));
        assert!(sql.contains("title ILIKE $4"));
        assert!(sql.contains("ANY($5)"));
        assert!(sql.contains("COUNT(DISTINCT tag_id) = $6"));
    }

    #[test]
    fn test_filter_sql_empty_filter_adds_nothing() {
        let filter = BookmarkFilter::default();
        let mut sql = String::from("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1");
        let before = sql.clone();
        let bind_count = push_filter_sql(&mut sql, &filter, 1);

        assert_eq!(bind_count, 1);
        assert_eq!(sql, before);
    }

    // Integration tests for database operations live in linkstash-api/tests/
}
