/// Bookmark listing endpoint
///
/// # Endpoint
///
/// `GET /bookmarks`
///
/// # Query Parameters
///
/// - `page`, `limit`: pagination (clamped; see the pagination module)
/// - `collectionId`: only bookmarks in this collection
/// - `isFavorite`: filter on the favorite flag
/// - `search`: case-insensitive substring match on title (wildcards escaped)
/// - `sort`: `created_desc` (default), `created_asc`, `title_asc`, `title_desc`
/// - `tagIds`: comma-separated tag ids; bookmarks must carry ALL of them
///
/// # Response
///
/// ```json
/// {
///   "data": [ { "id": "...", "title": "...", "tags": [...] } ],
///   "pagination": { "page": 1, "limit": 20, "total": 42, "totalPages": 3,
///                   "hasNext": true, "hasPrev": false }
/// }
/// ```
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{Bookmark, BookmarkFilter, BookmarkSort},
    bookmark_tag::{BookmarkTag, TagRef},
};
use linkstash_shared::pagination::{normalize, PaginationMeta};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::BookmarkWithTags;

/// List bookmarks query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookmarksQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub collection_id: Option<Uuid>,
    pub is_favorite: Option<bool>,
    pub search: Option<String>,
    pub sort: Option<BookmarkSort>,

    /// Comma-separated tag ids
    pub tag_ids: Option<String>,
}

/// List bookmarks response
#[derive(Debug, Serialize)]
pub struct ListBookmarksResponse {
    pub data: Vec<BookmarkWithTags>,
    pub pagination: PaginationMeta,
}

/// Parses the comma-separated `tagIds` parameter
fn parse_tag_ids(raw: Option<&str>) -> Result<Vec<Uuid>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| ApiError::BadRequest(format!("Invalid tag id: {}", s)))
        })
        .collect()
}

/// Groups a batch of tag rows by their bookmark id
fn group_tags(rows: Vec<linkstash_shared::models::bookmark_tag::BookmarkTagRow>) -> HashMap<Uuid, Vec<TagRef>> {
    let mut by_bookmark: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
    for row in rows {
        by_bookmark.entry(row.bookmark_id).or_default().push(TagRef {
            id: row.id,
            name: row.name,
            color: row.color,
        });
    }
    by_bookmark
}

/// List bookmarks endpoint handler
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListBookmarksQuery>,
) -> ApiResult<Json<ListBookmarksResponse>> {
    let pagination = normalize(query.page, query.limit);
    let sort = query.sort.unwrap_or_default();

    let filter = BookmarkFilter {
        collection_id: query.collection_id,
        is_favorite: query.is_favorite,
        search: query.search.clone(),
        tag_ids: parse_tag_ids(query.tag_ids.as_deref())?,
    };

    let (data, total) = tokio::try_join!(
        Bookmark::list(
            &state.db,
            auth.user_id,
            &filter,
            sort,
            pagination.limit,
            pagination.offset,
        ),
        Bookmark::count(&state.db, auth.user_id, &filter),
    )?;

    let bookmark_ids: Vec<Uuid> = data.iter().map(|b| b.id).collect();
    let tag_rows = BookmarkTag::tags_for_bookmarks(&state.db, &bookmark_ids).await?;
    let mut tags_by_bookmark = group_tags(tag_rows);

    let data = data
        .into_iter()
        .map(|bookmark| {
            let tags = tags_by_bookmark.remove(&bookmark.id).unwrap_or_default();
            BookmarkWithTags { bookmark, tags }
        })
        .collect();

    Ok(Json(ListBookmarksResponse {
        data,
        pagination: PaginationMeta::new(pagination.page, pagination.limit, total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_ids_empty() {
        assert!(parse_tag_ids(None).unwrap().is_empty());
        assert!(parse_tag_ids(Some("")).unwrap().is_empty());
        assert!(parse_tag_ids(Some(" , ")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tag_ids_valid() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_tag_ids(Some(&format!("{}, {}", a, b))).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn test_parse_tag_ids_invalid() {
        assert!(parse_tag_ids(Some("not-a-uuid")).is_err());
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let query: ListBookmarksQuery =
            serde_urlencoded::from_str("isFavorite=true&sort=title_asc&tagIds=").unwrap();
        assert_eq!(query.is_favorite, Some(true));
        assert_eq!(query.sort, Some(BookmarkSort::TitleAsc));
    }
}
