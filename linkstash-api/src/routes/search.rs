/// Global search endpoint
///
/// # Endpoint
///
/// `GET /search?q=`
///
/// One query, three entity types, each capped separately: up to 10 bookmark
/// hits (title/url/description), 5 collections (name/description), and
/// 5 tags (name). Every hit carries its entity type so clients can render a
/// mixed result list.
///
/// # Response
///
/// ```json
/// {
///   "bookmarks": [ { "id": "...", "title": "...", "type": "bookmarks" } ],
///   "collections": [ { "id": "...", "name": "...", "type": "collections" } ],
///   "tags": [ { "id": "...", "name": "...", "type": "tags" } ]
/// }
/// ```
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{escape_like, Bookmark, BookmarkSearchHit},
    collection::{Collection, CollectionSearchHit},
    tag::{Tag, TagSearchHit},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const BOOKMARK_LIMIT: i64 = 10;
const COLLECTION_LIMIT: i64 = 5;
const TAG_LIMIT: i64 = 5;

/// Search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100, message = "Query must be 1-100 characters"))]
    pub q: String,
}

/// A search hit tagged with its entity type
#[derive(Debug, Serialize)]
pub struct Typed<T: Serialize> {
    #[serde(flatten)]
    pub item: T,

    #[serde(rename = "type")]
    pub entity_type: &'static str,
}

/// Global search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub bookmarks: Vec<Typed<BookmarkSearchHit>>,
    pub collections: Vec<Typed<CollectionSearchHit>>,
    pub tags: Vec<Typed<TagSearchHit>>,
}

/// Global search endpoint handler
pub async fn global_search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    query.validate()?;

    let pattern = format!("%{}%", escape_like(&query.q));

    let (bookmarks, collections, tags) = tokio::try_join!(
        Bookmark::search(&state.db, auth.user_id, &pattern, BOOKMARK_LIMIT),
        Collection::search(&state.db, auth.user_id, &pattern, COLLECTION_LIMIT),
        Tag::search(&state.db, auth.user_id, &pattern, TAG_LIMIT),
    )?;

    Ok(Json(SearchResponse {
        bookmarks: bookmarks
            .into_iter()
            .map(|item| Typed {
                item,
                entity_type: "bookmarks",
            })
            .collect(),
        collections: collections
            .into_iter()
            .map(|item| Typed {
                item,
                entity_type: "collections",
            })
            .collect(),
        tags: tags
            .into_iter()
            .map(|item| Typed {
                item,
                entity_type: "tags",
            })
            .collect(),
    }))
}
