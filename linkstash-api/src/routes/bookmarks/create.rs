/// Bookmark creation endpoint
///
/// # Endpoint
///
/// `POST /bookmarks`
///
/// # Flow
///
/// 1. Reject with 409 if the user already bookmarked this URL.
/// 2. Caller-supplied title short-circuits the metadata fetch; otherwise the
///    page is fetched synchronously for title/description/image.
/// 3. The bookmark lands in the caller's chosen collection, or the user's
///    "unsorted" system collection.
/// 4. Without a caller title, a detached task re-fetches the page and
///    overwrites title/description/cover once done. The request never waits
///    for it and its failure is swallowed.
/// 5. Tag names are resolved find-or-create, one at a time, then linked.
///
/// # Example Request
///
/// ```json
/// {
///   "url": "https://blog.example.com/post",
///   "note": "read later",
///   "tags": ["rust", "async"]
/// }
/// ```
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    metadata,
};
use axum::{extract::State, Extension, Json};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{Bookmark, CreateBookmark},
    bookmark_tag::BookmarkTag,
    collection::{self, Collection},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create bookmark request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkRequest {
    /// URL to bookmark
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional title; supplying one skips the metadata fetch entirely
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Optional cover image URL
    #[validate(url(message = "Invalid cover URL"), length(max = 1000))]
    pub cover: Option<String>,

    /// Optional free-form note
    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,

    /// Favorite flag
    pub is_favorite: Option<bool>,

    /// Target collection; defaults to the user's unsorted collection
    pub collection_id: Option<Uuid>,

    /// Tag names to attach; missing tags are created
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Create bookmark endpoint handler
///
/// # Errors
///
/// - 400: Validation failed
/// - 404: Caller-supplied collection doesn't exist for this user
/// - 409: URL already bookmarked by this user
pub async fn create_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBookmarkRequest>,
) -> ApiResult<Json<Bookmark>> {
    req.validate()?;

    if Bookmark::url_exists(&state.db, auth.user_id, &req.url).await? {
        return Err(ApiError::conflict());
    }

    // Caller-supplied title means caller-supplied everything; no fetch.
    let (title, description, cover, needs_refresh) = match &req.title {
        Some(title) => (
            title.clone(),
            req.description.clone(),
            req.cover.clone(),
            false,
        ),
        None => {
            let meta = state.metadata.fetch(&req.url).await;
            (
                meta.title,
                meta.description,
                req.cover.clone().or(meta.image),
                true,
            )
        }
    };

    let collection_id = match req.collection_id {
        Some(id) => Some(
            Collection::find_by_id_and_user(&state.db, id, auth.user_id)
                .await?
                .ok_or_else(ApiError::not_found)?
                .id,
        ),
        None => {
            Collection::system_collection_id(&state.db, auth.user_id, collection::UNSORTED_SLUG)
                .await?
        }
    };

    let bookmark = Bookmark::create(
        &state.db,
        CreateBookmark {
            user_id: auth.user_id,
            url: req.url.clone(),
            title,
            description,
            note: req.note,
            cover,
            domain: metadata::hostname(&req.url),
            is_favorite: req.is_favorite.unwrap_or(false),
            collection_id,
        },
    )
    .await?;

    if needs_refresh {
        spawn_metadata_refresh(&state, bookmark.id, req.url);
    }

    if !req.tags.is_empty() {
        let tag_ids = super::resolve_tag_names(&state.db, auth.user_id, &req.tags).await?;
        BookmarkTag::link_many(&state.db, bookmark.id, &tag_ids).await?;
    }

    tracing::info!(
        user_id = %auth.user_id,
        bookmark_id = %bookmark.id,
        domain = ?bookmark.domain,
        "Bookmark created"
    );

    Ok(Json(bookmark))
}

/// Launches the deferred metadata refresh as a detached task
///
/// The task owns its clones of the pool and fetcher, so it outlives the
/// request. The row may be deleted before the fetch completes; the
/// conditional UPDATE then affects zero rows, which is the accepted outcome.
fn spawn_metadata_refresh(state: &AppState, bookmark_id: Uuid, url: String) {
    let pool = state.db.clone();
    let fetcher = state.metadata.clone();

    tokio::spawn(async move {
        let meta = fetcher.fetch(&url).await;

        match Bookmark::apply_metadata(
            &pool,
            bookmark_id,
            &meta.title,
            meta.description.as_deref(),
            meta.image.as_deref(),
        )
        .await
        {
            Ok(0) => {
                tracing::debug!(%bookmark_id, "Bookmark gone before metadata refresh landed");
            }
            Ok(_) => {
                tracing::debug!(%bookmark_id, "Metadata refresh applied");
            }
            Err(e) => {
                tracing::warn!(%bookmark_id, error = %e, "Metadata refresh failed");
            }
        }
    });
}
