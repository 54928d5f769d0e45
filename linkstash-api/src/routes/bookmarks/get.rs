/// Single-bookmark fetch endpoint
///
/// # Endpoint
///
/// `GET /bookmarks/:id`
///
/// Returns the bookmark with its tags attached. A bookmark that exists but
/// belongs to someone else is indistinguishable from one that doesn't exist:
/// both are 404.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{bookmark::Bookmark, bookmark_tag::BookmarkTag};
use uuid::Uuid;

use super::BookmarkWithTags;

/// Get bookmark endpoint handler
pub async fn get_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookmarkWithTags>> {
    let bookmark = Bookmark::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let tags = BookmarkTag::tags_for_bookmark(&state.db, bookmark.id).await?;

    Ok(Json(BookmarkWithTags { bookmark, tags }))
}
