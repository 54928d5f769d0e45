/// Bookmark archive / unarchive / delete endpoints
///
/// Deletion is deliberately two-step:
///
/// ```text
/// POST /bookmarks/:id/archive     unsorted-or-other → archived
/// POST /bookmarks/:id/unarchive   archived → unsorted
/// DELETE /bookmarks/:id           archived → gone (409 from anywhere else)
/// ```
///
/// A bookmark can only be hard-deleted out of the archived collection; the
/// guard turns a stray DELETE into a 409 instead of data loss. Once the
/// guard passes the row is removed permanently and its tag links cascade.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::Bookmark,
    collection::{self, Collection},
};
use serde::Serialize;
use uuid::Uuid;

/// Response for the lifecycle endpoints
#[derive(Debug, Serialize)]
pub struct LifecycleResponse {
    pub success: bool,
}

/// Resolves one of the user's system collections, 404 when seeding never ran
async fn require_system_collection(
    state: &AppState,
    user_id: Uuid,
    slug: &str,
) -> ApiResult<Uuid> {
    Collection::system_collection_id(&state.db, user_id, slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} collection not found", slug)))
}

/// Archive endpoint handler
///
/// Moves the bookmark into the user's archived collection.
pub async fn archive_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LifecycleResponse>> {
    let archived_id =
        require_system_collection(&state, auth.user_id, collection::ARCHIVED_SLUG).await?;

    Bookmark::set_collection(&state.db, id, auth.user_id, archived_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(LifecycleResponse { success: true }))
}

/// Unarchive endpoint handler
///
/// Moves the bookmark back into the user's unsorted collection.
pub async fn unarchive_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LifecycleResponse>> {
    let unsorted_id =
        require_system_collection(&state, auth.user_id, collection::UNSORTED_SLUG).await?;

    Bookmark::set_collection(&state.db, id, auth.user_id, unsorted_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(LifecycleResponse { success: true }))
}

/// Delete endpoint handler
///
/// # Errors
///
/// - 404: Bookmark (or the archived collection) not found for this user
/// - 409: Bookmark is not currently archived
pub async fn delete_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LifecycleResponse>> {
    let archived_id =
        require_system_collection(&state, auth.user_id, collection::ARCHIVED_SLUG).await?;

    let bookmark = Bookmark::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if bookmark.collection_id != Some(archived_id) {
        return Err(ApiError::Conflict(
            "Bookmark must be archived first".to_string(),
        ));
    }

    Bookmark::delete(&state.db, id, auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, bookmark_id = %id, "Bookmark deleted");

    Ok(Json(LifecycleResponse { success: true }))
}
