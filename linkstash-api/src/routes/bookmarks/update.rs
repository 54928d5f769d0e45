/// Bookmark update endpoint
///
/// # Endpoint
///
/// `PATCH /bookmarks/:id`
///
/// Partial update. Two fields have non-obvious semantics:
///
/// - `url`: changing it re-runs the per-user dedup check (excluding this
///   bookmark) and re-derives `domain`.
/// - `tags`: PRESENT replaces the whole tag set, even when empty (empty
///   clears all tags); ABSENT leaves tags untouched. `collectionId: null`
///   detaches the bookmark from its collection.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    metadata,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{Bookmark, UpdateBookmark},
    bookmark_tag::BookmarkTag,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Update bookmark request
///
/// `collection_id` distinguishes "absent" (leave alone) from "null" (detach)
/// via the double Option.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkRequest {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,

    #[validate(url(message = "Invalid cover URL"), length(max = 1000))]
    pub cover: Option<String>,

    pub is_favorite: Option<bool>,

    /// `Some(None)` detaches; `None` leaves the collection untouched
    #[serde(default, deserialize_with = "double_option")]
    pub collection_id: Option<Option<Uuid>>,

    /// Present (even empty) replaces the tag set; absent leaves it alone
    pub tags: Option<Vec<String>>,
}

/// Deserializes a present-but-null field into `Some(None)`
///
/// Serde's default treatment of `Option<Option<T>>` folds `null` into the
/// outer None, losing the absent/null distinction this endpoint needs.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Update bookmark endpoint handler
///
/// # Errors
///
/// - 400: Validation failed
/// - 404: Bookmark not owned by the caller
/// - 409: Another bookmark of this user already has the new URL
pub async fn update_bookmark(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookmarkRequest>,
) -> ApiResult<Json<Bookmark>> {
    req.validate()?;

    if let Some(ref url) = req.url {
        if Bookmark::url_taken_by_other(&state.db, auth.user_id, url, id).await? {
            return Err(ApiError::conflict());
        }
    }

    let domain = req.url.as_deref().and_then(metadata::hostname);

    let bookmark = Bookmark::update(
        &state.db,
        id,
        auth.user_id,
        UpdateBookmark {
            title: req.title,
            url: req.url,
            description: req.description,
            note: req.note,
            cover: req.cover,
            domain,
            is_favorite: req.is_favorite,
            collection_id: req.collection_id,
        },
    )
    .await?
    .ok_or_else(ApiError::not_found)?;

    if let Some(tag_names) = req.tags {
        BookmarkTag::clear_for_bookmark(&state.db, bookmark.id).await?;

        if !tag_names.is_empty() {
            let tag_ids = super::resolve_tag_names(&state.db, auth.user_id, &tag_names).await?;
            BookmarkTag::link_many(&state.db, bookmark.id, &tag_ids).await?;
        }
    }

    Ok(Json(bookmark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_collection_id_is_outer_none() {
        let req: UpdateBookmarkRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(req.collection_id, None);
    }

    #[test]
    fn test_null_collection_id_is_some_none() {
        let req: UpdateBookmarkRequest =
            serde_json::from_str(r#"{"collectionId": null}"#).unwrap();
        assert_eq!(req.collection_id, Some(None));
    }

    #[test]
    fn test_value_collection_id_is_some_some() {
        let id = Uuid::new_v4();
        let req: UpdateBookmarkRequest =
            serde_json::from_str(&format!(r#"{{"collectionId": "{}"}}"#, id)).unwrap();
        assert_eq!(req.collection_id, Some(Some(id)));
    }

    #[test]
    fn test_absent_tags_vs_empty_tags() {
        let absent: UpdateBookmarkRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.tags.is_none());

        let empty: UpdateBookmarkRequest = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        assert_eq!(empty.tags, Some(vec![]));
    }

    #[test]
    fn test_url_validation() {
        let req = UpdateBookmarkRequest {
            url: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
