/// Collection endpoints
///
/// # Endpoints
///
/// - `POST /collections` - create
/// - `GET /collections` - list roots (system pair first)
/// - `GET /collections/slug/:slug` - lookup by slug (how clients find the
///   system collections)
/// - `GET /collections/:id` - fetch one
/// - `PATCH /collections/:id` - update
/// - `DELETE /collections/:id` - delete (bookmarks inside fall back to no
///   collection)
/// - `GET /collections/:id/children` - one level of nesting
/// - `GET /collections/:id/bookmarks` - paginated bookmarks in a collection
///
/// The system pair ("unsorted", "archived") is protected: renames and
/// deletes are 409s. Icon/color/description changes are allowed, since they
/// don't affect the slugs the bookmark lifecycle depends on.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{Bookmark, BookmarkFilter, BookmarkSort},
    collection::{Collection, CreateCollection, UpdateCollection},
};
use linkstash_shared::pagination::{normalize, PaginationMeta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create collection request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "Icon must be at most 100 characters"))]
    pub icon: Option<String>,

    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,

    pub parent_id: Option<Uuid>,
}

/// Update collection request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "Icon must be at most 100 characters"))]
    pub icon: Option<String>,

    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,
}

/// Delete collection response
#[derive(Debug, Serialize)]
pub struct DeleteCollectionResponse {
    pub success: bool,
}

/// Query parameters for the per-collection bookmark listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionBookmarksQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<BookmarkSort>,
}

/// Paginated bookmarks in one collection
#[derive(Debug, Serialize)]
pub struct CollectionBookmarksResponse {
    pub data: Vec<Bookmark>,
    pub pagination: PaginationMeta,
}

/// Create collection endpoint handler
///
/// # Errors
///
/// - 404: Parent collection not owned by the caller
/// - 409: Name or derived slug already taken
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCollectionRequest>,
) -> ApiResult<Json<Collection>> {
    req.validate()?;

    if let Some(parent_id) = req.parent_id {
        Collection::find_by_id_and_user(&state.db, parent_id, auth.user_id)
            .await?
            .ok_or_else(ApiError::not_found)?;
    }

    let collection = Collection::create(
        &state.db,
        CreateCollection {
            user_id: auth.user_id,
            name: req.name,
            description: req.description,
            icon: req.icon,
            color: req.color,
            parent_id: req.parent_id,
        },
    )
    .await?;

    Ok(Json(collection))
}

/// List root collections endpoint handler
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Collection>>> {
    let collections = Collection::list_roots(&state.db, auth.user_id).await?;
    Ok(Json(collections))
}

/// Get collection endpoint handler
pub async fn get_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Collection>> {
    let collection = Collection::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(collection))
}

/// Get collection by slug endpoint handler
pub async fn get_collection_by_slug(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Collection>> {
    let collection = Collection::find_by_slug(&state.db, auth.user_id, &slug)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(collection))
}

/// Update collection endpoint handler
///
/// # Errors
///
/// - 404: Collection not owned by the caller
/// - 409: Rename of a system collection, or name/slug collision
pub async fn update_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCollectionRequest>,
) -> ApiResult<Json<Collection>> {
    req.validate()?;

    let existing = Collection::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if existing.is_system && req.name.is_some() {
        return Err(ApiError::Conflict(
            "System collections cannot be renamed".to_string(),
        ));
    }

    let collection = Collection::update(
        &state.db,
        id,
        auth.user_id,
        UpdateCollection {
            name: req.name,
            description: req.description,
            icon: req.icon,
            color: req.color,
        },
    )
    .await?
    .ok_or_else(ApiError::not_found)?;

    Ok(Json(collection))
}

/// Delete collection endpoint handler
///
/// # Errors
///
/// - 404: Collection not owned by the caller
/// - 409: System collection
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteCollectionResponse>> {
    let existing = Collection::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if existing.is_system {
        return Err(ApiError::Conflict(
            "System collections cannot be deleted".to_string(),
        ));
    }

    Collection::delete(&state.db, id, auth.user_id).await?;

    Ok(Json(DeleteCollectionResponse { success: true }))
}

/// List child collections endpoint handler
pub async fn list_children(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Collection>>> {
    Collection::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let children = Collection::list_children(&state.db, id, auth.user_id).await?;
    Ok(Json(children))
}

/// List a collection's bookmarks endpoint handler
pub async fn list_collection_bookmarks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<CollectionBookmarksQuery>,
) -> ApiResult<Json<CollectionBookmarksResponse>> {
    Collection::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let pagination = normalize(query.page, query.limit);
    let sort = query.sort.unwrap_or_default();
    let filter = BookmarkFilter {
        collection_id: Some(id),
        ..Default::default()
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

    Ok(Json(CollectionBookmarksResponse {
        data,
        pagination: PaginationMeta::new(pagination.page, pagination.limit, total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let good: CreateCollectionRequest =
            serde_json::from_str(r#"{"name": "Reading List"}"#).unwrap();
        assert!(good.validate().is_ok());

        let empty_name: CreateCollectionRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty_name.validate().is_err());

        let long_name: CreateCollectionRequest =
            serde_json::from_str(&format!(r#"{{"name": "{}"}}"#, "a".repeat(101))).unwrap();
        assert!(long_name.validate().is_err());
    }
}
