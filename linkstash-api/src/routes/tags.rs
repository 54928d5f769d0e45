/// Tag endpoints
///
/// # Endpoints
///
/// - `GET /tags` - all tags ranked by usage (bookmark count desc, then name)
/// - `GET /tags/search?q=` - substring match, up to 10 results
/// - `PATCH /tags/:id` - rename and/or recolor
/// - `DELETE /tags/:id` - delete; bookmark links cascade
///
/// There is no create endpoint: tags come into existence through bookmark
/// writes that name them.
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
    bookmark::escape_like,
    tag::{Tag, TagWithCount, UpdateTag},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tag search query
#[derive(Debug, Deserialize, Validate)]
pub struct SearchTagsQuery {
    #[validate(length(min = 1, max = 100, message = "Query must be 1-100 characters"))]
    pub q: String,
}

/// Update tag request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,
}

/// Delete tag response
#[derive(Debug, Serialize)]
pub struct DeleteTagResponse {
    pub success: bool,
}

/// List tags endpoint handler
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TagWithCount>>> {
    let tags = Tag::list_with_counts(&state.db, auth.user_id).await?;
    Ok(Json(tags))
}

/// Search tags endpoint handler
pub async fn search_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchTagsQuery>,
) -> ApiResult<Json<Vec<Tag>>> {
    query.validate()?;

    let pattern = format!("%{}%", escape_like(&query.q));
    let tags = Tag::search_by_name(&state.db, auth.user_id, &pattern, 10).await?;

    Ok(Json(tags))
}

/// Update tag endpoint handler
///
/// # Errors
///
/// - 404: Tag not owned by the caller
/// - 409: Rename collides with an existing tag name
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTagRequest>,
) -> ApiResult<Json<Tag>> {
    req.validate()?;

    let tag = Tag::update(
        &state.db,
        id,
        auth.user_id,
        UpdateTag {
            name: req.name,
            color: req.color,
        },
    )
    .await?
    .ok_or_else(ApiError::not_found)?;

    Ok(Json(tag))
}

/// Delete tag endpoint handler
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTagResponse>> {
    let deleted = Tag::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::not_found());
    }

    Ok(Json(DeleteTagResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_validation() {
        let good = SearchTagsQuery {
            q: "rust".to_string(),
        };
        assert!(good.validate().is_ok());

        let empty = SearchTagsQuery { q: "".to_string() };
        assert!(empty.validate().is_err());

        let long = SearchTagsQuery {
            q: "a".repeat(101),
        };
        assert!(long.validate().is_err());
    }
}
