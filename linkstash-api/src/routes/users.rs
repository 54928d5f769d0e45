/// User profile endpoints
///
/// # Endpoints
///
/// - `GET /user/me` - the authenticated user's profile
/// - `GET /user/stats` - bookmark/collection/tag counts
/// - `PATCH /user/profile` - update display name and avatar
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::user::{UpdateProfile, User, UserStats};
use serde::Deserialize;
use validator::Validate;

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(url(message = "Invalid avatar URL"), length(max = 1000))]
    pub avatar_url: Option<String>,
}

/// Current user endpoint handler
///
/// The auth layer already proved the token maps to a user id; a missing row
/// here means the account was deleted after the token was minted.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}

/// User stats endpoint handler
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserStats>> {
    let stats = User::stats(&state.db, auth.user_id).await?;
    Ok(Json(stats))
}

/// Update profile endpoint handler
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            name: req.name,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}
