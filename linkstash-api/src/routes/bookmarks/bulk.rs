/// Bulk bookmark endpoints
///
/// # Endpoints
///
/// - `POST /bookmarks/bulk` - batch create (dedup per item)
/// - `PATCH /bookmarks/bulk` - batch update
/// - `POST /bookmarks/bulk/archive` - batch archive by id list
///
/// Items are independent: one bad item is recorded in the per-item details
/// and never aborts the rest of the batch. Bulk creates skip the metadata
/// fetch entirely; a missing title falls back to the URL's hostname right
/// away, which keeps an import of hundreds of bookmarks from fanning out
/// hundreds of page fetches.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    metadata,
};
use axum::{extract::State, Extension, Json};
use futures::future::join_all;
use linkstash_shared::auth::middleware::AuthContext;
use linkstash_shared::models::{
    bookmark::{Bookmark, CreateBookmark, UpdateBookmark},
    collection::{self, Collection},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One bookmark in a bulk create payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkBookmarkItem {
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid cover URL"), length(max = 1000))]
    pub cover: Option<String>,

    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,

    pub is_favorite: Option<bool>,

    pub collection_id: Option<Uuid>,
}

/// Bulk create request
///
/// Item bodies are validated per item inside the batch so one malformed
/// entry fails alone.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateRequest {
    #[validate(length(min = 1, message = "At least one bookmark is required"))]
    pub bookmarks: Vec<BulkBookmarkItem>,
}

/// Per-item outcome in the bulk create response
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BulkCreateDetail {
    Created { bookmark: Box<Bookmark> },
    Skipped { url: String, reason: String },
    Failed { url: String, reason: String },
}

/// Bulk create response
#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub details: Vec<BulkCreateDetail>,
}

/// One update in a bulk update payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BulkUpdateItem {
    pub id: Uuid,

    #[validate(nested)]
    pub data: BulkUpdateData,
}

/// Fields a bulk update may change
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateData {
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid cover URL"), length(max = 1000))]
    pub cover: Option<String>,

    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,

    pub is_favorite: Option<bool>,

    pub collection_id: Option<Uuid>,
}

/// Bulk update request
#[derive(Debug, Deserialize, Validate)]
pub struct BulkUpdateRequest {
    #[validate(length(min = 1, message = "At least one update is required"))]
    pub updates: Vec<BulkUpdateItem>,
}

/// Per-item outcome in the bulk update response
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BulkUpdateDetail {
    Updated { bookmark: Box<Bookmark> },
    Failed { id: Uuid, reason: String },
}

/// Bulk update response
#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    pub updated: usize,
    pub failed: usize,
    pub details: Vec<BulkUpdateDetail>,
}

/// Bulk archive request
#[derive(Debug, Deserialize, Validate)]
pub struct BulkArchiveRequest {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<Uuid>,
}

/// Bulk archive response
#[derive(Debug, Serialize)]
pub struct BulkArchiveResponse {
    pub archived: usize,
    pub ids: Vec<Uuid>,
}

/// Creates one bookmark of a bulk batch; all failure paths map to a detail
async fn create_one(state: &AppState, user_id: Uuid, item: BulkBookmarkItem) -> BulkCreateDetail {
    if let Err(e) = item.validate() {
        return BulkCreateDetail::Failed {
            url: item.url,
            reason: e.to_string(),
        };
    }

    match Bookmark::url_exists(&state.db, user_id, &item.url).await {
        Ok(true) => {
            return BulkCreateDetail::Skipped {
                url: item.url,
                reason: "duplicated".to_string(),
            }
        }
        Ok(false) => {}
        Err(e) => {
            return BulkCreateDetail::Failed {
                url: item.url,
                reason: e.to_string(),
            }
        }
    }

    let collection_id = match item.collection_id {
        Some(id) => Some(id),
        None => {
            match Collection::system_collection_id(&state.db, user_id, collection::UNSORTED_SLUG)
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    return BulkCreateDetail::Failed {
                        url: item.url,
                        reason: e.to_string(),
                    }
                }
            }
        }
    };

    let host = metadata::hostname(&item.url);
    let title = item
        .title
        .or_else(|| host.clone())
        .unwrap_or_else(|| item.url.clone());

    let result = Bookmark::create(
        &state.db,
        CreateBookmark {
            user_id,
            url: item.url.clone(),
            title,
            description: item.description,
            note: item.note,
            cover: item.cover,
            domain: host,
            is_favorite: item.is_favorite.unwrap_or(false),
            collection_id,
        },
    )
    .await;

    match result {
        Ok(bookmark) => BulkCreateDetail::Created {
            bookmark: Box::new(bookmark),
        },
        Err(e) => BulkCreateDetail::Failed {
            url: item.url,
            reason: e.to_string(),
        },
    }
}

/// Bulk create endpoint handler
pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BulkCreateRequest>,
) -> ApiResult<Json<BulkCreateResponse>> {
    req.validate()?;

    let details = join_all(
        req.bookmarks
            .into_iter()
            .map(|item| create_one(&state, auth.user_id, item)),
    )
    .await;

    let created = details
        .iter()
        .filter(|d| matches!(d, BulkCreateDetail::Created { .. }))
        .count();
    let skipped = details
        .iter()
        .filter(|d| matches!(d, BulkCreateDetail::Skipped { .. }))
        .count();
    let failed = details.len() - created - skipped;

    tracing::info!(
        user_id = %auth.user_id,
        created, skipped, failed,
        "Bulk create finished"
    );

    Ok(Json(BulkCreateResponse {
        created,
        skipped,
        failed,
        details,
    }))
}

/// Updates one bookmark of a bulk batch
async fn update_one(state: &AppState, user_id: Uuid, item: BulkUpdateItem) -> BulkUpdateDetail {
    if let Err(e) = item.validate() {
        return BulkUpdateDetail::Failed {
            id: item.id,
            reason: e.to_string(),
        };
    }

    let domain = item.data.url.as_deref().and_then(metadata::hostname);

    let result = Bookmark::update(
        &state.db,
        item.id,
        user_id,
        UpdateBookmark {
            title: item.data.title,
            url: item.data.url,
            description: item.data.description,
            note: item.data.note,
            cover: item.data.cover,
            domain,
            is_favorite: item.data.is_favorite,
            collection_id: item.data.collection_id.map(Some),
        },
    )
    .await;

    match result {
        Ok(Some(bookmark)) => BulkUpdateDetail::Updated {
            bookmark: Box::new(bookmark),
        },
        Ok(None) => BulkUpdateDetail::Failed {
            id: item.id,
            reason: "not found".to_string(),
        },
        Err(e) => BulkUpdateDetail::Failed {
            id: item.id,
            reason: e.to_string(),
        },
    }
}

/// Bulk update endpoint handler
pub async fn bulk_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BulkUpdateRequest>,
) -> ApiResult<Json<BulkUpdateResponse>> {
    req.validate()?;

    let details = join_all(
        req.updates
            .into_iter()
            .map(|item| update_one(&state, auth.user_id, item)),
    )
    .await;

    let updated = details
        .iter()
        .filter(|d| matches!(d, BulkUpdateDetail::Updated { .. }))
        .count();
    let failed = details.len() - updated;

    Ok(Json(BulkUpdateResponse {
        updated,
        failed,
        details,
    }))
}

/// Bulk archive endpoint handler
///
/// Single UPDATE over the id list; ids not owned by the caller are skipped
/// silently and absent from the response.
pub async fn bulk_archive(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BulkArchiveRequest>,
) -> ApiResult<Json<BulkArchiveResponse>> {
    req.validate()?;

    let archived_id =
        Collection::system_collection_id(&state.db, auth.user_id, collection::ARCHIVED_SLUG)
            .await?
            .ok_or_else(|| ApiError::NotFound("archived collection not found".to_string()))?;

    let ids = Bookmark::set_collection_bulk(&state.db, auth.user_id, &req.ids, archived_id).await?;

    Ok(Json(BulkArchiveResponse {
        archived: ids.len(),
        ids,
    }))
}
