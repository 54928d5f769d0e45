/// Bookmark route handlers
///
/// One file per operation group:
///
/// - `create`: POST /bookmarks (dedup, metadata, tag linking, async refresh)
/// - `list`: GET /bookmarks (filters, sort, pagination, embedded tags)
/// - `get`: GET /bookmarks/:id
/// - `update`: PATCH /bookmarks/:id (tag-set replacement)
/// - `lifecycle`: archive / unarchive / guarded delete
/// - `bulk`: batch create / update / archive
pub mod bulk;
pub mod create;
pub mod get;
pub mod lifecycle;
pub mod list;
pub mod update;

use crate::error::ApiResult;
use linkstash_shared::models::{
    bookmark::Bookmark,
    bookmark_tag::TagRef,
    tag::Tag,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A bookmark with its tags attached, as served by GET endpoints
#[derive(Debug, Serialize)]
pub struct BookmarkWithTags {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub tags: Vec<TagRef>,
}

/// Resolves tag names to ids, creating missing tags
///
/// The loop awaits each find-or-create before starting the next. That
/// ordering matters: the same new name can appear twice in one payload, and
/// two parallel inserts would race on the `(user_id, name)` unique index.
pub(crate) async fn resolve_tag_names(
    pool: &PgPool,
    user_id: Uuid,
    names: &[String],
) -> ApiResult<Vec<Uuid>> {
    let mut tag_ids = Vec::with_capacity(names.len());

    for name in names {
        let tag = Tag::find_or_create(pool, user_id, name).await?;
        tag_ids.push(tag.id);
    }

    Ok(tag_ids)
}
