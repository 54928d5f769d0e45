/// Database models for Linkstash
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and profile data
/// - `collection`: Bookmark collections, including the two reserved system
///   collections ("unsorted", "archived") seeded per user
/// - `bookmark`: Bookmarks with filtering, archive flow, and dedup rules
/// - `tag`: Per-user tags, created implicitly on first use
/// - `bookmark_tag`: The bookmark/tag join rows
///
/// Every read and write is scoped by `user_id`; no operation in this module
/// can see another user's rows.
///
/// # Example
///
/// ```no_run
/// use linkstash_shared::models::bookmark::{Bookmark, CreateBookmark};
/// use linkstash_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let bookmark = Bookmark::create(&pool, CreateBookmark {
///     user_id: Uuid::new_v4(),
///     url: "https://example.com/post".to_string(),
///     title: "example.com".to_string(),
///     description: None,
///     note: None,
///     cover: None,
///     domain: Some("example.com".to_string()),
///     is_favorite: false,
///     collection_id: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub mod bookmark;
pub mod bookmark_tag;
pub mod collection;
pub mod tag;
pub mod user;
