/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration (with system-collection seeding), login, refresh
/// - `bookmarks`: Bookmark CRUD, archive lifecycle, and bulk operations
/// - `collections`: Collection CRUD with system-collection protections
/// - `tags`: Tag listing, search, rename/recolor, delete
/// - `search`: Cross-entity substring search
/// - `users`: Profile and aggregate stats
pub mod auth;
pub mod bookmarks;
pub mod collections;
pub mod health;
pub mod search;
pub mod tags;
pub mod users;
