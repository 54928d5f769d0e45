/// Collection model and database operations
///
/// Collections group bookmarks. Two reserved collections exist per user,
/// seeded at registration and identified by slug:
///
/// - `unsorted`: default destination for new bookmarks
/// - `archived`: staging area a bookmark must pass through before deletion
///
/// Both carry `is_system = true` and cannot be renamed, re-slugged, or
/// deleted. The bookmark archive/unarchive/delete flow depends on both
/// existing, which is why a seeding failure fails registration itself.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE collections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     slug VARCHAR(120) NOT NULL,
///     description TEXT,
///     icon VARCHAR(100),
///     color VARCHAR(32),
///     parent_id UUID REFERENCES collections(id) ON DELETE SET NULL,
///     is_system BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// -- UNIQUE (user_id, name), UNIQUE (user_id, slug)
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Slug of the default collection for new bookmarks
pub const UNSORTED_SLUG: &str = "unsorted";

/// Slug of the archive staging collection
pub const ARCHIVED_SLUG: &str = "archived";

/// Collection model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique collection ID
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Display name, unique per user
    pub name: String,

    /// URL-safe identifier, unique per user; "unsorted" and "archived" are
    /// reserved for the system pair
    pub slug: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional icon identifier
    pub icon: Option<String>,

    /// Optional display color
    pub color: Option<String>,

    /// Parent collection for one level of nesting
    pub parent_id: Option<Uuid>,

    /// Whether this is one of the reserved system collections
    pub is_system: bool,

    /// When the collection was created
    pub created_at: DateTime<Utc>,

    /// When the collection was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a collection
#[derive(Debug, Clone)]
pub struct CreateCollection {
    /// Owner
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional icon identifier
    pub icon: Option<String>,

    /// Optional display color
    pub color: Option<String>,

    /// Optional parent collection
    pub parent_id: Option<Uuid>,
}

/// Input for updating a collection
///
/// Only non-None fields are written. Renames also re-derive the slug, so a
/// rename can collide with an existing slug and surface as a conflict.
#[derive(Debug, Clone, Default)]
pub struct UpdateCollection {
    /// New display name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New icon
    pub icon: Option<String>,

    /// New color
    pub color: Option<String>,
}

/// Search hit returned by the global search endpoint
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSearchHit {
    pub id: Uuid,
    pub name: String,
}

/// Derives a URL-safe slug from a collection name
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens. An all-symbol name degrades to
/// "collection" rather than an empty slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "collection".to_string()
    } else {
        slug
    }
}

impl Collection {
    /// Creates a collection with a slug derived from its name
    ///
    /// # Errors
    ///
    /// A name or slug collision surfaces as a unique-constraint database
    /// error; callers map it to a 409.
    pub async fn create(pool: &PgPool, data: CreateCollection) -> Result<Self, sqlx::Error> {
        let slug = slugify(&data.name);

        let collection = sqlx::query_as::<_, Collection>(
            r#"
            INSERT INTO collections (user_id, name, slug, description, icon, color, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, slug, description, icon, color, parent_id,
                      is_system, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(slug)
        .bind(data.description)
        .bind(data.icon)
        .bind(data.color)
        .bind(data.parent_id)
        .fetch_one(pool)
        .await?;

        Ok(collection)
    }

    /// Seeds the two reserved system collections for a freshly created user
    ///
    /// Registration calls this and propagates any failure: an account
    /// without its system pair would break the whole bookmark lifecycle.
    pub async fn seed_system(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO collections (user_id, name, slug, is_system)
            VALUES ($1, 'Unsorted', $2, TRUE),
                   ($1, 'Archived', $3, TRUE)
            "#,
        )
        .bind(user_id)
        .bind(UNSORTED_SLUG)
        .bind(ARCHIVED_SLUG)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Finds a collection by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let collection = sqlx::query_as::<_, Collection>(
            r#"
            SELECT id, user_id, name, slug, description, icon, color, parent_id,
                   is_system, created_at, updated_at
            FROM collections
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(collection)
    }

    /// Finds a collection by slug, scoped to its owner
    pub async fn find_by_slug(
        pool: &PgPool,
        user_id: Uuid,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let collection = sqlx::query_as::<_, Collection>(
            r#"
            SELECT id, user_id, name, slug, description, icon, color, parent_id,
                   is_system, created_at, updated_at
            FROM collections
            WHERE user_id = $1 AND slug = $2
            "#,
        )
        .bind(user_id)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(collection)
    }

    /// Resolves a system collection's id by slug
    ///
    /// The archive flow calls this for every transition; it returns None only
    /// if seeding never ran for the user, which registration prevents.
    pub async fn system_collection_id(
        pool: &PgPool,
        user_id: Uuid,
        slug: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let id: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM collections WHERE user_id = $1 AND slug = $2 AND is_system",
        )
        .bind(user_id)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(id.map(|(id,)| id))
    }

    /// Lists a user's root collections (no parent), system pair included
    pub async fn list_roots(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let collections = sqlx::query_as::<_, Collection>(
            r#"
            SELECT id, user_id, name, slug, description, icon, color, parent_id,
                   is_system, created_at, updated_at
            FROM collections
            WHERE user_id = $1 AND parent_id IS NULL
            ORDER BY is_system DESC, name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(collections)
    }

    /// Lists the children of a collection
    pub async fn list_children(
        pool: &PgPool,
        parent_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let collections = sqlx::query_as::<_, Collection>(
            r#"
            SELECT id, user_id, name, slug, description, icon, color, parent_id,
                   is_system, created_at, updated_at
            FROM collections
            WHERE user_id = $1 AND parent_id = $2
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(pool)
        .await?;

        Ok(collections)
    }

    /// Updates a collection
    ///
    /// Only non-None fields are written; a rename re-derives the slug.
    /// Returns None if the collection isn't owned by the user. System
    /// collections must be rejected by the caller before this runs.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateCollection,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE collections SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
            bind_count += 1;
            query.push_str(&format!(", slug = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.icon.is_some() {
            bind_count += 1;
            query.push_str(&format!(", icon = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, name, slug, description, icon, color, parent_id, \
             is_system, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Collection>(&query).bind(id).bind(user_id);

        if let Some(name) = data.name {
            let slug = slugify(&name);
            q = q.bind(name);
            q = q.bind(slug);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(icon) = data.icon {
            q = q.bind(icon);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }

        let collection = q.fetch_optional(pool).await?;

        Ok(collection)
    }

    /// Deletes a collection
    ///
    /// Bookmarks inside it fall back to `collection_id = NULL` via the
    /// foreign key. Returns false if the collection isn't owned by the user.
    /// System collections must be rejected by the caller before this runs.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Substring search over name/description for the global search endpoint
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<CollectionSearchHit>, sqlx::Error> {
        let hits = sqlx::query_as::<_, CollectionSearchHit>(
            r#"
            SELECT id, name
            FROM collections
            WHERE user_id = $1 AND (name ILIKE $2 OR description ILIKE $2)
            ORDER BY name
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(hits)
    }
}
