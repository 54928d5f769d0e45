/// User model and database operations
///
/// Users own every other entity in the system. Accounts are created through
/// the registration endpoint, which also seeds the two reserved system
/// collections; that seeding is part of the registration contract, not of
/// this model.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     avatar_url VARCHAR(1000),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored lowercased, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (stored lowercased)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Input for updating a user's profile
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    /// New display name
    pub name: Option<String>,

    /// New avatar URL
    pub avatar_url: Option<String>,
}

/// Aggregate counts for a user's data, served by GET /user/stats
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStats {
    /// Number of bookmarks
    pub bookmarks: i64,

    /// Number of collections (system collections included)
    pub collections: i64,

    /// Number of tags
    pub tags: i64,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Surfaces the unique-email violation as a database error; callers map
    /// it to a 409.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, avatar_url)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING id, email, password_hash, name, avatar_url,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, avatar_url,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, avatar_url,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates profile fields (name, avatar)
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    /// Returns the updated user, or None if the id doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, password_hash, name, avatar_url, \
             created_at, updated_at, last_login_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Updates the last login timestamp, called after successful
    /// authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the user's bookmarks, collections, and tags in one round trip
    pub async fn stats(pool: &PgPool, id: Uuid) -> Result<UserStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bookmarks WHERE user_id = $1) AS bookmarks,
                (SELECT COUNT(*) FROM collections WHERE user_id = $1) AS collections,
                (SELECT COUNT(*) FROM tags WHERE user_id = $1) AS tags
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}
