/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (migrations run on first connect)
/// - A per-test user with its seeded system collections
/// - JWT token generation
/// - A canned metadata fetcher so no test touches the network
/// - Request/response helpers around `tower::Service::call`
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use linkstash_api::app::{build_router, AppState};
use linkstash_api::config::Config;
use linkstash_api::metadata::{FetchMetadata, PageMetadata};
use linkstash_shared::auth::jwt::{create_token, Claims, TokenType};
use linkstash_shared::models::collection::{self, Collection};
use linkstash_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

/// Canned fetcher: deterministic metadata, no network
pub struct StubFetcher;

#[async_trait]
impl FetchMetadata for StubFetcher {
    async fn fetch(&self, url: &str) -> PageMetadata {
        let domain = linkstash_api::metadata::hostname(url);
        PageMetadata {
            title: format!("Stub title for {}", domain.as_deref().unwrap_or(url)),
            description: Some("stub description".to_string()),
            image: None,
            domain,
            url: url.to_string(),
        }
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db).await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::with_fetcher(db.clone(), config.clone(), Arc::new(StubFetcher));
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Resolves one of this user's system collections by slug
    pub async fn system_collection(&self, slug: &str) -> Uuid {
        Collection::system_collection_id(&self.db, self.user.id, slug)
            .await
            .unwrap()
            .expect("system collection missing")
    }

    /// Sends an authenticated JSON request and returns (status, body)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header());

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Deleting the user cascades collections, bookmarks, tags, links
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a user the way registration does: account plus system collections
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: "$argon2id$test-hash".to_string(),
            name: Some("Test User".to_string()),
            avatar_url: None,
        },
    )
    .await?;

    Collection::seed_system(db, user.id).await?;

    Ok(user)
}

/// Creates a bookmark through the API and returns its id
pub async fn create_test_bookmark(
    ctx: &TestContext,
    url: &str,
    title: Option<&str>,
    tags: &[&str],
) -> Uuid {
    let mut body = serde_json::json!({ "url": url, "tags": tags });
    if let Some(title) = title {
        body["title"] = serde_json::json!(title);
    }

    let (status, json) = ctx.request("POST", "/bookmarks", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "bookmark create failed: {}", json);

    Uuid::parse_str(json["id"].as_str().unwrap()).unwrap()
}

/// Slug re-exports so tests don't need the shared crate everywhere
pub const UNSORTED_SLUG: &str = collection::UNSORTED_SLUG;
pub const ARCHIVED_SLUG: &str = collection::ARCHIVED_SLUG;
