/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use linkstash_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = linkstash_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{
    config::Config,
    metadata::{FetchMetadata, HttpMetadataFetcher},
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use linkstash_shared::auth::middleware::resolve_bearer;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; everything inside is
/// either a pool handle or an Arc, so clones are cheap. The metadata fetcher
/// sits behind a trait object so tests can swap in a stub.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Page metadata fetcher used by the bookmark creation flow
    pub metadata: Arc<dyn FetchMetadata>,
}

impl AppState {
    /// Creates application state with the production metadata fetcher
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_fetcher(db, config, Arc::new(HttpMetadataFetcher::new()))
    }

    /// Creates application state with a custom metadata fetcher
    ///
    /// Tests use this to avoid network fetches.
    pub fn with_fetcher(db: PgPool, config: Config, metadata: Arc<dyn FetchMetadata>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            metadata,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// ├── /auth/                        # Authentication (public)
/// │   ├── POST /register            # Also seeds system collections
/// │   ├── POST /login
/// │   └── POST /refresh
/// ├── /bookmarks/                   # Authenticated
/// │   ├── POST   /                  # Create (dedup, tag linking, async enrichment)
/// │   ├── GET    /                  # List (filters, sort, pagination)
/// │   ├── POST   /bulk              # Batch create
/// │   ├── PATCH  /bulk              # Batch update
/// │   ├── POST   /bulk/archive      # Batch archive
/// │   ├── GET    /:id               # Fetch one with its tags
/// │   ├── PATCH  /:id               # Update (tag-set replacement)
/// │   ├── DELETE /:id               # Hard delete, archive-guarded
/// │   ├── POST   /:id/archive
/// │   └── POST   /:id/unarchive
/// ├── /collections/                 # Authenticated CRUD + children + slug lookup
/// ├── /tags/                        # Authenticated list/search/update/delete
/// ├── /search                       # Authenticated cross-entity search
/// └── /user/                        # Authenticated profile + stats
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let bookmark_routes = Router::new()
        .route(
            "/",
            post(routes::bookmarks::create::create_bookmark)
                .get(routes::bookmarks::list::list_bookmarks),
        )
        .route(
            "/bulk",
            post(routes::bookmarks::bulk::bulk_create).patch(routes::bookmarks::bulk::bulk_update),
        )
        .route("/bulk/archive", post(routes::bookmarks::bulk::bulk_archive))
        .route(
            "/:id",
            get(routes::bookmarks::get::get_bookmark)
                .patch(routes::bookmarks::update::update_bookmark)
                .delete(routes::bookmarks::lifecycle::delete_bookmark),
        )
        .route(
            "/:id/archive",
            post(routes::bookmarks::lifecycle::archive_bookmark),
        )
        .route(
            "/:id/unarchive",
            post(routes::bookmarks::lifecycle::unarchive_bookmark),
        );

    let collection_routes = Router::new()
        .route(
            "/",
            post(routes::collections::create_collection).get(routes::collections::list_collections),
        )
        .route("/slug/:slug", get(routes::collections::get_collection_by_slug))
        .route(
            "/:id",
            get(routes::collections::get_collection)
                .patch(routes::collections::update_collection)
                .delete(routes::collections::delete_collection),
        )
        .route("/:id/children", get(routes::collections::list_children))
        .route("/:id/bookmarks", get(routes::collections::list_collection_bookmarks));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/search", get(routes::tags::search_tags))
        .route(
            "/:id",
            patch(routes::tags::update_tag).delete(routes::tags::delete_tag),
        );

    let search_routes = Router::new().route("/", get(routes::search::global_search));

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/stats", get(routes::users::stats))
        .route("/profile", patch(routes::users::update_profile));

    // Everything except health and auth requires a session
    let protected_routes = Router::new()
        .nest("/bookmarks", bookmark_routes)
        .nest("/collections", collection_routes)
        .nest("/tags", tag_routes)
        .nest("/search", search_routes)
        .nest("/user", user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the Authorization header to an `AuthContext` and injects it into
/// request extensions; this is the only place request headers become a user
/// id.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = resolve_bearer(auth_header, state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
