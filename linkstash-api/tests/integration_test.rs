/// Integration tests for the Linkstash API
///
/// These tests verify the system end-to-end against a real database:
/// - Bookmark creation with dedup and metadata fallback
/// - The archive → unarchive → guarded-delete lifecycle
/// - Tag replacement semantics on update
/// - AND-semantics tag filtering in the listing
/// - System collection protections
/// - Authentication gating
///
/// They require `DATABASE_URL` and `JWT_SECRET` in the environment (or a
/// `.env` file) and a running PostgreSQL instance.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_bookmark, TestContext, ARCHIVED_SLUG, UNSORTED_SLUG};
use serde_json::json;
use tower::Service as _;

/// Creating a bookmark without a title uses fetched metadata and lands in
/// the unsorted system collection
#[tokio::test]
async fn test_create_bookmark_defaults() {
    let ctx = TestContext::new().await.unwrap();
    let unsorted_id = ctx.system_collection(UNSORTED_SLUG).await;

    let (status, json) = ctx
        .request(
            "POST",
            "/bookmarks",
            Some(json!({ "url": "https://example.com/article" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["collectionId"].as_str().unwrap(), unsorted_id.to_string());
    assert_eq!(json["domain"], "example.com");
    // The stub fetcher answers synchronously; the deferred refresh writes the
    // same values, so the title is stable either way.
    assert_eq!(json["title"], "Stub title for example.com");

    ctx.cleanup().await.unwrap();
}

/// Duplicate URL for the same user is a 409; the same URL under another user
/// is fine
#[tokio::test]
async fn test_duplicate_url_conflict_is_per_user() {
    let ctx = TestContext::new().await.unwrap();

    let url = "https://example.com/dup";
    create_test_bookmark(&ctx, url, Some("First"), &[]).await;

    let (status, _) = ctx
        .request("POST", "/bookmarks", Some(json!({ "url": url })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Same URL, different user: allowed.
    let other = TestContext::new().await.unwrap();
    let (status, _) = other
        .request("POST", "/bookmarks", Some(json!({ "url": url })))
        .await;
    assert_eq!(status, StatusCode::OK);

    other.cleanup().await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Caller-supplied title suppresses the metadata fetch
#[tokio::test]
async fn test_caller_title_wins() {
    let ctx = TestContext::new().await.unwrap();

    let (status, json) = ctx
        .request(
            "POST",
            "/bookmarks",
            Some(json!({ "url": "https://example.com/titled", "title": "My Title" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "My Title");

    ctx.cleanup().await.unwrap();
}

/// Full lifecycle: delete is rejected until the bookmark is archived, then
/// removes the row for good
#[tokio::test]
async fn test_archive_unarchive_delete_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let unsorted_id = ctx.system_collection(UNSORTED_SLUG).await;
    let archived_id = ctx.system_collection(ARCHIVED_SLUG).await;

    let id = create_test_bookmark(&ctx, "https://example.com/cycle", Some("Cycle"), &["keep"])
        .await;

    // Delete before archive: 409, row intact.
    let (status, _) = ctx
        .request("DELETE", &format!("/bookmarks/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    // Archive moves it into the archived collection.
    let (status, _) = ctx
        .request("POST", &format!("/bookmarks/{}/archive", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(json["collectionId"].as_str().unwrap(), archived_id.to_string());

    // Unarchive moves it back to unsorted.
    let (status, _) = ctx
        .request("POST", &format!("/bookmarks/{}/unarchive", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(json["collectionId"].as_str().unwrap(), unsorted_id.to_string());

    // Archive again, then delete succeeds and the row is gone.
    ctx.request("POST", &format!("/bookmarks/{}/archive", id), None)
        .await;
    let (status, _) = ctx
        .request("DELETE", &format!("/bookmarks/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Tag update semantics: present replaces, empty clears, absent preserves;
/// repeated names create one tag
#[tokio::test]
async fn test_tag_replacement_semantics() {
    let ctx = TestContext::new().await.unwrap();

    let id = create_test_bookmark(
        &ctx,
        "https://example.com/tagged",
        Some("Tagged"),
        &["rust", "async", "rust"],
    )
    .await;

    // Repeated "rust" in the payload created one tag, linked once.
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);

    // Omitting tags leaves them untouched.
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/bookmarks/{}", id),
            Some(json!({ "note": "still tagged" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);

    // Present tags replace the whole set.
    ctx.request(
        "PATCH",
        &format!("/bookmarks/{}", id),
        Some(json!({ "tags": ["rust", "web"] })),
    )
    .await;
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    let names: Vec<&str> = json["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["rust", "web"]);

    // Empty list clears everything.
    ctx.request(
        "PATCH",
        &format!("/bookmarks/{}", id),
        Some(json!({ "tags": [] })),
    )
    .await;
    let (_, json) = ctx.request("GET", &format!("/bookmarks/{}", id), None).await;
    assert!(json["tags"].as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

/// Listing with tagIds requires ALL named tags, not any
#[tokio::test]
async fn test_listing_tag_intersection() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(&ctx, "https://example.com/both", Some("Both"), &["a", "b"]).await;
    create_test_bookmark(&ctx, "https://example.com/only-a", Some("OnlyA"), &["a"]).await;

    // Resolve tag ids from the listing.
    let (_, tags) = ctx.request("GET", "/tags", None).await;
    let find = |name: &str| {
        tags.as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == name)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    };
    let (tag_a, tag_b) = (find("a"), find("b"));

    let (status, json) = ctx
        .request(
            "GET",
            &format!("/bookmarks?tagIds={},{}", tag_a, tag_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Both");
    assert_eq!(json["pagination"]["total"], 1);

    ctx.cleanup().await.unwrap();
}

/// Title search is case-insensitive and wildcard characters match literally
#[tokio::test]
async fn test_listing_search_escapes_wildcards() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(&ctx, "https://example.com/pct", Some("100% done"), &[]).await;
    create_test_bookmark(&ctx, "https://example.com/other", Some("100 things"), &[]).await;

    let (status, json) = ctx.request("GET", "/bookmarks?search=100%25", None).await;
    assert_eq!(status, StatusCode::OK);

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "100% done");

    ctx.cleanup().await.unwrap();
}

/// Changing a bookmark's URL onto another bookmark's URL is a 409
#[tokio::test]
async fn test_update_url_dedup() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(&ctx, "https://example.com/one", Some("One"), &[]).await;
    let id = create_test_bookmark(&ctx, "https://example.com/two", Some("Two"), &[]).await;

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/bookmarks/{}", id),
            Some(json!({ "url": "https://example.com/one" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Updating to its own URL is fine.
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/bookmarks/{}", id),
            Some(json!({ "url": "https://example.com/two" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// System collections refuse rename and delete
#[tokio::test]
async fn test_system_collection_protections() {
    let ctx = TestContext::new().await.unwrap();
    let archived_id = ctx.system_collection(ARCHIVED_SLUG).await;

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/collections/{}", archived_id),
            Some(json!({ "name": "Trash" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .request("DELETE", &format!("/collections/{}", archived_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Recoloring is allowed; slugs are untouched.
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/collections/{}", archived_id),
            Some(json!({ "color": "#888888" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// Bulk create skips duplicates and reports per-item outcomes
#[tokio::test]
async fn test_bulk_create_counts() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(&ctx, "https://example.com/existing", Some("Existing"), &[]).await;

    let (status, json) = ctx
        .request(
            "POST",
            "/bookmarks/bulk",
            Some(json!({
                "bookmarks": [
                    { "url": "https://example.com/existing" },
                    { "url": "https://example.com/fresh", "title": "Fresh" },
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["created"], 1);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["failed"], 0);

    // Bulk creates never fetch metadata: the untitled skip fell back nowhere,
    // and the fresh one kept its explicit title.
    let (_, listing) = ctx.request("GET", "/bookmarks?search=Fresh", None).await;
    assert_eq!(listing["data"].as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

/// Bulk archive moves every owned id and reports which
#[tokio::test]
async fn test_bulk_archive() {
    let ctx = TestContext::new().await.unwrap();
    let archived_id = ctx.system_collection(ARCHIVED_SLUG).await;

    let a = create_test_bookmark(&ctx, "https://example.com/ba1", Some("A"), &[]).await;
    let b = create_test_bookmark(&ctx, "https://example.com/ba2", Some("B"), &[]).await;

    let (status, json) = ctx
        .request(
            "POST",
            "/bookmarks/bulk/archive",
            Some(json!({ "ids": [a, b] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["archived"], 2);

    let (_, one) = ctx.request("GET", &format!("/bookmarks/{}", a), None).await;
    assert_eq!(one["collectionId"].as_str().unwrap(), archived_id.to_string());

    ctx.cleanup().await.unwrap();
}

/// Global search returns typed hits across entity types
#[tokio::test]
async fn test_global_search() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(
        &ctx,
        "https://example.com/searchme",
        Some("Searchable Post"),
        &["searchable-tag"],
    )
    .await;
    ctx.request(
        "POST",
        "/collections",
        Some(json!({ "name": "Searchable Shelf" })),
    )
    .await;

    let (status, json) = ctx.request("GET", "/search?q=searchable", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["bookmarks"][0]["type"], "bookmarks");
    assert_eq!(json["collections"][0]["type"], "collections");
    assert_eq!(json["tags"][0]["type"], "tags");

    ctx.cleanup().await.unwrap();
}

/// User stats count the seeded collections too
#[tokio::test]
async fn test_user_stats() {
    let ctx = TestContext::new().await.unwrap();

    create_test_bookmark(&ctx, "https://example.com/stat", Some("Stat"), &["t1"]).await;

    let (status, json) = ctx.request("GET", "/user/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bookmarks"], 1);
    assert_eq!(json["collections"], 2); // the seeded system pair
    assert_eq!(json["tags"], 1);

    ctx.cleanup().await.unwrap();
}

/// Requests without a token are rejected before any handler runs
#[tokio::test]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/bookmarks")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Registration provisions the system collections
#[tokio::test]
async fn test_register_seeds_system_collections() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("register-{}@example.com", uuid::Uuid::new_v4());
    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": "long_enough_1" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let user_id = uuid::Uuid::parse_str(body["userId"].as_str().unwrap()).unwrap();

    for slug in [UNSORTED_SLUG, ARCHIVED_SLUG] {
        let found = linkstash_shared::models::collection::Collection::system_collection_id(
            &ctx.db, user_id, slug,
        )
        .await
        .unwrap();
        assert!(found.is_some(), "missing {} collection", slug);
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Health endpoint is public and reports database connectivity
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}
