use std::{net::SocketAddr, path::Path, sync::Arc};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use reelnotes_be::{
    config::Config,
    create_app,
    db::{
        JsonStore, Store,
        store::{Document, DocumentStore, Filter, Sort, UpsertOutcome},
    },
    errors::AppError,
    identity::{IdentityMode, IdentityResolver},
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app_with(store: Store, mode: IdentityMode, static_dir: &Path) -> Router {
    let config = Config {
        static_dir: static_dir.to_path_buf(),
        identity_mode: mode,
        ..Config::default()
    };
    let state = AppState::new(store, IdentityResolver::new(mode, false));
    create_app(state, &config)
}

fn test_app(mode: IdentityMode) -> Router {
    test_app_with(
        Arc::new(JsonStore::in_memory()),
        mode,
        Path::new("does-not-exist"),
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    from: [u8; 4],
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let mut request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((from, 40000))));

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, payload)
}

const ALICE: [u8; 4] = [10, 0, 0, 1];
const BOB: [u8; 4] = [10, 0, 0, 2];

#[tokio::test]
async fn test_rating_round_trip() {
    let app = test_app(IdentityMode::PerAddress);

    let (status, body) = send(
        &app,
        "POST",
        "/api/ratings",
        Some(json!({ "item_id": "Alien", "rating": 4 })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 1, "sum": 4, "average": 4.0 }));

    let (status, body) = send(
        &app,
        "POST",
        "/api/ratings",
        Some(json!({ "itemId": "Alien", "rating": 5 })),
        BOB,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 2, "sum": 9, "average": 4.5 }));

    let (status, body) = send(&app, "GET", "/api/ratings/Alien", None, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 2, "sum": 9, "average": 4.5 }));
}

#[tokio::test]
async fn test_same_address_votes_once_per_item() {
    let app = test_app(IdentityMode::PerAddress);

    for rating in [3, 5] {
        send(
            &app,
            "POST",
            "/api/ratings",
            Some(json!({ "item_id": "Alien", "rating": rating })),
            ALICE,
        )
        .await;
    }

    let (_, body) = send(&app, "GET", "/api/ratings/Alien", None, ALICE).await;
    assert_eq!(body, json!({ "total": 1, "sum": 5, "average": 5.0 }));
}

#[tokio::test]
async fn test_unlimited_mode_counts_every_vote() {
    let app = test_app(IdentityMode::Unlimited);

    for rating in [3, 5] {
        send(
            &app,
            "POST",
            "/api/ratings",
            Some(json!({ "item_id": "Alien", "rating": rating })),
            ALICE,
        )
        .await;
    }

    let (_, body) = send(&app, "GET", "/api/ratings/Alien", None, ALICE).await;
    assert_eq!(body, json!({ "total": 2, "sum": 8, "average": 4.0 }));
}

#[tokio::test]
async fn test_invalid_ratings_are_bad_requests() {
    let app = test_app(IdentityMode::PerAddress);

    let bad_bodies = [
        json!({ "item_id": "Alien", "rating": 0 }),
        json!({ "item_id": "Alien", "rating": 6 }),
        json!({ "item_id": "Alien", "rating": 3.5 }),
        json!({ "item_id": "Alien", "rating": "five" }),
        json!({ "item_id": "Alien" }),
        json!({ "rating": 3 }),
        json!({ "item_id": "  ", "rating": 3 }),
    ];

    for body in bad_bodies {
        let (status, response) =
            send(&app, "POST", "/api/ratings", Some(body.clone()), ALICE).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} should be rejected");
        assert!(response["error"].is_string(), "{body} should carry an error");
    }

    let (_, body) = send(&app, "GET", "/api/ratings/Alien", None, ALICE).await;
    assert_eq!(body, json!({ "total": 0, "sum": 0, "average": 0.0 }));
}

#[tokio::test]
async fn test_unknown_item_has_zero_stats() {
    let app = test_app(IdentityMode::PerAddress);

    let (status, body) = send(&app, "GET", "/api/ratings/unknown-item", None, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 0, "sum": 0, "average": 0.0 }));
}

#[tokio::test]
async fn test_percent_encoded_item_ids() {
    let app = test_app(IdentityMode::PerAddress);

    send(
        &app,
        "POST",
        "/api/ratings",
        Some(json!({ "item_id": "The Thing (1982)", "rating": 5 })),
        ALICE,
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/ratings/The%20Thing%20(1982)", None, ALICE).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_comment_flow() {
    let app = test_app(IdentityMode::PerAddress);

    let (status, created) = send(
        &app,
        "POST",
        "/api/comments",
        Some(json!({ "mediaTitle": " Alien ", "author": " Ripley ", "text": "Nostromo out." })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["mediaTitle"], "Alien");
    assert_eq!(created["author"], "Ripley");
    assert!(created["id"].is_string());
    assert!(created["timestamp"].as_str().unwrap().ends_with('Z'));

    send(
        &app,
        "POST",
        "/api/comments",
        Some(json!({ "mediaTitle": "Heat", "author": "Neil", "text": "30 seconds flat." })),
        BOB,
    )
    .await;

    let (_, all) = send(&app, "GET", "/api/comments", None, ALICE).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, alien) = send(&app, "GET", "/api/comments/Alien", None, ALICE).await;
    let alien = alien.as_array().unwrap();
    assert_eq!(alien.len(), 1);
    assert_eq!(alien[0]["text"], "Nostromo out.");

    let uri = format!("/api/comments/{}", created["id"].as_str().unwrap());
    let (status, body) = send(&app, "DELETE", &uri, None, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = send(&app, "DELETE", &uri, None, ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = send(&app, "GET", "/api/comments", None, ALICE).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_validation() {
    let app = test_app(IdentityMode::PerAddress);

    let (status, body) = send(
        &app,
        "POST",
        "/api/comments",
        Some(json!({ "mediaTitle": "Alien", "author": "Ripley" })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = send(
        &app,
        "POST",
        "/api/comments",
        Some(json!({ "mediaTitle": "Alien", "author": "x".repeat(51), "text": "hi" })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Comment too long");

    let (status, _) = send(
        &app,
        "POST",
        "/api/comments",
        Some(json!({ "mediaTitle": "Alien", "author": "Ash", "text": "y".repeat(501) })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&app, "GET", "/api/comments", None, ALICE).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_guestbook_newest_first() {
    let app = test_app(IdentityMode::PerAddress);

    for (name, message) in [("Dallas", "First!"), ("Lambert", "Second.")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/guestbook",
            Some(json!({ "name": name, "message": message })),
            ALICE,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, entries) = send(&app, "GET", "/api/guestbook", None, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "Lambert");
    assert_eq!(entries[1]["name"], "Dallas");

    let (status, _) = send(
        &app,
        "POST",
        "/api/guestbook",
        Some(json!({ "name": "Kane", "message": "" })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>reel notes</h1>").unwrap();

    let app = test_app_with(
        Arc::new(JsonStore::in_memory()),
        IdentityMode::PerAddress,
        dir.path(),
    );

    let (status, body) = send(&app, "GET", "/api/health", None, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let request = Request::builder()
        .uri("/index.html")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>reel notes</h1>");

    let (status, _) = send(&app, "GET", "/missing.css", None, ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Unavailable("connection refused".into()))
    }

    async fn find_one(&self, _: &str, _: &Filter) -> Result<Option<Document>, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }

    async fn find_many(
        &self,
        _: &str,
        _: &Filter,
        _: Option<&Sort>,
    ) -> Result<Vec<Document>, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }

    async fn insert_one(&self, _: &str, _: Document) -> Result<String, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }

    async fn update_one(&self, _: &str, _: &Filter, _: Document) -> Result<bool, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }

    async fn upsert_one(
        &self,
        _: &str,
        _: &Filter,
        _: Document,
        _: Document,
    ) -> Result<UpsertOutcome, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }

    async fn delete_one(&self, _: &str, _: &Filter) -> Result<bool, AppError> {
        Err(AppError::Storage("connection refused".into()))
    }
}

#[tokio::test]
async fn test_storage_failures_are_opaque_500s() {
    let app = test_app_with(
        Arc::new(BrokenStore),
        IdentityMode::PerAddress,
        Path::new("does-not-exist"),
    );

    let (status, body) = send(&app, "GET", "/api/ratings/Alien", None, ALICE).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));

    let (status, body) = send(
        &app,
        "POST",
        "/api/ratings",
        Some(json!({ "item_id": "Alien", "rating": 4 })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().contains("refused"));

    // Validation still wins over a dead store.
    let (status, _) = send(
        &app,
        "POST",
        "/api/ratings",
        Some(json!({ "item_id": "Alien", "rating": 9 })),
        ALICE,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/comments", None, ALICE).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, "GET", "/api/health", None, ALICE).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
