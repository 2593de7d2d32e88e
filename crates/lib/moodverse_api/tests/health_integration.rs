//! Integration test — build router, call /health and the static fallback.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{Reply, StubCompletions, app, app_with_config, body_json, get, test_config};

#[tokio::test]
async fn health_endpoint_returns_expected_shape() {
    // Provider that always fails: health must not depend on it.
    let stub = StubCompletions::new(Reply::Failure {
        status: None,
        detail: "connection refused".into(),
    });
    let resp = app(stub.clone())
        .oneshot(get("192.0.2.1", "/health"))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "Moodverse API");
    assert_eq!(json["version"], moodverse_core::version());

    let timestamp = json["timestamp"].as_str().expect("timestamp is string");
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp is not RFC 3339: {timestamp}"
    );
    assert!(timestamp.ends_with('Z'));

    assert!(stub.last_prompt().is_none(), "health must not call upstream");
}

#[tokio::test]
async fn unknown_paths_serve_the_entry_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<!doctype html><title>Moodverse</title>")
        .expect("write index");
    std::fs::write(dir.path().join("app.js"), "console.log('hi');").expect("write asset");

    let config = moodverse_api::config::ApiConfig {
        static_dir: dir.path().to_path_buf(),
        ..test_config()
    };
    let router = app_with_config(StubCompletions::text("{}"), config);

    for uri in ["/", "/journal/today", "/index.html"] {
        let resp = router
            .clone()
            .oneshot(get("192.0.2.2", uri))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "uri {uri}");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(
            String::from_utf8_lossy(&body).contains("<title>Moodverse</title>"),
            "uri {uri}"
        );
    }

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/app.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"console.log('hi');");
}

#[tokio::test]
async fn get_catch_all_covers_api_paths_and_other_methods_are_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<!doctype html><title>Moodverse</title>")
        .expect("write index");

    let config = moodverse_api::config::ApiConfig {
        static_dir: dir.path().to_path_buf(),
        ..test_config()
    };
    let router = app_with_config(StubCompletions::text("{}"), config);

    let resp = router
        .clone()
        .oneshot(get("192.0.2.3", "/api/generate-portrait"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("<title>Moodverse</title>"));

    for (method, uri) in [
        ("PUT", "/unknown"),
        ("DELETE", "/api/generate-portrait"),
        ("POST", "/health"),
    ] {
        let resp = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("x-forwarded-for", "192.0.2.3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }
}
