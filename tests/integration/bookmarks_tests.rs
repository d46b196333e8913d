//! Bookmark endpoint tests.
//!
//! Tests verify:
//! - CRUD round trips through `/api/bookmarks`
//! - Validation messages and their priority order
//! - 404 handling shared by GET, DELETE and PATCH on `/:id`
//! - Sanitization of title and description

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::test_utils::{
    authed, body_bytes, body_json, error_message, make_bookmarks, make_malicious_bookmark, seed, test_app,
};

const EMPTY_UPDATE: &str = "Request body must contain either 'title', 'url', 'description', or 'rating'";

fn valid_bookmark() -> Value {
    json!({
        "title": "test-title",
        "url": "https://www.test.com",
        "description": "test description",
        "rating": 1
    })
}

// =============================================================================
// Empty Table
// =============================================================================

#[tokio::test]
async fn test_list_empty() {
    let app = test_app().await;

    let response = app.router.oneshot(authed("GET", "/api/bookmarks", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_missing_id_is_not_found_for_every_verb() {
    let app = test_app().await;

    let requests = [
        authed("GET", "/api/bookmarks/123456", None),
        authed("DELETE", "/api/bookmarks/123456", None),
        authed("PATCH", "/api/bookmarks/123456", Some(json!({ "title": "x" }))),
        authed("GET", "/api/bookmarks/not-a-number", None),
    ];

    for request in requests {
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, error_message("Bookmark Not Found"));
    }
}

#[tokio::test]
async fn test_non_canonical_id_does_not_alias() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    assert_eq!(seeded[0].id, 1);

    let requests = [
        authed("GET", "/api/bookmarks/+1", None),
        authed("GET", "/api/bookmarks/01", None),
        authed("DELETE", "/api/bookmarks/01", None),
    ];

    for request in requests {
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, error_message("Bookmark Not Found"));
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_then_get() {
    let app = test_app().await;
    let input = valid_bookmark();

    let response = app
        .router
        .clone()
        .oneshot(authed("POST", "/api/bookmarks", Some(input.clone())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();
    let created = body_json(response).await;

    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(location, format!("/api/bookmarks/{}", id));
    for field in ["title", "url", "description", "rating"] {
        assert_eq!(created[field], input[field], "field {field}");
    }

    let response = app.router.oneshot(authed("GET", &location, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn test_create_requires_fields_in_order() {
    let app = test_app().await;

    let cases = [
        ("title", json!({ "url": "https://test.com", "rating": 1 })),
        ("url", json!({ "title": "test-title", "rating": 1 })),
        ("rating", json!({ "title": "test-title", "url": "https://test.com" })),
        ("title", json!({})),
    ];

    for (field, body) in cases {
        let response = app
            .router
            .clone()
            .oneshot(authed("POST", "/api/bookmarks", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, error_message(&format!("'{field}' is required")));
    }
}

#[tokio::test]
async fn test_create_rejects_invalid_rating() {
    let app = test_app().await;

    for rating in [json!("invalid"), json!(-1), json!(6), json!(1.5)] {
        let mut body = valid_bookmark();
        body["rating"] = rating;

        let response = app
            .router
            .clone()
            .oneshot(authed("POST", "/api/bookmarks", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            error_message("'rating' must be a number between 0 and 5")
        );
    }
}

#[tokio::test]
async fn test_create_rejects_invalid_url() {
    let app = test_app().await;
    let mut body = valid_bookmark();
    body["url"] = json!("htp://invalid-url");

    let response = app.router.oneshot(authed("POST", "/api/bookmarks", Some(body))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, error_message("'url' must be a valid URL"));
}

#[tokio::test]
async fn test_create_accepts_zero_rating_and_numeric_string() {
    let app = test_app().await;

    for (rating, expected) in [(json!(0), 0), (json!("5"), 5)] {
        let mut body = valid_bookmark();
        body["rating"] = rating;

        let response = app
            .router
            .clone()
            .oneshot(authed("POST", "/api/bookmarks", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["rating"], json!(expected));
    }
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = test_app().await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/bookmarks")
        .header(header::AUTHORIZATION, format!("Bearer {}", super::test_utils::TEST_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_create_sanitizes_response() {
    let app = test_app().await;
    let (malicious, expected) = make_malicious_bookmark();
    let body = json!({
        "title": malicious.title,
        "url": malicious.url,
        "description": malicious.description,
        "rating": malicious.rating,
    });

    let response = app.router.oneshot(authed("POST", "/api/bookmarks", Some(body))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    for field in ["title", "url", "description", "rating"] {
        assert_eq!(created[field], expected[field], "field {field}");
    }
}

// =============================================================================
// Seeded Table
// =============================================================================

#[tokio::test]
async fn test_list_returns_all() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;

    let response = app.router.oneshot(authed("GET", "/api/bookmarks", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::to_value(&seeded).unwrap());
}

#[tokio::test]
async fn test_get_and_list_sanitize_stored_markup() {
    let app = test_app().await;
    let (malicious, expected) = make_malicious_bookmark();
    let stored = seed(&app.db, vec![malicious]).await.remove(0);

    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &format!("/api/bookmarks/{}", stored.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["title"], expected["title"]);
    assert_eq!(fetched["description"], expected["description"]);

    let response = app.router.oneshot(authed("GET", "/api/bookmarks", None)).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed[0], fetched);
}

#[tokio::test]
async fn test_delete_removes_only_target() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    let target = &seeded[1];

    let response = app
        .router
        .clone()
        .oneshot(authed("DELETE", &format!("/api/bookmarks/{}", target.id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let expected: Vec<_> = seeded.iter().filter(|b| b.id != target.id).collect();
    let response = app.router.oneshot(authed("GET", "/api/bookmarks", None)).await.unwrap();
    assert_eq!(body_json(response).await, serde_json::to_value(&expected).unwrap());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_patch_without_recognised_fields() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;

    let response = app
        .router
        .oneshot(authed(
            "PATCH",
            &format!("/api/bookmarks/{}", seeded[0].id),
            Some(json!({ "irrelevantField": "foo" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, error_message(EMPTY_UPDATE));
}

#[tokio::test]
async fn test_patch_updates_all_fields() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    let uri = format!("/api/bookmarks/{}", seeded[1].id);
    let changes = json!({
        "title": "updated title",
        "url": "https://www.updated.com",
        "description": "updated description",
        "rating": 5
    });

    let response = app
        .router
        .clone()
        .oneshot(authed("PATCH", &uri, Some(changes.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.router.oneshot(authed("GET", &uri, None)).await.unwrap();
    let mut expected = changes;
    expected["id"] = json!(seeded[1].id);
    assert_eq!(body_json(response).await, expected);
}

#[tokio::test]
async fn test_patch_subset_keeps_other_fields() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    let original = &seeded[0];
    let uri = format!("/api/bookmarks/{}", original.id);

    let response = app
        .router
        .clone()
        .oneshot(authed(
            "PATCH",
            &uri,
            Some(json!({ "title": "updated title", "fieldToIgnore": "should not be in GET response" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.router.oneshot(authed("GET", &uri, None)).await.unwrap();
    let fetched = body_json(response).await;
    assert_eq!(fetched["title"], json!("updated title"));
    assert_eq!(fetched["url"], json!(original.url));
    assert_eq!(fetched["description"], json!(original.description));
    assert_eq!(fetched["rating"], json!(original.rating));
    assert!(fetched.get("fieldToIgnore").is_none());
}

#[tokio::test]
async fn test_patch_rating_zero() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    let uri = format!("/api/bookmarks/{}", seeded[2].id);

    let response = app
        .router
        .clone()
        .oneshot(authed("PATCH", &uri, Some(json!({ "rating": 0 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.router.oneshot(authed("GET", &uri, None)).await.unwrap();
    assert_eq!(body_json(response).await["rating"], json!(0));
}

#[tokio::test]
async fn test_patch_rejects_invalid_values() {
    let app = test_app().await;
    let seeded = seed(&app.db, make_bookmarks()).await;
    let uri = format!("/api/bookmarks/{}", seeded[0].id);

    let cases = [
        (json!({ "rating": 9 }), "'rating' must be a number between 0 and 5"),
        (json!({ "url": "not a url" }), "'url' must be a valid URL"),
    ];

    for (body, message) in cases {
        let response = app.router.clone().oneshot(authed("PATCH", &uri, Some(body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, error_message(message));
    }
}

#[tokio::test]
async fn test_create_reports_missing_field_before_wrong_type() {
    let app = test_app().await;

    let cases = [
        ("'title' is required", json!({ "url": "https://a.com", "rating": 1, "description": 5 })),
        ("'url' is required", json!({ "title": 5, "rating": 1 })),
        ("'description' must be a string", json!({ "title": "t", "url": "https://a.com", "rating": 1, "description": 5 })),
    ];

    for (message, body) in cases {
        let response = app
            .router
            .clone()
            .oneshot(authed("POST", "/api/bookmarks", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, error_message(message));
    }
}

// =============================================================================
// Database Failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let app = test_app().await;
    app.db.connection().execute("DROP TABLE bookmarks", ()).await.unwrap();

    let response = app.router.oneshot(authed("GET", "/api/bookmarks", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, error_message("server error"));
}
