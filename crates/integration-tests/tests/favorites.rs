//! Per-reader favorite tags.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use newsdesk_api::db::ContentStore;
use newsdesk_api::models::NewArticle;
use newsdesk_integration_tests::{TestApp, body_json, body_string};

fn article(title: &str) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        body: String::new(),
        author: "Desk".to_string(),
        url: None,
        created_at: None,
    }
}

#[tokio::test]
async fn test_favorites_require_sign_in() {
    let app = TestApp::new();
    let tag = app.store.create_tag("sports").await.unwrap().id;
    let tag_uri = format!("/user/tags/{tag}");

    for (method, uri) in [
        (Method::GET, "/user/tags"),
        (Method::GET, "/user/news"),
        (Method::POST, tag_uri.as_str()),
        (Method::DELETE, tag_uri.as_str()),
    ] {
        let response = app.request(method.clone(), uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_unauthorized_comes_before_id_validation() {
    let app = TestApp::new();
    let response = app.request(Method::POST, "/user/tags/abc", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_favorite_is_idempotent() {
    let app = TestApp::new();
    let tag = app.store.create_tag("sports").await.unwrap().id;
    let cookie = app.sign_in().await;
    let uri = format!("/user/tags/{tag}");

    for _ in 0..2 {
        let response = app.request(Method::POST, &uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    let body = body_json(app.get("/user/tags", Some(&cookie)).await).await;
    assert_eq!(body, json!([{"id": 1, "name": "sports"}]));
}

#[tokio::test]
async fn test_add_unknown_tag_is_not_found() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app.request(Method::POST, "/user/tags/42", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_tag_id_is_bad_request() {
    let app = TestApp::new();
    let cookie = app.sign_in().await;

    let response = app.request(Method::POST, "/user/tags/abc", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_favorite() {
    let app = TestApp::new();
    let tag = app.store.create_tag("sports").await.unwrap().id;
    let cookie = app.sign_in().await;
    let uri = format!("/user/tags/{tag}");

    app.request(Method::POST, &uri, Some(&cookie)).await;
    let response = app.request(Method::DELETE, &uri, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(app.get("/user/tags", Some(&cookie)).await).await, json!([]));

    // Removing again, or a tag that never existed, still succeeds.
    let response = app.request(Method::DELETE, &uri, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.request(Method::DELETE, "/user/tags/77", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_favorites_are_per_reader() {
    let app = TestApp::new();
    let tag = app.store.create_tag("sports").await.unwrap().id;
    let first = app.sign_in().await;
    app.provider.set_profile("google-2", "second@example.com");
    let second = app.sign_in().await;

    app.request(Method::POST, &format!("/user/tags/{tag}"), Some(&first))
        .await;

    assert_eq!(
        body_json(app.get("/user/tags", Some(&first)).await).await,
        json!([{"id": 1, "name": "sports"}])
    );
    assert_eq!(
        body_json(app.get("/user/tags", Some(&second)).await).await,
        json!([])
    );
}

#[tokio::test]
async fn test_favorite_news_deduplicates_and_keeps_full_tag_sets() {
    let app = TestApp::new();
    let store = &app.store;
    let sports = store.create_tag("sports").await.unwrap().id;
    let local = store.create_tag("local").await.unwrap().id;
    let tech = store.create_tag("tech").await.unwrap().id;

    let derby = store.create_article(&article("Derby")).await.unwrap();
    let chip = store.create_article(&article("Chip")).await.unwrap();
    store.add_tags_to_article(derby, &[sports, local, tech]).await.unwrap();
    store.add_tags_to_article(chip, &[tech]).await.unwrap();

    let cookie = app.sign_in().await;
    for tag in [sports, local] {
        app.request(Method::POST, &format!("/user/tags/{tag}"), Some(&cookie))
            .await;
    }

    let response = app.get("/user/news", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let articles = body.as_array().unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "Derby");
    assert_eq!(articles[0]["tags"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_favorite_news_without_favorites_is_empty() {
    let app = TestApp::new();
    let tag = app.store.create_tag("sports").await.unwrap().id;
    let id = app.store.create_article(&article("Derby")).await.unwrap();
    app.store.add_tags_to_article(id, &[tag]).await.unwrap();

    let cookie = app.sign_in().await;
    let body = body_json(app.get("/user/news", Some(&cookie)).await).await;
    assert_eq!(body, json!([]));
}
