use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn presigned_url_without_storage_is_unavailable() {
    let ctx = test_support::setup_test_context().await;
    let user =
        test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;
    let token = test_support::bearer_token(&user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/aws/presigned-url",
            Some(&token),
            Some(json!({"file_name": "essay.pdf"})),
        ))
        .await
        .expect("presign");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn presigned_url_signs_sanitized_keys() {
    let ctx = test_support::setup_test_context_with_storage().await;
    let user =
        test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;
    let token = test_support::bearer_token(&user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/aws/presigned-url",
            Some(&token),
            Some(json!({
                "file_name": "Recording.MP3",
                "folder": "/listening/part-1/",
                "content_type": "audio/mpeg"
            })),
        ))
        .await
        .expect("presign");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");

    let key = body["data"]["key"].as_str().expect("key");
    assert!(key.starts_with("listening/part-1/"));
    assert!(key.ends_with(".mp3"));
    assert_eq!(body["data"]["bucket_name"], "ielts-test-bucket");
    assert!(body["data"]["url"].as_str().expect("url").contains("X-Amz-Signature"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/aws/presigned-url",
            Some(&token),
            Some(json!({"file_name": "x.png", "folder": "../secrets"})),
        ))
        .await
        .expect("traversal");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/aws/presigned-url",
            None,
            Some(json!({"file_name": "x.png"})),
        ))
        .await
        .expect("anonymous");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
