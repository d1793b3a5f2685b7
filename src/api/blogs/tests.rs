use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn staff_manage_blogs_and_anyone_reads() {
    let ctx = test_support::setup_test_context().await;
    let staff = test_support::insert_user(ctx.state.db(), "mod@example.com", UserRole::Moderator).await;
    let token = test_support::bearer_token(&staff, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/blogs",
            Some(&token),
            Some(json!({
                "name": "Band 7 listening tips",
                "content": "Read the questions first.",
                "theme": "listening"
            })),
        ))
        .await
        .expect("create blog");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["status"], "draft");
    let blog_id = body["data"]["id"].as_str().expect("blog id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/blogs",
            Some(&token),
            Some(json!({"name": "Band 7 listening tips", "content": "", "theme": "reading"})),
        ))
        .await
        .expect("duplicate blog");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/blogs/name/Band%207%20listening%20tips",
            None,
            None,
        ))
        .await
        .expect("get by name");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["id"], blog_id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/blogs/{blog_id}"),
            Some(&token),
            Some(json!({"status": "published"})),
        ))
        .await
        .expect("update blog");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["status"], "published");
    assert_eq!(body["data"]["content"], "Read the questions first.");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/blogs", None, None))
        .await
        .expect("list blogs");
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"].as_array().expect("blogs").len(), 1);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/blogs/{blog_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete blog");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/blogs/{blog_id}"),
            None,
            None,
        ))
        .await
        .expect("get deleted");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/blogs/{blog_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_cannot_write_blogs() {
    let ctx = test_support::setup_test_context().await;
    let student =
        test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/blogs",
            Some(&token),
            Some(json!({"name": "Nope", "content": "", "theme": "writing"})),
        ))
        .await
        .expect("student create");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/blogs",
            None,
            Some(json!({"name": "Nope", "content": "", "theme": "writing"})),
        ))
        .await
        .expect("anonymous create");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
