use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::core::time::{primitive_after, primitive_now_utc};
use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn registration_flow_creates_verified_user() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "Learner@Example.com",
                "password": "secret-pass",
                "full_name": "Linh Tran"
            })),
        ))
        .await
        .expect("register");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], true);

    let pending = repositories::temp_users::find_by_email(ctx.state.db(), "learner@example.com")
        .await
        .expect("load pending")
        .expect("pending registration");
    assert_eq!(pending.username, "Linh Tran");

    let wrong_code = if pending.otp_code == "123456" { "654321" } else { "123456" };
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({"email": "learner@example.com", "otp": wrong_code})),
        ))
        .await
        .expect("verify wrong otp");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Invalid OTP code");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({"email": "learner@example.com", "otp": pending.otp_code})),
        ))
        .await
        .expect("verify otp");
    assert_eq!(response.status(), StatusCode::OK);

    let user = repositories::users::find_by_email(ctx.state.db(), "learner@example.com")
        .await
        .expect("load user")
        .expect("user created");
    assert!(user.is_email_verified);
    assert_eq!(user.role, UserRole::Student);
    assert!(user.last_login_at.is_some());
    let leftover = repositories::temp_users::find_by_email(ctx.state.db(), "learner@example.com")
        .await
        .expect("load pending");
    assert!(leftover.is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "learner@example.com",
                "password": "secret-pass",
                "full_name": "Linh Tran"
            })),
        ))
        .await
        .expect("register again");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Email is already registered");
}

#[tokio::test]
async fn expired_otp_is_removed() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "late@example.com",
                "password": "secret-pass",
                "fullName": "Late Learner"
            })),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("UPDATE temp_users SET otp_expires_at = otp_expires_at - INTERVAL '1 hour'")
        .execute(ctx.state.db())
        .await
        .expect("expire otp");
    let pending = repositories::temp_users::find_by_email(ctx.state.db(), "late@example.com")
        .await
        .expect("load pending")
        .expect("pending registration");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({"email": "late@example.com", "otp": pending.otp_code})),
        ))
        .await
        .expect("verify otp");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "OTP expired");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({"email": "late@example.com", "otp": pending.otp_code})),
        ))
        .await
        .expect("verify otp again");
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Verification record not found");
}

#[tokio::test]
async fn register_rejects_invalid_payload() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "secret-pass", "full_name": "X"})),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "short@example.com", "password": "123", "full_name": "X"})),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Password must be at least 6 characters long");
}

#[tokio::test]
async fn cancel_register_requires_pending_record() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/cancel-register",
            None,
            Some(json!({"email": "nobody@example.com"})),
        ))
        .await
        .expect("cancel");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Registration not found or already completed");
}

#[tokio::test]
async fn login_refresh_and_logout() {
    let ctx = test_support::setup_test_context().await;
    let user =
        test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "student@example.com", "password": "wrong-password"})),
        ))
        .await
        .expect("login wrong password");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    let body = test_support::read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 401);
    assert_eq!(body["detail"], "Invalid email or password");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "student@example.com", "password": test_support::TEST_PASSWORD})),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["token_type"], "bearer");
    let access = body["data"]["access_token"].as_str().expect("access token").to_string();
    let refresh = body["data"]["refresh_token"].as_str().expect("refresh token").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&access), None))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["email"], "student@example.com");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&refresh), None))
        .await
        .expect("me with refresh token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({"refresh_token": refresh})),
        ))
        .await
        .expect("refresh");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    let rotated = body["data"]["refresh_token"].as_str().expect("rotated token").to_string();
    assert_ne!(rotated, refresh);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({"refresh_token": refresh})),
        ))
        .await
        .expect("refresh with stale token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Invalid or revoked token");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/logout",
            Some(&access),
            Some(json!({"refresh_token": rotated})),
        ))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({"refresh_token": rotated})),
        ))
        .await
        .expect("refresh after logout");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_refresh_token_is_revoked() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "student@example.com", "password": test_support::TEST_PASSWORD})),
        ))
        .await
        .expect("login");
    let body = test_support::read_json(response).await;
    let refresh = body["data"]["refresh_token"].as_str().expect("refresh token").to_string();

    sqlx::query("UPDATE refresh_tokens SET expires_at = expires_at - INTERVAL '60 days'")
        .execute(ctx.state.db())
        .await
        .expect("expire token");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({"refresh_token": refresh})),
        ))
        .await
        .expect("refresh");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Refresh token expired");

    let stored = repositories::refresh_tokens::find_by_token(ctx.state.db(), &refresh)
        .await
        .expect("load token")
        .expect("token row");
    assert!(stored.revoked_at.is_some());
}

#[tokio::test]
async fn concurrent_rotation_accepts_only_one_caller() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_user(ctx.state.db(), "student@example.com", UserRole::Student).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "student@example.com", "password": test_support::TEST_PASSWORD})),
        ))
        .await
        .expect("login");
    let body = test_support::read_json(response).await;
    let refresh = body["data"]["refresh_token"].as_str().expect("refresh token").to_string();

    // Both callers read the row before either rotates.
    let first = repositories::refresh_tokens::find_by_token(ctx.state.db(), &refresh)
        .await
        .expect("first read")
        .expect("token row");
    let second = repositories::refresh_tokens::find_by_token(ctx.state.db(), &refresh)
        .await
        .expect("second read")
        .expect("token row");

    let now = primitive_now_utc();
    let expires_at = primitive_after(time::Duration::days(7));
    let rotation = |id, next| repositories::refresh_tokens::RotateRefreshToken {
        id,
        current: refresh.as_str(),
        next,
        ip_address: None,
        expires_at,
        now,
    };
    let rotated = repositories::refresh_tokens::rotate(ctx.state.db(), rotation(first.id, "next-a"))
        .await
        .expect("first rotation");
    assert!(rotated);
    let rotated =
        repositories::refresh_tokens::rotate(ctx.state.db(), rotation(second.id, "next-b"))
            .await
            .expect("second rotation");
    assert!(!rotated);

    assert!(repositories::refresh_tokens::find_by_token(ctx.state.db(), "next-a")
        .await
        .expect("load next-a")
        .is_some());
    assert!(repositories::refresh_tokens::find_by_token(ctx.state.db(), "next-b")
        .await
        .expect("load next-b")
        .is_none());
}

#[tokio::test]
async fn login_is_rate_limited_per_email() {
    let ctx = test_support::setup_test_context().await;

    for _ in 0..10 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": "flood@example.com", "password": "whatever"})),
            ))
            .await
            .expect("login");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "flood@example.com", "password": "whatever"})),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn google_sign_in_requires_configuration() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/google",
            None,
            Some(json!({"token": "id-token"})),
        ))
        .await
        .expect("google");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
