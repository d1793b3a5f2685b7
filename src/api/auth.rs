use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{ClientInfo, CurrentUser};
use crate::api::response::ApiResponse;
use crate::api::validation::validate_payload;
use crate::core::metrics;
use crate::core::redis::AUTH_RATE_LIMIT;
use crate::core::security::{self, TokenKind, TokenPair};
use crate::core::state::AppState;
use crate::core::time::{is_past, primitive_after, primitive_now_utc, to_primitive_utc};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{
    CancelRegisterRequest, GoogleLoginRequest, LoginRequest, RefreshTokenRequest,
    RegisterRequest, TokenResponse, VerifyOtpRequest,
};
use crate::schemas::user::UserResponse;
use crate::services::google::GoogleAuthError;
use crate::services::otp;

const GOOGLE_USER_AGENT: &str = "Google-OAuth";
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid or revoked token";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/cancel-register", post(cancel_register))
        .route("/login", post(login))
        .route("/google", post(google_login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
        .route("/me", get(me))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn enforce_rate_limit(state: &AppState, scope: &str, subject: &str) -> Result<(), ApiError> {
    if state.redis().allow(scope, subject, AUTH_RATE_LIMIT).await {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests("Too many attempts, try again later"))
    }
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<bool>, ApiError> {
    validate_payload(&payload)?;
    let email = normalize_email(&payload.email);
    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::BadRequest("Full name must not be empty".to_string()));
    }
    enforce_rate_limit(&state, "register", &email).await?;

    let exists = repositories::users::email_exists(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if exists {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let code = otp::generate_otp();
    let ttl_minutes = state.settings().security().otp_expire_minutes;

    repositories::temp_users::replace(
        state.db(),
        repositories::temp_users::CreateTempUser {
            email: &email,
            username: full_name,
            hashed_password: &hashed_password,
            otp_code: &code,
            otp_expires_at: primitive_after(state.settings().security().otp_ttl()),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store pending registration"))?;

    metrics::record_registration_started();
    tracing::info!(email = %email, action = "register_started", "Pending registration stored");

    send_verification_email(&state, email, full_name.to_string(), code, ttl_minutes);

    Ok(ApiResponse::ok("Verification code sent to your email", true))
}

/// Delivery happens in the background; the registration never waits on SMTP.
fn send_verification_email(
    state: &AppState,
    email: String,
    name: String,
    code: String,
    ttl_minutes: u64,
) {
    let Some(mailer) = state.email().cloned() else {
        tracing::warn!(email = %email, "SMTP disabled, verification email not sent");
        return;
    };

    tokio::spawn(async move {
        if let Err(err) = mailer.send_verification_code(&email, &name, &code, ttl_minutes).await {
            tracing::error!(error = %err, email = %email, "Failed to send verification email");
        }
    });
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<ApiResponse<bool>, ApiError> {
    validate_payload(&payload)?;
    let email = normalize_email(&payload.email);
    enforce_rate_limit(&state, "verify-otp", &email).await?;

    let pending = repositories::temp_users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load pending registration"))?
        .ok_or_else(|| ApiError::BadRequest("Verification record not found".to_string()))?;

    if is_past(pending.otp_expires_at) {
        repositories::temp_users::delete_by_email(state.db(), &email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to delete expired registration"))?;
        return Err(ApiError::BadRequest("OTP expired".to_string()));
    }

    if !otp::otp_matches(&pending.otp_code, &payload.otp) {
        return Err(ApiError::BadRequest("Invalid OTP code".to_string()));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            email: &pending.email,
            username: &pending.username,
            hashed_password: Some(&pending.hashed_password),
            avatar: None,
            role: UserRole::Student,
            is_email_verified: true,
            last_login_at: Some(now),
            now,
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Email is already registered", "Failed to create user"))?;

    repositories::temp_users::delete_by_email(&mut *tx, &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete pending registration"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit registration"))?;

    tracing::info!(user_id = %user.id, action = "register_completed", "User registered");
    Ok(ApiResponse::ok("Email verified successfully", true))
}

async fn cancel_register(
    State(state): State<AppState>,
    Json(payload): Json<CancelRegisterRequest>,
) -> Result<ApiResponse<bool>, ApiError> {
    validate_payload(&payload)?;
    let email = normalize_email(&payload.email);

    let deleted = repositories::temp_users::delete_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to cancel registration"))?;
    if !deleted {
        return Err(ApiError::NotFound("Registration not found or already completed".to_string()));
    }

    tracing::info!(email = %email, action = "register_cancelled", "Pending registration removed");
    Ok(ApiResponse::ok("Registration cancelled", true))
}

async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    validate_payload(&payload)?;
    let email = normalize_email(&payload.email);
    enforce_rate_limit(&state, "login", &email).await?;

    let user = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    // Accounts created through Google sign-in have no password.
    let hash = user.hashed_password.as_deref().ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;
    let verified = security::verify_password(&payload.password, hash)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS))?;
    if !verified {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    let pair = start_session(&state, &user, &client.user_agent, client.ip_address.as_deref()).await?;

    tracing::info!(user_id = %user.id, action = "login", "User logged in");
    Ok(ApiResponse::ok("Login successful", TokenResponse::from(&pair)))
}

async fn google_login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    validate_payload(&payload)?;
    let verifier = state
        .google()
        .ok_or_else(|| ApiError::ServiceUnavailable("Google sign-in is not configured".to_string()))?;

    let identity = verifier.verify(&payload.token).await.map_err(|err| {
        match &err {
            GoogleAuthError::Rejected(reason) => {
                tracing::warn!(reason, "Google token rejected");
            }
            GoogleAuthError::Upstream(error) => {
                tracing::warn!(error = %error, "Google tokeninfo request failed");
            }
        }
        ApiError::Unauthorized("Invalid Google token")
    })?;

    let email = normalize_email(&identity.email);
    let existing = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    let user = match existing {
        Some(user) => user,
        None => {
            let username = identity
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| email.split('@').next().unwrap_or(&email))
                .to_string();
            let now = primitive_now_utc();

            let user = repositories::users::create(
                state.db(),
                repositories::users::CreateUser {
                    email: &email,
                    username: &username,
                    hashed_password: None,
                    avatar: identity.picture.as_deref(),
                    role: UserRole::Student,
                    is_email_verified: true,
                    last_login_at: Some(now),
                    now,
                },
            )
            .await
            .map_err(|e| {
                ApiError::from_write(e, "Email is already registered", "Failed to create user")
            })?;
            tracing::info!(user_id = %user.id, action = "register_google", "User registered");
            user
        }
    };

    let pair = start_session(&state, &user, GOOGLE_USER_AGENT, client.ip_address.as_deref()).await?;

    tracing::info!(user_id = %user.id, action = "login_google", "User logged in with Google");
    Ok(ApiResponse::ok("Login successful", TokenResponse::from(&pair)))
}

/// Issues a token pair, stores the refresh token for the agent and records the login time.
async fn start_session(
    state: &AppState,
    user: &User,
    user_agent: &str,
    ip_address: Option<&str>,
) -> Result<TokenPair, ApiError> {
    let pair = security::issue_token_pair(user, state.settings())
        .map_err(|e| ApiError::internal(e, "Failed to create tokens"))?;
    let now = primitive_now_utc();

    repositories::refresh_tokens::upsert_for_agent(
        state.db(),
        repositories::refresh_tokens::StoreRefreshToken {
            user_id: user.id,
            token: &pair.refresh_token,
            user_agent,
            ip_address,
            expires_at: to_primitive_utc(pair.refresh_expires_at),
            now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store refresh token"))?;

    repositories::users::touch_last_login(state.db(), user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update last login"))?;

    Ok(pair)
}

async fn logout(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ApiResponse<bool>, ApiError> {
    let revoked = repositories::refresh_tokens::revoke_for_user(
        state.db(),
        user.id,
        &payload.refresh_token,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to revoke refresh token"))?;

    tracing::info!(user_id = %user.id, action = "logout", revoked, "User logged out");
    Ok(ApiResponse::ok("Logout successful", true))
}

async fn refresh_token(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    validate_payload(&payload)?;
    let subject = client.ip_address.as_deref().unwrap_or(&client.user_agent);
    enforce_rate_limit(&state, "refresh", subject).await?;

    let stored = repositories::refresh_tokens::find_by_token(state.db(), &payload.refresh_token)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load refresh token"))?
        .filter(|token| token.revoked_at.is_none())
        .ok_or(ApiError::Unauthorized(INVALID_REFRESH_TOKEN))?;

    let now = primitive_now_utc();
    if is_past(stored.expires_at) {
        repositories::refresh_tokens::revoke(state.db(), stored.id, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to revoke refresh token"))?;
        return Err(ApiError::Unauthorized("Refresh token expired"));
    }

    let claims =
        security::verify_token(&payload.refresh_token, TokenKind::Refresh, state.settings())
            .map_err(|_| ApiError::Unauthorized(INVALID_REFRESH_TOKEN))?;
    if claims.user_id().ok() != Some(stored.user_id) {
        return Err(ApiError::Unauthorized(INVALID_REFRESH_TOKEN));
    }

    let user = repositories::users::find_by_id(state.db(), stored.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    let pair = security::issue_token_pair(&user, state.settings())
        .map_err(|e| ApiError::internal(e, "Failed to create tokens"))?;

    let rotated = repositories::refresh_tokens::rotate(
        state.db(),
        repositories::refresh_tokens::RotateRefreshToken {
            id: stored.id,
            current: &payload.refresh_token,
            next: &pair.refresh_token,
            ip_address: client.ip_address.as_deref(),
            expires_at: to_primitive_utc(pair.refresh_expires_at),
            now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to rotate refresh token"))?;
    if !rotated {
        tracing::warn!(user_id = %user.id, action = "refresh_token", "Refresh token replayed");
        return Err(ApiError::Unauthorized(INVALID_REFRESH_TOKEN));
    }

    tracing::info!(user_id = %user.id, action = "refresh_token", "Refresh token rotated");
    Ok(ApiResponse::ok("Token refreshed successfully", TokenResponse::from(&pair)))
}

async fn me(CurrentUser(user): CurrentUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok("Current user", UserResponse::from_db(user))
}

#[cfg(test)]
mod tests;
