use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::security::TokenPair;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterRequest {
    #[validate(
        email(message = "Invalid email address"),
        length(max = 320, message = "Email must be at most 320 characters")
    )]
    pub(crate) email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub(crate) password: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, max = 200, message = "Full name must be 1 to 200 characters"))]
    pub(crate) full_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
    #[validate(length(equal = 6, message = "OTP must be exactly 6 characters"))]
    pub(crate) otp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CancelRegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GoogleLoginRequest {
    #[serde(alias = "idToken")]
    #[validate(length(min = 1, message = "Token is required"))]
    pub(crate) token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RefreshTokenRequest {
    #[serde(alias = "refreshToken")]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub(crate) refresh_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: &'static str,
    pub(crate) expires_in: i64,
}

impl From<&TokenPair> for TokenResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            token_type: "bearer",
            expires_in: pair.access_expires_in,
        }
    }
}
