use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum GoogleAuthError {
    #[error("google token rejected: {0}")]
    Rejected(&'static str),
    #[error("google tokeninfo request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Verified identity taken from a Google ID token.
#[derive(Debug, Clone)]
pub(crate) struct GoogleIdentity {
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Clone)]
pub(crate) struct GoogleVerifier {
    client: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let google = settings.google();
        if !google.is_enabled() {
            return Ok(None);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Some(Self {
            client,
            client_id: google.client_id.clone(),
            tokeninfo_url: google.tokeninfo_url.clone(),
        }))
    }

    /// Validates the ID token with Google and checks that it was issued for this client.
    pub(crate) async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let response =
            self.client.get(&self.tokeninfo_url).query(&[("id_token", id_token)]).send().await?;

        if response.status() == StatusCode::BAD_REQUEST {
            return Err(GoogleAuthError::Rejected("invalid token"));
        }

        let info: TokenInfo = response.error_for_status()?.json().await?;
        identity_from_info(info, &self.client_id)
    }
}

fn identity_from_info(info: TokenInfo, client_id: &str) -> Result<GoogleIdentity, GoogleAuthError> {
    if info.aud != client_id {
        return Err(GoogleAuthError::Rejected("audience mismatch"));
    }
    if info.email_verified.as_deref() == Some("false") {
        return Err(GoogleAuthError::Rejected("email not verified"));
    }

    let email = info
        .email
        .map(|email| email.trim().to_ascii_lowercase())
        .filter(|email| !email.is_empty())
        .ok_or(GoogleAuthError::Rejected("email missing"))?;

    Ok(GoogleIdentity { email, name: info.name, picture: info.picture })
}
