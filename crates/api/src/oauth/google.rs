//! Google OAuth 2.0 client.
//!
//! # Endpoints
//!
//! - Authorization: `https://accounts.google.com/o/oauth2/auth`
//! - Token exchange: `https://oauth2.googleapis.com/token`
//! - Userinfo: `https://www.googleapis.com/oauth2/v2/userinfo`

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{AccessToken, IdentityProvider, ProviderError, ProviderProfile};
use crate::config::GoogleOAuthConfig;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Token endpoint response (only the field we use).
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo endpoint response.
#[derive(Deserialize)]
struct UserInfo {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Client for Google's OAuth 2.0 endpoints.
#[derive(Clone)]
pub struct GoogleProvider {
    inner: Arc<GoogleProviderInner>,
}

struct GoogleProviderInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
    scopes: Vec<String>,
}

impl GoogleProvider {
    /// Create a new Google OAuth client.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            inner: Arc::new(GoogleProviderInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                redirect_url: config.redirect_url.clone(),
                scopes: config.scopes.clone(),
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTH_URL}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            state={}&\
            access_type=offline",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_url),
            urlencoding::encode(&self.inner.scopes.join(" ")),
            urlencoding::encode(state),
        )
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", self.inner.redirect_url.as_str()),
        ];

        let response = self.inner.client.post(TOKEN_URL).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                operation: "token exchange",
                status: response.status().as_u16(),
            });
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "empty access token".to_string(),
            ));
        }

        Ok(AccessToken(SecretString::from(token.access_token)))
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile, ProviderError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(token.0.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                operation: "userinfo request",
                status: response.status().as_u16(),
            });
        }

        let info: UserInfo = response.json().await?;
        if info.id.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "missing subject identifier".to_string(),
            ));
        }
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("missing email".to_string()))?;

        Ok(ProviderProfile {
            external_id: info.id,
            email,
        })
    }
}
