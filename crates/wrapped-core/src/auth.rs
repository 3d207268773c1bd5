//! Authorization-code exchange and token refresh against the accounts service.
//!
//! The browser round-trip itself is left to the user: `authorize_url` prints
//! where to log in, and the `code` query parameter of the redirect is handed
//! back to `exchange_code`.

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::{ApiConfig, AuthConfig};
use crate::credentials::Credentials;

pub const SCOPES: &str = "user-read-recently-played user-top-read";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client_id / client_secret are not configured")]
    MissingClient,
    #[error("stored credentials have no refresh token; log in again")]
    NoRefreshToken,
    #[error("token endpoint returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct AuthClient {
    http: Client,
    auth: AuthConfig,
    authorize_url: String,
    token_url: String,
}

impl AuthClient {
    pub fn new(api: &ApiConfig, auth: &AuthConfig) -> Result<Self, AuthError> {
        if auth.client_id.is_empty() || auth.client_secret.is_empty() {
            return Err(AuthError::MissingClient);
        }
        let http = Client::builder().timeout(api.timeout()).build()?;
        Ok(Self {
            http,
            auth: auth.clone(),
            authorize_url: api.authorize_url.clone(),
            token_url: api.token_url.clone(),
        })
    }

    /// URL the user opens in a browser to grant access.
    pub fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.auth.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.auth.redirect_uri.as_str()),
            ("scope", SCOPES),
            ("state", state),
        ];
        match reqwest::Url::parse_with_params(&self.authorize_url, &params) {
            Ok(url) => url.to_string(),
            // Unparseable base: show what was configured.
            Err(_) => self.authorize_url.clone(),
        }
    }

    /// Trade the one-time `code` from the redirect for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<Credentials, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.auth.redirect_uri.as_str()),
        ];
        let token = self.post_token(&form).await?;
        info!("Authorization code exchanged for tokens");
        Ok(into_credentials(token, None))
    }

    /// Obtain a fresh access token. The previous refresh token is kept when
    /// the response does not rotate it.
    pub async fn refresh(&self, current: &Credentials) -> Result<Credentials, AuthError> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let token = self.post_token(&form).await?;
        info!("Access token refreshed");
        Ok(into_credentials(token, current.refresh_token.clone()))
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.auth.client_id, Some(&self.auth.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

fn into_credentials(token: TokenResponse, previous_refresh: Option<String>) -> Credentials {
    Credentials {
        access_token: token.access_token,
        refresh_token: token.refresh_token.or(previous_refresh),
        token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
        scope: token.scope,
        expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
    }
}

/// Random value for the `state` parameter of the authorize URL.
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AuthConfig {
        AuthConfig {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8888/callback".into(),
        }
    }

    #[test]
    fn test_requires_client() {
        let err = AuthClient::new(&ApiConfig::default(), &AuthConfig::default());
        assert!(matches!(err, Err(AuthError::MissingClient)));
    }

    #[test]
    fn test_authorize_url_carries_params() {
        let client = AuthClient::new(&ApiConfig::default(), &configured()).unwrap();
        let url = reqwest::Url::parse(&client.authorize_url("xyz")).unwrap();
        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(params.contains(&("client_id".into(), "cid".into())));
        assert!(params.contains(&("response_type".into(), "code".into())));
        assert!(params.contains(&("scope".into(), SCOPES.into())));
        assert!(params.contains(&("state".into(), "xyz".into())));
    }

    #[test]
    fn test_refresh_keeps_previous_token() {
        let token = TokenResponse {
            access_token: "new".into(),
            token_type: None,
            scope: None,
            expires_in: Some(3600),
            refresh_token: None,
        };
        let creds = into_credentials(token, Some("old-refresh".into()));
        assert_eq!(creds.access_token, "new");
        assert_eq!(creds.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(creds.token_type, "Bearer");
        assert!(creds.expires_at.is_some());
    }

    #[test]
    fn test_random_state_shape() {
        let s = random_state();
        assert_eq!(s.len(), 16);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(s, random_state());
    }
}
