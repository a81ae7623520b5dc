//! Authentication for the Dataverse Web API
//!
//! A client authenticates exactly once, with the OAuth2 resource owner password
//! grant of a public client (no client secret). The token is never refreshed.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use super::constants::{self, headers};
use crate::config::DataverseConfig;
use crate::error::{DataverseError, Result, TransportError};

/// Public client application settings handed to the token provider
#[derive(Debug, Clone, PartialEq)]
pub struct PublicClientApp {
    pub client_id: String,
    pub authority: String,
    pub timeout: Duration,
}

impl PublicClientApp {
    pub fn from_config(config: &DataverseConfig) -> Self {
        Self {
            client_id: config.client_id().to_string(),
            authority: config.authority(),
            timeout: config.request_timeout(),
        }
    }

    pub fn token_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.authority.trim_end_matches('/'),
            constants::TOKEN_ENDPOINT_PATH
        )
    }
}

/// Token endpoint answer: an access token on success, error fields otherwise.
///
/// Only `Deserialize` is derived and `Debug` is written by hand, so the token
/// does not end up in logs.
#[derive(Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TokenResponse {
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            token_type: Some("Bearer".to_string()),
            ..Self::default()
        }
    }

    pub fn with_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            error_description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("error", &self.error)
            .field("error_description", &self.error_description)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Exchanges user credentials for an access token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token_by_username_password(
        &self,
        app: &PublicClientApp,
        username: &str,
        password: &SecretString,
        scopes: &[String],
    ) -> std::result::Result<TokenResponse, TransportError>;
}

/// Azure AD v2.0 token endpoint, password grant
#[derive(Debug, Clone, Default)]
pub struct AzureAdTokenProvider {
    http_client: reqwest::Client,
}

impl AzureAdTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl TokenProvider for AzureAdTokenProvider {
    async fn acquire_token_by_username_password(
        &self,
        app: &PublicClientApp,
        username: &str,
        password: &SecretString,
        scopes: &[String],
    ) -> std::result::Result<TokenResponse, TransportError> {
        let token_url = app.token_endpoint();
        let scope = scopes.join(" ");

        let response = self
            .http_client
            .post(&token_url)
            .timeout(app.timeout)
            .form(&[
                ("grant_type", "password"),
                ("client_id", app.client_id.as_str()),
                ("username", username),
                ("password", password.expose_secret()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        debug!("Token request status: {}", response.status());

        // Azure AD reports failures as a JSON body on a 4xx status
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            TokenResponse::with_error(
                "invalid_response",
                format!("token endpoint returned a non-JSON body ({}): {}", e, body),
            )
        }))
    }
}

/// Headers sent with every request of a session
pub struct SessionHeaders {
    authorization: SecretString,
}

impl SessionHeaders {
    fn bearer(token: &str) -> Self {
        Self {
            authorization: SecretString::from(format!("Bearer {}", token)),
        }
    }

    /// Named header set for one request, with an optional `Prefer` value
    pub fn for_request(&self, prefer: Option<&str>) -> RequestHeaders {
        RequestHeaders {
            authorization: self.authorization.expose_secret().to_string(),
            odata_max_version: headers::ODATA_VERSION.to_string(),
            odata_version: headers::ODATA_VERSION.to_string(),
            accept: headers::CONTENT_TYPE_JSON.to_string(),
            content_type: headers::CONTENT_TYPE_JSON.to_string(),
            prefer: prefer.map(str::to_string),
        }
    }
}

impl fmt::Debug for SessionHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHeaders")
            .field("authorization", &"[REDACTED]")
            .finish()
    }
}

/// Concrete headers for a single request
#[derive(Clone, PartialEq)]
pub struct RequestHeaders {
    pub authorization: String,
    pub odata_max_version: String,
    pub odata_version: String,
    pub accept: String,
    pub content_type: String,
    pub prefer: Option<String>,
}

impl RequestHeaders {
    /// Header name/value pairs in wire form
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            (headers::AUTHORIZATION, self.authorization.as_str()),
            (headers::ODATA_MAX_VERSION, self.odata_max_version.as_str()),
            (headers::ODATA_VERSION_HEADER, self.odata_version.as_str()),
            (headers::ACCEPT, self.accept.as_str()),
            (headers::CONTENT_TYPE, self.content_type.as_str()),
        ];
        if let Some(prefer) = &self.prefer {
            pairs.push((headers::PREFER, prefer.as_str()));
        }
        pairs
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHeaders")
            .field("authorization", &"[REDACTED]")
            .field("odata_max_version", &self.odata_max_version)
            .field("odata_version", &self.odata_version)
            .field("accept", &self.accept)
            .field("content_type", &self.content_type)
            .field("prefer", &self.prefer)
            .finish()
    }
}

/// Authenticated session owned by one client
#[derive(Debug)]
pub struct Session {
    token: TokenResponse,
    headers: SessionHeaders,
}

impl Session {
    pub fn token(&self) -> &TokenResponse {
        &self.token
    }

    pub fn access_token(&self) -> &str {
        self.token.access_token().unwrap_or_default()
    }

    pub fn headers(&self) -> &SessionHeaders {
        &self.headers
    }
}

/// Acquire a token for the configured user and build the session headers
pub async fn authenticate(
    config: &DataverseConfig,
    provider: &dyn TokenProvider,
) -> Result<Session> {
    let app = PublicClientApp::from_config(config);
    let username = config.username_at_domain();
    let scopes = vec![config.scope()];

    info!("Authenticating {} against {}", username, app.authority);

    let token = provider
        .acquire_token_by_username_password(&app, &username, config.password(), &scopes)
        .await
        .map_err(|source| {
            error!("Token request to {} failed: {}", app.authority, source);
            DataverseError::TokenTransport {
                authority: app.authority.clone(),
                source,
            }
        })?;

    let Some(access_token) = token.access_token() else {
        let error = token.error.clone().unwrap_or_else(|| "None".to_string());
        let description = token
            .error_description
            .clone()
            .unwrap_or_else(|| "None".to_string());
        error!("Error acquiring token: {} : {}", error, description);
        return Err(DataverseError::Authentication { error, description });
    };

    let headers = SessionHeaders::bearer(access_token);
    info!("Successfully authenticated {}", username);

    Ok(Session { token, headers })
}
