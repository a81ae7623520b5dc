//! Mock collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dataverse_client::api::{
    DataverseClient, HttpRequest, HttpResponse, HttpTransport, PublicClientApp, TokenProvider,
    TokenResponse,
};
use dataverse_client::{ConfigOverrides, DataverseConfig, TransportError};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

pub const API_URL: &str = "https://testorg.crm.dynamics.com/api/data/v9.2/";

pub fn test_overrides() -> ConfigOverrides {
    ConfigOverrides::new()
        .tenant_id("tenant-id")
        .client_id("client-id")
        .org("testorg")
        .username("user")
        .password("pass")
        .request_timeout_s(7.5)
}

pub fn test_config() -> DataverseConfig {
    DataverseConfig::from_overrides(test_overrides()).expect("valid test config")
}

/// Transport that replays canned answers and records every request
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            elapsed: Duration::from_millis(12),
            body: body.to_string(),
        }));
        self
    }

    pub fn respond_json(self, status: u16, body: Value) -> Self {
        let body = body.to_string();
        self.respond(status, &body)
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> HttpRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left")
    }
}

/// What the token provider was asked for
#[derive(Debug, Clone)]
pub struct TokenCall {
    pub app: PublicClientApp,
    pub username: String,
    pub password: String,
    pub scopes: Vec<String>,
}

#[derive(Clone)]
pub struct MockTokenProvider {
    response: Arc<Mutex<Option<Result<TokenResponse, TransportError>>>>,
    calls: Arc<Mutex<Vec<TokenCall>>>,
}

impl MockTokenProvider {
    pub fn granting(token: &str) -> Self {
        Self::answering(Ok(TokenResponse::with_access_token(token)))
    }

    pub fn rejecting(error: &str, description: &str) -> Self {
        Self::answering(Ok(TokenResponse::with_error(error, description)))
    }

    pub fn answering(response: Result<TokenResponse, TransportError>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(response))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<TokenCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn acquire_token_by_username_password(
        &self,
        app: &PublicClientApp,
        username: &str,
        password: &SecretString,
        scopes: &[String],
    ) -> Result<TokenResponse, TransportError> {
        self.calls.lock().unwrap().push(TokenCall {
            app: app.clone(),
            username: username.to_string(),
            password: password.expose_secret().to_string(),
            scopes: scopes.to_vec(),
        });
        self.response
            .lock()
            .unwrap()
            .take()
            .expect("token requested more than once")
    }
}

/// Client authenticated with a fake token, sending through `transport`
pub async fn connected(transport: MockTransport) -> DataverseClient<MockTransport> {
    DataverseClient::with_collaborators(
        test_config(),
        transport,
        &MockTokenProvider::granting("fake-token"),
    )
    .await
    .expect("mock authentication succeeds")
}
