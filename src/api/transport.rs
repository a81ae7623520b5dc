//! HTTP transport
//!
//! The client issues every request through [`HttpTransport`], so tests and
//! callers with special networking needs can swap the reqwest implementation out.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::auth::RequestHeaders;
use crate::error::TransportError;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: RequestHeaders,
    pub body: Option<Value>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub elapsed: Duration,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Non-2xx statuses are not errors at this level; only failures to get an
/// answer at all (DNS, connect, timeout) are.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dataverse-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client })
    }

    /// Use a preconfigured reqwest client
    pub fn with_custom_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Get shared HTTP client (cheap clone)
    pub fn http_client(&self) -> reqwest::Client {
        self.http_client.clone()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .timeout(request.timeout);

        for (name, value) in request.headers.pairs() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            elapsed: started.elapsed(),
            body,
        })
    }
}
