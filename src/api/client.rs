use reqwest::Method;
use serde::de::Error as _;
use serde_json::Value;

use super::auth::{self, AzureAdTokenProvider, Session, TokenProvider};
use super::constants::headers;
use super::logging::ApiLogger;
use super::query::{self, EntryId, Query, QueryOptions};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::config::DataverseConfig;
use crate::error::{DataverseError, Operation, Result};

/// Dataverse Web API client for basic CRUD on table rows.
///
/// Construction authenticates once; every call afterwards reuses that session
/// and issues exactly one HTTP request.
pub struct DataverseClient<T = ReqwestTransport> {
    config: DataverseConfig,
    transport: T,
    session: Session,
    api_logger: ApiLogger,
}

/// One outgoing call, before it is turned into an [`HttpRequest`]
struct Call<'a> {
    operation: Operation,
    table: &'a str,
    entry_id: Option<&'a EntryId>,
    method: Method,
    url: String,
    body: Option<&'a Value>,
    prefer: Option<&'static str>,
}

impl DataverseClient<ReqwestTransport> {
    /// Authenticate against Azure AD and return a ready client.
    ///
    /// Fails with [`DataverseError::TransportSetup`] if the reqwest client cannot be built.
    pub async fn connect(config: DataverseConfig) -> Result<Self> {
        let transport = ReqwestTransport::new().map_err(DataverseError::TransportSetup)?;
        let provider = AzureAdTokenProvider::with_custom_client(transport.http_client());

        Self::with_collaborators(config, transport, &provider).await
    }
}

impl<T: HttpTransport> DataverseClient<T> {
    /// Authenticate through `provider` and send all requests through `transport`
    pub async fn with_collaborators(
        config: DataverseConfig,
        transport: T,
        provider: &dyn TokenProvider,
    ) -> Result<Self> {
        let session = auth::authenticate(&config, provider).await?;

        Ok(Self {
            config,
            transport,
            session,
            api_logger: ApiLogger::new(),
        })
    }

    pub fn config(&self) -> &DataverseConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// URL for a table, optionally narrowed to one row and/or OData options
    pub fn build_url(
        &self,
        table: &str,
        entry_id: Option<&EntryId>,
        options: &QueryOptions,
    ) -> String {
        query::build_url(&self.config.api_url(), table, entry_id, options)
    }

    /// Get a row by primary key or alternate key
    pub async fn get(&self, table: &str, id: impl Into<EntryId>) -> Result<Value> {
        let id = id.into();
        let url = self.build_url(table, Some(&id), &QueryOptions::default());

        let response = self
            .execute(Call {
                operation: Operation::Get,
                table,
                entry_id: Some(&id),
                method: Method::GET,
                url,
                body: None,
                prefer: None,
            })
            .await?;

        parse_body(Operation::Get, table, &response)
    }

    /// Add a new row, returning the server's answer
    pub async fn add(&self, table: &str, data: &Value) -> Result<Value> {
        let url = self.build_url(table, None, &QueryOptions::default());

        let response = self
            .execute(Call {
                operation: Operation::Add,
                table,
                entry_id: None,
                method: Method::POST,
                url,
                body: Some(data),
                prefer: None,
            })
            .await?;

        parse_body(Operation::Add, table, &response)
    }

    /// Patch an existing row and return its updated representation
    pub async fn update(&self, table: &str, id: impl Into<EntryId>, patch: &Value) -> Result<Value> {
        let id = id.into();
        let url = self.build_url(table, Some(&id), &QueryOptions::default());

        let response = self
            .execute(Call {
                operation: Operation::Update,
                table,
                entry_id: Some(&id),
                method: Method::PATCH,
                url,
                body: Some(patch),
                prefer: Some(headers::PREFER_RETURN_REPRESENTATION),
            })
            .await?;

        parse_body(Operation::Update, table, &response)
    }

    /// Rows matching `query`; the `value` array of the response, empty if absent
    pub async fn query(&self, table: &str, query: Query) -> Result<Vec<Value>> {
        let url = self.build_url(table, None, &QueryOptions::from(query));

        let response = self
            .execute(Call {
                operation: Operation::Query,
                table,
                entry_id: None,
                method: Method::GET,
                url,
                body: None,
                prefer: None,
            })
            .await?;

        match parse_body(Operation::Query, table, &response)? {
            Value::Object(mut body) => match body.remove("value") {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(rows)) => Ok(rows),
                Some(other) => Err(DataverseError::InvalidResponse {
                    operation: Operation::Query,
                    table: table.to_string(),
                    source: serde_json::Error::custom(format!(
                        "expected `value` to be an array, found {}",
                        other
                    )),
                }),
            },
            _ => Ok(Vec::new()),
        }
    }

    /// Send one request; non-2xx answers become [`DataverseError::Http`]
    async fn execute(&self, call: Call<'_>) -> Result<HttpResponse> {
        let entry = call.entry_id.map(EntryId::to_string);
        let context = self
            .api_logger
            .start_operation(call.operation, call.table, entry.clone());
        let method = call.method.to_string();

        let request = HttpRequest {
            method: call.method,
            url: call.url,
            headers: self.session.headers().for_request(call.prefer),
            body: call.body.cloned(),
            timeout: self.config.request_timeout(),
        };
        self.api_logger
            .log_request(&context, &method, &request.url, &request.headers);

        let url = request.url.clone();
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(source) => {
                self.api_logger
                    .log_transport_failure(&context, &method, &url, &source);
                return Err(DataverseError::Transport {
                    operation: call.operation,
                    table: call.table.to_string(),
                    entry,
                    source,
                });
            }
        };

        self.api_logger
            .log_response(&context, &method, &url, response.status, response.elapsed);

        if !response.is_success() {
            return Err(DataverseError::Http {
                operation: call.operation,
                table: call.table.to_string(),
                entry,
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}

/// Parse a 2xx body; an empty body (`204 No Content`) is `Value::Null`
fn parse_body(operation: Operation, table: &str, response: &HttpResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&response.body).map_err(|source| DataverseError::InvalidResponse {
        operation,
        table: table.to_string(),
        source,
    })
}
