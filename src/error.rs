//! Error types for the Dataverse client

use std::fmt;

use thiserror::Error;

/// Which client operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Add,
    Update,
    Query,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Query => "query",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Operation::Get => "fetching",
            Operation::Add => "adding",
            Operation::Update => "updating",
            Operation::Query => "querying",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a [`TransportError`], usually a `reqwest::Error`
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Network level failure reported by an [`HttpTransport`](crate::api::HttpTransport)
/// or a [`TokenProvider`](crate::api::TokenProvider). The cause is kept as the
/// error source, so the whole chain (down to the OS error) stays walkable.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("request failed: {0}")]
    Request(#[source] BoxError),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(Box::new(err))
        } else if err.is_connect() {
            TransportError::Connect(Box::new(err))
        } else {
            TransportError::Request(Box::new(err))
        }
    }
}

#[derive(Debug, Error)]
pub enum DataverseError {
    /// A required setting is missing from every source, or a source is unreadable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token provider answered without an access token
    #[error("error acquiring token: {error} : {description}")]
    Authentication { error: String, description: String },

    /// The HTTP client could not be built
    #[error("failed to set up HTTP transport: {0}")]
    TransportSetup(#[source] TransportError),

    /// The token request itself never got an answer
    #[error("transport failure acquiring token from {authority}: {source}")]
    TokenTransport {
        authority: String,
        #[source]
        source: TransportError,
    },

    #[error("error {verb} {table}{target}: {status} {body}",
        verb = .operation.verb(),
        target = describe_entry(.entry.as_deref()))]
    Http {
        operation: Operation,
        table: String,
        entry: Option<String>,
        status: u16,
        body: String,
    },

    #[error("transport failure {verb} {table}{target}: {source}",
        verb = .operation.verb(),
        target = describe_entry(.entry.as_deref()))]
    Transport {
        operation: Operation,
        table: String,
        entry: Option<String>,
        #[source]
        source: TransportError,
    },

    #[error("invalid response body {verb} {table}: {source}", verb = .operation.verb())]
    InvalidResponse {
        operation: Operation,
        table: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DataverseError {
    /// HTTP status of a rejected request, if this error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            DataverseError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a rejected request
    pub fn body(&self) -> Option<&str> {
        match self {
            DataverseError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

fn describe_entry(entry: Option<&str>) -> String {
    match entry {
        Some(entry) => format!(" entry with id {}", entry),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DataverseError>;
