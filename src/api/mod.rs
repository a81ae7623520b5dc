//! Dataverse Web API module
//!
//! Authentication, URL construction and the CRUD client, with the HTTP
//! transport and token provider behind traits.

pub mod auth;
pub mod client;
pub mod constants;
pub mod logging;
pub mod query;
pub mod transport;

pub use auth::{AzureAdTokenProvider, PublicClientApp, RequestHeaders, Session, TokenProvider, TokenResponse};
pub use client::DataverseClient;
pub use logging::{ApiLogger, OperationContext};
pub use query::{build_url, Columns, EntryId, KeyValue, Query, QueryOptions};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
