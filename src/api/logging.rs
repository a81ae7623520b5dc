//! Structured request logging with correlation ids
//!
//! Every call logs method, URL, status and elapsed time. Credentials never
//! reach the log: the authorization header is redacted before serialization.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde_json::json;

use super::auth::RequestHeaders;
use crate::error::{Operation, TransportError};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiLogger;

/// Context for a single API call
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    pub operation: Operation,
    pub table: String,
    pub entry: Option<String>,
    pub start_time: Instant,
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl ApiLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn start_operation(
        &self,
        operation: Operation,
        table: &str,
        entry: Option<String>,
    ) -> OperationContext {
        OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            operation,
            table: table.to_string(),
            entry,
            start_time: Instant::now(),
        }
    }

    pub fn log_request(&self, context: &OperationContext, method: &str, url: &str, headers: &RequestHeaders) {
        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation": context.operation.as_str(),
            "table": context.table,
            "entry": context.entry,
            "method": method,
            "url": url,
            "headers": sanitize_headers(headers),
        });

        debug!("HTTP Request: {}", log_data);
    }

    /// `duration` is the transport-measured round trip
    pub fn log_response(
        &self,
        context: &OperationContext,
        method: &str,
        url: &str,
        status_code: u16,
        duration: Duration,
    ) {
        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation": context.operation.as_str(),
            "table": context.table,
            "entry": context.entry,
            "method": method,
            "url": url,
            "status_code": status_code,
            "duration_ms": duration.as_millis(),
        });

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            info!("HTTP Response: {}", log_data);
        }
    }

    pub fn log_transport_failure(
        &self,
        context: &OperationContext,
        method: &str,
        url: &str,
        failure: &TransportError,
    ) {
        let log_data = json!({
            "event": "transport_failure",
            "correlation_id": context.correlation_id,
            "operation": context.operation.as_str(),
            "table": context.table,
            "entry": context.entry,
            "method": method,
            "url": url,
            "error": failure.to_string(),
            "duration_ms": context.elapsed().as_millis(),
        });

        error!("HTTP Request Failed: {}", log_data);
    }
}

/// Header map safe to log
fn sanitize_headers(headers: &RequestHeaders) -> BTreeMap<String, String> {
    headers
        .pairs()
        .into_iter()
        .map(|(key, value)| {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization") || key_lower.contains("token") || key_lower.contains("key") {
                (key.to_string(), "[REDACTED]".to_string())
            } else {
                (key.to_string(), value.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> RequestHeaders {
        RequestHeaders {
            authorization: "Bearer secret-token".to_string(),
            odata_max_version: "4.0".to_string(),
            odata_version: "4.0".to_string(),
            accept: "application/json".to_string(),
            content_type: "application/json".to_string(),
            prefer: Some("return=representation".to_string()),
        }
    }

    #[test]
    fn test_header_sanitization() {
        let sanitized = sanitize_headers(&headers());

        assert_eq!(sanitized.get("Authorization"), Some(&"[REDACTED]".to_string()));
        assert_eq!(sanitized.get("Content-Type"), Some(&"application/json".to_string()));
        assert_eq!(sanitized.get("Prefer"), Some(&"return=representation".to_string()));
        assert!(!sanitized.values().any(|v| v.contains("secret-token")));
    }

    #[test]
    fn test_operation_context_creation() {
        let logger = ApiLogger::new();
        let first = logger.start_operation(Operation::Get, "mice", Some("123".to_string()));
        let second = logger.start_operation(Operation::Get, "mice", None);

        assert_eq!(first.operation, Operation::Get);
        assert_eq!(first.table, "mice");
        assert_eq!(first.entry.as_deref(), Some("123"));
        assert_ne!(first.correlation_id, second.correlation_id);
    }
}
