//! reqwest transport and Azure AD token provider against a local HTTP server

use std::time::Duration;

use anyhow::Result;
use dataverse_client::api::{
    AzureAdTokenProvider, HttpRequest, HttpTransport, PublicClientApp, RequestHeaders,
    ReqwestTransport, TokenProvider,
};
use dataverse_client::TransportError;
use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request_headers(prefer: Option<&str>) -> RequestHeaders {
    RequestHeaders {
        authorization: "Bearer fake-token".to_string(),
        odata_max_version: "4.0".to_string(),
        odata_version: "4.0".to_string(),
        accept: "application/json".to_string(),
        content_type: "application/json".to_string(),
        prefer: prefer.map(str::to_string),
    }
}

fn app(server: &MockServer) -> PublicClientApp {
    PublicClientApp {
        client_id: "client-id".to_string(),
        authority: format!("{}/tenant-id", server.uri()),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_transport_sends_headers_and_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/data/v9.2/crb81_dim_mice_bases(crb81_mouse_id='614174')"))
        .and(header("Authorization", "Bearer fake-token"))
        .and(header("OData-MaxVersion", "4.0"))
        .and(header("OData-Version", "4.0"))
        .and(header("Accept", "application/json"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({"crb81_full_genotype": "12"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"crb81_full_genotype": "12"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new()?;
    let response = transport
        .send(HttpRequest {
            method: Method::PATCH,
            url: format!(
                "{}/api/data/v9.2/crb81_dim_mice_bases(crb81_mouse_id='614174')",
                server.uri()
            ),
            headers: request_headers(Some("return=representation")),
            body: Some(json!({"crb81_full_genotype": "12"})),
            timeout: Duration::from_secs(5),
        })
        .await?;

    assert_eq!(response.status, 200);
    assert!(response.is_success());
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&response.body)?,
        json!({"crb81_full_genotype": "12"})
    );
    Ok(())
}

#[tokio::test]
async fn test_transport_returns_error_statuses() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new()?;
    let response = transport
        .send(HttpRequest {
            method: Method::GET,
            url: format!("{}/api/data/v9.2/mice(abc)", server.uri()),
            headers: request_headers(None),
            body: None,
            timeout: Duration::from_secs(5),
        })
        .await?;

    assert_eq!(response.status, 404);
    assert_eq!(response.body, "not here");
    assert!(!response.is_success());
    Ok(())
}

#[tokio::test]
async fn test_transport_timeout() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new()?;
    let err = transport
        .send(HttpRequest {
            method: Method::GET,
            url: format!("{}/slow", server.uri()),
            headers: request_headers(None),
            body: None,
            timeout: Duration::from_millis(50),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout(_)), "got {:?}", err);
    let cause = std::error::Error::source(&err).expect("timeout keeps its cause");
    assert!(cause.downcast_ref::<reqwest::Error>().is_some_and(|e| e.is_timeout()));
    Ok(())
}

#[tokio::test]
async fn test_transport_connect_failure_keeps_error_chain() -> Result<()> {
    let transport = ReqwestTransport::new()?;
    let err = transport
        .send(HttpRequest {
            method: Method::GET,
            url: "http://127.0.0.1:1/x".to_string(),
            headers: request_headers(None),
            body: None,
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Connect(_)), "got {:?}", err);

    let mut chain: Vec<&(dyn std::error::Error + 'static)> = Vec::new();
    let mut current = std::error::Error::source(&err);
    while let Some(source) = current {
        chain.push(source);
        current = source.source();
    }

    assert!(chain[0].downcast_ref::<reqwest::Error>().is_some());
    // reqwest's own message names only the URL; the OS-level cause sits further down
    assert!(chain.len() >= 2, "cause chain was cut short: {:?}", chain);
    assert!(chain.iter().any(|e| e.downcast_ref::<std::io::Error>().is_some()));
    Ok(())
}

#[tokio::test]
async fn test_token_provider_password_grant() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-id/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("username=user%40alleninstitute.org"))
        .and(body_string_contains("password=pass"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Ftestorg.crm.dynamics.com%2F.default+offline_access",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "granted-token",
            "expires_in": 3599,
            "scope": "https://testorg.crm.dynamics.com/user_impersonation"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AzureAdTokenProvider::new();
    let token = provider
        .acquire_token_by_username_password(
            &app(&server),
            "user@alleninstitute.org",
            &SecretString::from("pass"),
            &["https://testorg.crm.dynamics.com/.default offline_access".to_string()],
        )
        .await?;

    assert_eq!(token.access_token(), Some("granted-token"));
    assert_eq!(token.expires_in, Some(3599));
    assert!(token.error.is_none());
    Ok(())
}

#[tokio::test]
async fn test_token_provider_error_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-id/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "AADSTS50126: Error validating credentials",
            "error_codes": [50126]
        })))
        .mount(&server)
        .await;

    let token = AzureAdTokenProvider::new()
        .acquire_token_by_username_password(
            &app(&server),
            "user@alleninstitute.org",
            &SecretString::from("wrong"),
            &["scope".to_string()],
        )
        .await?;

    assert!(token.access_token().is_none());
    assert_eq!(token.error.as_deref(), Some("invalid_grant"));
    assert_eq!(
        token.error_description.as_deref(),
        Some("AADSTS50126: Error validating credentials")
    );
    Ok(())
}

#[tokio::test]
async fn test_token_provider_non_json_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let token = AzureAdTokenProvider::new()
        .acquire_token_by_username_password(
            &app(&server),
            "user@alleninstitute.org",
            &SecretString::from("pass"),
            &["scope".to_string()],
        )
        .await?;

    assert!(token.access_token().is_none());
    assert_eq!(token.error.as_deref(), Some("invalid_response"));
    assert!(token
        .error_description
        .as_deref()
        .is_some_and(|d| d.contains("Bad Gateway")));
    Ok(())
}
