//! Shared HTTP plumbing — client construction, URL joining, and turning a
//! failed provider response into an [`Error::Upstream`].

use std::time::Duration;

use agentnx_core::utils::truncate_string;
use agentnx_core::{Error, Result};

/// Upstream error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 500;

/// Build the shared, connection-pooled client.
///
/// A zero `timeout` disables the per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if !timeout.is_zero() {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))
}

/// `{base}/{path}` tolerating a trailing slash on the base.
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Convert a transport-level failure. reqwest strips credentials from the
/// URLs it reports, and the bearer header never appears in its messages.
pub fn transport_error(err: reqwest::Error) -> Error {
    match err.status() {
        Some(status) => Error::upstream_status(status.as_u16(), err.to_string()),
        None => Error::upstream(err.to_string()),
    }
}

/// Build an upstream error from a non-success response, preferring the
/// provider's `error.message` field when the body is JSON.
pub async fn status_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or(body);

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        truncate_string(&message, MAX_ERROR_BODY)
    };

    Error::upstream_status(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_url_trailing_slash() {
        assert_eq!(
            endpoint_url("https://api.openai.com/v1/", "chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint_url("https://api.openai.com/v1", "models"),
            "https://api.openai.com/v1/models"
        );
    }

    #[tokio::test]
    async fn test_status_error_prefers_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded", "type": "rate_limit_error" }
            })))
            .mount(&server)
            .await;

        let resp = reqwest::get(server.uri()).await.unwrap();
        match status_error(resp).await {
            Error::Upstream { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_error_plain_body_and_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway upstream"))
            .mount(&server)
            .await;

        let resp = reqwest::get(server.uri()).await.unwrap();
        let err = status_error(resp).await;
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway upstream"));

        let empty = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&empty)
            .await;
        let resp = reqwest::get(empty.uri()).await.unwrap();
        assert!(status_error(resp).await.to_string().contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_zero_timeout_client_waits_for_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
            .mount(&server)
            .await;

        let client = build_client(Duration::ZERO).unwrap();
        let resp = client.get(server.uri()).send().await.unwrap();
        assert!(resp.status().is_success());
    }
}
