//! Shared HTTP client for all upstream adapters
//!
//! One `reqwest::Client` is built per process and cloned into each backend.
//! Every call is a single attempt: there is no retry loop, and the caller
//! decides whether to try again.

use std::time::{Duration, Instant};

use headsong_config::{ApiKey, Credential, HttpConfig};
use headsong_utils::error::{AdapterError, ConfigError};
use headsong_utils::logging::{log_adapter_request, log_adapter_response};
use headsong_utils::redaction::redact_error_message;
use headsong_utils::types::Service;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Thin wrapper over a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Build the client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the TLS backend cannot be initialized.
    pub fn new(http: &HttpConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(http.timeout)
            .connect_timeout(http.connect_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http".to_string(),
                value: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            timeout: http.timeout,
        })
    }

    pub(crate) fn get(&self, url: reqwest::Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send one request and return the body of a 2xx response.
    ///
    /// Non-2xx statuses become `AdapterError::Upstream` with the status
    /// passed through unchanged. Connection failures and timeouts become
    /// `AdapterError::Transport`.
    pub(crate) async fn send(
        &self,
        service: Service,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<String, AdapterError> {
        log_adapter_request(service, method, url);
        let started = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(service, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(service, &e))?;

        log_adapter_response(service, status.as_u16(), started.elapsed().as_millis());

        if !status.is_success() {
            return Err(AdapterError::Upstream {
                service,
                status: status.as_u16(),
                body: redact_error_message(&body),
            });
        }

        Ok(body)
    }

    fn transport_error(&self, service: Service, error: &reqwest::Error) -> AdapterError {
        let message = if error.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };

        AdapterError::Transport {
            service,
            message: redact_error_message(&message),
        }
    }
}

/// Resolve the key for a call, or fail before any request is built.
pub(crate) fn require_key(
    service: Service,
    credential: &Credential,
) -> Result<&ApiKey, AdapterError> {
    credential
        .key()
        .ok_or_else(|| AdapterError::ConfigurationMissing {
            service,
            env_var: credential.env_var().to_string(),
        })
}

/// Decode a success body, mapping schema mismatches to `MalformedResponse`.
pub(crate) fn parse_json<T: DeserializeOwned>(service: Service, body: &str) -> Result<T, AdapterError> {
    serde_json::from_str(body).map_err(|e| AdapterError::MalformedResponse {
        service,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_http_client_construction() {
        let client = HttpClient::new(&HttpConfig::default());
        assert!(client.is_ok(), "Should construct HTTP client successfully");
    }

    #[test]
    fn test_require_key_missing() {
        let credential = Credential::Missing {
            env_var: "NEWS_API_KEY".to_string(),
        };
        let err = require_key(Service::News, &credential).unwrap_err();
        assert_eq!(
            err,
            AdapterError::ConfigurationMissing {
                service: Service::News,
                env_var: "NEWS_API_KEY".to_string(),
            }
        );
    }

    #[test]
    fn test_require_key_present() {
        let credential = Credential::Present {
            env_var: "NEWS_API_KEY".to_string(),
            key: ApiKey::new("k"),
        };
        assert_eq!(require_key(Service::News, &credential).unwrap().expose(), "k");
    }

    #[derive(Debug, Deserialize)]
    struct Shape {
        #[allow(dead_code)]
        articles: Vec<String>,
    }

    #[test]
    fn test_parse_json_missing_field_is_malformed() {
        let err = parse_json::<Shape>(Service::News, r#"{"status":"ok"}"#).unwrap_err();
        match err {
            AdapterError::MalformedResponse { service, detail } => {
                assert_eq!(service, Service::News);
                assert!(detail.contains("articles"));
            }
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_non_json_is_malformed() {
        let err = parse_json::<Shape>(Service::Song, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, AdapterError::MalformedResponse { .. }));
    }

    async fn send_to_stub(status: u16, body: &str) -> Result<String, AdapterError> {
        let (base_url, server) = crate::test_support::serve_once(status, body).await;
        let client = HttpClient::new(&HttpConfig::default()).unwrap();
        let url = format!("{base_url}/v2/top-headlines");
        let request = client.get(reqwest::Url::parse(&url).unwrap());

        let result = client.send(Service::News, "GET", &url, request).await;
        server.await.unwrap();
        result
    }

    #[tokio::test]
    async fn test_rate_limit_status_passes_through() {
        let err = send_to_stub(429, r#"{"error":"rate"}"#).await.unwrap_err();
        assert_eq!(
            err,
            AdapterError::Upstream {
                service: Service::News,
                status: 429,
                body: r#"{"error":"rate"}"#.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_status_passes_through() {
        let err = send_to_stub(500, "upstream exploded").await.unwrap_err();
        match err {
            AdapterError::Upstream { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("Expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let body = send_to_stub(200, r#"{"status":"ok"}"#).await.unwrap();
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let http = HttpConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        };
        let client = HttpClient::new(&http).unwrap();
        let url = "http://127.0.0.1:1/unreachable";
        let request = client.post(url).body("{}");

        let err = client
            .send(Service::Lyrics, "POST", url, request)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::Transport { service: Service::Lyrics, .. }),
            "got {err:?}"
        );
    }
}
