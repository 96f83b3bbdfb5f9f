//! HTTP client builder shared by all ML service implementations.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::StatusCode;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;
use crate::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout, applied to every attempt.
    pub timeout: Duration,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: format!("call-ai/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client with timeout and retry middleware.
pub type ServiceClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for ML service HTTP clients.
///
/// Every client gets a per-request timeout and transient-failure retry with
/// exponential backoff. A bearer token is attached when one is configured.
pub struct ServiceClientBuilder {
    config: HttpClientConfig,
    bearer_token: Option<String>,
}

impl ServiceClientBuilder {
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn build(self) -> Result<ServiceClient, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::Configuration("Invalid API key format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .default_headers(headers)
            .build()?;

        let retry_policy = BackoffPolicy::new(self.config.max_retries);
        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

impl Default for ServiceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates a non-success response into the matching [`Error`] variant.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_seconds = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Authentication(format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after_seconds: retry_after_seconds.unwrap_or(60),
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Error::Timeout(format!("{status}: {body}"))
        }
        status if status.is_server_error() => Error::Network(format!("{status}: {body}")),
        _ => Error::Provider(format!("{status}: {body}")),
    })
}
