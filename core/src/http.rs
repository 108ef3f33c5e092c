//! HTTP transport: plain-data request/response types and the executor trait.
//!
//! # Design
//! Requests and responses are described as plain data, and the actual I/O
//! happens behind the [`HttpTransport`] trait. The default transport is
//! reqwest-backed; tests script responses with an in-memory transport and
//! never touch the network. Transports return non-2xx statuses as data, not
//! errors; status interpretation belongs to the client layer. Only failures
//! where no response was received at all surface as [`ApiError::Network`].

use async_trait::async_trait;
use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    /// Query pairs in canonical order; the transport percent-encodes them.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json_body(mut self, body: String) -> Self {
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes [`HttpRequest`]s. Implemented by the reqwest transport and by
/// scripted transports in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Default transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: std::time::Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let response = builder.send().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;
        Ok(HttpResponse { status, body })
    }
}

/// Execute a read request with exponential backoff.
///
/// Total attempts are capped at `policy.max_attempts`. 4xx responses and
/// client-classified errors return immediately; 5xx responses and network
/// errors back off starting at `base_delay`, doubling up to `max_delay`.
/// Mutations must not go through here; callers execute them exactly once.
pub(crate) async fn execute_with_retry(
    transport: &dyn HttpTransport,
    request: &HttpRequest,
    policy: &RetryPolicy,
) -> Result<HttpResponse, ApiError> {
    let mut delay = policy.base_delay;
    let mut attempt = 1u32;
    loop {
        match transport.execute(request).await {
            Ok(response) => {
                let retryable = response.status >= 500;
                if !retryable || attempt >= policy.max_attempts {
                    return Ok(response);
                }
                warn!(
                    status = response.status,
                    attempt,
                    url = %request.url,
                    "server error, retrying"
                );
            }
            Err(err) => {
                if err.is_client_error() || attempt >= policy.max_attempts {
                    return Err(err);
                }
                warn!(error = %err, attempt, url = %request.url, "transport error, retrying");
            }
        }
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(policy.max_delay);
        attempt += 1;
    }
}
