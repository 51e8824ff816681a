//! HTTP client abstraction for testability

use super::types::EngineError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent string for HTTP requests.
/// Google's web endpoint rejects requests without a browser-like User-Agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Maximum number of body bytes kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Errors from HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Request did not complete within the timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection or transfer failed
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
}

impl HttpError {
    /// Map to an engine error.
    ///
    /// | HTTP outcome                  | Engine error       |
    /// |-------------------------------|--------------------|
    /// | timeout                       | `ContentTimeout`   |
    /// | connect/transfer failure, 5xx, 429 | `TransportFault` |
    /// | other 4xx                     | `Rejected`         |
    pub fn into_engine_error(self, timeout: Duration) -> EngineError {
        match self {
            HttpError::Timeout(_) => EngineError::ContentTimeout(timeout),
            HttpError::Client(msg) | HttpError::Transport(msg) => EngineError::TransportFault(msg),
            HttpError::Status { status, url, .. } if status == 429 || status >= 500 => {
                EngineError::TransportFault(format!("HTTP {} from {}", status, url))
            }
            HttpError::Status { status, body, .. } => EngineError::Rejected {
                status,
                message: body,
            },
        }
    }

    /// Returns true if the server answered at all.
    pub fn is_response(&self) -> bool {
        matches!(self, HttpError::Status { .. })
    }
}

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP GET request with URL-encoded query parameters.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `query` - Slice of (name, value) pairs appended to the URL
    fn get_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP POST request with JSON body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `json_body` - JSON body as a string
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn execute(
        &self,
        method: &'static str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, HttpError> {
        trace!(method, url = url, "HTTP request starting");

        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    method,
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    method,
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    is_request = e.is_request(),
                    "HTTP request failed"
                );
                return Err(classify_reqwest_error(e));
            }
        };

        let status = response.status();

        // Read response body
        let body = match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                bytes.to_vec()
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                return Err(classify_reqwest_error(e));
            }
        };

        // Check HTTP status
        if !status.is_success() {
            warn!(method, url = url, status = status.as_u16(), "HTTP error status");
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        self.execute("GET", url, self.client.get(url)).await
    }

    async fn get_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        self.execute("GET", url, self.client.get(url).query(query))
            .await
    }

    async fn post_json(&self, url: &str, json_body: &str) -> Result<Vec<u8>, HttpError> {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string());
        self.execute("POST", url, request).await
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(e.to_string())
    } else {
        HttpError::Transport(e.to_string())
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.into_owned(),
    }
}
