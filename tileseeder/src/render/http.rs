//! HTTP client abstraction for testability

use super::RenderError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default per-request timeout. A timed-out tile is a normal per-tile
/// failure, never fatal to the run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent with every request. Some public tile servers reject
/// requests without one.
const USER_AGENT: &str = concat!("tileseeder/", env!("CARGO_PKG_VERSION"));

/// A successful HTTP response body.
///
/// The content type is kept because the mapagent signals rendering errors
/// as 2xx responses carrying an XML body instead of an image.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl HttpResponse {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    /// True when the response claims to carry an image payload.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim_start().starts_with("image/"))
            .unwrap_or(false)
    }
}

/// Trait for asynchronous HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// A non-2xx status is an error; its body text (truncated) becomes the
    /// error message.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, RenderError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the default per-request timeout.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RenderError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, RenderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = self.client.get(url).send().await.map_err(classify_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let message = match response.bytes().await {
                Ok(body) => snippet(&body),
                Err(_) => String::new(),
            };
            warn!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(RenderError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(classify_error)?;
        debug!(
            url = url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "HTTP response received"
        );

        Ok(HttpResponse::new(bytes.to_vec(), content_type))
    }
}

fn classify_error(e: reqwest::Error) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout
    } else {
        RenderError::Network(e.to_string())
    }
}

/// First part of a response body as printable text, for error messages.
fn snippet(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.len() > MAX {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}
