//! HTTP transport abstraction
//!
//! The dispatcher hands a fully built [`SignedRequest`] to a [`Transport`]
//! and gets raw response bytes back. Keeping the network behind a trait lets
//! the dispatch logic be tested without real HTTP calls.

use crate::params::EncodedBody;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Header carrying the API key on private requests
pub const API_KEY_HEADER: &str = "API-Key";
/// Header carrying the base64 signature on private requests
pub const API_SIGN_HEADER: &str = "API-Sign";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport layer errors
///
/// These describe failures to complete the HTTP exchange. No response
/// body was decoded when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not connect (refused, DNS, TLS handshake)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No complete response within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure while sending the request or reading the response
    #[error("request failed: {0}")]
    Request(String),
}

/// A request ready to be sent
///
/// Built once per call. For private calls the body is exactly the byte
/// sequence that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    url: String,
    path: String,
    body: EncodedBody,
    headers: Vec<(&'static str, String)>,
}

impl SignedRequest {
    pub(crate) fn new(
        url: String,
        path: String,
        body: EncodedBody,
        headers: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            url,
            path,
            body,
            headers,
        }
    }

    /// Full request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL path (e.g. `/0/private/Balance`)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Form-encoded body
    pub fn body(&self) -> &EncodedBody {
        &self.body
    }

    /// Extra headers (authentication only)
    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    /// Look up a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether this request carries authentication headers
    pub fn is_signed(&self) -> bool {
        self.header(API_SIGN_HEADER).is_some()
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for HTTP transport abstraction
///
/// Implementations must be safe to share between concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the request and return the raw response
    async fn post(&self, request: &SignedRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Verify the server's TLS certificate
    pub verify_tls: bool,
    /// User agent header
    pub user_agent: String,
}

/// Real HTTP transport using reqwest
///
/// Holds one connection pool for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build the underlying HTTP client
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::ConnectionFailed(error_chain(&error))
        } else {
            TransportError::Request(error_chain(&error))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(path = %request.path()))]
    async fn post(&self, request: &SignedRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .post(request.url())
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(request.body().as_str().to_owned());

        for (name, value) in request.headers() {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        debug!(status, len = body.len(), "Received response");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Render an error with its sources, reqwest keeps the useful part deep
/// in the chain (e.g. "connection refused").
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Mock transport for testing
///
/// Returns queued responses in order and records every request it sees.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MockTransport {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<HttpResponse, TransportError>>>,
    requests: parking_lot::Mutex<Vec<SignedRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a mock with no queued responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body
    pub fn push_json(&self, body: impl Into<String>) {
        self.push_response(HttpResponse::new(200, body.into()));
    }

    /// Queue a raw response
    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests sent so far
    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: &SignedRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionFailed("no mock response queued".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;

    fn request() -> SignedRequest {
        SignedRequest::new(
            "https://api.kraken.com/0/private/Balance".into(),
            "/0/private/Balance".into(),
            RequestParams::new().with("nonce", "1").encode().unwrap(),
            vec![(API_KEY_HEADER, "key".into()), (API_SIGN_HEADER, "sig".into())],
        )
    }

    #[test]
    fn test_signed_request_accessors() {
        let req = request();
        assert_eq!(req.path(), "/0/private/Balance");
        assert_eq!(req.body().as_str(), "nonce=1");
        assert_eq!(req.header("api-key"), Some("key"));
        assert_eq!(req.header(API_SIGN_HEADER), Some("sig"));
        assert!(req.is_signed());
    }

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockTransport::new();
        transport.push_json(r#"{"error":[],"result":1}"#);
        transport.push_error(TransportError::Timeout(Duration::from_secs(1)));

        let first = transport.post(&request()).await.unwrap();
        assert_eq!(first.status, 200);

        let second = transport.post(&request()).await.unwrap_err();
        assert_eq!(second, TransportError::Timeout(Duration::from_secs(1)));

        // Exhausted
        assert!(matches!(
            transport.post(&request()).await,
            Err(TransportError::ConnectionFailed(_))
        ));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_http_transport_builds() {
        let config = TransportConfig {
            timeout: Duration::from_secs(5),
            verify_tls: false,
            user_agent: "test-agent".into(),
        };
        assert!(HttpTransport::new(&config).is_ok());
    }
}
