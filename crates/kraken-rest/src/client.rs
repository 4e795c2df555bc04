//! Main REST client implementation
//!
//! [`KrakenRestClient`] is the single dispatch point for every endpoint. A
//! call goes through a fixed sequence: build parameters, (private only) add
//! the nonce and sign, send over the shared transport, decode the envelope.
//! There are no retries; each call ends in a decoded result or exactly one
//! classified [`RestError`].

use crate::config::ClientConfig;
use crate::endpoints::{AccountEndpoints, MarketEndpoints, TradingEndpoints};
use crate::error::{RestError, RestResult};
use crate::params::{RequestParams, NONCE_PARAM};
use crate::response::{decode_envelope, ApiResponse};
use crate::transport::{HttpTransport, SignedRequest, Transport, API_KEY_HEADER, API_SIGN_HEADER};
use crate::types::{BalanceInfo, OrderRequest, OrderResponse, TickerInfo};
use kraken_auth::{Credentials, Nonce, NonceGenerator, RequestSigner};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Kraken REST API client
///
/// Cheap to clone; clones share the HTTP connection pool, the credentials
/// and the nonce generator, so nonces stay increasing across all of them.
///
/// # Example
///
/// ```no_run
/// use kraken_rest::{KrakenRestClient, RequestParams};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = KrakenRestClient::new()?;
///     let time: serde_json::Value = client.call_public("Time", RequestParams::new()).await?;
///     println!("{}", time);
///
///     // With authentication for private endpoints
///     let auth_client = KrakenRestClient::from_env()?;
///     let balance = auth_client.get_balance().await?;
///     println!("{:?}", balance);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct KrakenRestClient {
    transport: Arc<dyn Transport>,
    credentials: Option<Arc<Credentials>>,
    nonces: Arc<NonceGenerator>,
    base_url: String,
    api_version: String,
}

impl KrakenRestClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with credentials
    pub fn with_credentials(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::default().with_credentials(credentials))
    }

    /// Create an authenticated client from an API key and base64 private key
    ///
    /// # Errors
    /// [`RestError::Configuration`] if the private key cannot be decoded.
    /// Nothing is sent over the network.
    pub fn authenticated(api_key: impl Into<String>, private_key: impl AsRef<str>) -> RestResult<Self> {
        Self::with_credentials(Credentials::new(api_key, private_key)?)
    }

    /// Create a client configured from the environment
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> RestResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.transport_config())
            .map_err(|e| RestError::Configuration(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> RestResult<Self> {
        config.validate()?;

        info!(
            base_url = %config.base_url,
            api_version = %config.api_version,
            authenticated = config.credentials.is_some(),
            "Created Kraken REST client"
        );
        if !config.verify_tls {
            warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            transport,
            credentials: config.credentials.map(Arc::new),
            nonces: Arc::new(NonceGenerator::new()),
            base_url: config.base_url,
            api_version: config.api_version,
        })
    }

    /// Check if the client has credentials for private endpoints
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// The configured API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.credentials.as_deref().map(Credentials::api_key)
    }

    /// Generator used for this client's nonces
    pub fn nonce_generator(&self) -> &NonceGenerator {
        &self.nonces
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Build the request for a public call without sending it
    pub fn build_public(&self, method: &str, params: &RequestParams) -> RestResult<SignedRequest> {
        validate_method(method)?;
        let path = format!("/{}/public/{}", self.api_version, method);
        let body = params.encode()?;
        let url = format!("{}{}", self.base_url, path);

        Ok(SignedRequest::new(url, path, body, Vec::new()))
    }

    /// Build and sign the request for a private call without sending it
    ///
    /// A `nonce` is added in front of the other parameters unless the caller
    /// supplied one. A caller nonce must be an unsigned decimal integer that
    /// fits in a `u64` (at most 20 digits), otherwise the call fails with
    /// [`RestError::InvalidParameter`]; it is sent unchanged and the
    /// generator is moved past it.
    pub fn sign_private(&self, method: &str, mut params: RequestParams) -> RestResult<SignedRequest> {
        validate_method(method)?;
        let credentials = self.credentials.as_deref().ok_or(RestError::AuthRequired)?;

        let nonce = match params.get(NONCE_PARAM) {
            Some(value) => {
                let nonce = value.as_wire().into_owned();
                let parsed = Nonce::parse(&nonce).ok_or_else(|| {
                    RestError::InvalidParameter(format!(
                        "nonce must be an unsigned decimal integer, got '{}'",
                        nonce
                    ))
                })?;
                if !self.nonces.observe(parsed) {
                    warn!(method, "Caller-supplied nonce is not above the last issued nonce");
                }
                nonce
            }
            None => {
                let nonce = self.nonces.next().to_string();
                params.insert_first(NONCE_PARAM, nonce.clone());
                nonce
            }
        };

        let body = params.encode()?;
        let path = format!("/{}/private/{}", self.api_version, method);
        let signer = RequestSigner::new(credentials, &path);
        let signature = signer.sign(&nonce, body.as_str());

        let headers = vec![
            (API_KEY_HEADER, signer.api_key().to_string()),
            (API_SIGN_HEADER, signature),
        ];
        let url = format!("{}{}", self.base_url, path);

        Ok(SignedRequest::new(url, path, body, headers))
    }

    /// Call a public method and return the raw envelope
    ///
    /// Errors listed in the envelope are left for the caller to inspect.
    #[instrument(skip(self, params))]
    pub async fn public_envelope<T: DeserializeOwned>(
        &self,
        method: &str,
        params: RequestParams,
    ) -> RestResult<ApiResponse<T>> {
        let request = self.build_public(method, &params)?;
        self.execute(&request).await
    }

    /// Call a private method and return the raw envelope
    #[instrument(skip(self, params))]
    pub async fn private_envelope<T: DeserializeOwned>(
        &self,
        method: &str,
        params: RequestParams,
    ) -> RestResult<ApiResponse<T>> {
        let request = self.sign_private(method, params)?;
        self.execute(&request).await
    }

    /// Call a public method
    ///
    /// # Errors
    /// [`RestError::Transport`], [`RestError::Decode`], or [`RestError::Api`]
    /// when Kraken reports errors.
    pub async fn call_public<T: DeserializeOwned>(&self, method: &str, params: RequestParams) -> RestResult<T> {
        self.public_envelope(method, params).await?.into_result()
    }

    /// Call a private method
    ///
    /// Requires credentials; see [`KrakenRestClient::sign_private`] for nonce
    /// handling.
    pub async fn call_private<T: DeserializeOwned>(&self, method: &str, params: RequestParams) -> RestResult<T> {
        self.private_envelope(method, params).await?.into_result()
    }

    async fn execute<T: DeserializeOwned>(&self, request: &SignedRequest) -> RestResult<ApiResponse<T>> {
        debug!(path = request.path(), body_len = request.body().len(), "Sending request");

        let response = self.transport.post(request).await.map_err(|e| {
            warn!(path = request.path(), error = %e, "Request failed");
            RestError::from(e)
        })?;

        let envelope: ApiResponse<T> = decode_envelope(&response).map_err(|e| {
            warn!(path = request.path(), status = response.status, "Malformed response");
            e
        })?;

        if !envelope.is_success() {
            debug!(path = request.path(), errors = ?envelope.error, "Kraken returned errors");
        }

        Ok(envelope)
    }

    // ========================================================================
    // Endpoint groups
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(self)
    }

    /// Get account endpoints (requires credentials)
    pub fn account(&self) -> RestResult<AccountEndpoints<'_>> {
        self.require_credentials()?;
        Ok(AccountEndpoints::new(self))
    }

    /// Get trading endpoints (requires credentials)
    pub fn trading(&self) -> RestResult<TradingEndpoints<'_>> {
        self.require_credentials()?;
        Ok(TradingEndpoints::new(self))
    }

    /// Get ticker information for trading pairs
    pub async fn get_ticker(&self, pairs: &[&str]) -> RestResult<HashMap<String, TickerInfo>> {
        self.market().ticker(pairs).await
    }

    /// Get account balance
    pub async fn get_balance(&self) -> RestResult<BalanceInfo> {
        self.account()?.balance().await
    }

    /// Place a new order
    pub async fn add_order(&self, order: &OrderRequest) -> RestResult<OrderResponse> {
        self.trading()?.add_order(order).await
    }

    fn require_credentials(&self) -> RestResult<()> {
        if self.has_credentials() {
            Ok(())
        } else {
            Err(RestError::AuthRequired)
        }
    }
}

impl std::fmt::Debug for KrakenRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenRestClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

/// Method names become a URL path segment
fn validate_method(method: &str) -> RestResult<()> {
    if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RestError::InvalidParameter(format!("invalid method name '{}'", method)));
    }
    Ok(())
}
