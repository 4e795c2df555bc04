//! Error types for REST API operations

use crate::error_codes::ApiError;
use crate::transport::TransportError;
use kraken_auth::AuthError;

/// Errors that can occur during REST API operations
///
/// Every call ends in exactly one of these or a decoded result:
/// - [`RestError::Transport`]: the HTTP exchange did not complete
/// - [`RestError::Decode`]: a response arrived but is not a Kraken envelope
/// - [`RestError::Api`]: Kraken answered and rejected the request
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Invalid client configuration (bad secret, missing env var, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing API credentials for private endpoint
    #[error("Authentication required for this endpoint")]
    AuthRequired,

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The HTTP exchange failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body is not a well-formed envelope
    #[error("Decode error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Decode {
        /// HTTP status of the response, when one was received
        status: Option<u16>,
        /// What went wrong
        message: String,
    },

    /// Kraken returned errors in the envelope
    #[error("API error: {message}")]
    Api {
        /// Parsed errors, in the order Kraken sent them
        errors: Vec<ApiError>,
        /// Original error strings joined with ", "
        message: String,
    },
}

impl RestError {
    /// Create an API error from error strings returned by Kraken
    pub fn from_api_errors(errors: Vec<String>) -> Self {
        let message = errors.join(", ");
        Self::Api {
            errors: ApiError::parse_many(&errors),
            message,
        }
    }

    /// Parsed exchange errors, empty for every other variant
    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            Self::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The exchange rejected the request's nonce
    pub fn is_nonce_error(&self) -> bool {
        self.api_errors().iter().any(ApiError::is_nonce_error)
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.api_errors().iter().any(ApiError::is_rate_limit)
    }

    /// Whether the caller may reissue the call
    ///
    /// The client never retries on its own. A retry must be a new call so
    /// that it gets a fresh nonce.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { errors, .. } => !errors.is_empty() && errors.iter().all(ApiError::is_retryable),
            Self::Configuration(_)
            | Self::AuthRequired
            | Self::InvalidParameter(_)
            | Self::Decode { .. } => false,
        }
    }
}

impl From<AuthError> for RestError {
    fn from(error: AuthError) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
