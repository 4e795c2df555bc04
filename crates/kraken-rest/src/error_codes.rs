//! Classification of the error strings Kraken returns in a response envelope
//!
//! Kraken reports business failures as strings of the form
//! `"<severity><category>:<message>"`, e.g. `"EOrder:Insufficient funds"` or
//! `"WGeneral:..."` for warnings. They arrive with HTTP 200 and are not
//! failures of this client.

use std::fmt;

/// Error category, taken from the prefix before the first `:`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// `EAPI` - authentication, nonce and request format
    Api,
    /// `EGeneral`
    General,
    /// `EService` - exchange availability
    Service,
    /// `EOrder` - order placement and management
    Order,
    /// `EFunding` - deposits and withdrawals
    Funding,
    /// `EQuery`
    Query,
    /// `ETrade`
    Trade,
    /// Anything else
    Unknown,
}

impl ErrorCategory {
    fn from_prefix(prefix: &str) -> Self {
        // The first character is the severity (E or W)
        match prefix.get(1..) {
            Some("API") => Self::Api,
            Some("General") => Self::General,
            Some("Service") => Self::Service,
            Some("Order") => Self::Order,
            Some("Funding") => Self::Funding,
            Some("Query") => Self::Query,
            Some("Trade") => Self::Trade,
            _ => Self::Unknown,
        }
    }
}

/// Error codes the client gives special meaning to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// EAPI:Invalid nonce
    InvalidNonce,
    /// EAPI:Invalid key
    InvalidKey,
    /// EAPI:Invalid signature
    InvalidSignature,
    /// EAPI:Rate limit exceeded
    RateLimitExceeded,
    /// EAPI:Bad request
    BadRequest,
    /// EGeneral:Invalid arguments
    InvalidArguments,
    /// EGeneral:Permission denied
    PermissionDenied,
    /// EGeneral:Unknown method
    UnknownMethod,
    /// EGeneral:Temporary lockout
    TemporaryLockout,
    /// EGeneral:Too many requests
    TooManyRequests,
    /// EGeneral:Internal error
    InternalError,
    /// EService:Unavailable
    ServiceUnavailable,
    /// EService:Busy
    ServiceBusy,
    /// EService:Deadline elapsed
    DeadlineElapsed,
    /// EQuery:Unknown asset pair
    UnknownAssetPair,
    /// EOrder:Insufficient funds
    InsufficientFunds,
    /// EOrder:Unknown order
    UnknownOrder,
    /// EOrder:Rate limit exceeded
    OrderRateLimitExceeded,
    /// EOrder:Order minimum not met
    OrderMinimumNotMet,
}

impl ErrorCode {
    /// Look up a code by its exact Kraken string
    pub fn lookup(raw: &str) -> Option<Self> {
        Some(match raw {
            "EAPI:Invalid nonce" => Self::InvalidNonce,
            "EAPI:Invalid key" => Self::InvalidKey,
            "EAPI:Invalid signature" => Self::InvalidSignature,
            "EAPI:Rate limit exceeded" => Self::RateLimitExceeded,
            "EAPI:Bad request" => Self::BadRequest,
            "EGeneral:Invalid arguments" => Self::InvalidArguments,
            "EGeneral:Permission denied" => Self::PermissionDenied,
            "EGeneral:Unknown method" => Self::UnknownMethod,
            "EGeneral:Temporary lockout" => Self::TemporaryLockout,
            "EGeneral:Too many requests" => Self::TooManyRequests,
            "EGeneral:Internal error" => Self::InternalError,
            "EService:Unavailable" => Self::ServiceUnavailable,
            "EService:Busy" => Self::ServiceBusy,
            "EService:Deadline elapsed" => Self::DeadlineElapsed,
            "EQuery:Unknown asset pair" => Self::UnknownAssetPair,
            "EOrder:Insufficient funds" => Self::InsufficientFunds,
            "EOrder:Unknown order" => Self::UnknownOrder,
            "EOrder:Rate limit exceeded" => Self::OrderRateLimitExceeded,
            "EOrder:Order minimum not met" => Self::OrderMinimumNotMet,
            _ => return None,
        })
    }
}

/// One parsed entry of an envelope's `error` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The string exactly as Kraken sent it
    pub raw: String,
    /// Category from the prefix
    pub category: ErrorCategory,
    /// Known code, if recognized
    pub code: Option<ErrorCode>,
    /// Text after the prefix
    pub message: String,
    /// `true` for `W`-prefixed warnings
    pub is_warning: bool,
}

impl ApiError {
    /// Parse a Kraken error string
    pub fn parse(raw: &str) -> Self {
        let (category, message) = match raw.split_once(':') {
            Some((prefix, message)) => (ErrorCategory::from_prefix(prefix), message.trim()),
            None => (ErrorCategory::Unknown, raw.trim()),
        };

        Self {
            raw: raw.to_string(),
            category,
            code: ErrorCode::lookup(raw),
            message: message.to_string(),
            is_warning: raw.starts_with('W'),
        }
    }

    /// Parse every entry of an envelope's error list
    pub fn parse_many<S: AsRef<str>>(errors: &[S]) -> Vec<Self> {
        errors.iter().map(|e| Self::parse(e.as_ref())).collect()
    }

    /// The request was rejected because of its nonce
    pub fn is_nonce_error(&self) -> bool {
        self.code == Some(ErrorCode::InvalidNonce)
    }

    /// Key, signature or permission problem
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.code,
            Some(ErrorCode::InvalidKey | ErrorCode::InvalidSignature | ErrorCode::PermissionDenied)
        )
    }

    /// Any of Kraken's rate limit responses
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self.code,
            Some(
                ErrorCode::RateLimitExceeded
                    | ErrorCode::TooManyRequests
                    | ErrorCode::OrderRateLimitExceeded
                    | ErrorCode::TemporaryLockout
            )
        )
    }

    /// Sending the same request again later (with a fresh nonce) may succeed
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limit()
            || matches!(
                self.code,
                Some(ErrorCode::ServiceUnavailable | ErrorCode::ServiceBusy | ErrorCode::DeadlineElapsed)
            )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nonce_error() {
        let error = ApiError::parse("EAPI:Invalid nonce");
        assert_eq!(error.category, ErrorCategory::Api);
        assert_eq!(error.code, Some(ErrorCode::InvalidNonce));
        assert_eq!(error.message, "Invalid nonce");
        assert!(error.is_nonce_error());
        assert!(!error.is_retryable());
        assert!(!error.is_warning);
    }

    #[test]
    fn test_parse_order_error() {
        let error = ApiError::parse("EOrder:Insufficient funds");
        assert_eq!(error.category, ErrorCategory::Order);
        assert_eq!(error.code, Some(ErrorCode::InsufficientFunds));
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "EOrder:Insufficient funds");
    }

    #[test]
    fn test_parse_service_and_rate_limit() {
        assert!(ApiError::parse("EService:Unavailable").is_retryable());
        assert!(ApiError::parse("EAPI:Rate limit exceeded").is_rate_limit());
        assert!(ApiError::parse("EGeneral:Temporary lockout").is_retryable());
    }

    #[test]
    fn test_parse_auth_error() {
        assert!(ApiError::parse("EAPI:Invalid signature").is_auth_error());
        assert!(ApiError::parse("EGeneral:Permission denied").is_auth_error());
    }

    #[test]
    fn test_parse_unknown_and_detailed() {
        let error = ApiError::parse("EGeneral:Invalid arguments:volume");
        assert_eq!(error.category, ErrorCategory::General);
        assert_eq!(error.code, None);
        assert_eq!(error.message, "Invalid arguments:volume");

        let error = ApiError::parse("something odd");
        assert_eq!(error.category, ErrorCategory::Unknown);
        assert_eq!(error.message, "something odd");
    }

    #[test]
    fn test_parse_warning() {
        let error = ApiError::parse("WGeneral:Deprecated endpoint");
        assert!(error.is_warning);
        assert_eq!(error.category, ErrorCategory::General);
    }

    #[test]
    fn test_parse_many() {
        let errors = ApiError::parse_many(&["EAPI:Invalid key", "EOrder:Unknown order"]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].code, Some(ErrorCode::UnknownOrder));
    }
}
