//! The response envelope wrapping every Kraken REST payload

use crate::error::{RestError, RestResult};
use crate::error_codes::ApiError;
use crate::transport::HttpResponse;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Kraken response envelope: `{"error": [...], "result": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Error messages (empty if successful)
    pub error: Vec<String>,
    /// Result data (present if successful)
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Parsed entries of the error list
    pub fn api_errors(&self) -> Vec<ApiError> {
        ApiError::parse_many(&self.error)
    }

    /// Get the result, turning a populated error list into [`RestError::Api`]
    ///
    /// A list holding only `W`-prefixed warnings does not fail the call when
    /// a result is present; the warnings are logged and the result returned.
    /// An envelope with neither errors nor a result is malformed and is
    /// reported as [`RestError::Decode`].
    pub fn into_result(self) -> RestResult<T> {
        if !self.error.is_empty() {
            let warnings_only = self.api_errors().iter().all(|e| e.is_warning);
            match self.result {
                Some(result) if warnings_only => {
                    warn!(warnings = ?self.error, "Kraken returned warnings");
                    return Ok(result);
                }
                _ => return Err(RestError::from_api_errors(self.error)),
            }
        }
        self.result.ok_or_else(|| RestError::Decode {
            status: None,
            message: "envelope has an empty error list and no result".to_string(),
        })
    }
}

/// Decode raw response bytes into an envelope
///
/// The envelope is read first with an untyped `result`. Any body that is not
/// a JSON object with an `error` array is a [`RestError::Decode`], whatever
/// the HTTP status was. A `result` that does not fit `T` is a
/// [`RestError::Decode`] only when the error list is empty; otherwise it is
/// dropped so the exchange errors reach the caller.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    response: &HttpResponse,
) -> RestResult<ApiResponse<T>> {
    let raw: ApiResponse<Value> = serde_json::from_slice(&response.body).map_err(|e| RestError::Decode {
        status: Some(response.status),
        message: format!("{} (body: {})", e, preview(&response.body)),
    })?;

    let result = match raw.result {
        None => None,
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(typed) => Some(typed),
            Err(_) if !raw.error.is_empty() => None,
            Err(e) => {
                return Err(RestError::Decode {
                    status: Some(response.status),
                    message: format!("unexpected result shape: {} (body: {})", e, preview(&response.body)),
                })
            }
        },
    };

    Ok(ApiResponse {
        error: raw.error,
        result,
    })
}

fn preview(body: &[u8]) -> String {
    const MAX: usize = 128;
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= MAX {
        text.into_owned()
    } else {
        let mut cut: String = text.chars().take(MAX).collect();
        cut.push_str("...");
        cut
    }
}
