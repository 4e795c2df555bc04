//! Error types for authentication operations

/// Errors raised while building credentials or signing material
///
/// None of these involve I/O; they always indicate bad configuration.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid API credentials (e.g. a secret that is not valid base64)
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
