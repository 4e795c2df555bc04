//! Credentials, nonces and request signing for Kraken's private REST API
//!
//! This crate holds everything needed to authenticate a private request and
//! performs no I/O itself. The transport lives in `kraken-rest`.
//!
//! # Example
//!
//! ```no_run
//! use kraken_auth::{Credentials, NonceGenerator, RequestSigner};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = Credentials::from_env()?;
//! let nonces = NonceGenerator::new();
//!
//! let nonce = nonces.next().to_string();
//! let body = format!("nonce={}", nonce);
//!
//! let signer = RequestSigner::new(&creds, "/0/private/Balance");
//! let api_sign = signer.sign(&nonce, &body);
//! println!("API-Key: {}\nAPI-Sign: {}", signer.api_key(), api_sign);
//! # Ok(())
//! # }
//! ```

mod credentials;
mod error;
mod nonce;
mod signer;

pub use credentials::{Credentials, API_KEY_ENV, PRIVATE_KEY_ENV};
pub use error::{AuthError, AuthResult};
pub use nonce::{Nonce, NonceGenerator};
pub use signer::{sign, RequestSigner, SIGNATURE_LEN};
