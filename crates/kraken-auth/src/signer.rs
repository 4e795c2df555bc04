//! Kraken request signing
//!
//! Kraken signature algorithm:
//! 1. SHA256(nonce + POST_data)
//! 2. HMAC-SHA512(private_key, uri_path + SHA256_result)
//! 3. Base64 encode result

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use crate::credentials::Credentials;

type HmacSha512 = Hmac<Sha512>;

/// Length of a raw HMAC-SHA512 signature
pub const SIGNATURE_LEN: usize = 64;

/// Compute the raw signature bytes for a private request
///
/// # Arguments
/// * `secret` - Decoded private key
/// * `path` - API endpoint path (e.g., "/0/private/Balance")
/// * `post_data` - URL-encoded POST body, exactly as it will be sent
/// * `nonce` - The nonce contained in `post_data`
pub fn sign(secret: &[u8], path: &str, post_data: &str, nonce: &str) -> [u8; SIGNATURE_LEN] {
    let mut sha256 = Sha256::new();
    sha256.update(nonce.as_bytes());
    sha256.update(post_data.as_bytes());
    let digest = sha256.finalize();

    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(path.as_bytes());
    mac.update(&digest);

    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    signature
}

/// Signs requests for one endpoint path with a set of credentials
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
    path: &'a str,
}

impl<'a> RequestSigner<'a> {
    /// Create a new request signer
    pub fn new(credentials: &'a Credentials, path: &'a str) -> Self {
        Self { credentials, path }
    }

    /// Endpoint path being signed
    pub fn path(&self) -> &str {
        self.path
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign the request body, returning the `API-Sign` header value
    pub fn sign(&self, nonce: &str, post_data: &str) -> String {
        let signature = self
            .credentials
            .with_secret(|secret| sign(secret, self.path, post_data, nonce));
        BASE64.encode(signature)
    }
}

impl std::fmt::Debug for RequestSigner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", self.credentials)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published example from Kraken's REST authentication guide
    const DOC_SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";
    const DOC_NONCE: &str = "1616492376594";
    const DOC_BODY: &str =
        "nonce=1616492376594&ordertype=limit&pair=XBTUSD&price=37500&type=buy&volume=1.25";
    const DOC_PATH: &str = "/0/private/AddOrder";
    const DOC_SIGNATURE: &str =
        "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ==";

    #[test]
    fn test_known_vector() {
        let creds = Credentials::new("API_KEY", DOC_SECRET).unwrap();
        let signer = RequestSigner::new(&creds, DOC_PATH);
        assert_eq!(signer.sign(DOC_NONCE, DOC_BODY), DOC_SIGNATURE);
    }

    #[test]
    fn test_raw_signature_matches_header() {
        let secret = BASE64.decode(DOC_SECRET).unwrap();
        let raw = sign(&secret, DOC_PATH, DOC_BODY, DOC_NONCE);
        assert_eq!(raw.len(), SIGNATURE_LEN);
        assert_eq!(BASE64.encode(raw), DOC_SIGNATURE);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let secret = BASE64.decode(DOC_SECRET).unwrap();
        let a = sign(&secret, "/0/private/Balance", "nonce=1", "1");
        let b = sign(&secret, "/0/private/Balance", "nonce=1", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_input_affects_signature() {
        let secret = BASE64.decode(DOC_SECRET).unwrap();
        let base = sign(&secret, "/0/private/Balance", "nonce=1", "1");

        assert_ne!(base, sign(&secret, "/0/private/TradeBalance", "nonce=1", "1"));
        assert_ne!(base, sign(&secret, "/0/private/Balance", "nonce=2", "1"));
        assert_ne!(base, sign(&secret, "/0/private/Balance", "nonce=1", "2"));
        assert_ne!(base, sign(b"other secret", "/0/private/Balance", "nonce=1", "1"));
    }

    #[test]
    fn test_signer_debug_redacts_secret() {
        let creds = Credentials::new("API_KEY_12345", DOC_SECRET).unwrap();
        let signer = RequestSigner::new(&creds, DOC_PATH);
        let debug = format!("{:?}", signer);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(DOC_SECRET));
        assert_eq!(signer.api_key(), "API_KEY_12345");
        assert_eq!(signer.path(), DOC_PATH);
    }
}
