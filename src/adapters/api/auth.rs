//! Venue Authentication — HMAC-SHA256 Request Signing
//!
//! Signed endpoints take `timestamp` and `recvWindow` in the query string
//! and a trailing `signature` parameter computed as
//! `hex(HMAC-SHA256(secret, query_string))`. The API key travels in the
//! `X-MBX-APIKEY` header; the secret is never sent.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Credentials;

/// Header carrying the API key. Static header names must be lowercase.
pub const API_KEY_HEADER: &str = "x-mbx-apikey";

/// Signs query strings for the futures REST API.
pub struct RequestSigner {
    credentials: Credentials,
    recv_window_ms: u64,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, recv_window_ms: u64) -> Self {
        Self {
            credentials,
            recv_window_ms,
        }
    }

    /// Get the API key for request headers.
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Current Unix time in milliseconds.
    pub fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// `hex(HMAC-SHA256(secret, payload))`.
    pub fn sign(&self, payload: &str) -> String {
        let mac = hmac_sha256::HMAC::mac(
            payload.as_bytes(),
            self.credentials.api_secret().as_bytes(),
        );
        hex::encode(mac)
    }

    /// Validity window sent with every signed request.
    pub fn recv_window_ms(&self) -> u64 {
        self.recv_window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example key pair and request from the venue's API documentation.
    const DOC_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    fn signer(recv_window_ms: u64) -> RequestSigner {
        let creds = Credentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            DOC_SECRET,
        )
        .unwrap();
        RequestSigner::new(creds, recv_window_ms)
    }

    #[test]
    fn test_sign_matches_documented_example() {
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            signer(5000).sign(payload),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let other = RequestSigner::new(Credentials::new("k", "another-secret").unwrap(), 5000);
        assert_ne!(other.sign("timestamp=1"), signer(5000).sign("timestamp=1"));
        assert_eq!(other.sign("timestamp=1").len(), 64);
    }
}
