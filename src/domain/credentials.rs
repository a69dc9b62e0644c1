//! API credentials.

use std::fmt;

use super::error::BotError;

/// API key and secret for the venue. The secret never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// # Errors
    /// `BotError::Connection` if either value is blank.
    pub fn new(api_key: &str, api_secret: &str) -> Result<Self, BotError> {
        let api_key = api_key.trim();
        let api_secret = api_secret.trim();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(BotError::Connection(
                "API key and secret must both be non-empty".into(),
            ));
        }
        Ok(Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("key", "   ").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("key", "hunter2").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("hunter2"));
    }
}
