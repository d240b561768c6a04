//! Request signing for the exchange REST API.
//!
//! Signature = hex(HMAC-SHA256(secret, METHOD + timestamp + path + query + body))
//! where `timestamp` is unix seconds and `query` is `?k=v&...` or empty.
//! The exact body string that is signed must be the one transmitted.

use std::fmt;
use std::sync::Arc;

use deltabot_core::{Clock, SystemClock};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{ExecutorError, ExecutorResult};

type HmacSha256 = Hmac<Sha256>;

/// API key pair. The secret is wiped on drop and never printed.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Load from environment variables.
    ///
    /// # Errors
    /// Returns `ExecutorError::Credentials` if either variable is unset or empty.
    pub fn from_env(key_var: &str, secret_var: &str) -> ExecutorResult<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ExecutorError::Credentials(format!("{name} is not set")))
        };
        let api_key = read(key_var)?;
        let api_secret = Zeroizing::new(read(secret_var)?);
        Ok(Self {
            api_key,
            api_secret,
        })
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

/// String the signature covers.
pub fn prehash(method: &str, timestamp: &str, path: &str, query: &str, body: &str) -> String {
    format!(
        "{}{}{}{}{}",
        method.to_ascii_uppercase(),
        timestamp,
        path,
        query,
        body
    )
}

/// Headers produced by signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    pub timestamp: String,
    pub signature: String,
}

/// Signs requests with HMAC-SHA256.
pub struct RequestSigner {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Hex HMAC-SHA256 of `payload`.
    pub fn signature(&self, payload: &str) -> ExecutorResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| ExecutorError::Credentials(format!("Invalid secret: {e}")))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Sign a request at the current time.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        query: &str,
        body: &str,
    ) -> ExecutorResult<SignedHeaders> {
        let timestamp = self.clock.now_secs().to_string();
        let signature = self.signature(&prehash(method, &timestamp, path, query, body))?;
        Ok(SignedHeaders {
            api_key: self.credentials.api_key.clone(),
            timestamp,
            signature,
        })
    }
}
