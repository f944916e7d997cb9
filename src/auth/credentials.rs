use crate::types::error::CsbError;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;

/// Environment variable holding the access key
pub const ACCESS_KEY_ENV: &str = "CSB_ACCESS_KEY";
/// Environment variable holding the secret key
pub const SECRET_KEY_ENV: &str = "CSB_SECRET_KEY";

/// Access key / secret key pair identifying a CSB caller
///
/// The secret key is kept in a `SecretString`: it is zeroed on drop and never
/// shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: SecretString,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Load credentials from `CSB_ACCESS_KEY` / `CSB_SECRET_KEY`
    ///
    /// A `.env` file in the working directory is honored if present.
    /// Both variables must be set and non-empty.
    pub fn from_env() -> Result<Self, CsbError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through `lookup`, called with each variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CsbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_parts(lookup(ACCESS_KEY_ENV), lookup(SECRET_KEY_ENV))
    }

    /// Pair up optional key material, rejecting absent or partial credentials
    ///
    /// Empty strings count as absent.
    pub fn from_parts(
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Result<Self, CsbError> {
        let access_key = access_key.filter(|k| !k.is_empty());
        let secret_key = secret_key.filter(|k| !k.is_empty());

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Self::new(access_key, secret_key)),
            (None, None) => Err(CsbError::MissingCredentials),
            _ => Err(CsbError::PartialCredentials),
        }
    }

    /// Public identity, safe to log
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Secret key for HMAC computation only. Never log or transmit the result.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Credentials store - maps access key to credentials
#[derive(Clone, Debug, Default)]
pub struct CredentialsStore {
    credentials: Arc<HashMap<String, Credentials>>,
}

impl CredentialsStore {
    /// Create a store keyed by each credential's access key
    pub fn new(credentials: impl IntoIterator<Item = Credentials>) -> Self {
        let credentials = credentials
            .into_iter()
            .map(|c| (c.access_key().to_string(), c))
            .collect();

        Self {
            credentials: Arc::new(credentials),
        }
    }

    /// Get credentials for a given access key
    /// Returns None if the access key is not known
    pub fn get(&self, access_key: &str) -> Option<&Credentials> {
        self.credentials.get(access_key)
    }
}
