// ABOUTME: Bearer credential injected into the control-plane channel.
// ABOUTME: Credentials are explicit values with an optional expiry, never fetched ambiently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Environment variable read by [`EnvCredential::default`].
pub const DEFAULT_CREDENTIAL_ENV: &str = "SETTLE_ACCESS_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    Missing(String),

    #[error("environment variable {0} is empty")]
    Empty(String),

    #[error("credential expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("credential rejected by control plane: {0}")]
    Rejected(String),
}

/// An access token with a defined lifetime.
#[derive(Clone)]
pub struct Credential {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// The bearer token, or an error once the credential has expired.
    pub fn bearer(&self) -> Result<&str, CredentialError> {
        match self.expires_at {
            Some(at) if at <= Utc::now() => Err(CredentialError::Expired(at)),
            _ => Ok(&self.token),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of credentials. Failures are fatal and never retried.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credential(&self) -> Result<Credential, CredentialError>;
}

#[async_trait]
impl CredentialProvider for Credential {
    async fn credential(&self) -> Result<Credential, CredentialError> {
        Ok(self.clone())
    }
}

/// Reads a bearer token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_ENV)
    }
}

#[async_trait]
impl CredentialProvider for EnvCredential {
    async fn credential(&self) -> Result<Credential, CredentialError> {
        let token =
            std::env::var(&self.var).map_err(|_| CredentialError::Missing(self.var.clone()))?;
        if token.trim().is_empty() {
            return Err(CredentialError::Empty(self.var.clone()));
        }
        Ok(Credential::new(token.trim()))
    }
}
