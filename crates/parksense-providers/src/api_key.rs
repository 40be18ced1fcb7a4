//! Credential handling for provider access
//!
//! The credential is resolved from its source on every lookup, so a source
//! backed by the environment picks up changes made at runtime. Secrets are
//! never printed: `Credential`'s `Debug` output is redacted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable consulted by default.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A provider secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building the authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Present but unusable (empty or whitespace only).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Where the provider credential comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// A fixed value; `None` means no credential is configured
    Static(Option<String>),
    /// Read the named environment variable on each lookup
    Env(String),
}

impl Default for CredentialSource {
    fn default() -> Self {
        CredentialSource::Env(DEFAULT_API_KEY_ENV.to_string())
    }
}

impl CredentialSource {
    /// Source that never yields a credential.
    pub fn none() -> Self {
        CredentialSource::Static(None)
    }

    pub fn fixed(secret: impl Into<String>) -> Self {
        CredentialSource::Static(Some(secret.into()))
    }

    /// Look the credential up. `None` means it is absent.
    pub fn resolve(&self) -> Option<Credential> {
        match self {
            CredentialSource::Static(value) => value.clone().map(Credential),
            CredentialSource::Env(var) => std::env::var(var).ok().map(Credential),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }
}
