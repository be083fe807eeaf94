//! Authentication for object-store requests.
//!
//! Two schemes, selected by [`AuthConfig`](crate::AuthConfig): a static
//! bearer token attached verbatim, or web-identity federation where a JWT is
//! exchanged for a temporary key/secret/session-token triple that signs each
//! request. Exchanged credentials are cached until shortly before their
//! stated expiration; a failed exchange is fatal and never retried, since it
//! indicates misconfiguration rather than transient network noise.

pub mod sign;

mod federation;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::options::FederationConfig;
use crate::transport::{Transport, TransportError};

/// Temporary credentials from a web-identity exchange.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Don't use a credential that would die mid-request.
const EXPIRY_MARGIN_SECS: i64 = 60;

impl Credential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credential exchange with {url} failed: {source}")]
    Exchange {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("federation response is not well-formed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    #[error("federation response is missing {0}")]
    MissingField(&'static str),

    #[error("invalid credential expiration '{value}': {source}")]
    BadExpiration {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Lazily exchanges and caches a federation [`Credential`].
///
/// The cache slot doubles as a single-flight guard: the lock is held across
/// the exchange, so concurrent resolvers either reuse the cached credential
/// or await the one in-flight exchange instead of issuing their own.
#[derive(Debug, Default)]
pub struct CredentialProvider {
    cached: Mutex<Option<Credential>>,
}

impl CredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a live credential, exchanging the configured JWT if the cached
    /// one is absent or expired.
    pub async fn resolve<T: Transport>(
        &self,
        transport: &T,
        config: &FederationConfig,
    ) -> Result<Credential, AuthError> {
        let mut slot = self.cached.lock().await;
        if let Some(credential) = slot.as_ref()
            && !credential.is_expired_at(Utc::now())
        {
            return Ok(credential.clone());
        }

        let credential = federation::assume_role(transport, config).await?;
        debug!(
            endpoint = %config.endpoint,
            expires_at = %credential.expires_at,
            "assumed web identity role"
        );
        *slot = Some(credential.clone());
        Ok(credential)
    }
}
