//! Web-identity credential exchange.

use chrono::{DateTime, Utc};

use super::{AuthError, Credential};
use crate::options::FederationConfig;
use crate::transport::Transport;

/// Credential lifetime requested from the federation endpoint.
const DURATION_SECONDS: &str = "3600";

/// Trade the configured JWT for temporary credentials.
pub(super) async fn assume_role<T: Transport>(
    transport: &T,
    config: &FederationConfig,
) -> Result<Credential, AuthError> {
    let params = [
        ("Action", "AssumeRoleWithWebIdentity"),
        ("Version", "2011-06-15"),
        ("RoleSessionName", config.role_session_name.as_str()),
        ("DurationSeconds", DURATION_SECONDS),
        ("WebIdentityToken", config.jwt.as_str()),
    ]
    .map(|(name, value)| (name.to_string(), value.to_string()));

    let body = transport
        .post_form(config.endpoint.as_str(), &params)
        .await
        .map_err(|source| AuthError::Exchange {
            url: config.endpoint.to_string(),
            source,
        })?;

    parse_assume_role_response(&body)
}

/// Pull the credential fields out of an `AssumeRoleWithWebIdentityResponse`.
///
/// Lookup is by local element name, ignoring the STS namespace, so both
/// namespaced and bare responses parse.
fn parse_assume_role_response(body: &str) -> Result<Credential, AuthError> {
    let document = roxmltree::Document::parse(body)?;
    let field = |name: &'static str| {
        document
            .descendants()
            .find(|node| node.tag_name().name() == name)
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(AuthError::MissingField(name))
    };

    let expiration = field("Expiration")?;
    let expires_at = DateTime::parse_from_rfc3339(expiration)
        .map_err(|source| AuthError::BadExpiration {
            value: expiration.to_string(),
            source,
        })?
        .with_timezone(&Utc);

    Ok(Credential {
        access_key: field("AccessKeyId")?.to_string(),
        secret_key: field("SecretAccessKey")?.to_string(),
        session_token: field("SessionToken")?.to_string(),
        expires_at,
    })
}
