//! Legacy S3-style request signing for temporary credentials.
//!
//! The object store expects the exact header shape MinIO's STS gateway
//! validates: an `Authorization: AWS <access_key>:<signature>` header where
//! the signature is the base64 HMAC-SHA1 of a canonical string built from
//! the method, the HTTP date, the session token, and the bucket-qualified
//! resource path. This format is an external-interface contract; it is not
//! interchangeable with other signing schemes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use super::Credential;

/// Everything except unreserved characters and the path separator, matching
/// how the store's own clients quote object keys.
const RESOURCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// IMF-fixdate, the only date form the signature validator accepts.
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Canonical string covered by the signature.
pub fn string_to_sign(
    method: &str,
    date: &str,
    session_token: &str,
    bucket: &str,
    resource: &str,
) -> String {
    format!(
        "{method}\n\n\n{date}\nx-amz-security-token:{session_token}\n/{bucket}/{encoded}",
        encoded = utf8_percent_encode(resource, RESOURCE_ENCODE_SET)
    )
}

/// Base64 HMAC-SHA1 of the canonical string.
pub fn signature(secret_key: &str, to_sign: &str) -> String {
    // HMAC accepts keys of any length, so new_from_slice cannot fail.
    let mut mac = Hmac::<Sha1>::new_from_slice(secret_key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC keys are unsized"));
    mac.update(to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Full header set for one signed request.
pub fn signed_headers(
    method: &str,
    host: &str,
    bucket: &str,
    resource: &str,
    credential: &Credential,
    now: DateTime<Utc>,
) -> Vec<(String, String)> {
    let date = http_date(now);
    let to_sign = string_to_sign(method, &date, &credential.session_token, bucket, resource);
    let authorization = format!(
        "AWS {}:{}",
        credential.access_key,
        signature(&credential.secret_key, &to_sign)
    );
    vec![
        ("Host".to_string(), host.to_string()),
        ("Date".to_string(), date),
        (
            "x-amz-security-token".to_string(),
            credential.session_token.clone(),
        ),
        ("Authorization".to_string(), authorization),
    ]
}
