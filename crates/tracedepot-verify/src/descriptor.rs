use crate::error::{Result, VerifyError};

/// The integrity signals a remote object store advertises for one object.
///
/// Either field may be absent. A candidate is valid iff every *present*
/// field matches; with both fields absent nothing can disprove freshness,
/// so the candidate is accepted as-is. Callers that need a stricter policy
/// should check [`is_empty`](Self::is_empty) first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityDescriptor {
    /// Declared body length from `Content-Length`.
    pub content_length: Option<u64>,
    /// MD5 hex digest from the `etag` header, unquoted and lowercased.
    pub content_hash: Option<String>,
}

impl IntegrityDescriptor {
    pub fn new(content_length: Option<u64>, content_hash: Option<String>) -> Self {
        Self {
            content_length,
            content_hash: content_hash.as_deref().map(normalize_etag),
        }
    }

    /// True when the remote offered no integrity signal at all.
    pub fn is_empty(&self) -> bool {
        self.content_length.is_none() && self.content_hash.is_none()
    }

    /// Validate a candidate's byte count and MD5 hex digest.
    ///
    /// The digest is only compared when the descriptor carries a hash, so
    /// callers may pass a digest computed lazily (or a placeholder) when
    /// [`content_hash`](Self::content_hash) is `None`.
    pub fn check(&self, actual_length: u64, actual_hash: &str) -> Result<()> {
        if let Some(expected) = self.content_length
            && expected != actual_length
        {
            return Err(VerifyError::LengthMismatch {
                expected,
                actual: actual_length,
            });
        }
        if let Some(expected) = self.content_hash.as_deref()
            && expected != actual_hash.to_ascii_lowercase()
        {
            return Err(VerifyError::HashMismatch {
                expected: expected.to_string(),
                actual: actual_hash.to_string(),
            });
        }
        Ok(())
    }
}

/// Etags arrive quoted (`"abc"`) from some servers and bare from others.
fn normalize_etag(raw: &str) -> String {
    raw.trim().trim_matches('"').to_ascii_lowercase()
}
