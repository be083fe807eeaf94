//! The retrying downloader: one logical download, bounded attempts.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracedepot_verify::{Hasher, IntegrityDescriptor, Md5Hasher};
use tracing::{debug, warn};

use crate::error::{AttemptError, Result};
use crate::retry::retry_delay;
use crate::transport::Transport;

/// Downloads one URL into one destination, retrying transient failures.
///
/// Each attempt streams the body into a temporary file next to the
/// destination, hashing as it writes, and verifies the result before the
/// temporary file is atomically renamed over the destination. A failed
/// attempt leaves nothing behind; a failed download leaves the destination
/// untouched.
pub struct Downloader<'a, T: Transport> {
    transport: &'a T,
    retries: u32,
    backoff: Duration,
}

impl<'a, T: Transport> Downloader<'a, T> {
    pub fn new(transport: &'a T, retries: u32, backoff: Duration) -> Self {
        Self {
            transport,
            retries: retries.max(1),
            backoff,
        }
    }

    /// Fetch `url` into `dest`.
    ///
    /// `integrity_hint` carries a descriptor learned from an earlier HEAD;
    /// with `None`, the descriptor is derived from the GET response itself.
    /// Transport errors, timeouts, and verification failures all count
    /// against the attempt budget; whichever kind the final attempt died of
    /// is the terminal error.
    pub async fn download(
        &self,
        url: &str,
        headers: &[(String, String)],
        dest: &Path,
        integrity_hint: Option<&IntegrityDescriptor>,
    ) -> Result<()> {
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut attempt = 0;
        loop {
            match self.attempt(url, headers, dest, integrity_hint).await {
                Ok(bytes) => {
                    debug!(url, bytes, "download complete");
                    return Ok(());
                }
                Err(error) => {
                    attempt += 1;
                    if attempt >= self.retries || !error.is_transient() {
                        return Err(error.into_fetch_error(url, attempt));
                    }
                    warn!(url, attempt, %error, "download attempt failed, retrying");
                    tokio::time::sleep(retry_delay(attempt - 1, self.backoff)).await;
                }
            }
        }
    }

    /// One GET attempt: stream, hash, verify, atomically place.
    async fn attempt(
        &self,
        url: &str,
        headers: &[(String, String)],
        dest: &Path,
        integrity_hint: Option<&IntegrityDescriptor>,
    ) -> std::result::Result<u64, AttemptError> {
        let (parts, mut body) = self.transport.get(url, headers).await?;

        // The hint (from HEAD) wins; the response fills in what it lacks.
        let descriptor = match integrity_hint {
            Some(hint) => IntegrityDescriptor::new(
                hint.content_length.or(parts.content_length),
                hint.content_hash.clone().or_else(|| parts.etag.clone()),
            ),
            None => IntegrityDescriptor::new(parts.content_length, parts.etag.clone()),
        };

        let staging_dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Dropped on any early return, taking the partial file with it.
        let staging = NamedTempFile::new_in(staging_dir)?;

        let mut file = tokio::fs::File::create(staging.path()).await?;
        let mut hasher = Md5Hasher::new();
        let mut received = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            received += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        descriptor.check(received, &hasher.finalize_hex())?;

        staging.persist(dest).map_err(|e| AttemptError::Io(e.error))?;
        Ok(received)
    }
}
