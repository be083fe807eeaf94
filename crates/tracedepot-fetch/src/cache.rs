//! The cache orchestrator: the one entry point callers use.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracedepot_verify::{Hasher, IntegrityDescriptor, Md5Hasher};
use tracing::{debug, warn};

use crate::auth::{CredentialProvider, sign};
use crate::download::Downloader;
use crate::error::{FetchError, Result};
use crate::options::{AuthConfig, FetchOptions};
use crate::transport::Transport;

/// A local mirror of remote trace artifacts, keyed by relative path.
///
/// The cache root mirrors the remote hierarchy exactly; no sidecar metadata
/// is kept. The cache never evicts on its own: entries are only replaced
/// when validation fails against fresh remote integrity signals or when
/// [`FetchOptions::force`] is set.
pub struct ArtifactCache<T: Transport> {
    root: PathBuf,
    options: FetchOptions,
    transport: T,
    credentials: CredentialProvider,
}

impl<T: Transport> ArtifactCache<T> {
    pub fn new(root: impl Into<PathBuf>, options: FetchOptions, transport: T) -> Self {
        Self {
            root: root.into(),
            options,
            transport,
            credentials: CredentialProvider::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Guarantee `relative_path` exists under the cache root and holds the
    /// verified artifact bytes; returns the local path.
    ///
    /// An existing copy that validates against the remote's current
    /// integrity descriptor is used as-is (a HEAD is issued to obtain the
    /// descriptor; absent any signal the copy is trusted). Anything else
    /// falls through to a verified, atomically placed download.
    pub async fn ensure_file(&self, relative_path: &str) -> Result<PathBuf> {
        let local = self.local_path(relative_path)?;

        let Some(url) = self.options.remote_url(relative_path) else {
            return if tokio::fs::try_exists(&local).await? {
                Ok(local)
            } else {
                Err(FetchError::MissingArtifact { path: local })
            };
        };

        let mut integrity_hint = None;
        if !self.options.force && tokio::fs::try_exists(&local).await? {
            let headers = self.request_headers("HEAD", relative_path).await?;
            let parts = self
                .transport
                .head(&url, &headers)
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.clone(),
                    attempts: 1,
                    source,
                })?;
            let descriptor = IntegrityDescriptor::new(parts.content_length, parts.etag);
            if local_file_matches(&local, &descriptor).await? {
                debug!(path = %local.display(), "cached artifact is valid, skipping download");
                return Ok(local);
            }
            warn!(path = %local.display(), %url, "cached artifact failed validation, re-downloading");
            integrity_hint = Some(descriptor);
        }

        let headers = self.request_headers("GET", relative_path).await?;
        Downloader::new(
            &self.transport,
            self.options.retries,
            self.options.retry_backoff,
        )
        .download(&url, &headers, &local, integrity_hint.as_ref())
        .await?;
        Ok(local)
    }

    /// Resolve a relative artifact path under the cache root, rejecting
    /// anything that would land outside it.
    fn local_path(&self, relative_path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(FetchError::PathEscapesRoot {
                path: relative.to_path_buf(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Authentication headers for one request, per the configured scheme.
    async fn request_headers(
        &self,
        method: &str,
        relative_path: &str,
    ) -> Result<Vec<(String, String)>> {
        match &self.options.auth {
            AuthConfig::None => Ok(Vec::new()),
            AuthConfig::Bearer { token } => Ok(vec![(
                "Authorization".to_string(),
                format!("Bearer {token}"),
            )]),
            AuthConfig::Federation(federation) => {
                let credential = self
                    .credentials
                    .resolve(&self.transport, federation)
                    .await?;
                Ok(sign::signed_headers(
                    method,
                    &self.store_host(),
                    &federation.bucket,
                    relative_path,
                    &credential,
                    Utc::now(),
                ))
            }
        }
    }

    /// Host (netloc) of the download URL, covered by the signature.
    fn store_host(&self) -> String {
        let Some(base) = self.options.base_url.as_ref() else {
            return String::new();
        };
        let host = base.host_str().unwrap_or_default();
        match base.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

/// Whether an existing local file satisfies a remote integrity descriptor.
///
/// The file is only hashed when the descriptor carries a hash; a
/// length-only descriptor is settled from filesystem metadata.
async fn local_file_matches(path: &Path, descriptor: &IntegrityDescriptor) -> Result<bool> {
    let length = tokio::fs::metadata(path).await?.len();
    let hash = match descriptor.content_hash {
        Some(_) => md5_of_file(path).await?,
        None => String::new(),
    };
    Ok(descriptor.check(length, &hash).is_ok())
}

async fn md5_of_file(path: &Path) -> Result<String> {
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize_hex())
}
