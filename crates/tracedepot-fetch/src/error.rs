//! Error types for tracedepot-fetch.

use std::io;
use std::path::PathBuf;

use tracedepot_verify::VerifyError;

use crate::auth::AuthError;
use crate::transport::TransportError;

/// Terminal failure of a fetch, after any retry budget is spent.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no download url configured and '{path}' is not in the local cache")]
    MissingArtifact { path: PathBuf },

    #[error("artifact path '{path}' escapes the cache root")]
    PathEscapesRoot { path: PathBuf },

    #[error("download of {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("download of {url} failed verification after {attempts} attempt(s): {source}")]
    Integrity {
        url: String,
        attempts: u32,
        #[source]
        source: VerifyError,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// One failed download attempt, consumed by the retry loop.
///
/// Kept distinct from [`FetchError`] so "retry this" and "fail the whole
/// fetch" are separate outcomes; only the final attempt's error is promoted.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Integrity(#[from] VerifyError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AttemptError {
    /// Local disk failures are misconfiguration, not network noise.
    pub(crate) fn is_transient(&self) -> bool {
        !matches!(self, AttemptError::Io(_))
    }

    pub(crate) fn into_fetch_error(self, url: &str, attempts: u32) -> FetchError {
        match self {
            AttemptError::Transport(source) => FetchError::Transport {
                url: url.to_string(),
                attempts,
                source,
            },
            AttemptError::Integrity(source) => FetchError::Integrity {
                url: url.to_string(),
                attempts,
                source,
            },
            AttemptError::Io(source) => FetchError::Io(source),
        }
    }
}
