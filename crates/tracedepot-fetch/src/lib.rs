//! On-demand trace artifact downloading with integrity-checked caching.
//!
//! Replay jobs reference large, immutable binary traces by a path relative
//! to a remote object store. [`ArtifactCache::ensure_file`] guarantees that
//! path exists under a local cache root and holds the verified bytes, either
//! by short-circuiting on an already-valid copy or by downloading a fresh
//! one. A cached copy is never silently used when the remote's integrity
//! signals say it is stale.
//!
//! # Architecture
//!
//! - [`Transport`] - minimal HTTP seam (`head` / `get` / `post_form`) so
//!   every policy above it is testable with a scripted transport
//! - [`auth`] - static bearer tokens, or temporary credentials exchanged
//!   for a JWT at a federation endpoint and used to sign requests
//! - [`Downloader`] - bounded retries with exponential backoff, streaming
//!   writes into a staging file, verification before atomic placement
//! - [`ArtifactCache`] - the cache-root orchestrator callers use
//!
//! # Key guarantees
//!
//! - **Single-pass**: bytes are hashed while they stream to disk
//! - **Atomic placement**: a failed or in-progress download is never
//!   observable at the artifact's final path
//! - **Typed failures**: transient attempt errors are absorbed up to the
//!   retry budget; anything past that surfaces as one [`FetchError`]

pub use self::cache::ArtifactCache;
pub use self::download::Downloader;
pub use self::error::{FetchError, Result};
pub use self::options::{
    AuthConfig, DEFAULT_RETRIES, DEFAULT_RETRY_BACKOFF, FederationConfig, FetchOptions,
};
pub use self::retry::retry_delay;
pub use self::transport::{BodyStream, ResponseParts, Transport, TransportError};

#[cfg(feature = "reqwest")]
pub use self::transport::ReqwestTransport;

pub mod auth;
mod cache;
mod download;
mod error;
mod options;
mod retry;
mod transport;
