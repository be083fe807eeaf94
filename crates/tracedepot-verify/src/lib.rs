//! Integrity primitives for cached trace artifacts.
//!
//! Object stores advertise two integrity signals for a stored object: the
//! `Content-Length` header and an `etag` header carrying the MD5 hex digest
//! of the body. This crate models that pair as an [`IntegrityDescriptor`] and
//! provides the incremental [`Hasher`] used to compute digests while bytes
//! stream through, so a download is hashed in the same pass that writes it.
//!
//! # Example
//!
//! ```
//! use tracedepot_verify::{IntegrityDescriptor, Md5Hasher};
//!
//! let body = b"hello world";
//! let descriptor = IntegrityDescriptor::new(
//!     Some(body.len() as u64),
//!     Some(Md5Hasher::hex_digest(body)),
//! );
//!
//! assert!(descriptor.check(body.len() as u64, &Md5Hasher::hex_digest(body)).is_ok());
//! ```

pub use self::descriptor::IntegrityDescriptor;
pub use self::error::{Result, VerifyError};
pub use self::hasher::{Hasher, Md5Hasher};

mod descriptor;
mod error;
mod hasher;
