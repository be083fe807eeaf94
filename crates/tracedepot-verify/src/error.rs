use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("content length mismatch: remote declared {expected} bytes, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: remote etag {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
