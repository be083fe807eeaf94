use md5::digest::Digest;

/// Incremental hasher fed one chunk at a time.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// MD5, the algorithm behind single-part object-store etags.
///
/// MD5 is used strictly as an integrity signal against accidental
/// corruption, matching what the remote store advertises. It carries no
/// authenticity guarantee.
pub struct Md5Hasher(md5::Md5);

impl Hasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

impl Default for Md5Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5Hasher {
    pub fn new() -> Self {
        Self(md5::Md5::new())
    }

    pub fn digest(data: &[u8]) -> Vec<u8> {
        md5::Md5::digest(data).to_vec()
    }

    /// Lowercase hex digest, the form etags are compared in.
    pub fn hex_digest(data: &[u8]) -> String {
        hex::encode(Self::digest(data))
    }

    /// Finalize as a lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.finalize())
    }
}
