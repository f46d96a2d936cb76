use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length in bytes of a SHA-256 digest.
pub const SHA256_LEN: usize = 32;

/// A finalized SHA-256 digest.
///
/// Digests appear in two places: computed over the bytes of an archive entry,
/// and parsed from a `SHA256SUMS` manifest line. Verification compares the two
/// byte-for-byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sha256Digest([u8; SHA256_LEN]);

impl Sha256Digest {
    /// Wrap a pre-computed hash.
    pub fn from_hash(hash: [u8; SHA256_LEN]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; SHA256_LEN] {
        &self.0
    }

    /// Lowercase hex encoding, as written in `SHA256SUMS`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string. Case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != SHA256_LEN {
            return Err(TypeError::InvalidLength {
                expected: SHA256_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SHA256_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.short_hex())
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; SHA256_LEN]> for Sha256Digest {
    fn from(bytes: [u8; SHA256_LEN]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let digest = Sha256Digest::from_hash([0xAB; 32]);
        let parsed = Sha256Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let lower = Sha256Digest::from_hash([0xCD; 32]);
        let upper = Sha256Digest::from_hex(&lower.to_hex().to_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Sha256Digest::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn non_hex_is_rejected() {
        let err = Sha256Digest::from_hex(&"zz".repeat(32)).unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn display_is_full_hex() {
        let digest = Sha256Digest::from_hash([1; 32]);
        let display = format!("{digest}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, digest.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(Sha256Digest::from_hash([7; 32]).short_hex().len(), 8);
    }
}
