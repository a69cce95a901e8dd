//! Content hashing using blake3.
//!
//! Section ids are derived from the serialized section HTML, so identical
//! content always produces the same id across rebuilds.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint("<div>...</div>"); // -> "a1b2c3d4"
//! ```

/// Number of hash bytes kept in a fingerprint (8 hex chars).
const FINGERPRINT_BYTES: usize = 4;

/// Compute blake3 hash and return the leading bytes as an 8-char hex fingerprint.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    let hash = blake3::hash(value.as_ref());
    hex::encode(&hash.as_bytes()[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length() {
        assert_eq!(fingerprint("hello").len(), 8);
        assert_eq!(fingerprint("").len(), 8);
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("<p>a</p>"), fingerprint("<p>a</p>"));
        assert_ne!(fingerprint("<p>a</p>"), fingerprint("<p>b</p>"));
    }

    #[test]
    fn test_fingerprint_is_hex() {
        assert!(fingerprint("x").chars().all(|c| c.is_ascii_hexdigit()));
    }
}
