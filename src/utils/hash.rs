//! URL 해시 모듈.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of a URL.
///
/// Used to build fixed-length storage keys regardless of the URL length.
#[must_use]
pub fn hash_url(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_url_known_value() {
        assert_eq!(
            hash_url(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_url_is_hex_64() {
        let hash = hash_url("https://planetpython.org/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_url_distinguishes_urls() {
        assert_ne!(
            hash_url("https://example.com/a"),
            hash_url("https://example.com/b")
        );
        assert_eq!(
            hash_url("https://example.com/a"),
            hash_url("https://example.com/a")
        );
    }
}
