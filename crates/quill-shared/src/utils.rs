//! Utility functions

use sha2::{Digest, Sha256};

/// Short, non-reversible identifier for a bearer token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

/// Strips the `Bearer ` scheme from an `Authorization` header value.
/// The scheme name is matched case-insensitively.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let prefix = crate::constants::BEARER_PREFIX;
    let scheme = header.get(..prefix.len())?;
    if !scheme.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let token = header[prefix.len()..].trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
