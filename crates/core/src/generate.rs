//! # Generate
//!
//! Generate random strings for use in authorization codes, tokens, request
//! URIs and correlation values.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;

const TOKEN_LEN: usize = 32;

/// Generates a base64url encoded random string for an authorization code.
#[must_use]
pub fn auth_code() -> String {
    random_token(TOKEN_LEN)
}

/// Generates a base64url encoded random string for an access token.
#[must_use]
pub fn token() -> String {
    random_token(TOKEN_LEN)
}

/// Generates a base64url encoded random string for a pushed authorization
/// `request_uri`.
#[must_use]
pub fn uri_token() -> String {
    random_token(TOKEN_LEN)
}

/// Generates a base64url encoded string from `len` random bytes drawn from
/// the thread-local CSPRNG.
#[must_use]
pub fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_url_safe() {
        let a = auth_code();
        let b = auth_code();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
