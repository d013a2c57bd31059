//! # Proof Key for Code Exchange (RFC 7636)

use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_oidc4vc::Error;
use credibil_oidc4vc::types::CodeChallengeMethod;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const MIN_LEN: usize = 43;
const MAX_LEN: usize = 128;

/// Generate a code challenge from a code verifier using `S256`.
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    Base64UrlUnpadded::encode_string(Sha256::digest(verifier.as_bytes()).as_slice())
}

/// Check a code challenge or verifier is 43 to 128 unreserved characters.
///
/// # Errors
///
/// Returns `InvalidRequest` naming `param` when the value is malformed.
pub fn check_format(param: &str, value: &str) -> Result<(), Error> {
    if !(MIN_LEN..=MAX_LEN).contains(&value.len()) {
        return Err(Error::InvalidRequest(format!(
            "`{param}` must be between {MIN_LEN} and {MAX_LEN} characters"
        )));
    }
    if !value.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
    {
        return Err(Error::InvalidRequest(format!("`{param}` contains invalid characters")));
    }
    Ok(())
}

/// Verify `verifier` against the challenge recorded with the authorization
/// code.
///
/// # Errors
///
/// Returns `InvalidGrant` when the verifier is missing, malformed, or does
/// not match the challenge.
pub fn verify(
    challenge: &str, method: CodeChallengeMethod, verifier: Option<&str>,
) -> Result<(), Error> {
    let Some(verifier) = verifier else {
        return Err(Error::InvalidGrant("`code_verifier` is missing".to_string()));
    };
    if check_format("code_verifier", verifier).is_err() {
        return Err(Error::InvalidGrant("`code_verifier` is malformed".to_string()));
    }

    let computed = match method {
        CodeChallengeMethod::S256 => code_challenge(verifier),
        CodeChallengeMethod::Plain => verifier.to_string(),
    };
    if !bool::from(computed.as_bytes().ct_eq(challenge.as_bytes())) {
        return Err(Error::InvalidGrant("`code_verifier` is invalid".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7636 Appendix B
    const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    #[test]
    fn rfc_example() {
        assert_eq!(code_challenge(VERIFIER), CHALLENGE);
        verify(CHALLENGE, CodeChallengeMethod::S256, Some(VERIFIER)).expect("should verify");
    }

    #[test]
    fn plain() {
        verify(VERIFIER, CodeChallengeMethod::Plain, Some(VERIFIER)).expect("should verify");
    }

    #[test]
    fn mismatch() {
        let other = "xalsLDydJtHwIQZukUyj6boam5vMUaJRWv-BnGCAzcZi3ZTs";
        let err = verify(CHALLENGE, CodeChallengeMethod::S256, Some(other)).unwrap_err();
        assert_eq!(err, Error::InvalidGrant("`code_verifier` is invalid".to_string()));
    }

    #[test]
    fn missing_verifier() {
        let err = verify(CHALLENGE, CodeChallengeMethod::S256, None).unwrap_err();
        assert!(matches!(err, Error::InvalidGrant(_)));
    }

    #[test]
    fn format() {
        assert!(check_format("code_challenge", "short").is_err());
        assert!(check_format("code_challenge", &"a".repeat(129)).is_err());
        assert!(check_format("code_challenge", &format!("{}!", "a".repeat(43))).is_err());
        assert!(check_format("code_challenge", CHALLENGE).is_ok());
    }
}
