//! PKCE verifier and challenge generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use httpiness_domain::auth::PkceMethod;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a verifier.
const VERIFIER_BYTES: usize = 28;

/// Returns a fresh verifier: 28 random bytes, hex encoded.
#[must_use]
pub fn generate_verifier() -> String {
    let mut bytes = [0_u8; VERIFIER_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derives the challenge sent with the authorization request.
#[must_use]
pub fn challenge(verifier: &str, method: PkceMethod) -> Option<String> {
    match method {
        PkceMethod::None => None,
        PkceMethod::Plain => Some(verifier.to_string()),
        PkceMethod::S256 => Some(URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_shape() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 56);
        assert!(verifier.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(verifier, generate_verifier());
    }

    #[test]
    fn test_s256_challenge() {
        // RFC 7636 appendix B.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            challenge(verifier, PkceMethod::S256).as_deref(),
            Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM")
        );
    }

    #[test]
    fn test_plain_and_none() {
        assert_eq!(challenge("abc", PkceMethod::Plain).as_deref(), Some("abc"));
        assert_eq!(challenge("abc", PkceMethod::None), None);
    }
}
