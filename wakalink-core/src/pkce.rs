use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{distr::Alphanumeric, rng, Rng};
use sha2::{Digest, Sha256};

/// Proof Key for Code Exchange (PKCE) parameters.
#[derive(Debug, Clone)]
pub struct Pkce {
    /// High-entropy cryptographic random string
    pub code_verifier: String,
    /// BASE64URL-ENCODE(SHA256(ASCII(code_verifier)))
    pub code_challenge: String,
}

impl Pkce {
    /// The `code_challenge_method` sent with the challenge.
    pub const METHOD: &'static str = "S256";

    /// Generates a new PKCE verifier and challenge.
    pub fn new() -> Self {
        let code_verifier: String = rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        Self::from_verifier(code_verifier)
    }

    /// Derives the challenge for an existing verifier.
    pub fn from_verifier(code_verifier: impl Into<String>) -> Self {
        let code_verifier = code_verifier.into();
        let hash = Sha256::digest(code_verifier.as_bytes());

        Self {
            code_challenge: URL_SAFE_NO_PAD.encode(hash),
            code_verifier,
        }
    }
}

impl Default for Pkce {
    fn default() -> Self {
        Self::new()
    }
}
