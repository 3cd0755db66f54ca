use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// A proof-key pair for one login attempt.
///
/// Only `challenge` leaves the process: it goes into the authorization URL and
/// is persisted until the redirect returns. The verifier is never stored.
#[derive(Clone)]
pub struct ProofChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl ProofChallenge {
    /// Generates a fresh verifier and its S256 challenge.
    #[must_use]
    pub fn generate() -> Self {
        let verifier = generate_code_verifier();
        let challenge = generate_code_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

impl std::fmt::Debug for ProofChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofChallenge")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}

/// Generates a random code verifier.
///
/// 48 random bytes, base64url without padding: 64 characters from the
/// unreserved set (RFC 7636 allows 43-128).
#[must_use]
pub fn generate_code_verifier() -> String {
    let random_bytes: [u8; 48] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// `challenge = BASE64URL(SHA256(verifier))`
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
