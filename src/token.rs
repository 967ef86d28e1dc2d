//! API token checks for the notify endpoints.
//!
//! Only SHA-256 digests of the configured tokens are kept in memory. A
//! presented token is hashed and compared against every digest in constant
//! time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex-encoded SHA-256 of a token.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[derive(Debug, Clone, Default)]
pub struct ApiTokens {
    hashes: Vec<String>,
    required: bool,
}

impl ApiTokens {
    /// Builds the token set from plain tokens; blank ones are ignored.
    pub fn new<I, S>(tokens: I, required: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hashes = tokens
            .into_iter()
            .filter(|t| !t.as_ref().trim().is_empty())
            .map(|t| hash_token(t.as_ref()))
            .collect();
        ApiTokens { hashes, required }
    }

    /// Token checks disabled; every request is accepted.
    pub fn disabled() -> Self {
        ApiTokens {
            hashes: Vec::new(),
            required: false,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if `presented` matches a configured token.
    pub fn is_valid(&self, presented: &str) -> bool {
        let digest = hash_token(presented);
        // Visit every hash so the time taken doesn't reveal which one matched.
        self.hashes.iter().fold(false, |found, hash| {
            found | constant_time_eq(hash.as_bytes(), digest.as_bytes())
        })
    }

    /// Whether a request carrying `presented` may proceed.
    pub fn permits(&self, presented: Option<&str>) -> bool {
        if !self.required {
            return true;
        }
        presented.is_some_and(|t| self.is_valid(t))
    }
}
