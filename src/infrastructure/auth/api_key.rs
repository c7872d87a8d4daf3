//! Static API key verification

use sha2::{Digest, Sha256};

/// Checks presented `x-api-key` values against configured keys
///
/// Only SHA-256 digests are kept in memory. With no keys configured every
/// request is accepted.
#[derive(Clone, Default)]
pub struct ApiKeyVerifier {
    digests: Vec<[u8; 32]>,
}

impl std::fmt::Debug for ApiKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyVerifier")
            .field("keys", &self.digests.len())
            .finish()
    }
}

impl ApiKeyVerifier {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| digest(&k))
            .collect();

        Self { digests }
    }

    pub fn is_enabled(&self) -> bool {
        !self.digests.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.digests.len()
    }

    pub fn verify(&self, presented: Option<&str>) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let Some(presented) = presented.map(str::trim).filter(|k| !k.is_empty()) else {
            return false;
        };

        let candidate = digest(presented);
        self.digests
            .iter()
            .fold(false, |found, known| found | constant_time_eq(known, &candidate))
    }

    /// Hex digest used to identify a key in logs without revealing it
    pub fn fingerprint(key: &str) -> String {
        hex::encode(&digest(key.trim())[..6])
    }
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
