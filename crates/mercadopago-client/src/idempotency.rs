//! Idempotency Keys
//!
//! One key per logical payment attempt, sent as `X-Idempotency-Key`.
//! Keys are UUID v4 text built from an injected random source, so tests
//! can swap in a seeded generator.

use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Builder;

/// Source of the 128 random bits behind each key.
///
/// Not required to be cryptographic: the provider only uses the key to
/// deduplicate retries inside a short window.
pub trait RandomSource: Send + Sync {
    fn fill(&self, bytes: &mut [u8; 16]);
}

/// Thread-local generator from `rand`
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fill(&self, bytes: &mut [u8; 16]) {
        rand::thread_rng().fill_bytes(bytes);
    }
}

/// Deterministic generator for tests and reproducible runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill(&self, bytes: &mut [u8; 16]) {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.fill_bytes(bytes);
    }
}

/// UUID v4 idempotency key (formatted: xxxxxxxx-xxxx-4xxx-[89ab]xxx-xxxxxxxxxxxx)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Generate a new key from `source`
    pub fn generate(source: &dyn RandomSource) -> Self {
        let mut bytes = [0u8; 16];
        source.fill(&mut bytes);
        // Stamps version nibble 4 and the 10xx variant bits.
        let id = Builder::from_random_bytes(bytes).into_uuid();
        Self(id.hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
