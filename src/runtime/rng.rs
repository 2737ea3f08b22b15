//! Deterministic per-run random stream

use sha2::{Digest, Sha256};

/// Random stream derived from a seed
///
/// Each draw hashes `seed || counter` with SHA-256 and maps the first eight
/// bytes to `[0, 1)`. The same seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    counter: u64,
}

impl SeededRng {
    /// Creates a stream for `seed`
    pub fn new(seed: u64) -> Self {
        SeededRng { seed, counter: 0 }
    }

    /// Seed this stream was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(self.counter.to_le_bytes());
        self.counter = self.counter.wrapping_add(1);

        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64
    }
}
