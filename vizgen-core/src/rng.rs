//! Deterministic RNG hierarchy.
//!
//! A master seed expands into per-`(label, iteration)` sub-seeds via BLAKE3,
//! so every interaction in a run gets its own independent stream. Derivation
//! is hash-based rather than order-dependent: interaction 7 draws the same
//! spec tree whether it runs first, last, or on another thread.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for a labeled stream.
    ///
    /// `label` names the stream kind (e.g. `"interaction"`) and `iteration`
    /// distinguishes repeats under the same label.
    pub fn sub_seed(&self, label: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }

    /// Create a seeded StdRng for a labeled stream.
    pub fn rng_for(&self, label: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(label, iteration))
    }
}
