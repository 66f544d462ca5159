//! Per-thread PRNG seeding (§3 "PRNG", §4.1, §9).
//!
//! Each render worker owns a private `Xoshiro256PlusPlus` stream, seeded by
//! splitting a single session seed with SplitMix64 so the streams are
//! decorrelated without sharing any mutable state. There is no global RNG;
//! every function that needs randomness takes one as a parameter.

use rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The odd constant each worker's seed is offset by, per §4.1.
const WORKER_SEED_STRIDE: u64 = 1_000_003;

/// SplitMix64, used only to turn a single `u64` into the 256 bits of seed
/// state Xoshiro256++ needs (the standard recommended seeding strategy).
struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

/// Builds a deterministic `Xoshiro256PlusPlus` for `worker_id` given a
/// session-wide `base_seed`. Two calls with the same arguments always
/// produce bit-identical streams (§8 "RNG determinism").
pub fn worker_rng(base_seed: u64, worker_id: u64) -> Xoshiro256PlusPlus {
    let seed = base_seed.wrapping_add(worker_id.wrapping_mul(WORKER_SEED_STRIDE));
    let mut splitter = SplitMix64(seed);
    let mut state = [0u8; 32];
    for chunk in state.chunks_exact_mut(8) {
        chunk.copy_from_slice(&splitter.next().to_le_bytes());
    }
    Xoshiro256PlusPlus::from_seed(state)
}
