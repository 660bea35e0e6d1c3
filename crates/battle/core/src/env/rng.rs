//! Deterministic random source for damage variance.
//!
//! Given the same seed, every implementation must return the same value so
//! battles can be replayed and tested.

/// RNG oracle for deterministic random number generation.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a random value in `[0, bound)`; 0 when `bound` is 0.
    ///
    /// Mirrors the host's `Math.randomInt(bound)`.
    fn random_int(&self, seed: u64, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32(seed) % bound
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives the seed of one roll.
///
/// * `battle_seed` - seed fixed when the battle starts
/// * `action` - action sequence number within the battle
/// * `subject_id` - actor or enemy id of the acting battler
/// * `roll` - index of the roll within the action (variance uses 0 and 1)
pub fn compute_seed(battle_seed: u64, action: u64, subject_id: u32, roll: u32) -> u64 {
    let mut hash = battle_seed;
    hash ^= action.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(subject_id).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(roll).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
