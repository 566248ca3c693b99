//! Seeded RNG for subsampling persons and shops.
//!
//! Sampling draws depend only on the configured seed and the order of the
//! inputs, so a rerun with the same seed and scenario picks the same
//! sample.  A separate stream per purpose (persons, shops, …) is derived
//! with [`SamplingRng::child`] so that changing one sampling rate does not
//! shift the draws of another.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic RNG used for the optional sampling controls.
pub struct SamplingRng(SmallRng);

impl SamplingRng {
    pub fn new(seed: u64) -> Self {
        SamplingRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream for a given purpose.
    pub fn child(&mut self, offset: u64) -> SamplingRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SamplingRng(SmallRng::seed_from_u64(child_seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Keep each item independently with probability `rate`.
    ///
    /// A rate of `1.0` or more keeps everything without consuming draws.
    pub fn sample_rate<T>(&mut self, items: Vec<T>, rate: f64) -> Vec<T> {
        if rate >= 1.0 {
            return items;
        }
        items.into_iter().filter(|_| self.gen_bool(rate)).collect()
    }

    /// Choose `amount` distinct items without replacement, preserving their
    /// input order.  Returns everything if `amount >= items.len()`.
    pub fn sample_amount<T>(&mut self, items: Vec<T>, amount: usize) -> Vec<T> {
        if amount >= items.len() {
            return items;
        }
        let mut picked = rand::seq::index::sample(&mut self.0, items.len(), amount).into_vec();
        picked.sort_unstable();
        let mut picked = picked.into_iter().peekable();
        items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| {
                if picked.peek() == Some(&i) {
                    picked.next();
                    Some(item)
                } else {
                    None
                }
            })
            .collect()
    }
}
