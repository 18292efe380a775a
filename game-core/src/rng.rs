//! Random draws for imposter, target and fallback content.
//!
//! Seedable so tests (and replays) get the same imposter/target sequence.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug)]
pub struct RngSelector {
    inner: ChaCha8Rng,
}

impl RngSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Uniform index in `[0, n)` not contained in `forbidden`.
    ///
    /// Rejection sampling: draws until an eligible index comes up. Returns
    /// `None` when no index is eligible, which would otherwise loop forever.
    pub fn pick_distinct(&mut self, n: usize, forbidden: &[usize]) -> Option<usize> {
        if (0..n).all(|i| forbidden.contains(&i)) {
            return None;
        }

        loop {
            let candidate = self.inner.gen_range(0..n);
            if !forbidden.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

impl Default for RngSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
