//! Injected randomness for miss, crit and target rolls
//!
//! Combat never reaches for a thread-local generator; every roll goes
//! through a `Roller` owned by the encounter so scenarios replay exactly
//! from a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable source of combat rolls
#[derive(Debug, Clone)]
pub struct Roller {
    rng: StdRng,
}

impl Roller {
    /// A roller that replays the same sequence for the same seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A roller seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uniform roll in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Succeeds with the given probability; `p <= 0` never, `p >= 1` always
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index below `len`
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.random_range(0..len))
        }
    }

    /// Pick one element uniformly
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }
}

impl Default for Roller {
    fn default() -> Self {
        Self::from_entropy()
    }
}
