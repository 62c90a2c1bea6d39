//! Tabserve - Randomness and fault injection
//!
//! [`RandomSource`] is the one process-wide generator, seeded from OS entropy
//! at construction and never reseeded. Draws are serialized through a mutex
//! so concurrent requests each get an independent, uncorrupted value.
//! [`FaultSimulator`] uses it to decide whether a request should fail.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Shared random source for sampling and fault rolls.
#[derive(Debug)]
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    /// Seed once from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic source, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        // A draw cannot leave the generator half-updated, so a poisoned lock is still usable
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One uniform value in `[0, 1)`.
    pub fn unit(&self) -> f64 {
        self.lock().random::<f64>()
    }

    /// `amount` distinct indices from `0..len`, in shuffled order.
    ///
    /// `amount` is clamped to `len`.
    pub fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize> {
        let mut rng = self.lock();
        let mut picked = index::sample(&mut *rng, len, amount.min(len)).into_vec();
        picked.shuffle(&mut *rng);
        picked
    }
}

/// Rolls a fixed-probability failure per request.
#[derive(Debug, Clone)]
pub struct FaultSimulator {
    probability: f64,
    rng: Arc<RandomSource>,
}

impl FaultSimulator {
    /// `probability` is clamped into `[0, 1]`; NaN counts as 0.
    pub fn new(probability: f64, rng: Arc<RandomSource>) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability, rng }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// True when this request should be rejected as a server failure.
    pub fn should_fail(&self) -> bool {
        let tripped = self.rng.unit() < self.probability;
        if tripped {
            warn!(probability = self.probability, "injecting simulated failure");
        }
        tripped
    }
}
