use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Random source used for degree draws and hop selection.
pub type SimRng = ChaCha20Rng;

/// Derives independent random sources from one global seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseSource {
    global_seed: u64,
}

impl NoiseSource {
    pub fn new(global_seed: u64) -> Self {
        Self { global_seed }
    }

    pub fn global_seed(&self) -> u64 {
        self.global_seed
    }

    /// Source shared across a whole sequential run.
    pub fn shared(&self) -> SimRng {
        SimRng::seed_from_u64(self.global_seed)
    }

    /// Source owned by a single trial, independent of execution order.
    pub fn for_trial(&self, trial_id: u64) -> SimRng {
        // Combine seeds deterministically
        let seed = self
            .global_seed
            .wrapping_add(trial_id.wrapping_mul(0x9e3779b97f4a7c15));
        SimRng::seed_from_u64(seed)
    }
}
