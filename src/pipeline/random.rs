use std::sync::Arc;

use crate::foundation::{core::Vec2, math::Rng64};

/// Precomputed points inside the unit disc used to jitter shadow-removal sampling.
///
/// Built once from a seed and shared read-only across passes and pipelines.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDirectionSet {
    seed: u64,
    dirs: Vec<Vec2>,
}

impl RandomDirectionSet {
    pub const LEN: usize = 512;

    pub fn new(seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let dirs = (0..Self::LEN)
            .map(|_| {
                let (x, y) = rng.next_in_unit_disc();
                Vec2::new(x, y)
            })
            .collect();
        Self { seed, dirs }
    }

    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.dirs
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Entry `i`, wrapping around the table.
    pub fn get(&self, i: usize) -> Vec2 {
        self.dirs[i % self.dirs.len()]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/random.rs"]
mod tests;
