use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::*;

/// Purely random placement from a fixed seed. The same seed and config
/// always produce the same field, which is what seeded play and the tests
/// rely on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomGenerator {
    seed: u64,
}

impl RandomGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineFieldGenerator for RandomGenerator {
    fn generate(self, config: GameConfig) -> MineField {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        MineField::generate(config, &mut rng)
    }
}
