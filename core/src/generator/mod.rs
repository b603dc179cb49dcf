use crate::*;
pub use random::*;

mod random;

/// Strategy seam for producing a [`MineField`] from a [`GameConfig`].
pub trait MineFieldGenerator {
    fn generate(self, config: GameConfig) -> MineField;
}
