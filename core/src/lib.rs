//! Board/game-state engine for a turn-based grid-reveal (minesweeper) game.
//!
//! The crate is split between [`MineField`], the immutable grid of mine
//! positions and adjacency counts, and [`Board`], the mutable session state
//! layered on top of it. Everything is synchronous and in-memory; the
//! interactive front end lives in a separate crate.

use core::fmt;
use core::ops::Index;
use std::collections::BTreeSet;

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Requested board geometry: grid size and mine count.
///
/// Stored as requested; an oversized mine count is clamped (not rejected)
/// when the field is generated.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Self {
        Self {
            size: (size_x.max(1), size_y.max(1)),
            mines,
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Fixed difficulty presets, selectable by index in the front end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Side length of the square grid.
    pub const fn size(self) -> Coord {
        match self {
            Self::Easy => 9,
            Self::Medium => 16,
            Self::Hard => 24,
        }
    }

    pub const fn mines(self) -> CellCount {
        match self {
            Self::Easy => 10,
            Self::Medium => 40,
            Self::Hard => 99,
        }
    }

    pub fn config(self) -> GameConfig {
        GameConfig::new((self.size(), self.size()), self.mines())
    }
}

/// Immutable grid of cell values: `-1` for a mine, otherwise the number of
/// mines among the cell's Moore neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineField {
    values: Array2<i8>,
    mine_count: CellCount,
}

impl MineField {
    /// Generates a field with mines drawn from a thread-local RNG.
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self::generate(GameConfig::new((width, height), mines), &mut rand::rng())
    }

    /// Generates a field from an explicit RNG, used by [`RandomGenerator`]
    /// and seeded play.
    ///
    /// Mine positions are drawn uniformly without replacement by rejection
    /// sampling into a coordinate set. A request for more mines than the
    /// grid holds is clamped to the cell total rather than rejected.
    pub fn generate<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        let (width, height) = config.size;
        let total_cells = config.total_cells();

        let mine_count = config.mines.min(total_cells);
        if mine_count < config.mines {
            log::warn!(
                "Requested {} mines but the grid only fits {}, clamped",
                config.mines,
                total_cells
            );
        }

        let mut positions = BTreeSet::new();
        while (positions.len() as CellCount) < mine_count {
            positions.insert((rng.random_range(0..width), rng.random_range(0..height)));
        }

        Self::from_positions(config.size, &positions)
    }

    /// Builds a field with mines at exactly the given coordinates. Intended
    /// for tests and tooling that need a deterministic layout.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut positions = BTreeSet::new();
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            positions.insert(coords);
        }
        Ok(Self::from_positions(size, &positions))
    }

    /// Two-pass build: count neighbors of every mine first, then overwrite
    /// the mine cells with `-1`. The order matters, counting after the
    /// overwrite would undercount mines adjacent to other mines.
    fn from_positions(size: Coord2, positions: &BTreeSet<Coord2>) -> Self {
        let mut values: Array2<i8> = Array2::default(size.to_nd_index());

        for &coords in positions {
            for neighbor in values.iter_neighbors(coords) {
                values[neighbor.to_nd_index()] += 1;
            }
        }
        for &coords in positions {
            values[coords.to_nd_index()] = -1;
        }

        let mine_count = positions.len().try_into().unwrap_or(CellCount::MAX);
        log::debug!("Generated {:?} field with {} mines", size, mine_count);
        Self { values, mine_count }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.values.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len().try_into().unwrap()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    /// Adjacency count, or `-1` for a mine. Out-of-range coordinates are a
    /// caller bug and panic via the grid's bounds check.
    pub fn value_at(&self, coords: Coord2) -> i8 {
        self[coords]
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self[coords] < 0
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.values.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineField {
    type Output = i8;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.values[(x as usize, y as usize)]
    }
}

/// Diagnostic dump: two characters per cell, row-major, one line per row.
impl fmt::Display for MineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        for y in 0..height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..width {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:2}", self[(x, y)])?;
            }
        }
        Ok(())
    }
}
