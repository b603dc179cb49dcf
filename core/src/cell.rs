use serde::{Deserialize, Serialize};

/// Player-visible marking of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Untouched,
    Flagged,
    Questioned,
    Revealed,
}

impl CellState {
    /// Glyph used by the board render. Revealed cells need the underlying
    /// field value: blank for 0, `*` for a mine, the digit otherwise.
    pub fn glyph(self, value: i8) -> char {
        use CellState::*;
        match self {
            Untouched => '☐',
            Flagged => '!',
            Questioned => '?',
            Revealed => match value {
                v if v < 0 => '*',
                0 => ' ',
                v => char::from_digit(v as u32, 10).unwrap_or('#'),
            },
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Untouched
    }
}
