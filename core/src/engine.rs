use core::fmt;
use std::collections::VecDeque;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Game lifecycle as a single tagged state: the terminal outcomes are
/// mutually exclusive by construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Playing
    }
}

/// Mutable game session: one [`MineField`] plus per-cell marking state, the
/// remaining flag budget, and the lifecycle status.
///
/// Actions stay callable after the game completes; the recorded status is
/// only ever written while the game is still [`GameStatus::Playing`], so a
/// finished result can no longer change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    field: MineField,
    cells: Array2<CellState>,
    flags_left: i32,
    status: GameStatus,
}

impl Board {
    pub fn new(field: MineField) -> Self {
        let size = field.size();
        let flags_left = field.mine_count().into();
        Self {
            field,
            cells: Array2::default(size.to_nd_index()),
            flags_left,
            status: Default::default(),
        }
    }

    /// Square board for a preset, mines drawn from a thread-local RNG.
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let size = difficulty.size();
        Self::new(MineField::new(size, size, difficulty.mines()))
    }

    /// Deterministic board for a preset, for seeded play and replays.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::new(RandomGenerator::new(seed).generate(difficulty.config()))
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn size(&self) -> Coord2 {
        self.field.size()
    }

    /// Mines remaining minus flags placed. Display-only: flagging more cells
    /// than there are mines drives it negative.
    pub fn flags_left(&self) -> i32 {
        self.flags_left
    }

    pub fn state_at(&self, coords: Coord2) -> CellState {
        self.cells[coords.to_nd_index()]
    }

    pub fn mine_field(&self) -> &MineField {
        &self.field
    }

    /// Reveals a cell. A flag on the target is lifted back into the budget
    /// first, before the mine check. Hitting a mine ends the game with no
    /// further mutation; a zero-value cell opens its whole region via flood
    /// fill; any other value reveals just the one cell.
    pub fn reveal(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.field.validate_coords(coords)?;

        if self.state_at(coords) == CellState::Flagged {
            self.flags_left += 1;
        }

        if self.field.is_mine(coords) {
            log::debug!("Mine hit at {:?}", coords);
            self.finish(GameStatus::Lost);
            return Ok(());
        }

        if self.field.value_at(coords) == 0 {
            self.flood_reveal(coords);
        } else {
            self.cells[coords.to_nd_index()] = CellState::Revealed;
        }

        if self.all_safe_cells_touched() {
            self.finish(GameStatus::Won);
        }
        Ok(())
    }

    /// Work-queue flood fill. A cell only passes the gate while `Untouched`,
    /// which both deduplicates visits and bounds the traversal; nonzero
    /// cells are revealed but never enqueue their neighbors, so they form
    /// the boundary of the opened region.
    fn flood_reveal(&mut self, start: Coord2) {
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            if self.state_at(coords) != CellState::Untouched {
                continue;
            }
            self.cells[coords.to_nd_index()] = CellState::Revealed;

            if self.field.value_at(coords) == 0 {
                to_visit.extend(self.field.iter_neighbors(coords));
            }
        }
        log::trace!("Flood fill from {:?} done", start);
    }

    /// Flags a cell and spends one unit of budget. Already-flagged cells are
    /// left alone; everything else, revealed cells included, gets the flag.
    pub fn flag(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.field.validate_coords(coords)?;

        if self.state_at(coords) == CellState::Flagged {
            return Ok(());
        }
        self.cells[coords.to_nd_index()] = CellState::Flagged;
        self.flags_left -= 1;
        Ok(())
    }

    /// Marks a cell questioned, refunding the budget if it was flagged.
    pub fn question(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.field.validate_coords(coords)?;

        if self.state_at(coords) == CellState::Flagged {
            self.flags_left += 1;
        }
        self.cells[coords.to_nd_index()] = CellState::Questioned;
        Ok(())
    }

    /// Removes a flag or question mark; untouched and revealed cells are
    /// left alone.
    pub fn clear(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.field.validate_coords(coords)?;

        match self.state_at(coords) {
            CellState::Flagged => self.flags_left += 1,
            CellState::Questioned => {}
            _ => return Ok(()),
        }
        self.cells[coords.to_nd_index()] = CellState::Untouched;
        Ok(())
    }

    /// End-of-game render: forces every cell to `Revealed` and zeroes the
    /// displayed counter, then renders. Destructive, call once when the
    /// session is over.
    pub fn revealed_view(&mut self) -> String {
        self.flags_left = 0;
        self.cells.fill(CellState::Revealed);
        self.to_string()
    }

    /// Won once no non-mine cell is still `Untouched`; flags and question
    /// marks count as touched.
    fn all_safe_cells_touched(&self) -> bool {
        let (width, height) = self.field.size();
        for x in 0..width {
            for y in 0..height {
                let coords = (x, y);
                if !self.field.is_mine(coords)
                    && self.state_at(coords) == CellState::Untouched
                {
                    return false;
                }
            }
        }
        true
    }

    fn finish(&mut self, status: GameStatus) {
        if self.status == GameStatus::Playing {
            log::debug!("Game over: {:?}", status);
            self.status = status;
        }
    }
}

/// Player-facing render: column-index header with the live flag counter, a
/// separator, then one row per grid row.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.field.size();

        write!(f, "   x")?;
        for x in 0..width {
            if x > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:2}", x)?;
        }
        writeln!(f, "  BombCount: {}", self.flags_left)?;

        writeln!(f, " y  {}", "-".repeat(3 * width as usize - 1))?;

        for y in 0..height {
            if y > 0 {
                writeln!(f)?;
            }
            write!(f, "{:2} | ", y)?;
            for x in 0..width {
                if x > 0 {
                    write!(f, "  ")?;
                }
                let coords = (x, y);
                write!(f, "{}", self.state_at(coords).glyph(self.field.value_at(coords)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::new(MineField::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn revealing_a_mine_loses_without_further_mutation() {
        let mut b = board((3, 3), &[(1, 1)]);

        b.reveal((1, 1)).unwrap();

        assert_eq!(b.status(), GameStatus::Lost);
        assert!(b.is_complete());
        // no cascading reveal happened, the mine cell itself included
        let (width, height) = b.size();
        for x in 0..width {
            for y in 0..height {
                assert_eq!(b.state_at((x, y)), CellState::Untouched);
            }
        }
    }

    #[test]
    fn revealing_a_flagged_mine_refunds_the_flag_before_losing() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((0, 0)).unwrap();
        assert_eq!(b.flags_left(), 0);

        b.reveal((0, 0)).unwrap();

        assert_eq!(b.status(), GameStatus::Lost);
        assert_eq!(b.flags_left(), 1);
        assert_eq!(b.state_at((0, 0)), CellState::Flagged);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_its_boundary() {
        // Wall of mines at x == 2 splits the 5x5 grid; flooding from (0, 0)
        // must open the x == 0 zeros and the x == 1 boundary digits, and
        // leave the far side untouched.
        let mines: Vec<Coord2> = (0..5).map(|y| (2, y)).collect();
        let mut b = board((5, 5), &mines);

        b.reveal((0, 0)).unwrap();

        for y in 0..5 {
            assert_eq!(b.state_at((0, y)), CellState::Revealed);
            assert_eq!(b.state_at((1, y)), CellState::Revealed);
            assert_eq!(b.state_at((2, y)), CellState::Untouched);
            assert_eq!(b.state_at((3, y)), CellState::Untouched);
            assert_eq!(b.state_at((4, y)), CellState::Untouched);
        }
        assert_eq!(b.status(), GameStatus::Playing);
    }

    #[test]
    fn flood_fill_stops_at_flags_and_questions() {
        let mut b = board((3, 1), &[]);

        b.flag((1, 0)).unwrap();
        b.reveal((0, 0)).unwrap();

        assert_eq!(b.state_at((0, 0)), CellState::Revealed);
        assert_eq!(b.state_at((1, 0)), CellState::Flagged);
        assert_eq!(b.state_at((2, 0)), CellState::Untouched);
    }

    #[test]
    fn revealing_a_flagged_zero_cell_only_refunds_the_flag() {
        let mut b = board((4, 4), &[(3, 3)]);
        assert_eq!(b.mine_field().value_at((1, 1)), 0);

        b.flag((1, 1)).unwrap();
        b.reveal((1, 1)).unwrap();

        // the flag gate stops the flood fill at its own starting cell
        assert_eq!(b.state_at((1, 1)), CellState::Flagged);
        assert_eq!(b.flags_left(), 1);
    }

    #[test]
    fn win_via_flood_fill() {
        let mut b = board((3, 3), &[(2, 2)]);

        b.reveal((0, 0)).unwrap();

        assert_eq!(b.status(), GameStatus::Won);
        assert_eq!(b.state_at((1, 1)), CellState::Revealed);
        assert_eq!(b.state_at((2, 2)), CellState::Untouched);
    }

    #[test]
    fn flags_and_questions_count_toward_the_win_condition() {
        // mine at (0, 0); mark two safe cells, reveal the last one
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((1, 0)).unwrap();
        b.question((0, 1)).unwrap();
        b.reveal((1, 1)).unwrap();

        assert_eq!(b.status(), GameStatus::Won);
    }

    #[test]
    fn single_cell_board_wins_on_first_reveal() {
        let mut b = board((1, 1), &[]);

        assert_eq!(b.mine_field().value_at((0, 0)), 0);
        b.reveal((0, 0)).unwrap();

        assert_eq!(b.status(), GameStatus::Won);
    }

    #[test]
    fn fully_mined_board_loses_on_any_reveal() {
        let field = MineField::new(3, 3, 100);
        assert_eq!(field.mine_count(), 9);
        let mut b = Board::new(field);

        b.reveal((1, 2)).unwrap();

        assert_eq!(b.status(), GameStatus::Lost);
    }

    #[test]
    fn flag_then_clear_round_trips_state_and_budget() {
        let mut b = board((2, 2), &[(0, 0)]);
        let before = b.flags_left();

        b.flag((1, 1)).unwrap();
        assert_eq!(b.state_at((1, 1)), CellState::Flagged);
        assert_eq!(b.flags_left(), before - 1);

        b.clear((1, 1)).unwrap();
        assert_eq!(b.state_at((1, 1)), CellState::Untouched);
        assert_eq!(b.flags_left(), before);
    }

    #[test]
    fn flagging_twice_spends_only_one_unit() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((1, 1)).unwrap();
        b.flag((1, 1)).unwrap();

        assert_eq!(b.flags_left(), 0);
    }

    #[test]
    fn flag_budget_goes_negative_without_clamping() {
        let mut b = board((2, 2), &[(0, 0)]);
        assert_eq!(b.flags_left(), 1);

        b.flag((0, 1)).unwrap();
        b.flag((1, 0)).unwrap();
        b.flag((1, 1)).unwrap();

        assert_eq!(b.flags_left(), -2);
    }

    #[test]
    fn question_refunds_a_flag_and_marks_any_cell() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((1, 1)).unwrap();
        b.question((1, 1)).unwrap();
        assert_eq!(b.state_at((1, 1)), CellState::Questioned);
        assert_eq!(b.flags_left(), 1);

        // questioning a revealed cell is allowed and sticks
        b.reveal((1, 0)).unwrap();
        b.question((1, 0)).unwrap();
        assert_eq!(b.state_at((1, 0)), CellState::Questioned);
    }

    #[test]
    fn clear_resets_questions_without_touching_the_budget() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.question((1, 1)).unwrap();
        b.clear((1, 1)).unwrap();

        assert_eq!(b.state_at((1, 1)), CellState::Untouched);
        assert_eq!(b.flags_left(), 1);
    }

    #[test]
    fn clear_ignores_untouched_and_revealed_cells() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.reveal((1, 1)).unwrap();
        b.clear((1, 1)).unwrap();
        b.clear((0, 1)).unwrap();

        assert_eq!(b.state_at((1, 1)), CellState::Revealed);
        assert_eq!(b.state_at((0, 1)), CellState::Untouched);
        assert_eq!(b.flags_left(), 1);
    }

    #[test]
    fn completed_status_is_never_overwritten() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.reveal((0, 0)).unwrap();
        assert_eq!(b.status(), GameStatus::Lost);

        // still callable, but the recorded result stands
        b.reveal((0, 1)).unwrap();
        b.reveal((1, 0)).unwrap();
        b.reveal((1, 1)).unwrap();
        b.flag((1, 1)).unwrap();

        assert_eq!(b.status(), GameStatus::Lost);
    }

    #[test]
    fn out_of_range_actions_report_invalid_coords() {
        let mut b = board((2, 2), &[(0, 0)]);

        assert_eq!(b.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(b.flag((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(b.question((5, 5)), Err(GameError::InvalidCoords));
        assert_eq!(b.clear((2, 2)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn render_shows_header_marks_and_digits() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((0, 0)).unwrap();
        b.question((0, 1)).unwrap();
        b.reveal((1, 1)).unwrap();

        let expected = "   x 0  1  BombCount: 0\n\
                        \u{20}y  -----\n\
                        \u{20}0 | !  ☐\n\
                        \u{20}1 | ?  1";
        assert_eq!(b.to_string(), expected);
    }

    #[test]
    fn revealed_view_exposes_everything_and_zeroes_the_counter() {
        let mut b = board((2, 2), &[(0, 0)]);

        b.flag((1, 0)).unwrap();
        let view = b.revealed_view();

        assert_eq!(b.flags_left(), 0);
        let (width, height) = b.size();
        for x in 0..width {
            for y in 0..height {
                assert_eq!(b.state_at((x, y)), CellState::Revealed);
            }
        }
        assert!(view.contains('*'));
        assert!(view.contains("BombCount: 0"));
    }

    #[test]
    fn board_state_survives_a_serde_round_trip() {
        let mut b = board((3, 3), &[(2, 2)]);
        b.flag((2, 2)).unwrap();
        b.reveal((0, 0)).unwrap();

        let json = serde_json::to_string(&b).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, b);
    }
}
