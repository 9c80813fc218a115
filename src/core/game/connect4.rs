//! Connect 4 rules on a 6x7 grid with gravity.
//!
//! Row 0 is the top row. A move names a column and the mark settles into the lowest
//! empty row of that column.

use super::{GameError, Mark, Rules, Variant};

/// Number of rows
pub const ROWS: usize = 6;
/// Number of columns
pub const COLUMNS: usize = 7;
/// Run length needed to win
pub const WIN_LENGTH: usize = 4;

/// Axis directions as (row delta, column delta): horizontal, vertical, both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// 6x7 grid, `grid[row][column]`, row 0 on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connect4Board {
    grid: [[Option<Mark>; COLUMNS]; ROWS],
}

impl Connect4Board {
    /// Mark at `(row, column)`, `None` when empty or off the board.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<Mark> {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    /// Row a mark dropped into `column` would land in.
    #[must_use]
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= COLUMNS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.grid[row][column].is_none())
    }

    /// Length of the contiguous `mark` run through `(row, column)` along one axis.
    fn run_length(&self, row: usize, column: usize, (dr, dc): (isize, isize), mark: Mark) -> usize {
        let mut count = 1;
        for sign in [1, -1] {
            let (mut r, mut c) = (row, column);
            loop {
                let (Some(next_r), Some(next_c)) = (
                    r.checked_add_signed(dr * sign),
                    c.checked_add_signed(dc * sign),
                ) else {
                    break;
                };
                if self.cell(next_r, next_c) != Some(mark) {
                    break;
                }
                count += 1;
                (r, c) = (next_r, next_c);
            }
        }
        count
    }
}

/// Connect 4 ruleset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connect4;

impl Rules for Connect4 {
    type Board = Connect4Board;

    const VARIANT: Variant = Variant::Connect4;
    const CONTROLS: usize = COLUMNS;

    fn apply_move(board: &mut Connect4Board, mv: usize, mark: Mark) -> Result<usize, GameError> {
        if mv >= COLUMNS {
            return Err(GameError::IllegalMove {
                reason: "That column doesn't exist!",
            });
        }
        let row = board.landing_row(mv).ok_or(GameError::IllegalMove {
            reason: "This column is full!",
        })?;
        board.grid[row][mv] = Some(mark);
        Ok(row * COLUMNS + mv)
    }

    fn detect_win(board: &Connect4Board, placed: usize, mark: Mark) -> bool {
        let (row, column) = (placed / COLUMNS, placed % COLUMNS);
        DIRECTIONS
            .iter()
            .any(|&axis| board.run_length(row, column, axis, mark) >= WIN_LENGTH)
    }

    fn is_full(board: &Connect4Board) -> bool {
        board.grid[0].iter().all(Option::is_some)
    }

    fn is_legal(board: &Connect4Board, mv: usize) -> bool {
        mv < COLUMNS && board.grid[0][mv].is_none()
    }

    fn cells(board: &Connect4Board) -> Vec<Option<Mark>> {
        board.grid.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::game::{Game, GameStatus};
    use crate::test_utils::{alice, bob};

    fn play(columns: &[usize]) -> Game<Connect4> {
        let mut game = Game::<Connect4>::new(alice(), bob()).unwrap();
        for &column in columns {
            let actor = game.current_player().id;
            game.submit_move(actor, column).unwrap();
        }
        game
    }

    #[test]
    fn test_drop_lands_in_lowest_empty_row() {
        let mut board = Connect4Board::default();
        let placed = Connect4::apply_move(&mut board, 2, Mark::First).unwrap();
        assert_eq!(placed, 5 * COLUMNS + 2);
        assert_eq!(board.cell(5, 2), Some(Mark::First));

        let placed = Connect4::apply_move(&mut board, 2, Mark::Second).unwrap();
        assert_eq!(placed, 4 * COLUMNS + 2);
        assert_eq!(board.cell(4, 2), Some(Mark::Second));
        assert_eq!(board.cell(3, 2), None);
    }

    #[test]
    fn test_full_column_rejects_seventh_drop() {
        let mut board = Connect4Board::default();
        for i in 0..ROWS {
            let placed = Connect4::apply_move(&mut board, 0, Mark::for_seat(i % 2)).unwrap();
            assert_eq!(placed / COLUMNS, ROWS - 1 - i);
        }
        let before = board;
        let result = Connect4::apply_move(&mut board, 0, Mark::First);
        assert!(matches!(result, Err(GameError::IllegalMove { .. })));
        assert_eq!(board, before);
        assert!(!Connect4::is_legal(&board, 0));
        assert!(Connect4::is_legal(&board, 1));
    }

    #[test]
    fn test_out_of_range_column_is_illegal() {
        let mut board = Connect4Board::default();
        assert!(Connect4::apply_move(&mut board, COLUMNS, Mark::First).is_err());
        assert!(!Connect4::is_legal(&board, COLUMNS));
    }

    #[test]
    fn test_bottom_row_horizontal_win() {
        // alice: 0,1,2,3 on row 5; bob stacks on top of them
        let mut game = play(&[0, 0, 1, 1, 2, 2]);
        assert_eq!(game.status(), GameStatus::InProgress);
        let status = game.submit_move(alice().id, 3).unwrap();
        assert_eq!(status, GameStatus::Won { seat: 0 });
    }

    #[test]
    fn test_vertical_win() {
        let game = play(&[4, 5, 4, 5, 4, 5, 4]);
        assert_eq!(game.status(), GameStatus::Won { seat: 0 });
    }

    #[test]
    fn test_diagonal_win_placed_in_middle_of_run() {
        // Build a rising diagonal (5,0) (4,1) (3,2) (2,3) for alice, finishing at (4,1).
        let mut board = Connect4Board::default();
        let alice_mark = Mark::First;
        let bob_mark = Mark::Second;
        Connect4::apply_move(&mut board, 0, alice_mark).unwrap(); // (5,0)
        Connect4::apply_move(&mut board, 1, bob_mark).unwrap(); // (5,1)
        Connect4::apply_move(&mut board, 2, bob_mark).unwrap(); // (5,2)
        Connect4::apply_move(&mut board, 2, bob_mark).unwrap(); // (4,2)
        Connect4::apply_move(&mut board, 2, alice_mark).unwrap(); // (3,2)
        for _ in 0..3 {
            Connect4::apply_move(&mut board, 3, bob_mark).unwrap(); // (5,3) (4,3) (3,3)
        }
        Connect4::apply_move(&mut board, 3, alice_mark).unwrap(); // (2,3)
        let placed = Connect4::apply_move(&mut board, 1, alice_mark).unwrap(); // (4,1)
        assert_eq!(placed, 4 * COLUMNS + 1);
        assert!(Connect4::detect_win(&board, placed, alice_mark));
    }

    #[test]
    fn test_falling_diagonal_win() {
        // alice on (2,0) (3,1) (4,2) (5,3)
        let mut board = Connect4Board::default();
        let (a, b) = (Mark::First, Mark::Second);
        for (column, mark) in [
            (3, a),
            (2, b),
            (2, a),
            (1, b),
            (1, b),
            (1, a),
            (0, b),
            (0, b),
            (0, b),
        ] {
            Connect4::apply_move(&mut board, column, mark).unwrap();
        }
        let placed = Connect4::apply_move(&mut board, 0, a).unwrap();
        assert_eq!(placed, 2 * COLUMNS);
        assert!(Connect4::detect_win(&board, placed, a));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let mut board = Connect4Board::default();
        let placed = (0..3)
            .map(|column| Connect4::apply_move(&mut board, column, Mark::First).unwrap())
            .last()
            .unwrap();
        assert!(!Connect4::detect_win(&board, placed, Mark::First));
    }

    #[test]
    fn test_full_board_without_four_is_draw() {
        // Column pairs end up as three-over-three blocks of opposite marks,
        // and the last column alternates.
        let mut game = Game::<Connect4>::new(alice(), bob()).unwrap();
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0];
        let mut columns = Vec::new();
        for base in [0, 2, 4] {
            columns.extend(order.iter().map(|c| c + base));
        }
        columns.extend([6; ROWS]);
        for column in columns {
            let actor = game.current_player().id;
            let status = game.submit_move(actor, column).unwrap();
            if status.is_terminal() {
                break;
            }
        }
        assert_eq!(game.status(), GameStatus::Drawn);
        assert!(Connect4::is_full(game.board()));
    }
}
