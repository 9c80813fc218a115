//! Tic Tac Toe rules on a 3x3 grid.

use super::{GameError, Mark, Rules, Variant};

/// Side length of the grid
pub const SIZE: usize = 3;
/// Number of cells
pub const CELLS: usize = SIZE * SIZE;

/// The eight winning triples: three rows, three columns, two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Row-major 3x3 grid; index = row * 3 + column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicTacToeBoard {
    cells: [Option<Mark>; CELLS],
}

impl TicTacToeBoard {
    /// Mark at `index`, `None` when empty or out of range.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    /// Mark holding a complete line, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a]?;
            (self.cells[b] == Some(mark) && self.cells[c] == Some(mark)).then_some(mark)
        })
    }
}

/// Tic Tac Toe ruleset.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl Rules for TicTacToe {
    type Board = TicTacToeBoard;

    const VARIANT: Variant = Variant::TicTacToe;
    const CONTROLS: usize = CELLS;

    fn apply_move(board: &mut TicTacToeBoard, mv: usize, mark: Mark) -> Result<usize, GameError> {
        match board.cells.get_mut(mv) {
            None => Err(GameError::IllegalMove {
                reason: "That cell doesn't exist!",
            }),
            Some(Some(_)) => Err(GameError::IllegalMove {
                reason: "This spot is already taken!",
            }),
            Some(cell) => {
                *cell = Some(mark);
                Ok(mv)
            }
        }
    }

    // Every line is scanned after each move; `_placed` is not needed to stay correct.
    fn detect_win(board: &TicTacToeBoard, _placed: usize, mark: Mark) -> bool {
        board.winner() == Some(mark)
    }

    fn is_full(board: &TicTacToeBoard) -> bool {
        board.cells.iter().all(Option::is_some)
    }

    fn is_legal(board: &TicTacToeBoard, mv: usize) -> bool {
        matches!(board.cells.get(mv), Some(None))
    }

    fn cells(board: &TicTacToeBoard) -> Vec<Option<Mark>> {
        board.cells.to_vec()
    }
}
