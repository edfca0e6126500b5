use crate::error::{ConfigError, MoveError};

use super::movegen;
use super::player::Player;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Pieces in a line needed to win.
pub const CONNECT: usize = 4;

/// Line directions as (row step, column step): horizontal, vertical and both diagonals.
static DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    One,
    Two,
}

impl Cell {
    /// The player occupying this cell, if any
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::One => Some(Player::One),
            Cell::Two => Some(Player::Two),
        }
    }
}

/// Outcome of a position. Always derived from the cells, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    Win(Player),
    Draw,
}

/// A rows × columns Connect Four grid.
///
/// Row 0 is the bottom row. Pieces only enter through [`Board::drop`] or
/// [`Board::drop_mut`], so every column is filled contiguously from the bottom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    heights: Vec<usize>,
}

impl Board {
    /// Create a new empty 6×7 board
    pub fn new() -> Self {
        Self::empty(ROWS, COLS)
    }

    /// Create an empty board with custom dimensions.
    pub fn with_size(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::Validation(format!(
                "board dimensions must be >= 1, got {rows}x{cols}"
            )));
        }
        Ok(Self::empty(rows, cols))
    }

    fn empty(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
            heights: vec![0; cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.cols
    }

    /// Get the cell at a specific position
    /// Row 0 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Number of pieces stacked in a column
    pub fn column_height(&self, col: usize) -> usize {
        self.heights[col]
    }

    /// Check if a column is full (out-of-range columns count as full)
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.cols || self.heights[col] == self.rows
    }

    /// Check that a drop into `col` would be accepted.
    pub fn check_move(&self, col: usize) -> Result<(), MoveError> {
        if col >= self.cols {
            return Err(MoveError::InvalidColumn {
                column: col,
                columns: self.cols,
            });
        }
        if self.heights[col] == self.rows {
            return Err(MoveError::ColumnFull(col));
        }
        Ok(())
    }

    /// Return a copy of the board with `player`'s piece dropped into `col`.
    pub fn drop(&self, col: usize, player: Player) -> Result<Board, MoveError> {
        let mut next = self.clone();
        next.drop_mut(col, player)?;
        Ok(next)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_mut(&mut self, col: usize, player: Player) -> Result<usize, MoveError> {
        self.check_move(col)?;
        let row = self.heights[col];
        self.cells[row * self.cols + col] = player.to_cell();
        self.heights[col] += 1;
        Ok(row)
    }

    /// Legal columns in ascending order
    pub fn legal_moves(&self) -> Vec<usize> {
        movegen::legal_moves(self)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&h| h == self.rows)
    }

    pub fn piece_count(&self) -> usize {
        self.heights.iter().sum()
    }

    /// The player whose turn it is, assuming [`Player::One`] moved first.
    pub fn next_player(&self) -> Player {
        let ones = self.cells.iter().filter(|&&c| c == Cell::One).count();
        let twos = self.cells.iter().filter(|&&c| c == Cell::Two).count();
        if ones > twos {
            Player::Two
        } else {
            Player::One
        }
    }

    /// Full-board scan for a line of [`CONNECT`] pieces.
    ///
    /// Returns the owner of the first line found, so at most one player is
    /// ever reported even for positions that could not arise in play.
    pub fn winner(&self) -> Option<Player> {
        self.windows().find_map(|window| {
            let owner = window[0].player()?;
            window.iter().all(|&c| c == window[0]).then_some(owner)
        })
    }

    /// Check if the piece at (row, col) is part of a winning line.
    ///
    /// Only looks through the given cell, which is all that can change after a drop.
    pub fn is_winning_cell(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let count = 1
                + self.run_length(row, col, dr, dc, cell)
                + self.run_length(row, col, -dr, -dc, cell);
            count >= CONNECT
        })
    }

    /// Count consecutive `cell` pieces starting next to (row, col) in one direction.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while self.in_bounds(r, c) && self.get(r as usize, c as usize) == cell {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// True when the board is full and nobody has won
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    pub fn result(&self) -> GameResult {
        match self.winner() {
            Some(player) => GameResult::Win(player),
            None if self.is_full() => GameResult::Draw,
            None => GameResult::InProgress,
        }
    }

    /// Every in-bounds line of [`CONNECT`] cells, in all four directions.
    pub fn windows(&self) -> impl Iterator<Item = [Cell; CONNECT]> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| (row, col)))
            .flat_map(move |(row, col)| {
                DIRECTIONS
                    .iter()
                    .filter_map(move |&(dr, dc)| self.window_at(row, col, dr, dc))
            })
    }

    fn window_at(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<[Cell; CONNECT]> {
        let span = CONNECT as isize - 1;
        let last_row = row as isize + dr * span;
        let last_col = col as isize + dc * span;
        if !self.in_bounds(last_row, last_col) {
            return None;
        }

        let mut window = [Cell::Empty; CONNECT];
        for (i, slot) in window.iter_mut().enumerate() {
            let r = row as isize + dr * i as isize;
            let c = col as isize + dc * i as isize;
            *slot = self.get(r as usize, c as usize);
        }
        Some(window)
    }

    /// One digit per cell (0 empty, 1 or 2 for the players), bottom row first.
    pub fn state_key(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Empty => '0',
                Cell::One => '1',
                Cell::Two => '2',
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
