//! Core Connect Four game logic: board representation, players, move
//! generation and the board's text form.

mod board;
mod format;
pub mod movegen;
mod player;

pub use board::{Board, Cell, GameResult, COLS, CONNECT, ROWS};
pub use player::Player;
pub use crate::error::{BoardParseError, MoveError};
