//! Text form of a board, as printed by the CLI:
//!
//! ```text
//! |==============|
//! |              |
//! |              |
//! |    X X       |
//! |    O X X     |
//! |  O X O O     |
//! |  O O X X     |
//! |==============|
//! |0 1 2 3 4 5 6 |
//! ```
//!
//! Parsing accepts exactly what `Display` produces (the index line is optional),
//! which makes it easy to paste a position from a log into a test.

use std::fmt;
use std::str::FromStr;

use crate::error::BoardParseError;

use super::board::{Board, Cell};
use super::player::Player;

const EMPTY_SYMBOL: char = ' ';

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("|{}|", "=".repeat(self.columns() * 2));
        writeln!(f, "{border}")?;
        for row in (0..self.rows()).rev() {
            write!(f, "|")?;
            for col in 0..self.columns() {
                let symbol = self.get(row, col).player().map_or(EMPTY_SYMBOL, Player::symbol);
                write!(f, "{symbol} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{border}")?;
        write!(f, "|")?;
        for col in 0..self.columns() {
            write!(f, "{col} ")?;
        }
        write!(f, "|")
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() < 3 {
            return Err(BoardParseError::TooShort);
        }

        let cols = border_width(lines[0]).ok_or_else(|| BoardParseError::MalformedLine {
            line: 0,
            reason: "expected a |====| border".to_string(),
        })?;

        // Rows run from the first border to the next one, top row first.
        let mut grid: Vec<Vec<Cell>> = Vec::new();
        let mut closed = false;
        for (idx, line) in lines.iter().enumerate().skip(1) {
            if border_width(line).is_some() {
                closed = true;
                break;
            }
            grid.push(parse_row(line, idx, cols)?);
        }
        if !closed || grid.is_empty() {
            return Err(BoardParseError::TooShort);
        }

        let rows = grid.len();
        let mut board = Board::with_size(rows, cols).map_err(|e| BoardParseError::MalformedLine {
            line: 0,
            reason: e.to_string(),
        })?;

        for col in 0..cols {
            let mut seen_empty = false;
            for row in grid.iter().rev() {
                match row[col].player() {
                    None => seen_empty = true,
                    Some(_) if seen_empty => {
                        return Err(BoardParseError::FloatingPiece { column: col });
                    }
                    Some(player) => {
                        board
                            .drop_mut(col, player)
                            .map_err(|_| BoardParseError::FloatingPiece { column: col })?;
                    }
                }
            }
        }

        Ok(board)
    }
}

/// Number of columns described by a `|====|` border line.
fn border_width(line: &str) -> Option<usize> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    let width = inner.chars().count();
    if width == 0 || width % 2 != 0 || !inner.chars().all(|c| c == '=') {
        return None;
    }
    Some(width / 2)
}

fn parse_row(line: &str, idx: usize, cols: usize) -> Result<Vec<Cell>, BoardParseError> {
    let malformed = |reason: &str| BoardParseError::MalformedLine {
        line: idx,
        reason: reason.to_string(),
    };
    let inner = line
        .strip_prefix('|')
        .and_then(|l| l.strip_suffix('|'))
        .ok_or_else(|| malformed("row must start and end with '|'"))?;

    let symbols: Vec<char> = inner.chars().collect();
    if symbols.len() != cols * 2 {
        return Err(malformed("row width does not match the border"));
    }
    if !symbols.iter().skip(1).step_by(2).all(|&c| c == ' ') {
        return Err(malformed("pieces must be separated by single spaces"));
    }

    symbols
        .iter()
        .step_by(2)
        .map(|&symbol| match symbol {
            'X' => Ok(Cell::One),
            'O' => Ok(Cell::Two),
            ' ' | '.' => Ok(Cell::Empty),
            other => Err(BoardParseError::UnknownSymbol {
                line: idx,
                symbol: other,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION: &str = "
|==============|
|              |
|              |
|    X X       |
|    O X X     |
|  O X O O     |
|  O O X X     |
|==============|
|0 1 2 3 4 5 6 |
";

    #[test]
    fn test_display_empty_board() {
        let board = Board::with_size(2, 3).unwrap();
        assert_eq!(board.to_string(), "|======|\n|      |\n|      |\n|======|\n|0 1 2 |");
    }

    #[test]
    fn test_parse_position() {
        let board: Board = POSITION.parse().unwrap();
        assert_eq!(board.rows(), 6);
        assert_eq!(board.columns(), 7);
        assert_eq!(board.get(0, 1), Cell::Two);
        assert_eq!(board.get(0, 3), Cell::One);
        assert_eq!(board.get(1, 3), Cell::Two);
        assert_eq!(board.get(3, 2), Cell::One);
        assert_eq!(board.column_height(2), 4);
        assert_eq!(board.column_height(0), 0);
        assert_eq!(board.piece_count(), 13);
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let board: Board = POSITION.parse().unwrap();
        assert_eq!(board.to_string(), POSITION.trim());
        let reparsed: Board = board.to_string().parse().unwrap();
        assert_eq!(reparsed, board);
    }

    #[test]
    fn test_parse_without_index_line() {
        let board: Board = "|====|\n|X   |\n|O X |\n|====|".parse().unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.columns(), 2);
        assert_eq!(board.get(1, 0), Cell::One);
        assert_eq!(board.get(0, 0), Cell::Two);
    }

    #[test]
    fn test_parse_rejects_floating_piece() {
        let err = "|====|\n|  X |\n|    |\n|====|".parse::<Board>().unwrap_err();
        assert_eq!(err, BoardParseError::FloatingPiece { column: 1 });
    }

    #[test]
    fn test_parse_rejects_unknown_symbol() {
        let err = "|====|\n|Z   |\n|====|".parse::<Board>().unwrap_err();
        assert_eq!(
            err,
            BoardParseError::UnknownSymbol {
                line: 1,
                symbol: 'Z'
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_separators() {
        let err = "|====|\n|XZOQ|\n|====|".parse::<Board>().unwrap_err();
        assert_eq!(
            err,
            BoardParseError::MalformedLine {
                line: 1,
                reason: "pieces must be separated by single spaces".to_string(),
            }
        );
        let err = "|====|\n|X.  |\n|====|".parse::<Board>().unwrap_err();
        assert!(matches!(err, BoardParseError::MalformedLine { line: 1, .. }));
        assert!("|====|\n|X O |\n|====|".parse::<Board>().is_ok());
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert_eq!("|==|".parse::<Board>().unwrap_err(), BoardParseError::TooShort);
        assert_eq!(
            "|====|\n|X   |".parse::<Board>().unwrap_err(),
            BoardParseError::TooShort
        );
    }

    #[test]
    fn test_parse_rejects_width_mismatch() {
        let err = "|====|\n|X     |\n|====|".parse::<Board>().unwrap_err();
        assert!(matches!(err, BoardParseError::MalformedLine { line: 1, .. }));
    }
}
