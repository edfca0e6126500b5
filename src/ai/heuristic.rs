use std::fmt;
use std::ops::Neg;

use crate::game::{Board, Cell, Player, CONNECT};

/// Position score from one player's point of view.
///
/// Heuristic values always lie within `±HEURISTIC_BOUND`; decided games are
/// scored near `WIN`/`LOSS`, far outside that range, so a forced result always
/// outranks any positional advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    pub const WIN: Score = Score(1_000_000);
    pub const LOSS: Score = Score(-1_000_000);
    pub const DRAW: Score = Score(0);
    /// Below every reachable score; used to open alpha-beta windows.
    pub const MIN: Score = Score(i32::MIN + 1);
    pub const MAX: Score = Score(i32::MAX);
    pub const HEURISTIC_BOUND: i32 = 100_000;

    /// A heuristic score, clamped into the heuristic range.
    pub fn heuristic(value: i32) -> Score {
        Score(value.clamp(-Self::HEURISTIC_BOUND, Self::HEURISTIC_BOUND))
    }

    /// Win found with `depth_left` plies still available; sooner wins score higher.
    pub fn win_in(depth_left: u32) -> Score {
        Score(Self::WIN.0 + Self::depth_bonus(depth_left))
    }

    /// Loss found with `depth_left` plies still available; later losses score higher.
    pub fn loss_in(depth_left: u32) -> Score {
        Score(Self::LOSS.0 - Self::depth_bonus(depth_left))
    }

    /// Depth adjustment, saturated so decided scores stay between the
    /// heuristic range and the alpha-beta bounds.
    fn depth_bonus(depth_left: u32) -> i32 {
        i32::try_from(depth_left)
            .unwrap_or(i32::MAX)
            .min(Self::HEURISTIC_BOUND)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// True for scores that come from a decided game rather than the heuristic.
    pub fn is_decisive(self) -> bool {
        self.0.abs() > Self::HEURISTIC_BOUND && self != Self::MIN && self != Self::MAX
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score(-self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_decisive() && self.0 > 0 {
            write!(f, "win")
        } else if self.is_decisive() {
            write!(f, "loss")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player) -> Score;
}

/// Default heuristic that scans all 4-cell windows and scores threats,
/// plus a bonus for owning the center column.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHeuristic;

impl WindowHeuristic {
    const CENTER_WEIGHT: i32 = 3;

    fn score_window(own: usize, opp: usize, empty: usize) -> i32 {
        match (own, opp, empty) {
            (3, 0, 1) => 50,
            (2, 0, 2) => 10,
            (0, 3, 1) => -80,
            (0, 2, 2) => -10,
            _ => 0,
        }
    }
}

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> Score {
        let own_cell = player.to_cell();
        let mut score = 0;

        let center = board.columns() / 2;
        for row in 0..board.column_height(center) {
            score += match board.get(row, center) {
                c if c == own_cell => Self::CENTER_WEIGHT,
                Cell::Empty => 0,
                _ => -Self::CENTER_WEIGHT,
            };
        }

        for window in board.windows() {
            let own = window.iter().filter(|&&c| c == own_cell).count();
            let empty = window.iter().filter(|&&c| c == Cell::Empty).count();
            let opp = CONNECT - own - empty;
            score += Self::score_window(own, opp, empty);
        }

        Score::heuristic(score)
    }
}
