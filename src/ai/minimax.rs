use crate::error::AgentError;
use crate::game::{movegen, Board, Player};

use super::agent::{require_moves, Agent};
use super::heuristic::{Heuristic, Score, WindowHeuristic};

/// Configuration for the minimax agent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MinimaxConfig {
    /// Search depth in plies. Zero is valid and scores the root moves directly.
    pub depth: u32,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig { depth: 5 }
    }
}

/// Depth-bounded minimax agent with alpha-beta pruning.
///
/// The root move counts as the first ply, so depths 0 and 1 both look one
/// move ahead and score the resulting positions statically.
pub struct MinimaxAgent {
    depth: u32,
    heuristic: Box<dyn Heuristic>,
}

impl MinimaxAgent {
    pub fn new(depth: u32) -> Self {
        MinimaxAgent {
            depth,
            heuristic: Box::new(WindowHeuristic),
        }
    }

    pub fn from_config(config: &MinimaxConfig) -> Self {
        Self::new(config.depth)
    }

    pub fn with_heuristic(depth: u32, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxAgent { depth, heuristic }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Score every legal root move and return the best column with its score.
    ///
    /// Moves are tried center-out and only a strictly better score replaces
    /// the current best, so ties go to the most central column.
    pub fn best_move(&self, board: &Board, player: Player) -> Result<(usize, Score), AgentError> {
        let moves = require_moves(movegen::ordered_moves(board))?;
        // No game lasts longer than the number of cells.
        let cells = u32::try_from(board.rows() * board.columns()).unwrap_or(u32::MAX);
        let depth_left = self.depth.min(cells).saturating_sub(1);

        let mut best_action = moves[0];
        let mut best_score = Score::MIN;
        let mut alpha = Score::MIN;

        for &col in &moves {
            let mut child = board.clone();
            let row = child.drop_mut(col, player)?;
            let score =
                self.minimax(&child, row, col, depth_left, alpha, Score::MAX, false, player);
            if score > best_score {
                best_score = score;
                best_action = col;
            }
            alpha = alpha.max(best_score);
        }

        Ok((best_action, best_score))
    }

    /// Minimax value of `board`, where the last piece landed at (row, col).
    ///
    /// Scores are always from `player`'s point of view; `maximizing` tells
    /// whether `player` is the one to move.
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &self,
        board: &Board,
        row: usize,
        col: usize,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        player: Player,
    ) -> Score {
        if board.is_winning_cell(row, col) {
            // The piece that just landed belongs to the side that is not moving now.
            return if maximizing {
                Score::loss_in(depth)
            } else {
                Score::win_in(depth)
            };
        }
        if board.is_full() {
            return Score::DRAW;
        }
        if depth == 0 {
            return self.heuristic.evaluate(board, player);
        }

        let mover = if maximizing { player } else { player.other() };
        let mut best = if maximizing { Score::MIN } else { Score::MAX };

        for next_col in movegen::ordered_moves(board) {
            let mut child = board.clone();
            let Ok(next_row) = child.drop_mut(next_col, mover) else {
                continue;
            };
            let score = self.minimax(
                &child,
                next_row,
                next_col,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                player,
            );
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }

        best
    }
}

impl Agent for MinimaxAgent {
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let (action, score) = self.best_move(board, player)?;
        log::debug!(
            "minimax depth {} picked column {} for {} (score {})",
            self.depth,
            action,
            player,
            score
        );
        Ok(action)
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}
