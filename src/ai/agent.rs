use crate::error::AgentError;
use crate::game::{Board, Player};

/// Universal interface for all AI agents.
///
/// The driver passes the board it owns by reference; agents that search copy
/// it and never touch the caller's board.
pub trait Agent {
    /// Choose a column for `player` to drop into.
    ///
    /// Fails with [`AgentError::NoLegalMoves`] when the board is full.
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

/// Legal moves of `board`, or [`AgentError::NoLegalMoves`] if there are none.
pub(crate) fn require_moves(moves: Vec<usize>) -> Result<Vec<usize>, AgentError> {
    if moves.is_empty() {
        Err(AgentError::NoLegalMoves)
    } else {
        Ok(moves)
    }
}
