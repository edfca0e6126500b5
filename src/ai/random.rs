use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::AgentError;
use crate::game::{movegen, Board, Player};

use super::agent::{require_moves, Agent};

/// An agent that selects uniformly at random from legal actions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(rng: StdRng) -> Self {
        RandomAgent { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, board: &Board, _player: Player) -> Result<usize, AgentError> {
        let moves = require_moves(movegen::legal_moves(board))?;
        let idx = self.rng.random_range(0..moves.len());
        Ok(moves[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}
