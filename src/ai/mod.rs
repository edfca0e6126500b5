mod agent;
pub mod heuristic;
pub mod mcts;
pub mod minimax;
mod random;
pub mod rl;

use std::fmt;

use rand::rngs::StdRng;

use crate::config::AppConfig;
use crate::error::{AgentError, SetupError};
use crate::game::{Board, Player};

pub use agent::Agent;
pub use heuristic::{Heuristic, Score, WindowHeuristic};
pub use mcts::{MctsAgent, MctsConfig, MctsParams, SearchBudget, SearchStats};
pub use minimax::{MinimaxAgent, MinimaxConfig};
pub use random::RandomAgent;
pub use rl::{PolicyModel, QTable, RlAgent, RlConfig};

/// The built-in agent families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Random,
    Minimax,
    Mcts,
    Rl,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Random,
        AgentKind::Minimax,
        AgentKind::Mcts,
        AgentKind::Rl,
    ];
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Random => "random",
            AgentKind::Minimax => "minimax",
            AgentKind::Mcts => "mcts",
            AgentKind::Rl => "rl",
        };
        write!(f, "{name}")
    }
}

/// Any built-in agent, dispatched statically.
pub enum AnyAgent {
    Random(RandomAgent),
    Minimax(MinimaxAgent),
    Mcts(MctsAgent),
    Rl(RlAgent<QTable>),
}

impl AnyAgent {
    /// Build an agent of `kind` from its section of `config`.
    pub fn from_config(
        kind: AgentKind,
        config: &AppConfig,
        rng: StdRng,
    ) -> Result<Self, SetupError> {
        let agent = match kind {
            AgentKind::Random => AnyAgent::Random(RandomAgent::new(rng)),
            AgentKind::Minimax => AnyAgent::Minimax(MinimaxAgent::from_config(&config.minimax)),
            AgentKind::Mcts => AnyAgent::Mcts(MctsAgent::from_config(&config.mcts, rng)?),
            AgentKind::Rl => {
                config.rl.validate()?;
                let table = config.rl.load_model()?;
                AnyAgent::Rl(RlAgent::new(table, config.rl.epsilon, rng)?)
            }
        };
        Ok(agent)
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            AnyAgent::Random(_) => AgentKind::Random,
            AnyAgent::Minimax(_) => AgentKind::Minimax,
            AnyAgent::Mcts(_) => AgentKind::Mcts,
            AnyAgent::Rl(_) => AgentKind::Rl,
        }
    }
}

impl Agent for AnyAgent {
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        match self {
            AnyAgent::Random(a) => a.choose_move(board, player),
            AnyAgent::Minimax(a) => a.choose_move(board, player),
            AnyAgent::Mcts(a) => a.choose_move(board, player),
            AnyAgent::Rl(a) => a.choose_move(board, player),
        }
    }

    fn name(&self) -> &str {
        match self {
            AnyAgent::Random(a) => a.name(),
            AnyAgent::Minimax(a) => a.name(),
            AnyAgent::Mcts(a) => a.name(),
            AnyAgent::Rl(a) => a.name(),
        }
    }
}
