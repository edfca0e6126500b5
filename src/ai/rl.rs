use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, ConfigError, ModelError};
use crate::game::{movegen, Board, Player};

use super::agent::{require_moves, Agent};

/// Configuration for the RL agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RlConfig {
    /// Q-table JSON file. Without one the agent plays from an empty table.
    pub model_path: Option<PathBuf>,
    /// Exploration rate in [0, 1].
    pub epsilon: f32,
}

impl RlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::Validation(format!(
                "rl.epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Load the configured Q-table, or an empty one when no path is set.
    pub fn load_model(&self) -> Result<QTable, ModelError> {
        match &self.model_path {
            Some(path) => QTable::load_or_empty(path),
            None => Ok(QTable::new()),
        }
    }
}

/// A pre-trained estimator that scores every column of a position.
///
/// Implementations return one value per board column, higher is better for
/// `player`. Values for full columns are ignored.
pub trait PolicyModel {
    fn action_values(&self, board: &Board, player: Player) -> Vec<f32>;
}

impl<F> PolicyModel for F
where
    F: Fn(&Board, Player) -> Vec<f32>,
{
    fn action_values(&self, board: &Board, player: Player) -> Vec<f32> {
        self(board, player)
    }
}

/// Tabular Q-values keyed by [`Board::state_key`].
///
/// Stored on disk as a JSON object mapping each key to its column values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    values: HashMap<String, Vec<f32>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path).map_err(|e| ModelError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from `path`, or start with an empty table if the file is missing.
    pub fn load_or_empty(path: &Path) -> Result<Self, ModelError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!(
                "model file {} not found, rl agent falls back to an empty Q-table",
                path.display()
            );
            Ok(Self::new())
        }
    }

    pub fn insert(&mut self, board: &Board, values: Vec<f32>) {
        self.values.insert(board.state_key(), values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PolicyModel for QTable {
    fn action_values(&self, board: &Board, _player: Player) -> Vec<f32> {
        self.values
            .get(&board.state_key())
            .cloned()
            .unwrap_or_else(|| vec![0.0; board.columns()])
    }
}

/// Agent that plays the legal column its policy model values most.
///
/// With probability `epsilon` it explores a uniformly random legal column
/// instead. The greedy pick ignores full columns and non-finite values; ties
/// go to the lowest column index.
pub struct RlAgent<M> {
    model: M,
    epsilon: f32,
    rng: StdRng,
}

impl<M: PolicyModel> RlAgent<M> {
    pub fn new(model: M, epsilon: f32, rng: StdRng) -> Result<Self, ConfigError> {
        RlConfig {
            model_path: None,
            epsilon,
        }
        .validate()?;
        Ok(RlAgent {
            model,
            epsilon,
            rng,
        })
    }

    /// Purely greedy agent.
    pub fn greedy(model: M, rng: StdRng) -> Self {
        RlAgent {
            model,
            epsilon: 0.0,
            rng,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Best legal column under the model, without exploration.
    pub fn greedy_move(&self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let legal = require_moves(movegen::legal_moves(board))?;
        let values = self.model.action_values(board, player);
        if values.len() != board.columns() {
            return Err(AgentError::InvalidPolicyOutput {
                expected: board.columns(),
                actual: values.len(),
            });
        }

        // Legal moves come in ascending order, so strict `>` keeps the lowest column on ties.
        let mut best_action = legal[0];
        let mut best_value = f32::NEG_INFINITY;
        for &col in &legal {
            let value = values[col];
            if value.is_finite() && value > best_value {
                best_value = value;
                best_action = col;
            }
        }
        Ok(best_action)
    }
}

impl<M: PolicyModel> Agent for RlAgent<M> {
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let legal = require_moves(movegen::legal_moves(board))?;

        if self.epsilon > 0.0 && self.rng.random_range(0.0..1.0) < self.epsilon {
            let idx = self.rng.random_range(0..legal.len());
            log::debug!("rl agent explores column {} for {}", legal[idx], player);
            return Ok(legal[idx]);
        }

        let action = self.greedy_move(board, player)?;
        log::debug!("rl agent picked column {} for {}", action, player);
        Ok(action)
    }

    fn name(&self) -> &str {
        "RL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    fn fixed(values: Vec<f32>) -> impl Fn(&Board, Player) -> Vec<f32> {
        move |_, _| values.clone()
    }

    #[test]
    fn test_picks_highest_value() {
        let mut agent = RlAgent::greedy(fixed(vec![0.1, 0.2, 0.9, 0.3, 0.0, -1.0, 0.5]), rng());
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(2));
    }

    #[test]
    fn test_masks_full_columns() {
        let mut board = Board::new();
        for _ in 0..board.rows() {
            board.drop_mut(2, Player::One).unwrap();
        }
        let mut agent = RlAgent::greedy(fixed(vec![0.1, 0.2, 9.0, 0.3, 0.0, -1.0, 0.5]), rng());
        assert_eq!(agent.choose_move(&board, Player::Two), Ok(6));
    }

    #[test]
    fn test_ties_go_to_lowest_column() {
        let mut agent = RlAgent::greedy(fixed(vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0]), rng());
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(1));
    }

    #[test]
    fn test_ignores_non_finite_values() {
        let values = vec![f32::NAN, f32::INFINITY, -3.0, -2.0, f32::NAN, -5.0, -4.0];
        let mut agent = RlAgent::greedy(fixed(values), rng());
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(3));

        // Nothing usable: fall back to the first legal column.
        let mut agent = RlAgent::greedy(fixed(vec![f32::NAN; 7]), rng());
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(0));
    }

    #[test]
    fn test_wrong_output_length_is_an_error() {
        let mut agent = RlAgent::greedy(fixed(vec![1.0; 5]), rng());
        assert_eq!(
            agent.choose_move(&Board::new(), Player::One),
            Err(AgentError::InvalidPolicyOutput {
                expected: 7,
                actual: 5
            })
        );
    }

    #[test]
    fn test_full_board_errors() {
        let mut board = Board::with_size(1, 1).unwrap();
        board.drop_mut(0, Player::One).unwrap();
        let mut agent = RlAgent::greedy(fixed(vec![1.0]), rng());
        assert_eq!(agent.choose_move(&board, Player::Two), Err(AgentError::NoLegalMoves));
    }

    #[test]
    fn test_epsilon_validation() {
        assert!(RlAgent::new(QTable::new(), -0.1, rng()).is_err());
        assert!(RlAgent::new(QTable::new(), 1.5, rng()).is_err());
        assert!(RlAgent::new(QTable::new(), f32::NAN, rng()).is_err());
        assert!(RlAgent::new(QTable::new(), 0.3, rng()).is_ok());
    }

    #[test]
    fn test_full_exploration_is_seeded_and_legal() {
        let model = fixed(vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0]);
        let mut a = RlAgent::new(&model, 1.0, StdRng::seed_from_u64(5)).unwrap();
        let mut b = RlAgent::new(&model, 1.0, StdRng::seed_from_u64(5)).unwrap();
        let board = Board::new();
        let first: Vec<usize> = (0..40)
            .map(|_| a.choose_move(&board, Player::One).unwrap())
            .collect();
        let second: Vec<usize> = (0..40)
            .map(|_| b.choose_move(&board, Player::One).unwrap())
            .collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|&c| c != 3));
    }

    #[test]
    fn test_qtable_unseen_state_is_zero() {
        let table = QTable::new();
        assert_eq!(table.action_values(&Board::new(), Player::One), vec![0.0; 7]);
        // All zeros: the lowest legal column wins.
        let mut agent = RlAgent::greedy(table, rng());
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(0));
    }

    #[test]
    fn test_qtable_lookup_by_state_key() {
        let mut board = Board::new();
        board.drop_mut(3, Player::One).unwrap();
        let mut table = QTable::new();
        table.insert(&board, vec![0.0, 0.0, 0.0, 0.0, 0.7, 0.0, 0.0]);
        assert_eq!(table.len(), 1);

        let mut agent = RlAgent::greedy(table, rng());
        assert_eq!(agent.choose_move(&board, Player::Two), Ok(4));
        assert_eq!(agent.choose_move(&Board::new(), Player::One), Ok(0));
    }

    #[test]
    fn test_qtable_load_from_json() {
        let board = Board::new().drop(0, Player::One).unwrap();
        let json = format!(
            r#"{{ "{}": [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6] }}"#,
            board.state_key()
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let table = QTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        let mut agent = RlAgent::greedy(table, rng());
        assert_eq!(agent.choose_move(&board, Player::Two), Ok(6));
    }

    #[test]
    fn test_qtable_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(QTable::load(&missing), Err(ModelError::Read { .. })));
        assert!(QTable::load_or_empty(&missing).unwrap().is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(QTable::load(&bad), Err(ModelError::Parse { .. })));
        assert!(QTable::load_or_empty(&bad).is_err());
    }

    #[test]
    fn test_config_loads_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");
        let key = Board::new().state_key();
        fs::write(&path, format!(r#"{{"{key}": [0, 0, 0, 0, 0, 1, 0]}}"#)).unwrap();

        let config = RlConfig {
            model_path: Some(path),
            epsilon: 0.0,
        };
        config.validate().unwrap();
        let table = config.load_model().unwrap();
        assert_eq!(table.action_values(&Board::new(), Player::One)[5], 1.0);

        assert!(RlConfig::default().load_model().unwrap().is_empty());
        let bad = RlConfig {
            model_path: None,
            epsilon: 2.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(RlAgent::greedy(QTable::new(), rng()).name(), "RL");
    }
}
