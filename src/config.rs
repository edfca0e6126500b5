use std::path::Path;

use crate::ai::{MctsConfig, MinimaxConfig, RlConfig};
use crate::error::ConfigError;
use crate::game::{Board, COLS, ROWS};

/// Board dimensions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub columns: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            rows: ROWS,
            columns: COLS,
        }
    }
}

impl BoardConfig {
    /// An empty board of the configured size.
    pub fn build(&self) -> Result<Board, ConfigError> {
        Board::with_size(self.rows, self.columns)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master seed for every agent's RNG. Unset means a fresh seed per run.
    pub seed: Option<u64>,
    pub board: BoardConfig,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
    pub rl: RlConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.rows == 0 {
            return Err(ConfigError::Validation("board.rows must be >= 1".into()));
        }
        if self.board.columns == 0 {
            return Err(ConfigError::Validation("board.columns must be >= 1".into()));
        }
        self.mcts.validate()?;
        self.rl.validate()?;
        Ok(())
    }

    /// Render the default configuration as TOML, for writing a starter file.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.seed, None);
        assert_eq!(config.minimax.depth, 5);
        assert_eq!(config.mcts.iterations, 2000);
        assert_eq!(config.rl.epsilon, 0.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
seed = 17

[mcts]
time_budget_ms = 300
workers = 4
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.mcts.workers, 4);
        assert_eq!(config.mcts.iterations, 2000);
        assert!(config.mcts.heuristic_rollouts);
        assert_eq!(config.board.rows, 6);
        assert_eq!(config.board.columns, 7);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.minimax.depth, default.minimax.depth);
        assert!((config.mcts.exploration - default.mcts.exploration).abs() < 1e-12);
    }

    #[test]
    fn test_negative_depth_fails_to_parse() {
        let result: Result<AppConfig, _> = toml::from_str("[minimax]\ndepth = -1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_depth_is_valid() {
        let config: AppConfig = toml::from_str("[minimax]\ndepth = 0\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.minimax.depth, 0);
    }

    #[test]
    fn test_validation_rejects_zero_board_dimensions() {
        let mut config = AppConfig::default();
        config.board.rows = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.board.columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_iterations() {
        let mut config = AppConfig::default();
        config.mcts.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_time_budget() {
        let mut config = AppConfig::default();
        config.mcts.time_budget_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_exploration() {
        let mut config = AppConfig::default();
        config.mcts.exploration = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_workers() {
        let mut config = AppConfig::default();
        config.mcts.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_rollout_depth() {
        let mut config = AppConfig::default();
        config.mcts.rollout_depth = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_out_of_range() {
        let mut config = AppConfig::default();
        config.rl.epsilon = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.mcts.iterations, 2000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[board]
rows = 5
columns = 8

[minimax]
depth = 3
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.minimax.depth, 3);
        let board = config.board.build().unwrap();
        assert_eq!((board.rows(), board.columns()), (5, 8));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[mcts]\niterations = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "[mcts\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config.mcts.iterations, 2000);
    }
}
