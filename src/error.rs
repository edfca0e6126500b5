use std::path::PathBuf;

/// A drop that the board refuses. Never clamped or ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {column} is out of range (board has {columns} columns)")]
    InvalidColumn { column: usize, columns: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),
}

/// Errors an agent can report instead of a move.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("no legal moves: the board is full")]
    NoLegalMoves,

    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("policy returned {actual} values for a board with {expected} columns")]
    InvalidPolicyOutput { expected: usize, actual: usize },

    #[error("move input unavailable: {0}")]
    InputUnavailable(String),
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Errors that can occur when loading a policy model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors that can occur when building an agent from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors produced when reading a board from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("board text needs a border, at least one row, a border and an index line")]
    TooShort,

    #[error("line {line} is malformed: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("unknown piece symbol {symbol:?} on line {line}")]
    UnknownSymbol { line: usize, symbol: char },

    #[error("floating piece in column {column}")]
    FloatingPiece { column: usize },
}
