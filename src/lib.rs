//! # Connect Four Agents
//!
//! A Connect Four engine with interchangeable computer players: uniform
//! random, depth-bounded minimax with alpha-beta pruning, Monte Carlo Tree
//! Search and a Q-table driven reinforcement learning policy.
//!
//! ## Modules
//!
//! - [`game`] — Board, players, move generation and the board text format
//! - [`ai`] — Agent trait and the four agent families
//! - [`arena`] — Game driver and match statistics
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod arena;
pub mod config;
pub mod error;
pub mod game;
