use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::{AgentError, ConfigError};
use crate::game::{movegen, Board, Player};

use super::agent::{require_moves, Agent};
use super::heuristic::{Heuristic, WindowHeuristic};

// ─── Config ──────────────────────────────────────────────────────────────────

/// How much search to do per move. There is no default: callers must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Run exactly this many select/expand/simulate/backpropagate iterations.
    Iterations(u32),
    /// Keep iterating until the time is spent. Checked between iterations,
    /// and at least one iteration always runs.
    Time(Duration),
}

impl SearchBudget {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SearchBudget::Iterations(0) => Err(ConfigError::Validation(
                "mcts iteration budget must be > 0".into(),
            )),
            SearchBudget::Time(d) if d.is_zero() => Err(ConfigError::Validation(
                "mcts time budget must be > 0".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// MCTS tuning knobs other than the budget.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsParams {
    /// Exploration constant `c` in UCB1.
    pub exploration: f64,
    /// Stop playouts after this many plies and score the position statically.
    pub rollout_depth: Option<u32>,
    /// Playouts take immediate wins, block immediate losses and then prefer
    /// the center column before falling back to a uniformly random column.
    pub heuristic_rollouts: bool,
    /// Independent root-parallel search trees.
    pub workers: usize,
}

impl Default for MctsParams {
    fn default() -> Self {
        MctsParams {
            exploration: std::f64::consts::SQRT_2,
            rollout_depth: None,
            heuristic_rollouts: true,
            workers: 1,
        }
    }
}

impl MctsParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration <= 0.0 {
            return Err(ConfigError::Validation(
                "mcts exploration must be a finite number > 0".into(),
            ));
        }
        if self.rollout_depth == Some(0) {
            return Err(ConfigError::Validation(
                "mcts rollout_depth must be > 0 when set".into(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::Validation("mcts workers must be >= 1".into()));
        }
        Ok(())
    }
}

/// TOML-facing MCTS configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    pub iterations: u32,
    /// When set, search by wall-clock time instead of `iterations`.
    pub time_budget_ms: Option<u64>,
    pub exploration: f64,
    pub rollout_depth: Option<u32>,
    pub heuristic_rollouts: bool,
    pub workers: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        let params = MctsParams::default();
        MctsConfig {
            iterations: 2000,
            time_budget_ms: None,
            exploration: params.exploration,
            rollout_depth: params.rollout_depth,
            heuristic_rollouts: params.heuristic_rollouts,
            workers: params.workers,
        }
    }
}

impl MctsConfig {
    pub fn budget(&self) -> SearchBudget {
        match self.time_budget_ms {
            Some(ms) => SearchBudget::Time(Duration::from_millis(ms)),
            None => SearchBudget::Iterations(self.iterations),
        }
    }

    pub fn params(&self) -> MctsParams {
        MctsParams {
            exploration: self.exploration,
            rollout_depth: self.rollout_depth,
            heuristic_rollouts: self.heuristic_rollouts,
            workers: self.workers,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budget().validate()?;
        self.params().validate()
    }
}

// ─── Search statistics ───────────────────────────────────────────────────────

/// Root statistics for one candidate column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: usize,
    pub visits: u32,
    /// Sum of playout rewards from the root player's perspective.
    pub total_reward: f64,
}

impl ColumnStats {
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f64
        }
    }
}

/// Outcome of one search: per-column root statistics in center-out order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    pub columns: Vec<ColumnStats>,
}

impl SearchStats {
    /// Column with the most visits; ties go to the earlier (more central) column.
    pub fn best_column(&self) -> Option<usize> {
        let mut best: Option<&ColumnStats> = None;
        for stats in &self.columns {
            if best.map_or(true, |b| stats.visits > b.visits) {
                best = Some(stats);
            }
        }
        best.map(|s| s.column)
    }

    /// Sum of root child visits. Equals `iterations` after every search.
    pub fn total_visits(&self) -> u32 {
        self.columns.iter().map(|c| c.visits).sum()
    }

    /// Add another worker's statistics. Both must describe the same root.
    fn merge(&mut self, other: SearchStats) {
        self.iterations += other.iterations;
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns) {
            debug_assert_eq!(mine.column, theirs.column);
            mine.visits += theirs.visits;
            mine.total_reward += theirs.total_reward;
        }
    }
}

// ─── MCTS Tree (arena-based) ──────────────────────────────────────────────────

struct MctsNode {
    board: Board,
    /// Player whose piece led to this node. `reward` is from their perspective.
    mover: Player,
    parent: Option<usize>,
    /// Column played from the parent.
    column: Option<usize>,
    children: Vec<usize>,
    /// Unexpanded columns, most central last so `pop` takes it first.
    untried: Vec<usize>,
    /// Set when the move into this node ended the game: `Some(winner)` or `None` for a draw.
    terminal: Option<Option<Player>>,
    visits: u32,
    reward: f64,
}

impl MctsNode {
    fn new(
        board: Board,
        mover: Player,
        parent: Option<usize>,
        column: Option<usize>,
        terminal: Option<Option<Player>>,
    ) -> Self {
        let untried = if terminal.is_some() {
            Vec::new()
        } else {
            let mut moves = movegen::ordered_moves(&board);
            moves.reverse();
            moves
        };
        MctsNode {
            board,
            mover,
            parent,
            column,
            children: Vec::new(),
            untried,
            terminal,
            visits: 0,
            reward: 0.0,
        }
    }
}

struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    /// Fresh tree whose root is `board` with `to_move` about to play.
    fn new(board: Board, to_move: Player) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(MctsNode::new(board, to_move.other(), None, None, None));
        MctsTree { nodes }
    }

    fn root_player(&self) -> Player {
        self.nodes[0].mover.other()
    }

    /// Descend by UCB1 until a node with untried moves or a terminal node.
    fn select(&self, exploration: f64) -> usize {
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            if node.terminal.is_some() || !node.untried.is_empty() || node.children.is_empty() {
                return current;
            }
            current = self.best_ucb_child(current, exploration);
        }
    }

    /// Child of `node_idx` with the highest UCB1 score; the first one wins ties.
    fn best_ucb_child(&self, node_idx: usize, exploration: f64) -> usize {
        let node = &self.nodes[node_idx];
        let log_parent = (node.visits.max(1) as f64).ln();

        let mut best_child = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &ci in &node.children {
            let child = &self.nodes[ci];
            let score = if child.visits == 0 {
                f64::INFINITY
            } else {
                let visits = child.visits as f64;
                child.reward / visits + exploration * (log_parent / visits).sqrt()
            };
            if score > best_score {
                best_score = score;
                best_child = ci;
            }
        }
        best_child
    }

    /// Add one child for the next untried column. Returns the new node, or
    /// `node_idx` itself when there is nothing left to expand.
    fn expand(&mut self, node_idx: usize) -> usize {
        let Some(column) = self.nodes[node_idx].untried.pop() else {
            return node_idx;
        };

        let node = &self.nodes[node_idx];
        let mover = node.mover.other();
        let mut board = node.board.clone();
        let Ok(row) = board.drop_mut(column, mover) else {
            return node_idx;
        };
        let terminal = if board.is_winning_cell(row, column) {
            Some(Some(mover))
        } else if board.is_full() {
            Some(None)
        } else {
            None
        };

        let child_idx = self.nodes.len();
        self.nodes.push(MctsNode::new(
            board,
            mover,
            Some(node_idx),
            Some(column),
            terminal,
        ));
        self.nodes[node_idx].children.push(child_idx);
        child_idx
    }

    /// Walk from `node_idx` up to the root, crediting `winner` to each node's mover.
    fn backpropagate(&mut self, node_idx: usize, winner: Option<Player>) {
        let mut current = Some(node_idx);
        while let Some(idx) = current {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            node.reward += reward_for(winner, node.mover);
            current = node.parent;
        }
    }

    /// Root statistics in center-out column order, including unvisited columns.
    fn root_stats(&self, iterations: u32) -> SearchStats {
        let root = &self.nodes[0];
        debug_assert!(root
            .children
            .iter()
            .all(|&ci| self.nodes[ci].mover == self.root_player()));
        let columns = movegen::ordered_moves(&root.board)
            .into_iter()
            .map(|column| {
                let child = root
                    .children
                    .iter()
                    .map(|&ci| &self.nodes[ci])
                    .find(|child| child.column == Some(column));
                match child {
                    Some(child) => ColumnStats {
                        column,
                        visits: child.visits,
                        total_reward: child.reward,
                    },
                    None => ColumnStats {
                        column,
                        visits: 0,
                        total_reward: 0.0,
                    },
                }
            })
            .collect();
        SearchStats {
            iterations,
            columns,
        }
    }
}

/// +1 if `player` won, −1 if they lost, 0 for a draw.
fn reward_for(winner: Option<Player>, player: Player) -> f64 {
    match winner {
        Some(w) if w == player => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

// ─── Playouts ────────────────────────────────────────────────────────────────

/// Play from `board` (with `to_move` next) to the end, or to the rollout depth cap.
fn simulate(
    mut board: Board,
    mut to_move: Player,
    params: &MctsParams,
    root_player: Player,
    rng: &mut StdRng,
) -> Option<Player> {
    let mut plies = 0;
    loop {
        if params.rollout_depth.is_some_and(|limit| plies >= limit) {
            let score = WindowHeuristic.evaluate(&board, root_player).value();
            return match score.signum() {
                1 => Some(root_player),
                -1 => Some(root_player.other()),
                _ => None,
            };
        }

        let moves = movegen::legal_moves(&board);
        if moves.is_empty() {
            return None;
        }
        let column = rollout_move(&board, to_move, &moves, params.heuristic_rollouts, rng);

        let Ok(row) = board.drop_mut(column, to_move) else {
            return None;
        };
        if board.is_winning_cell(row, column) {
            return Some(to_move);
        }
        if board.is_full() {
            return None;
        }
        to_move = to_move.other();
        plies += 1;
    }
}

/// First column in `moves` where `player` would complete a line.
/// Playout policy. The heuristic one tries, in order: an immediate win, a
/// block of the opponent's immediate win, the center column, a random column.
fn rollout_move(
    board: &Board,
    to_move: Player,
    moves: &[usize],
    heuristic: bool,
    rng: &mut StdRng,
) -> usize {
    if heuristic {
        let center = board.columns() / 2;
        let preferred = winning_column(board, to_move, moves)
            .or_else(|| winning_column(board, to_move.other(), moves))
            .or_else(|| moves.contains(&center).then_some(center));
        if let Some(column) = preferred {
            return column;
        }
    }
    moves[rng.random_range(0..moves.len())]
}

fn winning_column(board: &Board, player: Player, moves: &[usize]) -> Option<usize> {
    moves.iter().copied().find(|&col| {
        let mut after = board.clone();
        after
            .drop_mut(col, player)
            .is_ok_and(|row| after.is_winning_cell(row, col))
    })
}

/// One complete search on a private tree.
fn run_search(
    board: Board,
    player: Player,
    budget: SearchBudget,
    params: &MctsParams,
    rng: &mut StdRng,
) -> SearchStats {
    let mut tree = MctsTree::new(board, player);
    let start = Instant::now();
    let mut iterations: u32 = 0;

    loop {
        let done = match budget {
            SearchBudget::Iterations(limit) => iterations >= limit,
            SearchBudget::Time(limit) => iterations > 0 && start.elapsed() >= limit,
        };
        if done {
            break;
        }

        let leaf = tree.select(params.exploration);
        let node_idx = tree.expand(leaf);
        let node = &tree.nodes[node_idx];
        let winner = match node.terminal {
            Some(result) => result,
            None => simulate(node.board.clone(), node.mover.other(), params, player, rng),
        };
        tree.backpropagate(node_idx, winner);
        iterations += 1;
    }

    tree.root_stats(iterations)
}

// ─── Agent ────────────────────────────────────────────────────────────────────

/// Monte Carlo Tree Search agent with UCB1 selection.
///
/// Each call builds a fresh tree; nothing is reused between moves.
pub struct MctsAgent {
    budget: SearchBudget,
    params: MctsParams,
    rng: StdRng,
}

impl MctsAgent {
    pub fn new(budget: SearchBudget, params: MctsParams, rng: StdRng) -> Result<Self, ConfigError> {
        budget.validate()?;
        params.validate()?;
        Ok(MctsAgent {
            budget,
            params,
            rng,
        })
    }

    pub fn from_config(config: &MctsConfig, rng: StdRng) -> Result<Self, ConfigError> {
        Self::new(config.budget(), config.params(), rng)
    }

    /// Iteration-budgeted agent with default parameters.
    pub fn with_iterations(iterations: u32, seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            SearchBudget::Iterations(iterations),
            MctsParams::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Search from `board` with `player` to move and return the root statistics.
    pub fn search(&mut self, board: &Board, player: Player) -> Result<SearchStats, AgentError> {
        require_moves(movegen::legal_moves(board))?;

        let workers = match self.budget {
            SearchBudget::Iterations(n) => self.params.workers.min(n as usize),
            SearchBudget::Time(_) => self.params.workers,
        };
        if workers <= 1 {
            return Ok(run_search(
                board.clone(),
                player,
                self.budget,
                &self.params,
                &mut self.rng,
            ));
        }

        // Seeds are drawn up front so the result only depends on our own RNG.
        let jobs: Vec<(SearchBudget, u64)> = (0..workers)
            .map(|i| (split_budget(self.budget, workers, i), self.rng.random()))
            .collect();
        let params = &self.params;

        let results: Vec<SearchStats> = std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|(budget, seed)| {
                    let board = board.clone();
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        run_search(board, player, budget, params, &mut rng)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let mut merged = results.into_iter();
        let mut stats = merged.next().ok_or(AgentError::NoLegalMoves)?;
        for worker_stats in merged {
            stats.merge(worker_stats);
        }
        Ok(stats)
    }
}

/// Share of `budget` for worker `index` out of `workers`.
fn split_budget(budget: SearchBudget, workers: usize, index: usize) -> SearchBudget {
    match budget {
        SearchBudget::Iterations(total) => {
            let workers = workers as u32;
            let index = index as u32;
            let share = total / workers + u32::from(index < total % workers);
            SearchBudget::Iterations(share)
        }
        time @ SearchBudget::Time(_) => time,
    }
}

impl Agent for MctsAgent {
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let stats = self.search(board, player)?;
        let column = stats.best_column().ok_or(AgentError::NoLegalMoves)?;
        log::debug!(
            "mcts picked column {} for {} after {} iterations ({:?})",
            column,
            player,
            stats.iterations,
            stats
                .columns
                .iter()
                .map(|c| (c.column, c.visits))
                .collect::<Vec<_>>()
        );
        Ok(column)
    }

    fn name(&self) -> &str {
        "MCTS"
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
