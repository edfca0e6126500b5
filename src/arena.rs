use std::fmt;

use crate::ai::Agent;
use crate::error::AgentError;
use crate::game::{Board, GameResult, Player};

/// Everything that happened in one finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub moves: Vec<(Player, usize)>,
    pub final_board: Board,
    pub result: GameResult,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Player> {
        match self.result {
            GameResult::Win(p) => Some(p),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Play `board` to the end. `first` plays [`Player::One`], `second` plays [`Player::Two`].
pub fn play_game(
    board: Board,
    first: &mut dyn Agent,
    second: &mut dyn Agent,
) -> Result<GameRecord, AgentError> {
    play_game_observed(board, first, second, |_, _, _| {})
}

/// Like [`play_game`], calling `on_move(board, player, column)` after every move.
///
/// The side to move is derived from the piece counts, so a partly played
/// board continues with whoever is next.
pub fn play_game_observed<F>(
    mut board: Board,
    first: &mut dyn Agent,
    second: &mut dyn Agent,
    mut on_move: F,
) -> Result<GameRecord, AgentError>
where
    F: FnMut(&Board, Player, usize),
{
    let mut moves = Vec::new();
    let mut player = board.next_player();

    while board.result() == GameResult::InProgress {
        let agent: &mut dyn Agent = match player {
            Player::One => &mut *first,
            Player::Two => &mut *second,
        };
        let column = agent.choose_move(&board, player)?;
        board.drop_mut(column, player)?;
        moves.push((player, column));
        on_move(&board, player, column);
        player = player.other();
    }

    let result = board.result();
    Ok(GameRecord {
        moves,
        final_board: board,
        result,
    })
}

/// Win/draw tally between two agents, A and B.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
    total_moves: usize,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one game in which agent A played `a_side`.
    pub fn record(&mut self, game: &GameRecord, a_side: Player) {
        self.total_moves += game.len();
        match game.winner() {
            Some(p) if p == a_side => self.a_wins += 1,
            Some(_) => self.b_wins += 1,
            None => self.draws += 1,
        }
    }

    pub fn games(&self) -> usize {
        self.a_wins + self.b_wins + self.draws
    }

    pub fn a_win_rate(&self) -> f32 {
        self.rate(self.a_wins)
    }

    pub fn b_win_rate(&self) -> f32 {
        self.rate(self.b_wins)
    }

    pub fn draw_rate(&self) -> f32 {
        self.rate(self.draws)
    }

    pub fn average_game_length(&self) -> f32 {
        self.rate(self.total_moves)
    }

    fn rate(&self, count: usize) -> f32 {
        match self.games() {
            0 => 0.0,
            n => count as f32 / n as f32,
        }
    }
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: A won {} ({:.1}%), B won {} ({:.1}%), {} drawn, {:.1} moves per game",
            self.games(),
            self.a_wins,
            self.a_win_rate() * 100.0,
            self.b_wins,
            self.b_win_rate() * 100.0,
            self.draws,
            self.average_game_length()
        )
    }
}

/// Play `games` games from `start`, swapping sides every game so that
/// A moves first in the even-numbered ones.
pub fn play_series(
    start: &Board,
    a: &mut dyn Agent,
    b: &mut dyn Agent,
    games: usize,
) -> Result<MatchStats, AgentError> {
    let mut stats = MatchStats::new();
    for game in 0..games {
        let (a_side, record) = if game % 2 == 0 {
            (Player::One, play_game(start.clone(), a, b)?)
        } else {
            (Player::Two, play_game(start.clone(), b, a)?)
        };
        log::info!(
            "game {}: {:?} after {} moves",
            game + 1,
            record.result,
            record.len()
        );
        stats.record(&record, a_side);
    }
    Ok(stats)
}
