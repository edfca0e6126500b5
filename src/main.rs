use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use connect_four_agents::ai::{Agent, AgentKind, AnyAgent};
use connect_four_agents::arena::{play_game_observed, play_series};
use connect_four_agents::config::AppConfig;
use connect_four_agents::error::AgentError;
use connect_four_agents::game::{Board, GameResult, Player};

/// Who controls one side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Human,
    Random,
    Minimax,
    Mcts,
    Rl,
}

impl Side {
    fn agent_kind(self) -> Option<AgentKind> {
        match self {
            Side::Human => None,
            Side::Random => Some(AgentKind::Random),
            Side::Minimax => Some(AgentKind::Minimax),
            Side::Mcts => Some(AgentKind::Mcts),
            Side::Rl => Some(AgentKind::Rl),
        }
    }
}

/// Play Connect Four between humans and computer agents.
#[derive(Parser)]
#[command(name = "connect4", about = "Play Connect Four against computer agents")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Who plays X and moves first
    #[arg(long, value_enum, default_value = "human")]
    first: Side,

    /// Who plays O
    #[arg(long, value_enum, default_value = "minimax")]
    second: Side,

    /// Number of games; more than one plays a series with alternating sides
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Override the master random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Only print the final result
    #[arg(long)]
    quiet: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Reads columns from `input`, re-prompting until the input is a legal move.
struct HumanAgent<R> {
    input: R,
    name: String,
    /// Print the board before prompting, for when moves are not echoed.
    show_board: bool,
}

impl<R: BufRead> Agent for HumanAgent<R> {
    fn choose_move(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        if board.legal_moves().is_empty() {
            return Err(AgentError::NoLegalMoves);
        }
        if self.show_board {
            println!("{board}");
        }
        loop {
            print!("{player}, choose a column (0-{}): ", board.columns() - 1);
            let _ = io::stdout().flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    println!();
                    return Err(AgentError::InputUnavailable("input closed".to_string()));
                }
                Ok(_) => {}
                Err(e) => return Err(AgentError::InputUnavailable(e.to_string())),
            }

            let Ok(column) = line.trim().parse::<usize>() else {
                println!("'{}' is not a column number.", line.trim());
                continue;
            };
            match board.check_move(column) {
                Ok(()) => return Ok(column),
                Err(e) => println!("Illegal move: {e}."),
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn build_side(
    side: Side,
    config: &AppConfig,
    master: &mut StdRng,
    quiet: bool,
) -> Result<Box<dyn Agent>> {
    // One stream per seat, drawn for humans too.
    let rng = StdRng::seed_from_u64(master.random());
    match side.agent_kind() {
        None => Ok(Box::new(HumanAgent {
            input: io::stdin().lock(),
            name: "Human".to_string(),
            show_board: quiet,
        })),
        Some(kind) => {
            let agent = AnyAgent::from_config(kind, config, rng)
                .with_context(|| format!("building {kind} agent"))?;
            Ok(Box::new(agent))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.quiet { "warn" } else { "info" }),
    )
    .init();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if cli.games == 0 {
        bail!("--games must be at least 1");
    }
    let has_human = cli.first == Side::Human || cli.second == Side::Human;
    if has_human && cli.games > 1 {
        bail!("a series of games needs two computer agents");
    }

    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    log::info!("using seed {seed}");
    let mut master = StdRng::seed_from_u64(seed);

    let board = config.board.build().context("building board")?;
    let mut first = build_side(cli.first, &config, &mut master, cli.quiet)?;
    let mut second = build_side(cli.second, &config, &mut master, cli.quiet)?;

    if cli.games > 1 {
        let stats = play_series(&board, first.as_mut(), second.as_mut(), cli.games)
            .context("playing series")?;
        println!("A = {}, B = {}", first.name(), second.name());
        println!("{stats}");
        return Ok(());
    }

    let quiet = cli.quiet;
    if !quiet {
        println!("{} (X) vs {} (O)", first.name(), second.name());
        println!("{board}");
        println!();
    }
    let record = play_game_observed(
        board,
        first.as_mut(),
        second.as_mut(),
        |board, player, column| {
            if !quiet {
                println!("{player} plays column {column}");
                println!("{board}");
                println!();
            }
        },
    )
    .context("playing game")?;

    if quiet {
        println!("{}", record.final_board);
    }
    match record.result {
        GameResult::Win(Player::One) => println!("{} wins as {}!", first.name(), Player::One),
        GameResult::Win(Player::Two) => println!("{} wins as {}!", second.name(), Player::Two),
        GameResult::Draw => println!("Draw."),
        GameResult::InProgress => bail!("game stopped before it was decided"),
    }
    Ok(())
}
