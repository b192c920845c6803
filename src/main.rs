//! Topcap command-line tool.
//!
//! ## Usage
//!
//! - `topcap` - Run a short demo
//! - `topcap show --code <CODE>` - Render a position with its codes and outcome
//! - `topcap moves --code <CODE>` - List legal moves
//! - `topcap think --code <CODE> --time-ms 2000` - Search for a move
//! - `topcap walk --plies 20 --seed 7` - Play random moves from the opening

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use topcap::board::{Board, Side};
use topcap::constants::DEFAULT_THINKING_TIME;
use topcap::heuristic::{ExponentialHeuristic, Heuristic, SimpleHeuristic};
use topcap::moves::Move;
use topcap::playout::random_walk;
use topcap::search::{ExplorationGraph, SearchLimits};

/// Topcap: graph search engine for a 6x6 jumping game
#[derive(Parser)]
#[command(name = "topcap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a position
    Show(PositionArgs),
    /// List legal moves for the side to move
    Moves(PositionArgs),
    /// Search for the best move
    Think {
        #[command(flatten)]
        position: PositionArgs,
        /// Thinking time in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
        /// Stop after this many expansions
        #[arg(long)]
        nodes: Option<usize>,
        #[arg(long, value_enum, default_value_t = HeuristicKind::Exponential)]
        heuristic: HeuristicKind,
    },
    /// Play random legal moves from a position
    Walk {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, default_value_t = 20)]
        plies: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Run a short demo of the engine
    Demo,
}

#[derive(Args)]
struct PositionArgs {
    /// 36-character placement code (rows 6 to 1, 'W', 'B', '-'); opening if omitted
    #[arg(long)]
    code: Option<String>,
    /// Second side to move
    #[arg(long)]
    second: bool,
}

impl PositionArgs {
    fn board(&self) -> Result<Board> {
        let mut board = match &self.code {
            Some(code) => Board::from_code(code).context("invalid placement code")?,
            None => Board::new(),
        };
        if self.second {
            board.set_side_to_move(Side::Second);
        }
        Ok(board)
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum HeuristicKind {
    Simple,
    Exponential,
}

impl HeuristicKind {
    fn build(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::Simple => Box::new(SimpleHeuristic::default()),
            HeuristicKind::Exponential => Box::new(ExponentialHeuristic::default()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Show(position)) => show(&position.board()?),
        Some(Commands::Moves(position)) => {
            let board = position.board()?;
            let moves = board.legal_moves(board.side_to_move());
            println!("{} to move, {} legal moves", board.side_to_move(), moves.len());
            for mv in moves {
                println!("{mv}");
            }
        }
        Some(Commands::Think {
            position,
            time_ms,
            nodes,
            heuristic,
        }) => {
            let board = position.board()?;
            let limits = SearchLimits {
                time: time_ms.map_or(DEFAULT_THINKING_TIME, Duration::from_millis),
                expansions: nodes,
            };
            think(&board, heuristic.build(), limits)?;
        }
        Some(Commands::Walk {
            position,
            plies,
            seed,
        }) => {
            let board = position.board()?;
            let (moves, end) = random_walk(&board, plies, &mut fastrand::Rng::with_seed(seed));
            let line: Vec<String> = moves.iter().map(Move::to_string).collect();
            println!("{}", line.join(" "));
            show(&end);
        }
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

fn show(board: &Board) {
    println!("{board}");
    println!("code:        {}", board.to_code());
    println!("fingerprint: {:#014x}", board.fingerprint());
    println!("to move:     {} (ply {})", board.side_to_move(), board.ply());
    let outcome = board.outcome();
    if outcome.is_decided() {
        println!("outcome:     {} wins ({:?})", outcome.winner, outcome.reason);
    }
}

fn think(board: &Board, heuristic: Box<dyn Heuristic>, limits: SearchLimits) -> Result<()> {
    if board.outcome().is_decided() {
        bail!("position is already decided");
    }
    let mut engine = ExplorationGraph::new(heuristic);
    println!("{board}");
    println!("Searching with {}", engine.heuristic_name());
    let stats = engine.explore(board, limits)?;
    let best = engine.best_move(board)?;
    let line: Vec<String> = engine
        .principal_variation(board, 8)
        .iter()
        .map(Move::to_string)
        .collect();
    println!("Best move: {best} (evaluation {:.1})", stats.root_evaluation);
    println!("Expected line: {}", line.join(" "));
    println!(
        "{} expansions, {} positions, {:.2}s{}",
        stats.expansions,
        stats.graph_size,
        stats.elapsed.as_secs_f64(),
        if stats.exhausted { ", exhausted" } else { "" }
    );
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Topcap: graph search engine\n");

    println!("=== Opening ===");
    let mut board = Board::new();
    show(&board);

    println!("\n=== Engine vs engine, first moves ===");
    let mut first = ExplorationGraph::with_heuristic(ExponentialHeuristic::default());
    let mut second = ExplorationGraph::with_heuristic(SimpleHeuristic::default());
    let limits = SearchLimits {
        time: Duration::from_millis(500),
        expansions: Some(2_000),
    };
    for _ in 0..4 {
        if board.outcome().is_decided() {
            break;
        }
        let engine = match board.side_to_move() {
            Side::Second => &mut second,
            _ => &mut first,
        };
        let mv = engine.choose_move(&board, limits)?;
        println!("{} plays {mv}", board.side_to_move());
        board.apply_move(&mv)?;
    }
    show(&board);
    Ok(())
}
