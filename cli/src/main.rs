//! Interactive terminal front end for the sapper engine.
//!
//! All input validation happens here; the engine only ever sees in-range
//! coordinates and well-formed actions.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::Verbosity;
use sapper_core::{Board, Coord, Difficulty, GameStatus};

#[derive(Parser)]
#[command(name = "sapper", about = "Turn-based grid-reveal puzzle in the terminal")]
struct Cli {
    /// Preset difficulty; prompts interactively when omitted
    #[arg(short, long, value_enum)]
    difficulty: Option<DifficultyArg>,

    /// Seed for deterministic mine placement
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbosity: Verbosity,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let difficulty = match cli.difficulty {
        Some(arg) => arg.into(),
        None => choose_difficulty()?,
    };
    log::info!("Starting a {:?} game", difficulty);

    let board = match cli.seed {
        Some(seed) => Board::with_seed(difficulty, seed),
        None => Board::from_difficulty(difficulty),
    };
    play(board, difficulty.size())
}

/// Prints `message` and reads one trimmed line from stdin. Fails when the
/// input stream is closed so prompt loops cannot spin on EOF.
fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    let bytes = io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if bytes == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

fn choose_difficulty() -> Result<Difficulty> {
    let max = Difficulty::ALL.len() - 1;
    loop {
        let input = prompt(&format!("Choose a difficulty [0..{max}]: "))?;
        if let Some(&difficulty) = input
            .parse::<usize>()
            .ok()
            .and_then(|index| Difficulty::ALL.get(index))
        {
            return Ok(difficulty);
        }
    }
}

fn play(mut board: Board, size: Coord) -> Result<()> {
    let mut aborted = false;

    loop {
        println!("{board}");
        println!();

        let command = loop {
            let input = prompt("Enter a command (Choose field[c], Exit[x]): ")?;
            if input == "c" || input == "x" {
                break input;
            }
        };

        match command.as_str() {
            "c" => take_turn(&mut board, size)?,
            _ => aborted = true,
        }
        println!();

        if board.is_complete() || aborted {
            break;
        }
    }

    println!("{}", board.revealed_view());
    println!();

    let message = if aborted {
        "Game aborted!"
    } else if board.status() == GameStatus::Won {
        "You won!"
    } else {
        "You lost!"
    };
    println!("{message}");
    Ok(())
}

/// One coordinate-and-action exchange. Bounds are checked here, before the
/// engine is called.
fn take_turn(board: &mut Board, size: Coord) -> Result<()> {
    let x = prompt("Enter x coordinate (→): ")?.parse::<Coord>();
    let y = prompt("Enter y coordinate (↓): ")?.parse::<Coord>();

    let (x, y) = match (x, y) {
        (Ok(x), Ok(y)) if x < size && y < size => (x, y),
        _ => {
            println!("Invalid coordinates!");
            return Ok(());
        }
    };

    let action = prompt("Enter action (Reveal[r], Flag[f], Question[q], Clear[c], Abort[a]): ")?;
    match action.as_str() {
        "r" => board.reveal((x, y))?,
        "f" => board.flag((x, y))?,
        "q" => board.question((x, y))?,
        "c" => board.clear((x, y))?,
        "a" => {}
        _ => println!("Invalid action!"),
    }
    Ok(())
}
