mod session;

use std::io::{self, Write};

use anyhow::Context;
use blockfall_engine::{Board, Generation, HeuristicPlayer, RandomAdversary, SharedBoard};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, prelude::*};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Seed for the adversary, given as a 64-bit integer.
    /// Replaying with the same seed and board yields the same game.
    /// Example: `./blockfall --seed=42` or `./blockfall -s 42`.
    #[arg(short, long)]
    seed: Option<u64>,
    /// How many blocks the adversary hands out before the game is won; `0` means no limit.
    #[arg(short = 'n', long, default_value_t = 400)]
    blocks: u32,
    /// Number of columns.
    #[arg(long, default_value_t = Board::DEFAULT_WIDTH)]
    width: i32,
    /// Number of rows.
    #[arg(long, default_value_t = Board::DEFAULT_HEIGHT)]
    height: i32,
    /// How many times the next block may be turned into a bomb.
    #[arg(long, default_value_t = Board::DEFAULT_BOMBS)]
    bombs: u32,
    /// How many falling blocks may be thrown away.
    #[arg(long, default_value_t = Board::DEFAULT_DISCARDS)]
    discards: u32,
    /// Custom starting board, as rows separated by '|', starting with the topmost row.
    /// The rows rest on the floor. Spaces indicate empty cells, anything else is a filled cell.
    /// Example: `./blockfall --board="X  XXX   X|XX XXXXXXX"` or `./blockfall -b "..."`.
    #[arg(short, long)]
    board: Option<String>,
    /// Hand out shapes from shuffled 7-bags instead of uniformly at random.
    #[arg(long)]
    bag: bool,
    /// Only print the final result, not every shape and action.
    #[arg(short, long)]
    quiet: bool,
    /// Print the final result as JSON.
    #[arg(long)]
    json: bool,
    /// Most verbose log level written to stderr.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    // Read commandline arguments.
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(LevelFilter::from_level(args.log_level))
        .init();

    // Catch panics and write error to separate file, so it isn't lost among the game transcript.
    std::panic::set_hook(Box::new(|panic_info| {
        let crash_file_name = format!(
            "blockfall_crash-msg_{}.txt",
            chrono::Utc::now().format("%Y-%m-%d_%Hh%Mm%Ss")
        );
        if let Ok(mut file) = std::fs::File::create(crash_file_name) {
            let _ = file.write(panic_info.to_string().as_bytes());
        }
        eprint!("{panic_info}\n\n");
    }));

    let rows: Vec<&str> = args
        .board
        .as_deref()
        .map(|board| board.split('|').collect())
        .unwrap_or_default();
    let board = Board::builder()
        .width(args.width)
        .height(args.height)
        .bombs_remaining(args.bombs)
        .discards_remaining(args.discards)
        .rows(rows)
        .build()
        .context("invalid board configuration")?;
    let board = SharedBoard::from(board);

    let seed = args.seed.unwrap_or_else(rand::random);
    let budget = (args.blocks > 0).then_some(args.blocks);
    let generation = if args.bag {
        Generation::bag()
    } else {
        Generation::uniform()
    };
    let mut adversary = RandomAdversary::new(seed, budget).with_generation(generation);
    let mut player = HeuristicPlayer::default();
    info!(seed, budget = ?adversary.budget(), ?generation, "starting game");

    // Run the game.
    let mut stdout = io::BufWriter::new(io::stdout().lock());
    let summary = session::play(
        &board,
        &mut player,
        &mut adversary,
        Some(seed),
        &mut stdout,
        args.quiet,
    )?;
    info!(handed_out = adversary.handed_out(), "adversary done");

    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
    } else {
        let verdict = if summary.won { "WON" } else { "LOST" };
        writeln!(stdout, "{verdict} {}", summary.score)?;
    }
    stdout.flush()?;

    Ok(())
}
