use std::{env, fs};

use anyhow::{bail, Context};
use checkers_engine::{utils::perf_test, Color, GameSession};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: {} <start|diagram-file> <depth> [expected] [white|black]", args[0]);
    }
    let to_move = match args.get(4).map(String::as_str) {
        None | Some("white") => Color::White,
        Some("black") => Color::Black,
        Some(other) => bail!("Unknown side to move '{other}'"),
    };
    let game = if args[1] == "start" {
        GameSession::new()
    } else {
        let diagram = fs::read_to_string(&args[1])
            .with_context(|| format!("failed to read diagram from {}", args[1]))?;
        GameSession::from_diagram(&diagram, to_move)?
    };
    let depth: usize = args[2].parse().context("depth must be a number")?;
    let expected: usize = match args.get(3) {
        Some(value) => value.parse().context("expected count must be a number")?,
        None => 0,
    };
    if perf_test(&game, depth, expected, true) {
        Ok(())
    } else {
        bail!("node count differs from {expected}")
    }
}
