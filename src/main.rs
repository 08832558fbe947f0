mod apple;
mod config;
mod game;
mod snake;
mod term;

use std::{fs::File, io::{stdin, stdout}, path::Path, process::exit};

use anyhow::Context;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};

use crate::config::{prompt_apple_count, Options};
use crate::game::SnakeGame;
use crate::term::TermManager;

pub type TermInt = u16;
pub type Coords = (i32, i32);
pub type Size = (TermInt, TermInt);

fn main() -> anyhow::Result<()> {
    let opts = match Options::from_env() {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{}", err);
            exit(2);
        }
    };

    if let Some(path) = &opts.log_file {
        init_logging(path)?;
    }

    let apples = match opts.apples {
        Some(n) => n,
        None => prompt_apple_count(stdin().lock(), stdout()).context("Error reading apple count")?,
    };

    let mut term = TermManager::new().context("Error reading terminal size")?;
    term.setup().context("Error setting up terminal")?;

    // The terminal is restored when the game (and the TermManager it owns) is dropped
    let mut game = SnakeGame::new(term, rand::thread_rng(), apples);
    let outcome = game.run()?;
    game.game_over(outcome.score)?;

    info!("Exiting with score {}", outcome.score);
    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Error creating log file {}", path.display()))?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)?;
    Ok(())
}
