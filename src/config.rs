use std::{env, fmt, io::{self, BufRead, Write}, path::PathBuf, time::Duration};

use crate::Coords;
use crate::snake::Direction;
use crossterm::style::Color;

pub const FRAMERATE: u64 = 30;

pub const START_COORDS: Coords = (10, 5);
pub const START_DIRECTION: Direction = Direction::Right;

pub const SNAKE_CHAR: char = 'O';
pub const APPLE_CHAR: char = 'A';

pub const SNAKE_COLOR: Color = Color::Green;
pub const APPLE_COLOR: Color = Color::Red;
pub const SCORE_COLOR: Color = Color::Reset;
pub const GAME_OVER_COLOR: Color = Color::DarkRed;
pub const BLANK_COLOR: Color = Color::Reset;

// Far more apples than any terminal has cells
pub const MAX_APPLES: usize = u16::MAX as usize;

pub const GAME_OVER_PAUSE: Duration = Duration::from_millis(1000);

const LOG_ENV_VAR: &str = "SNAKE_LOG";

/// Time to wait between ticks. Terminal cells are roughly twice as tall as
/// they are wide, so vertical movement runs at half the framerate.
pub fn frame_interval(direction: Direction) -> Duration {
    let framerate = if direction.is_vertical() { FRAMERATE / 2 } else { FRAMERATE };
    Duration::from_millis(1000 / framerate)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgError {
    InvalidAppleCount(String),
    TooManyApples(usize),
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgError::InvalidAppleCount(_) => write!(f, "Args must be an integer input"),
            ArgError::TooManyApples(n) => write!(f, "{} apples is too many, at most {} are allowed", n, MAX_APPLES),
        }
    }
}

impl std::error::Error for ArgError {}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// `None` when no argument was given and the count has to be asked for
    pub apples: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl Options {
    pub fn from_env() -> Result<Self, ArgError> {
        let mut opts = Options::from_args(env::args().skip(1))?;
        opts.log_file = env::var_os(LOG_ENV_VAR).map(PathBuf::from);
        Ok(opts)
    }

    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ArgError> {
        let apples = match args.into_iter().next() {
            Some(arg) => Some(parse_apple_count(&arg)?),
            None => None,
        };

        Ok(Options { apples, log_file: None })
    }
}

fn parse_apple_count(s: &str) -> Result<usize, ArgError> {
    match s.trim().parse::<usize>() {
        Ok(n) if n > MAX_APPLES => Err(ArgError::TooManyApples(n)),
        Ok(n) => Ok(n),
        Err(_) => Err(ArgError::InvalidAppleCount(s.to_string())),
    }
}

/// Keeps asking until a valid count is entered.
pub fn prompt_apple_count<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<usize> {
    let mut line = String::new();

    loop {
        write!(output, "Enter how many apples: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no apple count entered"));
        }

        if let Ok(n) = parse_apple_count(&line) {
            return Ok(n);
        }
    }
}
