//! Trainer configuration from environment variables and command-line flags

use std::env;
use std::time::Duration;

use opening_book::PlayerColor;

use crate::error::TrainerError;

#[derive(Clone, Debug)]
pub struct Config {
    /// Delay before the opponent answers a book move
    pub reply_delay: Duration,

    /// Delay before the opponent's first move when the trainee plays black
    pub first_move_delay: Duration,

    /// Seed for the opponent's choice between book branches (OS entropy if unset)
    pub seed: Option<u64>,

    /// Opening selected at startup
    pub opening: Option<String>,

    /// Initial board orientation, i.e. the trainee's side
    pub orientation: PlayerColor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(450),
            first_move_delay: Duration::from_millis(700),
            seed: None,
            opening: None,
            orientation: PlayerColor::White,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from a variable lookup. Unparsable values keep their defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            reply_delay: var("TRAINER_REPLY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.reply_delay),
            first_move_delay: var("TRAINER_FIRST_MOVE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.first_move_delay),
            seed: var("TRAINER_SEED").and_then(|v| v.parse().ok()),
            opening: var("TRAINER_OPENING").filter(|v| !v.trim().is_empty()),
            orientation: var("TRAINER_ORIENTATION")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.orientation),
        }
    }

    pub fn with_args(mut self, args: &CliArgs) -> Self {
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.opening.is_some() {
            self.opening = args.opening.clone();
        }
        if let Some(color) = args.orientation {
            self.orientation = color;
        }
        self
    }
}

/// Command-line flags: `--list`, `--seed N`, `--opening KEY`, `--black`, `--white`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub list: bool,
    pub seed: Option<u64>,
    pub opening: Option<String>,
    pub orientation: Option<PlayerColor>,
}

impl CliArgs {
    pub fn parse(args: &[String]) -> Result<Self, TrainerError> {
        let mut parsed = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--list" => parsed.list = true,
                "--black" => parsed.orientation = Some(PlayerColor::Black),
                "--white" => parsed.orientation = Some(PlayerColor::White),
                "--seed" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| TrainerError::InvalidArgument("--seed needs a value".into()))?;
                    let seed = value
                        .parse()
                        .map_err(|_| TrainerError::InvalidArgument(format!("bad seed '{value}'")))?;
                    parsed.seed = Some(seed);
                }
                "--opening" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| TrainerError::InvalidArgument("--opening needs a key".into()))?;
                    parsed.opening = Some(value.clone());
                }
                other => return Err(TrainerError::InvalidArgument(other.to_string())),
            }
        }
        Ok(parsed)
    }
}
