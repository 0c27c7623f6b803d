//! Command-line interface for duelsim
//!
//! Every run is headless; flags override the JSON config file.

use clap::Parser;
use std::path::PathBuf;

use crate::headless::HeadlessMatchConfig;

/// Real-time duel simulator
#[derive(Parser, Debug)]
#[command(name = "duelsim")]
#[command(about = "Run a player vs AI duel without a window and report the result")]
#[command(version)]
pub struct Args {
    /// JSON match config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// RON skill table replacing the built-in one
    #[arg(long, value_name = "SKILLS_FILE")]
    pub skills: Option<PathBuf>,

    /// Output path for the JSON match report
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Random seed for a reproducible match
    #[arg(long)]
    pub seed: Option<u64>,

    /// Match duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Log AI decisions at debug level
    #[arg(long)]
    pub debug_ai: bool,
}

impl Args {
    /// Load the config file (or defaults) and apply the flags on top.
    pub fn to_match_config(&self) -> Result<HeadlessMatchConfig, String> {
        let mut config = match &self.config {
            Some(path) => HeadlessMatchConfig::load_from_file(path)?,
            None => HeadlessMatchConfig::default(),
        };

        if let Some(path) = &self.skills {
            config.skills_path = Some(path.display().to_string());
        }
        if let Some(path) = &self.output {
            config.output_path = Some(path.display().to_string());
        }
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(secs) = self.duration {
            let ms = secs
                .checked_mul(1000)
                .ok_or_else(|| format!("Match duration of {}s is too long", secs))?;
            config.match_duration_ms = Some(ms);
        }
        config.debug_ai |= self.debug_ai;

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["duelsim", "--seed", "42", "--duration", "30", "--debug-ai"]);
        let config = args.to_match_config().unwrap();
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(config.match_duration_ms, Some(30_000));
        assert!(config.debug_ai);
        assert_eq!(config.frame_ms, 16);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let args = Args::parse_from(["duelsim", "--duration", "0"]);
        assert!(args.to_match_config().is_err());
    }

    #[test]
    fn test_huge_duration_is_an_error() {
        let args = Args::parse_from(["duelsim", "--duration", "18446744073709551615"]);
        let err = args.to_match_config().unwrap_err();
        assert!(err.contains("too long"), "{}", err);
    }
}
