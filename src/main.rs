//! duelsim - real-time duel simulator
//!
//! Runs one player vs AI duel headless, with a scripted player, and prints
//! the result.

use bevy::log::{Level, LogPlugin};
use std::process::ExitCode;

use duelsim::cli;
use duelsim::headless::run_headless_match_with_log;

fn main() -> ExitCode {
    let args = cli::parse_args();

    let log = LogPlugin {
        level: if args.debug_ai { Level::DEBUG } else { Level::INFO },
        filter: "bevy_app=warn,bevy_ecs=warn".to_string(),
        ..Default::default()
    };

    let config = match args.to_match_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_headless_match_with_log(config, log) {
        Ok(result) => {
            println!(
                "Winner: {:?} after {:.1}s",
                result.winner,
                result.duration_ms as f64 / 1000.0
            );
            for line in [&result.player, &result.ai] {
                println!(
                    "  {}: {}/{} hp, dealt {}, taken {}, interrupts {}",
                    line.name,
                    line.final_hp,
                    line.max_hp,
                    line.damage_dealt,
                    line.damage_taken,
                    line.interrupts_landed
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Headless match failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
