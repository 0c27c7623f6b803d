//! Integration tests for headless match execution
//!
//! These tests verify that:
//! - Headless matches run to completion
//! - Match results are accessible programmatically
//! - Seeded RNG produces deterministic results

use duelsim::headless::{run_headless_match, HeadlessMatchConfig, MatchResult};
use duelsim::Winner;

/// Helper to create a basic match config
fn create_config(seed: Option<u64>, duration_ms: Option<u64>) -> HeadlessMatchConfig {
    HeadlessMatchConfig {
        random_seed: seed,
        match_duration_ms: duration_ms,
        ..Default::default()
    }
}

#[test]
fn test_seeded_match_runs_to_completion() {
    let result = run_headless_match(create_config(Some(42), None)).expect("match should finish");

    assert!(result.winner.is_some());
    assert!(result.duration_ms <= 120_000 + 16);
    assert!(result.frames > 0);
    assert_eq!(result.random_seed, Some(42));
    assert!(!result.events.is_empty());
    assert!(result.events.len() <= 50);

    let someone_fell = result.player.final_hp == 0 || result.ai.final_hp == 0;
    if result.duration_ms < 120_000 {
        assert!(someone_fell, "an early end needs a death");
    }
}

#[test]
fn test_same_seed_same_result() {
    let first = run_headless_match(create_config(Some(7), Some(30_000))).unwrap();
    let second = run_headless_match(create_config(Some(7), Some(30_000))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_short_match_times_out() {
    let result = run_headless_match(create_config(Some(3), Some(5_000))).unwrap();

    assert!(result.duration_ms >= 5_000, "ended at {}", result.duration_ms);
    assert!(result.duration_ms < 5_000 + 16);
    let expected = if result.player.final_hp > result.ai.final_hp {
        Winner::Player
    } else if result.ai.final_hp > result.player.final_hp {
        Winner::Ai
    } else {
        Winner::Tie
    };
    assert_eq!(result.winner, Some(expected));
}

#[test]
fn test_scripted_player_fights_back() {
    let result = run_headless_match(create_config(Some(11), Some(60_000))).unwrap();

    assert!(result.player.damage_dealt > 0);
    assert_eq!(result.player.damage_dealt, result.ai.damage_taken);
    assert_eq!(result.ai.damage_dealt, result.player.damage_taken);
    assert!(result.player.interrupts_landed > 0, "yellow casts should get interrupted");
}

#[test]
fn test_report_written_as_json() {
    let path = std::env::temp_dir().join(format!("duelsim_report_{}.json", std::process::id()));
    let config = HeadlessMatchConfig {
        output_path: Some(path.display().to_string()),
        ..create_config(Some(5), Some(10_000))
    };

    let result = run_headless_match(config).unwrap();
    let contents = std::fs::read_to_string(&path).expect("report file");
    let saved: MatchResult = serde_json::from_str(&contents).expect("report parses");
    assert_eq!(saved, result);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_invalid_config_rejected_before_running() {
    let config = HeadlessMatchConfig {
        frame_ms: 0,
        ..Default::default()
    };
    assert!(run_headless_match(config).is_err());
}
