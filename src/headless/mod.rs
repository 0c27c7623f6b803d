//! Headless mode for agentic testing
//!
//! This module runs a duel without any graphical output: a scripted player
//! takes the player's seat, the match is stepped with a fixed frame time and a
//! JSON report is written at the end.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless match with defaults
//! cargo run --release
//!
//! # Reproducible match from a config file
//! cargo run --release -- --config match.json --seed 42 --output report.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "skills_path": "assets/config/skills.ron",
//!   "match_duration_ms": 60000,
//!   "random_seed": 42,
//!   "frame_ms": 16,
//!   "reaction_ms": 250,
//!   "use_defensive": true
//! }
//! ```

pub mod autopilot;
pub mod config;
pub mod runner;

pub use autopilot::Autopilot;
pub use config::HeadlessMatchConfig;
pub use runner::{run_headless_match, run_headless_match_with_log, MatchResult};
