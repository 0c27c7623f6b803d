//! Headless match execution
//!
//! Runs a duel without any graphical output, suitable for automated testing.
//! Frames are stepped manually with a fixed time step, so a seeded match
//! replays identically regardless of wall-clock speed.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::combat::events::CombatEvent;
use crate::combat::rng::GameRng;
use crate::combat::simulation::{ActorSummary, Simulation};
use crate::combat::state::{ActorId, Winner};
use crate::combat::{CombatPlugin, CombatSystemPhase, Engine, MatchControl, SkillRequest};

use super::autopilot::Autopilot;
use super::config::HeadlessMatchConfig;

/// Frames allowed beyond the nominal match length before giving up
const FRAME_SLACK: u64 = 600;

/// Result of a completed headless match
///
/// This struct provides programmatic access to match results for testing and analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The winner, or `Tie` when time ran out with equal health
    pub winner: Option<Winner>,
    /// Match time at the end, in milliseconds
    pub duration_ms: u64,
    pub player: ActorSummary,
    pub ai: ActorSummary,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Frames simulated
    pub frames: u64,
    /// The most recent combat log entries
    pub events: Vec<CombatEvent>,
}

/// Resource to track headless match state
#[derive(Resource)]
pub struct HeadlessMatchState {
    pub autopilot: Autopilot,
    /// Custom output path for the match report
    pub output_path: Option<String>,
    /// Whether the match has completed
    pub match_complete: bool,
    pub frames: u64,
    /// Match result (populated when match completes)
    pub result: Option<MatchResult>,
}

/// Plugin for headless match execution
pub struct HeadlessPlugin {
    pub config: HeadlessMatchConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeadlessMatchState {
            autopilot: Autopilot::from_config(&self.config),
            output_path: self.config.output_path.clone(),
            match_complete: false,
            frames: 0,
            result: None,
        })
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            self.config.frame_ms,
        )));

        app.add_systems(Startup, headless_start_match)
            .add_systems(
                Update,
                headless_autopilot.before(CombatSystemPhase::Input),
            )
            .add_systems(
                Update,
                headless_check_match_end.after(CombatSystemPhase::Resolution),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

fn headless_start_match(mut controls: EventWriter<MatchControl>) {
    controls.send(MatchControl::Start);
}

/// Feed the scripted player's choice into the request channel.
fn headless_autopilot(
    simulation: Res<Simulation>,
    mut headless_state: ResMut<HeadlessMatchState>,
    mut requests: EventWriter<SkillRequest>,
) {
    headless_state.frames += 1;
    if let Some(skill) = headless_state.autopilot.choose(&simulation) {
        requests.send(SkillRequest {
            actor: ActorId::Player,
            skill,
        });
    }
}

fn headless_check_match_end(
    simulation: Res<Simulation>,
    mut headless_state: ResMut<HeadlessMatchState>,
) {
    if headless_state.match_complete || !simulation.state().is_over() {
        return;
    }

    let result = build_match_result(&simulation, &headless_state);
    match &result.winner {
        Some(Winner::Tie) => info!("Match ended in a TIE!"),
        Some(winner) => info!("Match ended! {:?} wins!", winner),
        None => {}
    }

    if let Some(path) = headless_state.output_path.as_deref() {
        match save_match_report(&result, path) {
            Ok(()) => println!("Match complete. Report saved to: {}", path),
            Err(e) => eprintln!("Failed to save match report: {}", e),
        }
    }

    headless_state.result = Some(result);
    headless_state.match_complete = true;
}

/// Build the MatchResult from the current simulation state
fn build_match_result(simulation: &Simulation, headless_state: &HeadlessMatchState) -> MatchResult {
    let summary = simulation.summary();
    MatchResult {
        winner: summary.winner,
        duration_ms: summary.duration_ms,
        player: summary.player,
        ai: summary.ai,
        random_seed: simulation.engine().seed(),
        frames: headless_state.frames,
        events: simulation.state().combat_log.iter().cloned().collect(),
    }
}

/// Write the result as pretty JSON.
pub fn save_match_report(result: &MatchResult, path: &str) -> Result<(), String> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("Failed to serialize match report: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to write '{}': {}", path, e))
}

/// Exit the app when the match is complete
fn headless_exit_on_complete(
    headless_state: Res<HeadlessMatchState>,
    mut exit: EventWriter<AppExit>,
) {
    if headless_state.match_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless match with the given configuration
pub fn run_headless_match(config: HeadlessMatchConfig) -> Result<MatchResult, String> {
    run_match(config, None)
}

/// Same as [`run_headless_match`], with log output installed.
pub fn run_headless_match_with_log(
    config: HeadlessMatchConfig,
    log: LogPlugin,
) -> Result<MatchResult, String> {
    run_match(config, Some(log))
}

fn run_match(config: HeadlessMatchConfig, log: Option<LogPlugin>) -> Result<MatchResult, String> {
    config.validate()?;
    let ruleset = config.load_ruleset()?;

    let mut app = App::new();
    if let Some(log) = log {
        app.add_plugins(log);
    }

    let rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };

    let max_frames = ruleset.settings.match_duration_ms / config.frame_ms + FRAME_SLACK;
    info!(
        "Starting headless match: {}s, {}ms frames",
        ruleset.settings.match_duration_ms / 1000,
        config.frame_ms
    );

    let simulation = Simulation::from_engine(Engine::new(ruleset, rng));

    // Minimal plugins - no window, no rendering
    app.add_plugins(MinimalPlugins)
        .add_plugins(CombatPlugin)
        .add_plugins(HeadlessPlugin { config })
        .insert_resource(simulation);

    app.finish();
    app.cleanup();

    for _ in 0..max_frames {
        app.update();
        if app.should_exit().is_some() {
            break;
        }
    }

    app.world_mut()
        .resource_mut::<HeadlessMatchState>()
        .result
        .take()
        .ok_or_else(|| format!("Match did not finish within {} frames", max_frames))
}
