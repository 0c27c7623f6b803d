//! Bevy systems that drive the simulation
//!
//! The engine is pure; these systems feed it frame time and input events.
//! Ordering is fixed by [`CombatSystemPhase`]:
//! 1. Input: lifecycle commands and skill requests
//! 2. Simulation: one engine tick from the frame's elapsed time
//! 3. Resolution: report status transitions

use bevy::prelude::*;

use super::constants::MAX_TICK_MS;
use super::engine::Rejection;
use super::simulation::Simulation;
use super::skills::SkillId;
use super::state::{ActorId, MatchStatus};

/// System sets for combat ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSystemPhase {
    /// Lifecycle commands and skill requests
    Input,
    /// Engine tick
    Simulation,
    /// Status watchers, match end
    Resolution,
}

/// Configures the ordering between combat system phases.
///
/// Call this once during app setup before adding combat systems.
pub fn configure_combat_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CombatSystemPhase::Input,
            CombatSystemPhase::Simulation,
            CombatSystemPhase::Resolution,
        )
            .chain(),
    );
}

/// Request to activate a skill, as sent by an input layer.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillRequest {
    pub actor: ActorId,
    pub skill: SkillId,
}

/// Sent back when a [`SkillRequest`] is refused.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SkillRejected {
    pub actor: ActorId,
    pub skill: SkillId,
    pub reason: Rejection,
}

/// Lifecycle command for the running match.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchControl {
    Start,
    Pause,
    Restart,
}

/// Controls the speed of the combat simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = half speed, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn double_speed(&mut self) {
        self.multiplier = 2.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}

/// Converts frame time into whole engine milliseconds.
#[derive(Resource, Default, Debug)]
pub struct SimulationClock {
    /// Fraction of a millisecond not yet handed to the engine
    pub carry_ms: f64,
}

impl SimulationClock {
    /// Whole milliseconds to advance by for a frame of `delta_ms`, capped at
    /// [`MAX_TICK_MS`]. Time beyond the cap is dropped, not queued.
    pub fn take(&mut self, delta_ms: f64) -> u64 {
        let total = self.carry_ms + delta_ms.max(0.0);
        let whole = total.floor();
        self.carry_ms = total - whole;
        (whole as u64).min(MAX_TICK_MS)
    }
}

pub fn apply_match_controls(
    mut controls: EventReader<MatchControl>,
    mut simulation: ResMut<Simulation>,
) {
    for control in controls.read() {
        match control {
            MatchControl::Start => simulation.start(),
            MatchControl::Pause => simulation.pause(),
            MatchControl::Restart => simulation.restart(),
        }
    }
}

pub fn apply_skill_requests(
    mut requests: EventReader<SkillRequest>,
    mut rejected: EventWriter<SkillRejected>,
    mut simulation: ResMut<Simulation>,
) {
    for request in requests.read() {
        if let Err(reason) = simulation.activate(request.actor, request.skill) {
            debug!("{} could not use {}: {}", request.actor, request.skill, reason);
            rejected.send(SkillRejected {
                actor: request.actor,
                skill: request.skill,
                reason,
            });
        }
    }
}

pub fn advance_simulation(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut clock: ResMut<SimulationClock>,
    mut simulation: ResMut<Simulation>,
) {
    if speed.is_paused() || !simulation.state().is_playing() {
        return;
    }

    let delta_ms = time.delta_secs_f64() * 1000.0 * f64::from(speed.multiplier);
    let elapsed = clock.take(delta_ms);
    if elapsed > 0 {
        simulation.advance(elapsed);
    }
}

pub fn log_status_changes(mut last_status: Local<Option<MatchStatus>>, simulation: Res<Simulation>) {
    let status = simulation.status();
    if *last_status == Some(status) {
        return;
    }
    *last_status = Some(status);

    let state = simulation.state();
    match status {
        MatchStatus::Ended => info!(
            "Match over after {:.1}s, winner: {:?} (player {} hp, ai {} hp)",
            state.duration_ms as f64 / 1000.0,
            state.winner,
            state.player.hp,
            state.ai.hp
        ),
        other => info!("Match status: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_phase_ordering() {
        assert_ne!(CombatSystemPhase::Input, CombatSystemPhase::Simulation);
        assert_ne!(CombatSystemPhase::Simulation, CombatSystemPhase::Resolution);
    }

    #[test]
    fn test_clock_carries_fractions() {
        let mut clock = SimulationClock::default();
        // 60 fps frames: 16.666..ms each
        let frame = 1000.0 / 60.0;
        let total: u64 = (0..60).map(|_| clock.take(frame)).sum();
        assert!((999..=1000).contains(&total), "total = {}", total);
    }

    #[test]
    fn test_clock_caps_long_frames() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.take(5000.0), MAX_TICK_MS);
        // The excess isn't queued up
        assert_eq!(clock.take(0.0), 0);
    }

    #[test]
    fn test_speed_pause() {
        let mut speed = SimulationSpeed::default();
        assert!(!speed.is_paused());
        speed.pause();
        assert!(speed.is_paused());
        speed.double_speed();
        assert_eq!(speed.multiplier, 2.0);
        speed.normal_speed();
        assert_eq!(speed.multiplier, 1.0);
    }

    #[test]
    fn test_status_watcher_keeps_its_own_state() {
        let mut app = App::new();
        app.init_resource::<Simulation>()
            .init_resource::<SimulationClock>()
            .add_systems(Update, log_status_changes);

        app.update();
        app.world_mut().resource_mut::<Simulation>().start();
        app.update();

        assert_eq!(app.world().resource::<Simulation>().status(), MatchStatus::Playing);
        assert_eq!(app.world().resource::<SimulationClock>().carry_ms, 0.0);
    }
}
