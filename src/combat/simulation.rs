//! Simulation wrapper
//!
//! Holds the engine and the current snapshot together and implements the match
//! lifecycle (start, pause, resume, restart). This is what drivers talk to; the
//! engine itself never stores a state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::engine::{Engine, Rejection};
use super::rng::GameRng;
use super::ruleset::Ruleset;
use super::skills::SkillId;
use super::state::{ActorId, MatchState, MatchStatus, Winner};

/// Readiness of one loadout skill, for a skill bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAvailability {
    pub skill: SkillId,
    pub name: String,
    pub icon: Option<String>,
    pub cooldown_remaining_ms: u64,
    pub global_cooldown_remaining_ms: u64,
    pub silenced: bool,
    /// Whether activating now would be accepted
    pub ready: bool,
}

/// Per-actor line of the end-of-match summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub name: String,
    pub max_hp: u32,
    pub final_hp: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub interrupts_landed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub status: MatchStatus,
    pub winner: Option<Winner>,
    pub duration_ms: u64,
    pub player: ActorSummary,
    pub ai: ActorSummary,
}

/// The running duel.
#[derive(Resource)]
pub struct Simulation {
    engine: Engine,
    state: MatchState,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Ruleset::default(), GameRng::from_entropy())
    }
}

impl Simulation {
    pub fn new(ruleset: Ruleset, rng: GameRng) -> Self {
        let engine = Engine::new(ruleset, rng);
        let state = engine.new_match();
        Self { engine, state }
    }

    pub fn from_engine(engine: Engine) -> Self {
        let state = engine.new_match();
        Self { engine, state }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Replace the current snapshot, e.g. with a saved one.
    pub fn restore(&mut self, state: MatchState) {
        self.state = state;
    }

    pub fn status(&self) -> MatchStatus {
        self.state.status
    }

    /// Begin a fresh match from idle, or resume a paused one.
    pub fn start(&mut self) {
        match self.state.status {
            MatchStatus::Idle => self.state = self.engine.start_match(),
            MatchStatus::Paused => self.state.status = MatchStatus::Playing,
            MatchStatus::Playing | MatchStatus::Ended => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state.status == MatchStatus::Playing {
            self.state.status = MatchStatus::Paused;
        }
    }

    /// Throw the current match away and start a new one, whatever its status.
    pub fn restart(&mut self) {
        self.state = self.engine.start_match();
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        self.state = self.engine.advance(&self.state, elapsed_ms);
    }

    pub fn activate(&mut self, actor: ActorId, skill: SkillId) -> Result<(), Rejection> {
        self.state = self.engine.activate_skill(&self.state, actor, skill)?;
        Ok(())
    }

    pub fn activate_by_name(&mut self, actor: &str, skill: &str) -> Result<(), Rejection> {
        self.state = self.engine.activate_by_name(&self.state, actor, skill)?;
        Ok(())
    }

    /// Dry run of [`Simulation::activate`].
    pub fn check_activation(&self, actor: ActorId, skill: SkillId) -> Result<(), Rejection> {
        self.engine
            .check_activation(&self.state, actor, skill)
            .map(|_| ())
    }

    /// Readiness of every skill in `actor`'s loadout, in loadout order.
    pub fn availability(&self, actor: ActorId) -> Vec<SkillAvailability> {
        let now = self.state.now();
        let who = self.state.actor(actor);
        let gcd_remaining = who.global_cooldown_ends_at.saturating_sub(now);

        self.engine
            .ruleset()
            .loadout_skills(actor)
            .map(|skill| SkillAvailability {
                skill: skill.id,
                name: skill.name.clone(),
                icon: skill.icon.clone(),
                cooldown_remaining_ms: who.cooldown_remaining(skill.id, now),
                global_cooldown_remaining_ms: if skill.triggers_gcd { gcd_remaining } else { 0 },
                silenced: who.is_silenced(now),
                ready: self.check_activation(actor, skill.id).is_ok(),
            })
            .collect()
    }

    pub fn summary(&self) -> MatchSummary {
        let line = |id: ActorId| {
            let actor = self.state.actor(id);
            ActorSummary {
                name: actor.name.clone(),
                max_hp: actor.max_hp,
                final_hp: actor.hp,
                damage_dealt: actor.damage_dealt,
                damage_taken: actor.damage_taken,
                interrupts_landed: actor.interrupts_landed,
            }
        };

        MatchSummary {
            status: self.state.status,
            winner: self.state.winner,
            duration_ms: self.state.duration_ms,
            player: line(ActorId::Player),
            ai: line(ActorId::Ai),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        Simulation::new(Ruleset::default(), GameRng::from_seed(7))
    }

    #[test]
    fn test_lifecycle() {
        let mut sim = simulation();
        assert_eq!(sim.status(), MatchStatus::Idle);

        // Pause is ignored unless playing
        sim.pause();
        assert_eq!(sim.status(), MatchStatus::Idle);

        sim.start();
        assert_eq!(sim.status(), MatchStatus::Playing);
        sim.advance(100);
        sim.pause();
        assert_eq!(sim.status(), MatchStatus::Paused);

        let frozen = sim.state().clone();
        sim.advance(100);
        assert_eq!(sim.state(), &frozen);

        // Resume keeps the elapsed time
        sim.start();
        assert_eq!(sim.status(), MatchStatus::Playing);
        assert_eq!(sim.state().duration_ms, 100);

        sim.restart();
        assert_eq!(sim.status(), MatchStatus::Playing);
        assert_eq!(sim.state().duration_ms, 0);
    }

    #[test]
    fn test_ended_match_only_restarts() {
        let mut sim = simulation();
        sim.start();
        sim.state.ai.hp = 0;
        sim.advance(16);
        assert_eq!(sim.status(), MatchStatus::Ended);
        assert_eq!(sim.state().winner, Some(Winner::Player));

        sim.start();
        sim.pause();
        assert_eq!(sim.status(), MatchStatus::Ended);

        sim.restart();
        assert_eq!(sim.status(), MatchStatus::Playing);
        assert_eq!(sim.state().ai.hp, 15_000);
    }

    #[test]
    fn test_availability_reflects_cooldowns() {
        let mut sim = simulation();
        sim.start();
        sim.activate(ActorId::Player, SkillId::PlayerInterrupt).unwrap();

        let bar = sim.availability(ActorId::Player);
        assert_eq!(bar.len(), 4);

        let interrupt = bar.iter().find(|s| s.skill == SkillId::PlayerInterrupt).unwrap();
        assert_eq!(interrupt.cooldown_remaining_ms, 7000);
        assert!(!interrupt.ready);

        // The interrupt doesn't start the shared cooldown
        let attack = bar.iter().find(|s| s.skill == SkillId::PlayerAttack).unwrap();
        assert_eq!(attack.global_cooldown_remaining_ms, 0);
        assert!(attack.ready);
    }

    #[test]
    fn test_rejected_activation_keeps_state() {
        let mut sim = simulation();
        let before = sim.state().clone();
        assert_eq!(
            sim.activate(ActorId::Player, SkillId::PlayerAttack),
            Err(Rejection::NotPlaying)
        );
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_summary_tracks_totals() {
        let mut sim = simulation();
        sim.start();
        sim.state.ai.global_cooldown_ends_at = u64::MAX;
        sim.activate(ActorId::Player, SkillId::PlayerAttack).unwrap();

        let summary = sim.summary();
        assert_eq!(summary.player.damage_dealt, 300);
        assert_eq!(summary.ai.damage_taken, 300);
        assert_eq!(summary.ai.final_hp, 15_000 - 300);
        assert_eq!(summary.winner, None);
    }
}
