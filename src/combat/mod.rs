//! Combat system
//!
//! Implements the duel:
//! - Match state, actors, buffs and casts ([`state`])
//! - Skill table and match settings loaded from RON ([`skills`], [`ruleset`])
//! - The pure transition engine and the AI policy ([`engine`], [`ai`])
//! - Combat log and floating feedback text ([`log`], [`events`])
//! - Bevy integration: a [`Simulation`] resource driven by frame time ([`systems`])

use bevy::prelude::*;

pub mod ai;
pub mod constants;
pub mod diagnostics;
pub mod engine;
pub mod events;
pub mod log;
pub mod rng;
pub mod ruleset;
pub mod simulation;
pub mod skills;
pub mod state;
pub mod systems;

pub use engine::{Engine, Rejection};
pub use simulation::Simulation;
pub use systems::{
    CombatSystemPhase, MatchControl, SimulationClock, SimulationSpeed, SkillRejected, SkillRequest,
};

use systems::*;

/// Plugin for the combat system
///
/// Inserts a default [`Simulation`] unless one is already present, so callers can
/// provide their own ruleset and seed by inserting the resource first.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        configure_combat_system_ordering(app);

        app
            // Combat events
            .add_event::<SkillRequest>()
            .add_event::<SkillRejected>()
            .add_event::<MatchControl>()
            // Resources
            .init_resource::<Simulation>()
            .init_resource::<SimulationSpeed>()
            .init_resource::<SimulationClock>()
            // Systems
            .add_systems(
                Update,
                (apply_match_controls, apply_skill_requests)
                    .chain()
                    .in_set(CombatSystemPhase::Input),
            )
            .add_systems(
                Update,
                advance_simulation.in_set(CombatSystemPhase::Simulation),
            )
            .add_systems(
                Update,
                log_status_changes.in_set(CombatSystemPhase::Resolution),
            );
    }
}
