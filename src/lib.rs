//! duelsim - Real-time Duel Simulator
//!
//! A player and a scripted AI trade instant attacks, channeled casts,
//! interrupts and damage reduction buffs until one falls or time runs out.
//! The engine is a pure state transition; bevy drives it with frame time.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;

// Re-export commonly used types
pub use combat::engine::{Engine, Rejection};
pub use combat::log::CombatLog;
pub use combat::rng::GameRng;
pub use combat::ruleset::Ruleset;
pub use combat::simulation::Simulation;
pub use combat::skills::SkillId;
pub use combat::state::{ActorId, MatchState, MatchStatus, Winner};
pub use headless::HeadlessMatchConfig;
