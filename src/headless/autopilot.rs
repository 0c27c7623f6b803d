//! Scripted player for headless matches
//!
//! Plays the player's loadout with a fixed priority list, checked against the
//! engine so it only ever asks for skills that would be accepted:
//! 1. Interrupt an interruptible cast once it has been visible for the reaction time
//! 2. Defensive against a heavy red cast
//! 3. Channeled attack, then the instant attack

use crate::combat::constants::REACTIVE_DEFENSE_DAMAGE_THRESHOLD;
use crate::combat::simulation::Simulation;
use crate::combat::skills::{CastColor, SkillId, SkillKind};
use crate::combat::state::ActorId;

use super::config::HeadlessMatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autopilot {
    pub reaction_ms: u64,
    pub use_defensive: bool,
}

impl Autopilot {
    pub fn from_config(config: &HeadlessMatchConfig) -> Self {
        Self {
            reaction_ms: config.reaction_ms,
            use_defensive: config.use_defensive,
        }
    }

    /// The skill to use this frame, if any.
    pub fn choose(&self, simulation: &Simulation) -> Option<SkillId> {
        let state = simulation.state();
        if !state.is_playing() {
            return None;
        }

        let ruleset = simulation.engine().ruleset();
        let now = state.now();
        let ready = |kind: SkillKind| {
            ruleset
                .loadout_skills(ActorId::Player)
                .find(|s| s.kind == kind)
                .map(|s| s.id)
                .filter(|id| simulation.check_activation(ActorId::Player, *id).is_ok())
        };

        let opponent_cast = state
            .ai
            .cast
            .as_ref()
            .and_then(|cast| ruleset.skill(cast.skill).map(|skill| (cast, skill)));

        if let Some((cast, skill)) = opponent_cast {
            let watched_for = now.saturating_sub(cast.started_at_ms);
            if skill.can_be_interrupted() && watched_for >= self.reaction_ms {
                if let Some(id) = ready(SkillKind::Interrupt) {
                    return Some(id);
                }
            }

            let heavy_red = skill.is_color(CastColor::Red)
                && skill.damage > REACTIVE_DEFENSE_DAMAGE_THRESHOLD;
            if self.use_defensive && heavy_red {
                if let Some(id) = ready(SkillKind::Defensive) {
                    return Some(id);
                }
            }
        }

        ready(SkillKind::Charge).or_else(|| ready(SkillKind::Normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::GameRng;
    use crate::combat::ruleset::Ruleset;
    use crate::combat::state::ActiveCast;

    fn pilot() -> Autopilot {
        Autopilot::from_config(&HeadlessMatchConfig::default())
    }

    fn playing() -> Simulation {
        let mut sim = Simulation::new(Ruleset::default(), GameRng::from_seed(1));
        sim.start();
        sim
    }

    fn ai_casting(sim: &mut Simulation, skill: SkillId, started_at_ms: u64) {
        let mut state = sim.state().clone();
        state.ai.cast = Some(ActiveCast {
            skill,
            progress: 0.0,
            started_at_ms,
        });
        sim.restore(state);
    }

    #[test]
    fn test_idle_match_does_nothing() {
        let sim = Simulation::new(Ruleset::default(), GameRng::from_seed(1));
        assert_eq!(pilot().choose(&sim), None);
    }

    #[test]
    fn test_opens_with_channeled_attack() {
        assert_eq!(pilot().choose(&playing()), Some(SkillId::PlayerCast));
    }

    #[test]
    fn test_waits_for_reaction_time_before_interrupting() {
        let mut sim = playing();
        ai_casting(&mut sim, SkillId::AiYellow, 0);
        assert_eq!(pilot().choose(&sim), Some(SkillId::PlayerCast));

        let mut late = sim.state().clone();
        late.duration_ms = 300;
        sim.restore(late);
        assert_eq!(pilot().choose(&sim), Some(SkillId::PlayerInterrupt));
    }

    #[test]
    fn test_defends_against_red_cast() {
        let mut sim = playing();
        ai_casting(&mut sim, SkillId::AiRed, 0);
        assert_eq!(pilot().choose(&sim), Some(SkillId::PlayerDefensive));

        let reckless = Autopilot {
            use_defensive: false,
            ..pilot()
        };
        assert_eq!(reckless.choose(&sim), Some(SkillId::PlayerCast));
    }
}
