//! Combat AI
//!
//! Decision policy for the scripted duelist, evaluated once per tick when it is
//! free to act (not casting, not silenced, off the shared cooldown):
//! - Reactive defense: answer a big red cast from the player with a defensive skill
//! - Otherwise a random pick among off-cooldown skills that pass a selection roll
//! - Yellow casts may be fake: the AI cancels them itself to bait an interrupt

use super::constants::*;
use super::diagnostics::DiagnosticSink;
use super::engine::{perform_skill, push_event};
use super::events::CombatEventKind;
use super::rng::GameRng;
use super::ruleset::Ruleset;
use super::skills::{CastColor, Skill, SkillKind};
use super::state::{ActorId, MatchState};

const SELF: ActorId = ActorId::Ai;

/// Outcome of one evaluation of the policy.
#[derive(Debug, Clone, PartialEq)]
pub enum AiDecision<'a> {
    /// Use this skill
    Use { skill: &'a Skill, reason: String },
    /// Nothing this tick
    Idle { reason: String },
}

/// Pick a skill for the AI. Consumes randomness only in the random-pick stage.
pub fn decide<'a>(state: &MatchState, ruleset: &'a Ruleset, rng: &mut GameRng) -> AiDecision<'a> {
    let now = state.now();
    let me = state.actor(SELF);
    let opponent = state.actor(SELF.opponent());

    // Reactive defense. The default AI table has no defensive skill, so this only
    // fires with a custom table.
    let threatening_cast = opponent
        .casting_skill()
        .and_then(|id| ruleset.skill(id))
        .filter(|s| s.is_color(CastColor::Red) && s.damage > REACTIVE_DEFENSE_DAMAGE_THRESHOLD);

    if let Some(threat) = threatening_cast {
        let defensive = ruleset
            .loadout_skills(SELF)
            .find(|s| s.kind == SkillKind::Defensive && !me.on_cooldown(s.id, now));
        if let Some(skill) = defensive {
            return AiDecision::Use {
                skill,
                reason: format!(
                    "player is casting high-damage red skill [{}], defending",
                    threat.name
                ),
            };
        }
    }

    let off_cooldown: Vec<&Skill> = ruleset
        .loadout_skills(SELF)
        .filter(|s| !me.on_cooldown(s.id, now))
        .collect();

    if off_cooldown.is_empty() {
        return AiDecision::Idle {
            reason: "all skills on cooldown".to_string(),
        };
    }

    // Each candidate is admitted independently, in loadout order.
    let admitted: Vec<&Skill> = off_cooldown
        .iter()
        .copied()
        .filter(|_| rng.chance(AI_SKILL_ROLL_CHANCE))
        .collect();

    if admitted.is_empty() {
        return AiDecision::Idle {
            reason: format!(
                "{} skills ready, none passed the selection roll",
                off_cooldown.len()
            ),
        };
    }

    let skill = admitted[rng.pick_index(admitted.len())];
    AiDecision::Use {
        skill,
        reason: format!(
            "picked [{}] from {} admitted skills",
            skill.name,
            admitted.len()
        ),
    }
}

/// Run the AI for one tick: decide, then carry the decision out on `state`.
pub fn take_turn(
    state: &mut MatchState,
    ruleset: &Ruleset,
    rng: &mut GameRng,
    diagnostics: &mut dyn DiagnosticSink,
) {
    let (skill, reason) = match decide(state, ruleset, rng) {
        AiDecision::Use { skill, reason } => (skill, reason),
        AiDecision::Idle { reason } => {
            diagnostics.record(format!("AI idle: {}", reason));
            return;
        }
    };

    let now = state.now();
    diagnostics.record(format!(
        "AI decision: {} | skill: {} | cast: {} | damage: {}",
        reason,
        skill.name,
        if skill.is_instant() { "instant" } else { "channeled" },
        skill.damage
    ));

    perform_skill(state, ruleset, SELF, skill, diagnostics);

    if state.actor(SELF).is_casting() && skill.is_color(CastColor::Yellow) && rng.chance(FAKE_CAST_CHANCE) {
        let cancel_at = now + (skill.cast_time_ms as f64 * FAKE_CAST_CANCEL_POINT) as u64;
        state.actor_mut(SELF).fake_cast_cancel_at = Some(cancel_at);
        diagnostics.record(format!(
            "AI fake cast [{}]: will cancel itself in {:.2}s",
            skill.name,
            (cancel_at - now) as f64 / 1000.0
        ));
    }

    let me = state.actor_mut(SELF);
    if skill.triggers_gcd {
        me.global_cooldown_ends_at = now + skill.gcd_ms;
    }
    if skill.cooldown_ms > 0 {
        me.cooldowns.insert(skill.id, now + skill.cooldown_ms);
        diagnostics.record(format!(
            "AI skill [{}] on cooldown for {:.1}s",
            skill.name,
            skill.cooldown_ms as f64 / 1000.0
        ));
    }

    push_event(
        state,
        CombatEventKind::SkillCast,
        SELF,
        SELF.opponent(),
        &skill.name,
        None,
    );
}
