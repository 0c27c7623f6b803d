//! Combat Engine
//!
//! The only code allowed to change a [`MatchState`]. Two entry points:
//! - [`Engine::advance`]: one simulation tick (casting, damage, buffs, AI, cleanup)
//! - [`Engine::activate_skill`]: a discrete skill activation request
//!
//! Both take the prior snapshot by reference and return the next one, so the two
//! actors are always updated on one clearly owned working copy.

use bevy::log::info;
use std::fmt;

use super::ai;
use super::constants::*;
use super::diagnostics::{sink_for, DiagnosticSink};
use super::events::{next_fct_offset, CombatEvent, CombatEventKind, FeedbackCategory, FloatingText};
use super::rng::GameRng;
use super::ruleset::Ruleset;
use super::skills::{Skill, SkillId, SkillKind};
use super::state::{ActiveCast, ActorId, Buff, BuffKind, MatchState, MatchStatus, Winner};

/// Why a skill activation was refused. Refusals leave the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The match isn't in the playing state
    NotPlaying,
    UnknownActor(String),
    UnknownSkill(String),
    /// The skill exists but isn't in the requester's loadout
    NotInLoadout { actor: ActorId, skill: SkillId },
    Silenced { remaining_ms: u64 },
    OnCooldown { remaining_ms: u64 },
    GlobalCooldown { remaining_ms: u64 },
    /// Already casting, and the skill would start the shared cooldown
    BusyCasting,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotPlaying => write!(f, "match is not in progress"),
            Rejection::UnknownActor(id) => write!(f, "unknown actor '{}'", id),
            Rejection::UnknownSkill(id) => write!(f, "unknown skill '{}'", id),
            Rejection::NotInLoadout { actor, skill } => {
                write!(f, "{} does not have skill {}", actor, skill)
            }
            Rejection::Silenced { remaining_ms } => {
                write!(f, "silenced for another {}ms", remaining_ms)
            }
            Rejection::OnCooldown { remaining_ms } => {
                write!(f, "skill on cooldown for another {}ms", remaining_ms)
            }
            Rejection::GlobalCooldown { remaining_ms } => {
                write!(f, "global cooldown for another {}ms", remaining_ms)
            }
            Rejection::BusyCasting => write!(f, "already casting"),
        }
    }
}

/// Owns the rules, the random source and the diagnostics sink.
pub struct Engine {
    ruleset: Ruleset,
    rng: GameRng,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl Engine {
    /// Diagnostics follow the ruleset's `debug_ai` setting.
    pub fn new(ruleset: Ruleset, rng: GameRng) -> Self {
        let diagnostics = sink_for(ruleset.settings.debug_ai);
        Self {
            ruleset,
            rng,
            diagnostics,
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng.seed
    }

    /// Fresh match in the idle state.
    pub fn new_match(&self) -> MatchState {
        MatchState::new(&self.ruleset)
    }

    /// Fresh match, already playing.
    pub fn start_match(&self) -> MatchState {
        let mut state = self.new_match();
        state.status = MatchStatus::Playing;
        info!(
            "Match started: {} ({} hp) vs {} ({} hp), {}s",
            state.player.name,
            state.player.max_hp,
            state.ai.name,
            state.ai.max_hp,
            self.ruleset.settings.match_duration_ms / 1000
        );
        state
    }

    /// Advance the simulation by `elapsed_ms`.
    ///
    /// Callers clamp large gaps (see [`MAX_TICK_MS`]). Returns the state unchanged
    /// unless it is playing.
    pub fn advance(&mut self, state: &MatchState, elapsed_ms: u64) -> MatchState {
        let mut next = state.clone();
        if !next.is_playing() {
            return next;
        }

        if let Some(winner) = decide_outcome(&next, self.ruleset.settings.match_duration_ms) {
            next.status = MatchStatus::Ended;
            next.winner = Some(winner);
            info!(
                "Match ended at {:.1}s: {:?} ({} hp) vs ({} hp)",
                next.duration_ms as f64 / 1000.0,
                winner,
                next.player.hp,
                next.ai.hp
            );
            return next;
        }

        next.duration_ms += elapsed_ms;
        let now = next.duration_ms;

        // Player first: log order is observable
        for actor in [ActorId::Player, ActorId::Ai] {
            progress_cast(
                &mut next,
                &self.ruleset,
                actor,
                now,
                self.diagnostics.as_mut(),
            );
        }

        next.player.purge_expired_buffs(now);
        next.ai.purge_expired_buffs(now);

        let ai_actor = &next.ai;
        if let Some(cast) = &ai_actor.cast {
            self.diagnostics.record(format!(
                "AI casting [{}] progress {:.1}%",
                cast.skill, cast.progress
            ));
        } else if ai_actor.is_silenced(now) {
            self.diagnostics.record(format!(
                "AI waiting: silenced for {:.1}s",
                (ai_actor.silenced_until - now) as f64 / 1000.0
            ));
        } else if ai_actor.on_global_cooldown(now) {
            self.diagnostics.record(format!(
                "AI waiting: global cooldown for {:.1}s",
                (ai_actor.global_cooldown_ends_at - now) as f64 / 1000.0
            ));
        } else {
            ai::take_turn(
                &mut next,
                &self.ruleset,
                &mut self.rng,
                self.diagnostics.as_mut(),
            );
        }

        next.floating_texts
            .retain(|t| t.age_ms(now) < FLOATING_TEXT_TTL_MS);
        next.combat_log.trim();

        next
    }

    /// Validate an activation without performing it.
    pub fn check_activation(
        &self,
        state: &MatchState,
        requester: ActorId,
        skill_id: SkillId,
    ) -> Result<&Skill, Rejection> {
        if !state.is_playing() {
            return Err(Rejection::NotPlaying);
        }

        if !self.ruleset.has_skill(requester, skill_id) {
            return Err(Rejection::NotInLoadout {
                actor: requester,
                skill: skill_id,
            });
        }
        let skill = self
            .ruleset
            .skill(skill_id)
            .ok_or_else(|| Rejection::UnknownSkill(skill_id.to_string()))?;

        let now = state.now();
        let actor = state.actor(requester);

        if actor.is_silenced(now) {
            return Err(Rejection::Silenced {
                remaining_ms: actor.silenced_until - now,
            });
        }

        let remaining = actor.cooldown_remaining(skill_id, now);
        if remaining > 0 {
            return Err(Rejection::OnCooldown {
                remaining_ms: remaining,
            });
        }

        if skill.triggers_gcd && actor.on_global_cooldown(now) {
            return Err(Rejection::GlobalCooldown {
                remaining_ms: actor.global_cooldown_ends_at - now,
            });
        }

        if actor.is_casting() && skill.triggers_gcd {
            return Err(Rejection::BusyCasting);
        }

        Ok(skill)
    }

    /// Activate a skill for `requester`.
    ///
    /// On rejection the caller keeps its current state; nothing was changed.
    pub fn activate_skill(
        &mut self,
        state: &MatchState,
        requester: ActorId,
        skill_id: SkillId,
    ) -> Result<MatchState, Rejection> {
        let skill = self.check_activation(state, requester, skill_id)?.clone();

        let mut next = state.clone();
        let now = next.now();

        if skill.cooldown_ms > 0 {
            next.actor_mut(requester)
                .cooldowns
                .insert(skill.id, now + skill.cooldown_ms);
        }

        perform_skill(
            &mut next,
            &self.ruleset,
            requester,
            &skill,
            self.diagnostics.as_mut(),
        );

        if skill.triggers_gcd {
            next.actor_mut(requester).global_cooldown_ends_at = now + skill.gcd_ms;
        }

        Ok(next)
    }

    /// Activate by string ids, as delivered by input layers.
    pub fn activate_by_name(
        &mut self,
        state: &MatchState,
        requester: &str,
        skill: &str,
    ) -> Result<MatchState, Rejection> {
        let requester: ActorId = requester
            .parse()
            .map_err(|_| Rejection::UnknownActor(requester.to_string()))?;
        let skill: SkillId = skill
            .parse()
            .map_err(|_| Rejection::UnknownSkill(skill.to_string()))?;
        self.activate_skill(state, requester, skill)
    }
}

/// Decide whether the match is over and who won.
///
/// A dead actor loses outright (the player is checked first); otherwise, once time
/// runs out, higher remaining health wins.
pub fn decide_outcome(state: &MatchState, match_duration_ms: u64) -> Option<Winner> {
    let out_of_time = state.duration_ms >= match_duration_ms;
    if !out_of_time && state.player.is_alive() && state.ai.is_alive() {
        return None;
    }

    let winner = if !state.player.is_alive() {
        Winner::Ai
    } else if !state.ai.is_alive() {
        Winner::Player
    } else if state.player.hp > state.ai.hp {
        Winner::Player
    } else if state.ai.hp > state.player.hp {
        Winner::Ai
    } else {
        Winner::Tie
    };
    Some(winner)
}

/// Integrate one actor's cast: self-cancel, then completion.
fn progress_cast(
    state: &mut MatchState,
    ruleset: &Ruleset,
    actor_id: ActorId,
    now: u64,
    diagnostics: &mut dyn DiagnosticSink,
) {
    let Some(cast) = state.actor(actor_id).cast.clone() else {
        return;
    };
    let Some(skill) = ruleset.skill(cast.skill) else {
        state.actor_mut(actor_id).clear_cast();
        return;
    };

    // Equivalent to accumulating elapsed / cast_time * 100 per tick, without drift.
    let elapsed = now.saturating_sub(cast.started_at_ms) as f64;
    let progress = ((elapsed / skill.cast_time_ms.max(1) as f64) * 100.0).min(100.0) as f32;
    let progress = progress.max(cast.progress);

    if let Some(cancel_at) = state.actor(actor_id).fake_cast_cancel_at {
        if now >= cancel_at {
            state.actor_mut(actor_id).clear_cast();
            diagnostics.record(format!(
                "Fake cast: {} abandoned [{}] at {:.0}% to bait an interrupt",
                actor_id, skill.name, progress
            ));
            push_event(
                state,
                CombatEventKind::FakeCastCancel,
                actor_id,
                actor_id,
                &skill.name,
                None,
            );
            return;
        }
    }

    if progress >= 100.0 {
        state.actor_mut(actor_id).clear_cast();
        apply_damage(state, actor_id, skill);
    } else if let Some(active) = state.actor_mut(actor_id).cast.as_mut() {
        active.progress = progress;
    }
}

/// Dispatch an accepted skill by kind. Cooldowns are handled by the caller.
pub(crate) fn perform_skill(
    state: &mut MatchState,
    ruleset: &Ruleset,
    actor_id: ActorId,
    skill: &Skill,
    diagnostics: &mut dyn DiagnosticSink,
) {
    match skill.kind {
        SkillKind::Interrupt => resolve_interrupt(state, ruleset, actor_id, skill, diagnostics),
        SkillKind::Defensive => apply_defensive(state, actor_id, skill),
        _ if !skill.is_instant() => begin_cast(state, actor_id, skill),
        _ => apply_damage(state, actor_id, skill),
    }
}

fn begin_cast(state: &mut MatchState, actor_id: ActorId, skill: &Skill) {
    let now = state.now();
    let actor = state.actor_mut(actor_id);
    actor.cast = Some(ActiveCast {
        skill: skill.id,
        progress: 0.0,
        started_at_ms: now,
    });
    actor.fake_cast_cancel_at = None;
}

fn apply_defensive(state: &mut MatchState, actor_id: ActorId, skill: &Skill) {
    let now = state.now();
    let id = state.allocate_id();
    state.actor_mut(actor_id).buffs.push(Buff {
        id,
        name: skill.name.clone(),
        kind: BuffKind::DamageReduction,
        ends_at_ms: now + skill.buff_duration_ms,
        magnitude: skill.damage_reduction,
        icon: skill.icon.clone(),
    });
    push_event(
        state,
        CombatEventKind::BuffApplied,
        actor_id,
        actor_id,
        &skill.name,
        None,
    );
}

/// Resolve `skill` as damage from `source` to its opponent, with mitigation.
///
/// Any reduction that brings a positive hit to zero is reported as immune.
pub(crate) fn apply_damage(state: &mut MatchState, source: ActorId, skill: &Skill) {
    let now = state.now();
    let target = source.opponent();
    let base = skill.damage;

    let (amount, kind, feedback) = match state.actor(target).damage_reduction(now) {
        Some(reduction) => {
            let reduced = (f64::from(base) * (1.0 - reduction)).floor().max(0.0) as u32;
            let feedback = if reduced == 0 && base > 0 {
                Some(("Immune".to_string(), FeedbackCategory::Immune))
            } else if reduced < base {
                Some((format!("-{} (mitigated)", reduced), FeedbackCategory::Damage))
            } else {
                None
            };
            (reduced, CombatEventKind::DamageTaken, feedback)
        }
        None => (
            base,
            CombatEventKind::DamageDealt,
            Some((format!("-{}", base), FeedbackCategory::Damage)),
        ),
    };

    if let Some((text, category)) = feedback {
        push_floating_text(state, text, category, target);
    }
    push_event(state, kind, source, target, &skill.name, Some(amount));

    let applied = state.actor_mut(target).take_damage(amount);
    state.actor_mut(target).damage_taken += u64::from(applied);
    state.actor_mut(source).damage_dealt += u64::from(applied);
}

/// Interrupt the opponent's cast. The cooldown is already paid, hit or miss.
fn resolve_interrupt(
    state: &mut MatchState,
    ruleset: &Ruleset,
    source: ActorId,
    skill: &Skill,
    diagnostics: &mut dyn DiagnosticSink,
) {
    let now = state.now();
    let target_id = source.opponent();
    let target = state.actor(target_id);

    let Some(cast_skill) = target.casting_skill().and_then(|id| ruleset.skill(id)) else {
        diagnostics.record(format!(
            "{} used [{}] but {} was not casting: interrupt wasted",
            source, skill.name, target_id
        ));
        push_floating_text(state, "Dodged!".to_string(), FeedbackCategory::Immune, target_id);
        return;
    };

    let immune_to_interrupt = target
        .active_buffs(now)
        .any(|b| b.kind == BuffKind::ImmuneInterrupt);

    if immune_to_interrupt || !cast_skill.can_be_interrupted() {
        diagnostics.record(format!(
            "{} used [{}] on [{}]: cast cannot be interrupted",
            source, skill.name, cast_skill.name
        ));
        push_floating_text(state, "Immune!".to_string(), FeedbackCategory::Immune, target_id);
        return;
    }

    let immune_to_silence = target
        .active_buffs(now)
        .any(|b| b.kind == BuffKind::ImmuneSilence);

    diagnostics.record(format!(
        "{} interrupted [{}] of {}",
        source, cast_skill.name, target_id
    ));

    let target = state.actor_mut(target_id);
    target.clear_cast();
    if !immune_to_silence {
        target.silenced_until = now + INTERRUPT_SILENCE_MS;
    }
    state.actor_mut(source).interrupts_landed += 1;

    push_floating_text(
        state,
        "Interrupted!".to_string(),
        FeedbackCategory::Interrupt,
        target_id,
    );
    push_event(
        state,
        CombatEventKind::InterruptSuccess,
        source,
        target_id,
        &skill.name,
        None,
    );
}

pub(crate) fn push_event(
    state: &mut MatchState,
    kind: CombatEventKind,
    source: ActorId,
    target: ActorId,
    skill_name: &str,
    value: Option<u32>,
) {
    let timestamp_ms = state.now();
    state.combat_log.push(CombatEvent {
        timestamp_ms,
        kind,
        source,
        target,
        skill_name: skill_name.to_string(),
        value,
    });
}

fn push_floating_text(
    state: &mut MatchState,
    text: String,
    category: FeedbackCategory,
    target: ActorId,
) {
    let id = state.allocate_id();
    let x = FCT_ANCHOR_X + next_fct_offset(&mut state.fct_state, FCT_HORIZONTAL_SPREAD);
    let created_at_ms = state.now();
    state.floating_texts.push(FloatingText {
        id,
        text,
        category,
        target,
        created_at_ms,
        x,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(Ruleset::default(), GameRng::from_seed(42))
    }

    /// Keeps the AI from acting on its own during a test.
    fn bench_ai(state: &mut MatchState) {
        state.ai.global_cooldown_ends_at = u64::MAX;
    }

    #[test]
    fn test_outcome_none_while_both_alive() {
        let engine = engine();
        let state = engine.start_match();
        assert_eq!(decide_outcome(&state, 120_000), None);
    }

    #[test]
    fn test_outcome_dead_player_loses_even_if_both_dead() {
        let engine = engine();
        let mut state = engine.start_match();
        state.player.hp = 0;
        state.ai.hp = 0;
        assert_eq!(decide_outcome(&state, 120_000), Some(Winner::Ai));
    }

    #[test]
    fn test_outcome_timeout_tie() {
        let engine = engine();
        let mut state = engine.start_match();
        state.duration_ms = 120_000;
        state.player.hp = 5000;
        state.ai.hp = 5000;
        assert_eq!(decide_outcome(&state, 120_000), Some(Winner::Tie));
    }

    #[test]
    fn test_advance_is_noop_when_not_playing() {
        let mut engine = engine();
        let idle = engine.new_match();
        assert_eq!(engine.advance(&idle, 50), idle);

        let mut paused = engine.start_match();
        paused.status = MatchStatus::Paused;
        assert_eq!(engine.advance(&paused, 50), paused);
    }

    #[test]
    fn test_partial_reduction_is_floored() {
        let mut engine = engine();
        let mut state = engine.start_match();
        bench_ai(&mut state);
        state.ai.buffs.push(Buff {
            id: 99,
            name: "Ward".to_string(),
            kind: BuffKind::DamageReduction,
            ends_at_ms: 10_000,
            magnitude: Some(0.75),
            icon: None,
        });

        let next = engine
            .activate_skill(&state, ActorId::Player, SkillId::PlayerAttack)
            .unwrap();
        // 300 * 0.25 = 75
        assert_eq!(next.ai.hp, 15_000 - 75);
        let event = next.combat_log.last().unwrap();
        assert_eq!(event.kind, CombatEventKind::DamageTaken);
        assert_eq!(event.value, Some(75));
        assert_eq!(next.floating_texts[0].text, "-75 (mitigated)");
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::BusyCasting.to_string(), "already casting");
        assert_eq!(
            Rejection::OnCooldown { remaining_ms: 500 }.to_string(),
            "skill on cooldown for another 500ms"
        );
    }

    #[test]
    fn test_immune_to_silence_buff_keeps_ai_unsilenced() {
        let mut engine = engine();
        let mut state = engine.start_match();
        state.ai.cast = Some(ActiveCast {
            skill: SkillId::AiYellow,
            progress: 10.0,
            started_at_ms: 0,
        });
        state.ai.buffs.push(Buff {
            id: 1,
            name: "Focus".to_string(),
            kind: BuffKind::ImmuneSilence,
            ends_at_ms: 10_000,
            magnitude: None,
            icon: None,
        });

        let next = engine
            .activate_skill(&state, ActorId::Player, SkillId::PlayerInterrupt)
            .unwrap();
        assert!(!next.ai.is_casting());
        assert!(!next.ai.is_silenced(next.now()));
    }

    #[test]
    fn test_immune_to_interrupt_buff_blocks_interrupt() {
        let mut engine = engine();
        let mut state = engine.start_match();
        state.ai.cast = Some(ActiveCast {
            skill: SkillId::AiYellow,
            progress: 10.0,
            started_at_ms: 0,
        });
        state.ai.buffs.push(Buff {
            id: 1,
            name: "Steadfast".to_string(),
            kind: BuffKind::ImmuneInterrupt,
            ends_at_ms: 10_000,
            magnitude: None,
            icon: None,
        });

        let next = engine
            .activate_skill(&state, ActorId::Player, SkillId::PlayerInterrupt)
            .unwrap();
        assert!(next.ai.is_casting());
        assert_eq!(next.floating_texts[0].text, "Immune!");
    }

    #[test]
    fn test_seed_reported_only_when_seeded() {
        assert_eq!(engine().seed(), Some(42));
        let unseeded = Engine::new(Ruleset::default(), GameRng::from_entropy());
        assert_eq!(unseeded.seed(), None);
    }
}
