//! Combat state
//!
//! The authoritative snapshot of a duel. Pure data: every transition lives in
//! [`super::engine`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::events::{FloatingText, FloatingTextState};
use super::log::CombatLog;
use super::ruleset::Ruleset;
use super::skills::SkillId;

/// One of the two duelists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorId {
    Player,
    Ai,
}

impl ActorId {
    pub fn opponent(self) -> ActorId {
        match self {
            ActorId::Player => ActorId::Ai,
            ActorId::Ai => ActorId::Player,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActorId::Player => "player",
            ActorId::Ai => "ai",
        }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(ActorId::Player),
            "ai" => Ok(ActorId::Ai),
            _ => Err(format!("Unknown actor id: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Idle,
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player,
    Ai,
    Tie,
}

impl From<ActorId> for Winner {
    fn from(actor: ActorId) -> Self {
        match actor {
            ActorId::Player => Winner::Player,
            ActorId::Ai => Winner::Ai,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    DamageReduction,
    ImmuneInterrupt,
    ImmuneSilence,
}

/// A timed effect on an actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Buff {
    pub id: u64,
    pub name: String,
    pub kind: BuffKind,
    /// Match time at which the buff stops applying
    pub ends_at_ms: u64,
    /// Effect strength; for damage reduction a ratio in [0, 1]
    pub magnitude: Option<f64>,
    pub icon: Option<String>,
}

impl Buff {
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.ends_at_ms > now_ms
    }
}

/// A cast in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCast {
    pub skill: SkillId,
    /// Percent complete, 0..=100
    pub progress: f32,
    pub started_at_ms: u64,
}

/// A duelist.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub cast: Option<ActiveCast>,
    pub global_cooldown_ends_at: u64,
    pub silenced_until: u64,
    pub cooldowns: HashMap<SkillId, u64>,
    pub buffs: SmallVec<[Buff; 4]>,
    /// When set, the actor abandons its current cast at this time (fake cast).
    pub fake_cast_cancel_at: Option<u64>,
    /// Running totals for the end-of-match summary
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub interrupts_landed: u32,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            hp: max_hp,
            max_hp,
            cast: None,
            global_cooldown_ends_at: 0,
            silenced_until: 0,
            cooldowns: HashMap::new(),
            buffs: SmallVec::new(),
            fake_cast_cancel_at: None,
            damage_dealt: 0,
            damage_taken: 0,
            interrupts_landed: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_casting(&self) -> bool {
        self.cast.is_some()
    }

    pub fn casting_skill(&self) -> Option<SkillId> {
        self.cast.as_ref().map(|c| c.skill)
    }

    /// Cast progress in percent; 0 when not casting.
    pub fn cast_progress(&self) -> f32 {
        self.cast.as_ref().map_or(0.0, |c| c.progress)
    }

    pub fn is_silenced(&self, now_ms: u64) -> bool {
        now_ms < self.silenced_until
    }

    pub fn on_global_cooldown(&self, now_ms: u64) -> bool {
        now_ms < self.global_cooldown_ends_at
    }

    pub fn on_cooldown(&self, skill: SkillId, now_ms: u64) -> bool {
        self.cooldown_remaining(skill, now_ms) > 0
    }

    pub fn cooldown_remaining(&self, skill: SkillId, now_ms: u64) -> u64 {
        self.cooldowns
            .get(&skill)
            .map_or(0, |ends_at| ends_at.saturating_sub(now_ms))
    }

    /// Buffs that still apply at `now_ms`.
    pub fn active_buffs(&self, now_ms: u64) -> impl Iterator<Item = &Buff> {
        self.buffs.iter().filter(move |b| b.is_active(now_ms))
    }

    /// Reduction ratio of the first active damage reduction buff with an effect.
    pub fn damage_reduction(&self, now_ms: u64) -> Option<f64> {
        self.active_buffs(now_ms)
            .find(|b| b.kind == BuffKind::DamageReduction)
            .and_then(|b| b.magnitude)
            .filter(|m| *m > 0.0)
    }

    pub fn purge_expired_buffs(&mut self, now_ms: u64) {
        self.buffs.retain(|b| b.is_active(now_ms));
    }

    /// Drop the current cast and any pending self-cancel.
    pub fn clear_cast(&mut self) {
        self.cast = None;
        self.fake_cast_cancel_at = None;
    }

    /// Reduce health, never below zero. Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.hp);
        self.hp -= applied;
        applied
    }
}

/// Complete duel snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub status: MatchStatus,
    /// Elapsed match time in milliseconds; also the clock for every timestamp
    pub duration_ms: u64,
    pub winner: Option<Winner>,
    pub player: Actor,
    pub ai: Actor,
    pub combat_log: CombatLog,
    pub floating_texts: Vec<FloatingText>,
    pub fct_state: FloatingTextState,
    /// Source of ids for buffs and floating texts
    pub next_id: u64,
}

impl MatchState {
    /// Fresh idle match with both actors at full health.
    pub fn new(ruleset: &Ruleset) -> Self {
        Self {
            status: MatchStatus::Idle,
            duration_ms: 0,
            winner: None,
            player: Actor::new(
                ActorId::Player,
                ruleset.actor_name(ActorId::Player),
                ruleset.max_hp(ActorId::Player),
            ),
            ai: Actor::new(
                ActorId::Ai,
                ruleset.actor_name(ActorId::Ai),
                ruleset.max_hp(ActorId::Ai),
            ),
            combat_log: CombatLog::default(),
            floating_texts: Vec::new(),
            fct_state: FloatingTextState::default(),
            next_id: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.duration_ms
    }

    pub fn actor(&self, id: ActorId) -> &Actor {
        match id {
            ActorId::Player => &self.player,
            ActorId::Ai => &self.ai,
        }
    }

    pub fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
        match id {
            ActorId::Player => &mut self.player,
            ActorId::Ai => &mut self.ai,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == MatchStatus::Playing
    }

    pub fn is_over(&self) -> bool {
        self.status == MatchStatus::Ended
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
