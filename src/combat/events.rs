//! Combat events
//!
//! Defines the records the engine emits for display: log entries and floating
//! combat text. Neither is authoritative state.

use serde::{Deserialize, Serialize};

use super::state::ActorId;

/// Kinds of combat log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEventKind {
    /// An actor started or fired a skill
    SkillCast,
    /// Unmitigated damage landed
    DamageDealt,
    /// Damage landed through a damage reduction buff
    DamageTaken,
    /// An interrupt cleared a cast
    InterruptSuccess,
    /// A buff was applied
    BuffApplied,
    /// The AI cancelled its own cast
    FakeCastCancel,
}

/// A single entry in the combat log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    /// Match time in milliseconds
    pub timestamp_ms: u64,
    pub kind: CombatEventKind,
    pub source: ActorId,
    pub target: ActorId,
    pub skill_name: String,
    /// Damage amount, where one applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

/// Visual style of a floating text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Damage,
    Heal,
    Critical,
    Immune,
    Interrupt,
}

/// Short-lived text floating over an actor ("-300", "Immune", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: u64,
    pub text: String,
    pub category: FeedbackCategory,
    /// Actor the text floats over
    pub target: ActorId,
    pub created_at_ms: u64,
    /// Horizontal position in percent of the actor frame
    pub x: f32,
}

impl FloatingText {
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

/// Cycles floating text positions so simultaneous numbers don't overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingTextState {
    pub next_pattern_index: u8,
}

/// Returns the next horizontal offset and advances the pattern.
///
/// Deterministic alternating pattern: center, right, left, slight right, slight left.
pub fn next_fct_offset(state: &mut FloatingTextState, spread: f32) -> f32 {
    let offset = match state.next_pattern_index {
        0 => 0.0,
        1 => spread * 0.6,
        2 => spread * -0.6,
        3 => spread * 0.3,
        4 => spread * -0.3,
        _ => 0.0,
    };

    state.next_pattern_index = (state.next_pattern_index + 1) % 5;

    offset
}
