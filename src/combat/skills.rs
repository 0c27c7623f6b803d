//! Skill definitions
//!
//! Skills are identified by the closed [`SkillId`] enum. The table itself is data
//! (`assets/config/skills.ron`); see [`super::ruleset`] for loading. A [`SkillConfig`]
//! is the on-disk shape, a [`Skill`] is the resolved, validated runtime entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every skill known to the duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillId {
    /// `p_attack`: instant strike
    PlayerAttack,
    /// `p_cast`: channeled heavy attack
    PlayerCast,
    /// `p_interrupt`: off-GCD interrupt
    PlayerInterrupt,
    /// `p_defensive`: damage reduction buff
    PlayerDefensive,
    /// `ai_normal`
    AiNormal,
    /// `ai_yellow_1`
    AiYellow,
    /// `ai_red_1`
    AiRed,
    /// `ai_yellow_fast`
    AiYellowFast,
}

impl SkillId {
    pub const ALL: [SkillId; 8] = [
        SkillId::PlayerAttack,
        SkillId::PlayerCast,
        SkillId::PlayerInterrupt,
        SkillId::PlayerDefensive,
        SkillId::AiNormal,
        SkillId::AiYellow,
        SkillId::AiRed,
        SkillId::AiYellowFast,
    ];

    /// Stable string id used by input layers (skill buttons, JSON).
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillId::PlayerAttack => "p_attack",
            SkillId::PlayerCast => "p_cast",
            SkillId::PlayerInterrupt => "p_interrupt",
            SkillId::PlayerDefensive => "p_defensive",
            SkillId::AiNormal => "ai_normal",
            SkillId::AiYellow => "ai_yellow_1",
            SkillId::AiRed => "ai_red_1",
            SkillId::AiYellowFast => "ai_yellow_fast",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown skill id: '{}'", s))
    }
}

/// What a skill does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Plain attack, usually instant
    Normal,
    /// Channeled attack with a cast bar
    Charge,
    /// Interrupts the opponent's cast
    Interrupt,
    /// Applies a damage reduction buff to the caster
    Defensive,
}

/// Cast bar color. Yellow casts can be interrupted, red casts cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastColor {
    Yellow,
    Red,
}

fn default_true() -> bool {
    true
}

/// Skill entry as written in `skills.ron`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Display name
    pub name: String,
    pub kind: SkillKind,
    /// Base damage before mitigation
    #[serde(default)]
    pub damage: u32,
    /// Cast time in milliseconds (0 = instant)
    #[serde(default)]
    pub cast_time_ms: u64,
    /// Cooldown in milliseconds (0 = none)
    #[serde(default)]
    pub cooldown_ms: u64,
    /// Whether activation starts the shared cooldown
    #[serde(default = "default_true")]
    pub triggers_gcd: bool,
    /// Shared cooldown length; falls back to the match setting
    #[serde(default)]
    pub gcd_ms: Option<u64>,
    /// Damage reduction ratio in [0, 1] (defensive skills)
    #[serde(default)]
    pub damage_reduction: Option<f64>,
    /// Buff lifetime for defensive skills; falls back to 2000ms
    #[serde(default)]
    pub buff_duration_ms: Option<u64>,
    #[serde(default)]
    pub color: Option<CastColor>,
    /// Marks a cast interruptible regardless of its color
    #[serde(default)]
    pub interruptible: bool,
    /// Icon hint for presentation layers
    #[serde(default)]
    pub icon: Option<String>,
}

/// A resolved skill, ready for the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub kind: SkillKind,
    pub damage: u32,
    pub cast_time_ms: u64,
    pub cooldown_ms: u64,
    pub triggers_gcd: bool,
    pub gcd_ms: u64,
    pub damage_reduction: Option<f64>,
    pub buff_duration_ms: u64,
    pub color: Option<CastColor>,
    pub interruptible: bool,
    pub icon: Option<String>,
}

impl Skill {
    pub fn is_instant(&self) -> bool {
        self.cast_time_ms == 0
    }

    /// Whether an interrupt landing on this cast succeeds.
    pub fn can_be_interrupted(&self) -> bool {
        self.interruptible || self.color == Some(CastColor::Yellow)
    }

    pub fn is_color(&self, color: CastColor) -> bool {
        self.color == Some(color)
    }
}
