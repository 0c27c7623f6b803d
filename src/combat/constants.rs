//! Combat Constants
//!
//! Centralized location for the fixed numbers of the duel rules.
//! Values that a skill table may override live in `skills.ron`; everything here is
//! part of the rules themselves.

// ============================================================================
// Timing
// ============================================================================

/// Default shared (global) cooldown in milliseconds.
pub const DEFAULT_GCD_MS: u64 = 1500;

/// Default match length in milliseconds (2 minutes).
pub const DEFAULT_MATCH_DURATION_MS: u64 = 120_000;

/// Largest elapsed time a single `advance` call should receive.
/// Drivers clamp to this so a stalled clock doesn't skip simulation.
pub const MAX_TICK_MS: u64 = 100;

/// Silence applied by a successful interrupt.
pub const INTERRUPT_SILENCE_MS: u64 = 5000;

/// Lifetime of a defensive buff when the skill doesn't specify one.
pub const DEFAULT_BUFF_DURATION_MS: u64 = 2000;

// ============================================================================
// Health
// ============================================================================

pub const DEFAULT_PLAYER_MAX_HP: u32 = 10_000;
pub const DEFAULT_AI_MAX_HP: u32 = 15_000;

// ============================================================================
// AI Policy
// ============================================================================

/// Chance for each off-cooldown skill to be admitted into the AI's pick pool.
pub const AI_SKILL_ROLL_CHANCE: f32 = 0.3;

/// Chance that a yellow cast is a fake one the AI will cancel itself.
pub const FAKE_CAST_CHANCE: f32 = 0.3;

/// Fraction of the cast time after which a fake cast cancels itself.
pub const FAKE_CAST_CANCEL_POINT: f64 = 0.3;

/// Player red casts above this damage trigger the AI's reactive defense.
pub const REACTIVE_DEFENSE_DAMAGE_THRESHOLD: u32 = 500;

// ============================================================================
// Display
// ============================================================================

/// Floating combat text lifetime in milliseconds.
pub const FLOATING_TEXT_TTL_MS: u64 = 500;

/// Number of combat events kept in the rolling log.
pub const COMBAT_LOG_CAPACITY: usize = 50;

/// Horizontal anchor of floating text, in percent of the actor frame.
pub const FCT_ANCHOR_X: f32 = 50.0;

/// Floating text horizontal spread (percent). Offsets stay within +/- this value.
pub const FCT_HORIZONTAL_SPREAD: f32 = 10.0;
