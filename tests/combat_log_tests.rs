//! Tests for the combat log as produced by real matches
//!
//! These tests verify that the CombatLog:
//! - Never grows past its capacity, keeping the newest entries
//! - Records simultaneous resolutions player first
//! - Aggregates damage consistently with the actors' own totals
//! - Serializes with stable snake_case names

use duelsim::combat::events::{CombatEvent, CombatEventKind};
use duelsim::combat::state::ActiveCast;
use duelsim::{ActorId, CombatLog, Engine, GameRng, Ruleset, SkillId};

fn engine(seed: u64) -> Engine {
    Engine::new(Ruleset::default(), GameRng::from_seed(seed))
}

fn hit(ts: u64, source: ActorId, value: u32) -> CombatEvent {
    CombatEvent {
        timestamp_ms: ts,
        kind: CombatEventKind::DamageDealt,
        source,
        target: source.opponent(),
        skill_name: "Strike".to_string(),
        value: Some(value),
    }
}

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn test_log_capped_during_long_match() {
    let mut engine = engine(4);
    let mut state = engine.start_match();
    // Survive until the timeout so the log sees a full match
    state.player.max_hp = 1_000_000;
    state.player.hp = 1_000_000;
    let mut peak = 0;

    while !state.is_over() {
        if let Ok(next) = engine.activate_skill(&state, ActorId::Player, SkillId::PlayerAttack) {
            state = next;
        }
        state = engine.advance(&state, 100);
        peak = peak.max(state.combat_log.len());
    }

    assert_eq!(state.combat_log.capacity(), 50);
    assert_eq!(peak, state.combat_log.capacity(), "a full match fills the log");
}

#[test]
fn test_timestamps_never_decrease() {
    let mut engine = engine(12);
    let mut state = engine.start_match();
    for _ in 0..400 {
        if let Ok(next) = engine.activate_skill(&state, ActorId::Player, SkillId::PlayerCast) {
            state = next;
        }
        state = engine.advance(&state, 50);
    }

    let stamps: Vec<u64> = state.combat_log.iter().map(|e| e.timestamp_ms).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "{:?}", stamps);
}

#[test]
fn test_trim_keeps_newest() {
    let mut log = CombatLog::with_capacity(3);
    for ts in 0..5 {
        log.push(hit(ts, ActorId::Player, 10));
    }
    let kept: Vec<u64> = log.iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(kept, vec![2, 3, 4]);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_simultaneous_completion_logs_player_first() {
    let mut engine = engine(1);
    let mut state = engine.start_match();
    state.ai.global_cooldown_ends_at = u64::MAX;

    state = engine
        .activate_skill(&state, ActorId::Player, SkillId::PlayerCast)
        .unwrap();
    for _ in 0..5 {
        state = engine.advance(&state, 100);
    }
    state.ai.cast = Some(ActiveCast {
        skill: SkillId::AiYellow,
        progress: 0.0,
        started_at_ms: 500,
    });
    for _ in 0..15 {
        state = engine.advance(&state, 100);
    }

    let hits = state.combat_log.hp_changes_only();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].source, ActorId::Player);
    assert_eq!(hits[1].source, ActorId::Ai);
    assert_eq!(hits[0].timestamp_ms, hits[1].timestamp_ms);
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_damage_from_matches_actor_totals() {
    let mut engine = engine(1);
    let mut state = engine.start_match();
    state.ai.global_cooldown_ends_at = u64::MAX;

    for _ in 0..5 {
        if let Ok(next) = engine.activate_skill(&state, ActorId::Player, SkillId::PlayerAttack) {
            state = next;
        }
        for _ in 0..15 {
            state = engine.advance(&state, 100);
        }
    }

    assert_eq!(state.combat_log.damage_from(ActorId::Player), 1500);
    assert_eq!(state.player.damage_dealt, 1500);
    assert_eq!(state.ai.damage_taken, 1500);
    assert_eq!(state.combat_log.damage_from(ActorId::Ai), 0);
}

#[test]
fn test_recent_and_filters() {
    let mut log = CombatLog::default();
    log.push(hit(0, ActorId::Player, 300));
    log.push(CombatEvent {
        kind: CombatEventKind::SkillCast,
        value: None,
        ..hit(10, ActorId::Ai, 0)
    });
    log.push(hit(20, ActorId::Ai, 200));

    assert_eq!(log.recent(2).len(), 2);
    assert_eq!(log.recent(2)[0].timestamp_ms, 10);
    assert_eq!(log.recent(10).len(), 3);
    assert_eq!(log.filter_by_kind(CombatEventKind::SkillCast).len(), 1);
    assert_eq!(log.count(CombatEventKind::DamageDealt, ActorId::Ai), 1);
    assert_eq!(log.hp_changes_only().len(), 2);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_event_json_shape() {
    let json = serde_json::to_value(hit(1500, ActorId::Ai, 3000)).unwrap();
    assert_eq!(json["kind"], "damage_dealt");
    assert_eq!(json["source"], "ai");
    assert_eq!(json["target"], "player");
    assert_eq!(json["value"], 3000);

    let cancel = CombatEvent {
        kind: CombatEventKind::FakeCastCancel,
        value: None,
        ..hit(0, ActorId::Ai, 0)
    };
    let json = serde_json::to_value(cancel).unwrap();
    assert_eq!(json["kind"], "fake_cast_cancel");
    assert!(json.get("value").is_none());
}
