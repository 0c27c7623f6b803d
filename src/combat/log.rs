//! Combat logging
//!
//! Rolling record of recent combat events for display and diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::constants::COMBAT_LOG_CAPACITY;
use super::events::{CombatEvent, CombatEventKind};
use super::state::ActorId;

/// The combat log: the most recent events, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLog {
    entries: VecDeque<CombatEvent>,
    capacity: usize,
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::with_capacity(COMBAT_LOG_CAPACITY)
    }
}

impl CombatLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event. The log never holds more than its capacity.
    pub fn push(&mut self, event: CombatEvent) {
        self.entries.push_back(event);
        self.trim();
    }

    /// Drop the oldest entries beyond capacity.
    pub fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CombatEvent> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&CombatEvent> {
        self.entries.back()
    }

    /// Get entries filtered by kind
    pub fn filter_by_kind(&self, kind: CombatEventKind) -> Vec<&CombatEvent> {
        self.entries.iter().filter(|e| e.kind == kind).collect()
    }

    /// Get only HP-changing events
    pub fn hp_changes_only(&self) -> Vec<&CombatEvent> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    CombatEventKind::DamageDealt | CombatEventKind::DamageTaken
                )
            })
            .collect()
    }

    /// Get the last N entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<&CombatEvent> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Damage in the retained window that `source` dealt, mitigated or not.
    pub fn damage_from(&self, source: ActorId) -> u64 {
        self.hp_changes_only()
            .into_iter()
            .filter(|e| e.source == source)
            .map(|e| u64::from(e.value.unwrap_or(0)))
            .sum()
    }

    pub fn count(&self, kind: CombatEventKind, source: ActorId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == kind && e.source == source)
            .count()
    }
}
