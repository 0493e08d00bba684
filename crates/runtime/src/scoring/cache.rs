//! Per-round cache of base values.
//!
//! A base value is what one combatant is worth against another with no
//! situational modifiers: the best plain expected damage of its hostile
//! actions. The planner asks for the same pairs many times per turn, and the
//! answer only changes when HP or positions change, so entries live for one
//! round.
//!
//! Entries sit in a `Vec` arena; the index map holds the composite key.

use std::collections::HashMap;

use combat_core::{CombatantId, Round};

/// Composite cache key: `(combatant, target, round)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub combatant: CombatantId,
    pub target: CombatantId,
    pub round: Round,
}

impl CacheKey {
    pub fn new(combatant: CombatantId, target: CombatantId, round: Round) -> Self {
        Self {
            combatant,
            target,
            round,
        }
    }
}

#[derive(Debug, Default)]
pub struct BaseValueCache {
    arena: Vec<f64>,
    index: HashMap<CacheKey, usize>,
    round: Option<Round>,
    hits: u64,
    misses: u64,
}

impl BaseValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry if `round` differs from the cached round.
    pub fn sync_round(&mut self, round: Round) {
        if self.round != Some(round) {
            self.arena.clear();
            self.index.clear();
            self.round = Some(round);
        }
    }

    /// Cached value for `key`. Counts towards the hit/miss statistics.
    pub fn get(&mut self, key: CacheKey) -> Option<f64> {
        if self.round != Some(key.round) {
            self.misses += 1;
            return None;
        }
        match self.index.get(&key) {
            Some(&slot) => {
                self.hits += 1;
                Some(self.arena[slot])
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores `value`, clearing older rounds first.
    pub fn insert(&mut self, key: CacheKey, value: f64) {
        self.sync_round(key.round);
        match self.index.get(&key) {
            Some(&slot) => self.arena[slot] = value,
            None => {
                self.index.insert(key, self.arena.len());
                self.arena.push(value);
            }
        }
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: CacheKey, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.insert(key, value);
        value
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
