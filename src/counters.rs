//! Running hit/miss/eviction totals for a trace.

use serde::Serialize;

use crate::simulator::Outcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a per-reference outcome into the totals.
    pub fn absorb(&mut self, outcome: Outcome) {
        self.hits += u64::from(outcome.hits);
        self.misses += u64::from(outcome.misses);
        self.evictions += u64::from(outcome.evictions);
    }

    /// Hit ratio (0.0 to 1.0); 0.0 before any access.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
