//! Per-reference lookup and LRU replacement.
//!
//! A reference scans its set for an occupied line with a matching tag. On a
//! hit that line becomes most recently used. On a miss the least recently used
//! line is refilled (counting an eviction only if it was occupied) and then
//! promoted. A Modify is a load followed by a store to the same line, so its
//! second half always hits.

use std::fmt;

use tracing::{debug, trace};

use crate::address::decompose;
use crate::cache::Cache;
use crate::counters::Counters;
use crate::error::Result;
use crate::geometry::Geometry;

/// Data reference kinds. Instruction fetches never reach the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
    Modify,
}

impl AccessKind {
    pub fn as_char(self) -> char {
        match self {
            AccessKind::Load => 'L',
            AccessKind::Store => 'S',
            AccessKind::Modify => 'M',
        }
    }
}

/// One decoded trace entry. `size` is carried for output only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub kind: AccessKind,
    pub address: u64,
    pub size: u32,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind.as_char(), self.address, self.size)
    }
}

/// What a single reference did to the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

impl fmt::Display for Outcome {
    /// Event words in the order they happen, e.g. `miss eviction hit`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::repeat_n("miss", self.misses as usize)
            .chain(std::iter::repeat_n("eviction", self.evictions as usize))
            .chain(std::iter::repeat_n("hit", self.hits as usize));
        for (i, word) in words.enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

/// Run one reference against `cache.sets[set_index]` and add the result to `counters`.
///
/// `set_index` must be below the cache's set count, which [`decompose`]
/// guarantees for addresses split with the same geometry.
pub fn access(
    cache: &mut Cache,
    kind: AccessKind,
    set_index: usize,
    tag: u64,
    counters: &mut Counters,
) -> Outcome {
    let set = cache.set_mut(set_index);
    let mut outcome = Outcome::default();

    let way = match set.find(tag) {
        Some(way) => {
            outcome.hits += 1;
            way
        }
        None => {
            outcome.misses += 1;
            let way = set.victim();
            let replaced = set.fill(way, tag);
            if replaced.occupied {
                outcome.evictions += 1;
                debug!(set_index, way, old_tag = replaced.tag, new_tag = tag, "evicted line");
            }
            way
        }
    };
    set.promote(way);

    if kind == AccessKind::Modify {
        // The store half lands on the line just touched, already MRU.
        outcome.hits += 1;
    }

    counters.absorb(outcome);
    outcome
}

/// A cache bound to the geometry used to split addresses for it.
#[derive(Debug, Clone)]
pub struct Simulator {
    geometry: Geometry,
    cache: Cache,
}

impl Simulator {
    pub fn new(geometry: Geometry) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(&geometry)?,
            geometry,
        })
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn reference(&mut self, reference: &Reference, counters: &mut Counters) -> Outcome {
        let fields = decompose(
            reference.address,
            self.geometry.set_bits(),
            self.geometry.block_bits(),
        );
        // The set index is masked to `set_bits`, and `Geometry` ensures 2^set_bits fits a usize.
        let set_index = fields.set_index as usize;
        let outcome = access(&mut self.cache, reference.kind, set_index, fields.tag, counters);
        trace!(%reference, set_index, tag = fields.tag, %outcome, "access");
        outcome
    }

    /// Drive every reference through the cache in order.
    pub fn run<'a, I>(&mut self, references: I, counters: &mut Counters)
    where
        I: IntoIterator<Item = &'a Reference>,
    {
        for reference in references {
            self.reference(reference, counters);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn r(kind: AccessKind, address: u64) -> Reference {
        Reference {
            kind,
            address,
            size: 1,
        }
    }

    fn outcome(hits: u32, misses: u32, evictions: u32) -> Outcome {
        Outcome {
            hits,
            misses,
            evictions,
        }
    }

    fn sim(s: u32, e: usize, b: u32) -> Simulator {
        Simulator::new(Geometry::new(s, e, b).unwrap()).unwrap()
    }

    #[test]
    fn direct_mapped_conflicts() {
        // s=1, E=1, b=1: addresses 0 and 8 both land in set 0 with tags 0 and 2.
        let mut sim = sim(1, 1, 1);
        let mut counters = Counters::new();

        let seq: Vec<Outcome> = [0, 8, 0]
            .into_iter()
            .map(|a| sim.reference(&r(AccessKind::Load, a), &mut counters))
            .collect();

        assert_eq!(seq, vec![outcome(0, 1, 0), outcome(0, 1, 1), outcome(0, 1, 1)]);
        assert_eq!(counters, Counters { hits: 0, misses: 3, evictions: 2 });
    }

    #[test]
    fn cold_modify_is_miss_then_hit() {
        let mut sim = sim(4, 1, 4);
        let mut counters = Counters::new();
        let out = sim.reference(&r(AccessKind::Modify, 0x10), &mut counters);
        assert_eq!(out, outcome(1, 1, 0));
        assert_eq!(out.to_string(), "miss hit");
        assert_eq!(counters, Counters { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn warm_modify_hits_twice() {
        let mut sim = sim(4, 1, 4);
        let mut counters = Counters::new();
        sim.reference(&r(AccessKind::Load, 0x10), &mut counters);
        let out = sim.reference(&r(AccessKind::Modify, 0x14), &mut counters);
        assert_eq!(out, outcome(2, 0, 0));
        assert_eq!(out.to_string(), "hit hit");
    }

    #[test]
    fn modify_evicting_reports_all_three() {
        let mut sim = sim(0, 1, 4);
        let mut counters = Counters::new();
        sim.reference(&r(AccessKind::Store, 0x00), &mut counters);
        let out = sim.reference(&r(AccessKind::Modify, 0x100), &mut counters);
        assert_eq!(out.to_string(), "miss eviction hit");
        assert_eq!(counters, Counters { hits: 1, misses: 2, evictions: 1 });
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    #[case(8)]
    fn lru_capacity_miss(#[case] ways: usize) {
        // Fully associative, 16-byte blocks: tag = address >> 4.
        let mut sim = sim(0, ways, 4);
        let mut counters = Counters::new();
        for t in 0..=ways as u64 {
            sim.reference(&r(AccessKind::Load, t << 4), &mut counters);
        }
        assert!(!sim.cache().contains(0, 0), "first tag should be the LRU victim");
        let out = sim.reference(&r(AccessKind::Load, 0), &mut counters);
        assert_eq!(out.misses, 1);
        assert_eq!(out.evictions, 1);
    }

    #[test]
    fn hit_refreshes_recency() {
        let mut sim = sim(0, 2, 4);
        let mut counters = Counters::new();
        sim.reference(&r(AccessKind::Load, 0x00), &mut counters); // A
        sim.reference(&r(AccessKind::Load, 0x10), &mut counters); // B
        sim.reference(&r(AccessKind::Load, 0x00), &mut counters); // A hit, B now LRU
        sim.reference(&r(AccessKind::Load, 0x20), &mut counters); // C evicts B
        assert!(sim.cache().contains(0, 0));
        assert!(!sim.cache().contains(0, 1));
        assert!(sim.cache().contains(0, 2));
        assert_eq!(counters, Counters { hits: 1, misses: 3, evictions: 1 });
    }

    #[test]
    fn sets_are_independent() {
        // s=1, b=4: bit 4 picks the set.
        let mut sim = sim(1, 1, 4);
        let mut counters = Counters::new();
        sim.reference(&r(AccessKind::Load, 0x00), &mut counters); // set 0
        sim.reference(&r(AccessKind::Load, 0x10), &mut counters); // set 1
        sim.reference(&r(AccessKind::Load, 0x00), &mut counters);
        sim.reference(&r(AccessKind::Load, 0x10), &mut counters);
        assert_eq!(counters, Counters { hits: 2, misses: 2, evictions: 0 });
    }

    #[test]
    fn cold_lines_fill_before_evicting() {
        let mut sim = sim(0, 4, 0);
        let mut counters = Counters::new();
        for a in 0..4 {
            sim.reference(&r(AccessKind::Load, a), &mut counters);
        }
        assert_eq!(counters, Counters { hits: 0, misses: 4, evictions: 0 });
        sim.reference(&r(AccessKind::Load, 4), &mut counters);
        assert_eq!(counters.evictions, 1);
    }

    #[test]
    fn full_width_geometry_has_single_tag() {
        // s + b = 64, every address in a set shares tag 0.
        let mut sim = sim(0, 1, 64);
        let mut counters = Counters::new();
        sim.reference(&r(AccessKind::Load, 0x1234), &mut counters);
        sim.reference(&r(AccessKind::Load, u64::MAX), &mut counters);
        assert_eq!(counters, Counters { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn reference_display() {
        assert_eq!(r(AccessKind::Modify, 0x7ff0_0040).to_string(), "M 7ff00040,1");
        assert_eq!(Outcome::default().to_string(), "");
    }

    fn kind_strategy() -> impl Strategy<Value = AccessKind> {
        prop_oneof![
            Just(AccessKind::Load),
            Just(AccessKind::Store),
            Just(AccessKind::Modify),
        ]
    }

    proptest! {
        #[test]
        fn counter_invariants(
            s in 0u32..4,
            e in 1usize..5,
            b in 0u32..5,
            refs in prop::collection::vec((kind_strategy(), 0u64..512), 0..200),
        ) {
            let mut sim = sim(s, e, b);
            let mut counters = Counters::new();
            let mut expected_accesses = 0u64;
            for (kind, address) in refs {
                expected_accesses += if kind == AccessKind::Modify { 2 } else { 1 };
                let before = counters;
                let out = sim.reference(&r(kind, address), &mut counters);
                prop_assert!(out.misses <= 1);
                prop_assert!(counters.hits >= before.hits);
                prop_assert!(counters.misses >= before.misses);
                prop_assert!(counters.evictions >= before.evictions);
            }
            prop_assert_eq!(counters.hits + counters.misses, expected_accesses);
            prop_assert!(counters.evictions <= counters.misses);

            for set in sim.cache().sets() {
                let mut order = set.recency().to_vec();
                order.sort_unstable();
                prop_assert_eq!(order, (0..e).collect::<Vec<_>>());
            }
        }

        #[test]
        fn direct_mapped_alternation_always_evicts(t1 in 0u64..1024, t2 in 0u64..1024, n in 2usize..50) {
            prop_assume!(t1 != t2);
            // s=2, b=3: same set index 1, tags t1 and t2.
            let a1 = (t1 << 5) | (1 << 3);
            let a2 = (t2 << 5) | (1 << 3);
            let mut sim = sim(2, 1, 3);
            let mut counters = Counters::new();
            let first = sim.reference(&r(AccessKind::Load, a1), &mut counters);
            prop_assert_eq!(first, outcome(0, 1, 0));
            for i in 1..n {
                let a = if i % 2 == 0 { a1 } else { a2 };
                let out = sim.reference(&r(AccessKind::Load, a), &mut counters);
                prop_assert_eq!(out, outcome(0, 1, 1));
            }
        }
    }
}
