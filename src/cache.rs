//! Cache state: sets of lines with a per-set recency order.
//!
//! Each [`Set`] keeps a usage list of its own line indices, least recently
//! used at the front and most recently used at the back. Sets never share
//! replacement state.

use std::collections::TryReserveError;

use crate::error::{Error, Result};
use crate::geometry::Geometry;

/// A single line slot. Only `occupied` and `tag` are modelled; no block data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    pub occupied: bool,
    pub tag: u64,
}

/// `E` lines plus their LRU order.
#[derive(Debug, Clone)]
pub struct Set {
    lines: Vec<Line>,
    /// Line indices, LRU first. Always a permutation of `0..lines.len()`.
    recency: Vec<usize>,
}

impl Set {
    pub fn new(ways: usize) -> Result<Self> {
        let mut lines: Vec<Line> = Vec::new();
        let mut recency: Vec<usize> = Vec::new();
        lines
            .try_reserve_exact(ways)
            .and_then(|()| recency.try_reserve_exact(ways))
            .map_err(|e| unallocatable(format!("{ways} lines per set"), e))?;
        lines.resize(ways, Line::default());
        recency.extend(0..ways);
        Ok(Self { lines, recency })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn recency(&self) -> &[usize] {
        &self.recency
    }

    /// Index of the first occupied line holding `tag`.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.occupied && line.tag == tag)
    }

    /// The least recently used line.
    pub fn victim(&self) -> usize {
        self.recency[0]
    }

    /// Move `way` to the most recently used end.
    pub fn promote(&mut self, way: usize) {
        if let Some(pos) = self.recency.iter().position(|&w| w == way) {
            self.recency.remove(pos);
        }
        self.recency.push(way);
    }

    /// Overwrite `way` with `tag`, returning the line it replaced.
    pub fn fill(&mut self, way: usize, tag: u64) -> Line {
        std::mem::replace(
            &mut self.lines[way],
            Line {
                occupied: true,
                tag,
            },
        )
    }
}

#[derive(Debug, Clone)]
pub struct Cache {
    sets: Vec<Set>,
}

fn unallocatable(what: String, e: TryReserveError) -> Error {
    Error::geometry(format!("cannot allocate {what}: {e}"))
}

impl Cache {
    /// Allocate every set up front. Fails with `InvalidGeometry` if the host
    /// cannot hold the requested shape.
    pub fn new(geometry: &Geometry) -> Result<Self> {
        let num_sets = geometry.num_sets();
        let mut sets: Vec<Set> = Vec::new();
        sets.try_reserve_exact(num_sets)
            .map_err(|e| unallocatable(format!("{num_sets} sets"), e))?;
        for _ in 0..num_sets {
            sets.push(Set::new(geometry.ways())?);
        }
        Ok(Self { sets })
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn set_mut(&mut self, set_index: usize) -> &mut Set {
        &mut self.sets[set_index]
    }

    /// True if some line of `set_index` currently holds `tag`.
    pub fn contains(&self, set_index: usize, tag: u64) -> bool {
        self.sets[set_index].find(tag).is_some()
    }
}
