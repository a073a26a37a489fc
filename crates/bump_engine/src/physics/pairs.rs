//! Candidate pair discovery
//!
//! The broad phase walks the bump grid and emits every character-character
//! and character-particle pair whose horizontal reaches could touch. Each
//! unordered pair is recorded at most once per tick no matter how many cells
//! both members share: a per-tick set of [`PairKey`]s rejects the duplicates.
//!
//! The pool has a fixed capacity. When a tick produces more pairs than that,
//! the closest ones are kept and the rest are dropped and logged rather than
//! silently lost.

use std::collections::HashSet;

use crate::foundation::math::{utils, Vec2, Vec3};
use crate::spatial::BumpGrid;
use crate::world::{CharacterId, ParticleId, World};

/// Identity of an unordered pair
///
/// Character pairs are stored with the smaller handle first so `(a, b)` and
/// `(b, a)` produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PairKey {
    /// Two characters, smaller handle first
    Characters(CharacterId, CharacterId),
    /// A character and a particle
    CharacterParticle(CharacterId, ParticleId),
}

impl PairKey {
    /// Key for two characters in either order
    pub fn characters(a: CharacterId, b: CharacterId) -> Self {
        if a <= b {
            PairKey::Characters(a, b)
        } else {
            PairKey::Characters(b, a)
        }
    }

    /// Key for a character and a particle
    pub fn character_particle(character: CharacterId, particle: ParticleId) -> Self {
        PairKey::CharacterParticle(character, particle)
    }
}

/// One accepted candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRecord {
    /// Which two objects
    pub key: PairKey,
    /// Horizontal distance squared at discovery time
    pub distance_squared: f32,
    sequence: u32,
}

/// Tick-scoped pool of candidate pairs with symmetric deduplication
#[derive(Debug)]
pub struct PairPool {
    capacity: usize,
    seen: HashSet<PairKey>,
    records: Vec<PairRecord>,
    duplicates: usize,
    dropped: usize,
}

impl PairPool {
    /// Create a pool sized for `capacity` pairs
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: HashSet::with_capacity(capacity),
            records: Vec::with_capacity(capacity),
            duplicates: 0,
            dropped: 0,
        }
    }

    /// Maximum number of pairs kept per tick
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every pair from the previous tick
    pub fn clear(&mut self) {
        self.seen.clear();
        self.records.clear();
        self.duplicates = 0;
        self.dropped = 0;
    }

    /// Offer a pair; returns `false` when the same unordered pair was already recorded
    #[allow(clippy::cast_possible_truncation)]
    pub fn offer(&mut self, key: PairKey, distance_squared: f32) -> bool {
        if !self.seen.insert(key) {
            self.duplicates += 1;
            return false;
        }
        let sequence = self.records.len() as u32;
        self.records.push(PairRecord { key, distance_squared, sequence });
        true
    }

    /// Enforce the capacity, keeping the closest pairs in discovery order.
    /// Returns how many pairs were dropped.
    pub fn finish(&mut self) -> usize {
        if self.records.len() <= self.capacity {
            return 0;
        }

        let offered = self.records.len();
        self.records
            .sort_by(|a, b| a.distance_squared.total_cmp(&b.distance_squared).then(a.sequence.cmp(&b.sequence)));
        for record in self.records.drain(self.capacity..) {
            self.seen.remove(&record.key);
        }
        self.records.sort_by_key(|record| record.sequence);

        self.dropped = offered - self.capacity;
        log::error!(
            "Pair pool exhausted: {} candidate pairs for capacity {}, dropped the {} farthest",
            offered,
            self.capacity,
            self.dropped
        );
        self.dropped
    }

    /// Accepted pairs in discovery order
    pub fn records(&self) -> &[PairRecord] {
        &self.records
    }

    /// Number of accepted pairs
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no pair was accepted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Repeat offers rejected this tick
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Pairs dropped by the last [`PairPool::finish`]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Was this pair accepted this tick?
    pub fn contains(&self, key: &PairKey) -> bool {
        self.seen.contains(key)
    }
}

/// Walk the grid and fill `pool` with every pair that could be touching.
///
/// Each indexed character scans the cells covered by its reach widened by the
/// largest reach in the grid, so a neighbour registered in a different cell
/// is still found. `slack` widens the horizontal reach test for interactions
/// that start before the bounds meet, such as mounting.
pub fn discover(world: &World, grid: &BumpGrid, pool: &mut PairPool, slack: f32) -> usize {
    pool.clear();
    let margin = grid.max_reach() + slack;

    for (id, character) in &world.characters {
        if character.cell.is_none() {
            continue;
        }
        let reach = character.reach();
        let range = reach + margin;
        let min = Vec2::new(character.position.x - range, character.position.y - range);
        let max = Vec2::new(character.position.x + range, character.position.y + range);

        for cell in grid.cells_in_rect(min, max) {
            let bucket = grid.bucket(cell);

            for &other_id in &bucket.characters {
                if other_id == id {
                    continue;
                }
                let Some(other) = world.character(other_id) else {
                    continue;
                };
                if !within_reach(&character.position, &other.position, reach + other.reach() + slack) {
                    continue;
                }
                let distance = utils::horizontal_distance_squared(&character.position, &other.position);
                pool.offer(PairKey::characters(id, other_id), distance);
            }

            for &particle_id in &bucket.particles {
                let Some(particle) = world.particle(particle_id) else {
                    continue;
                };
                if !within_reach(&character.position, &particle.position, reach + particle.radius) {
                    continue;
                }
                let distance = utils::horizontal_distance_squared(&character.position, &particle.position);
                pool.offer(PairKey::character_particle(id, particle_id), distance);
            }
        }
    }

    pool.finish()
}

/// Square reach test; anything failing it is separated along X or Y
fn within_reach(a: &Vec3, b: &Vec3, reach: f32) -> bool {
    (a.x - b.x).abs() <= reach && (a.y - b.y).abs() <= reach
}
