//! Per-tick collision statistics

use std::fmt;

use crate::spatial::IndexStats;

/// Counters describing one call to [`crate::physics::CollisionSystem::resolve_tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Objects placed in the bump grid
    pub indexed: IndexStats,

    /// Unique candidate pairs kept for resolution
    pub candidate_pairs: usize,
    /// Repeat offers of an already recorded pair
    pub duplicate_pairs: usize,
    /// Pairs dropped because the pool was full
    pub dropped_pairs: usize,
    /// Pairs whose members disappeared before resolution
    pub stale_pairs: usize,

    /// Pairs excluded by attachment, holding or state
    pub excluded_pairs: usize,
    /// Pairs rejected because a member has no interaction strength
    pub no_strength: usize,
    /// Pairs found apart by the five-axis test
    pub separated: usize,

    /// Fresh contacts resolved by impulse
    pub impulses: usize,
    /// Sustained overlaps resolved by pressure
    pub pressure_contacts: usize,
    /// Riders coupled to a platform
    pub platform_contacts: usize,
    /// Mount attempts queued
    pub mount_attempts: usize,

    /// Particles that struck a character
    pub particle_hits: usize,
    /// Particles deflected or reflected
    pub deflections: usize,
    /// Money pickups
    pub money_pickups: usize,
    /// Particles flagged for termination
    pub terminated_particles: usize,

    /// Objects whose corrections were discarded as non-finite
    pub corrupted: usize,
    /// Moves rolled back at a wall
    pub wall_rollbacks: usize,

    /// Wall-clock cost of the tick when profiling is enabled
    pub elapsed_ms: Option<f32>,
}

impl TickStats {
    /// Contacts of every kind that changed something
    pub fn contacts(&self) -> usize {
        self.impulses + self.pressure_contacts + self.platform_contacts + self.particle_hits + self.deflections
    }
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} chr / {} prt indexed, {} pairs ({} dropped, {} stale), {} impulse, {} pressure, {} platform, {} hits, {} deflected",
            self.tick,
            self.indexed.characters,
            self.indexed.particles,
            self.candidate_pairs,
            self.dropped_pairs,
            self.stale_pairs,
            self.impulses,
            self.pressure_contacts,
            self.platform_contacts,
            self.particle_hits,
            self.deflections
        )?;
        if let Some(ms) = self.elapsed_ms {
            write!(f, " in {:.3} ms", ms)?;
        }
        Ok(())
    }
}
