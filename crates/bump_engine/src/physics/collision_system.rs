//! Per-tick collision pipeline
//!
//! Broad phase, classification, resolution and integration run back to back
//! inside [`CollisionSystem::resolve_tick`]:
//!
//! 1. **Index**: rebuild the bump grid from the live characters and particles.
//! 2. **Discover**: collect unique candidate pairs, up to the pool capacity.
//! 3. **Classify and resolve**: sort each pair into an [`Interaction`] and
//!    accumulate its corrections. Platform contacts are gathered first and
//!    resolved together so each rider picks a single platform.
//! 4. **Integrate**: apply effects and accumulated corrections to the world.
//!
//! Every stage reads the world as it stood at the start of the tick, so the
//! result does not depend on the order in which pairs are visited.

use crate::config::{Config, ConfigError};
use crate::core::config::PhysicsConfig;
use crate::foundation::time::Stopwatch;
use crate::physics::accumulator::Accumulators;
use crate::physics::classify::{self, Interaction};
use crate::physics::coupling::{self, PlatformContact};
use crate::physics::pairs::{self, PairPool};
use crate::physics::stats::TickStats;
use crate::physics::{contact, integrate, projectile};
use crate::spatial::BumpGrid;
use crate::world::{CharacterId, Mesh, World, WorldError};

/// Scratch state for one tick, reused across ticks to avoid reallocating
#[derive(Debug)]
pub struct TickContext {
    /// Spatial bucket index
    pub grid: BumpGrid,
    /// Candidate pairs
    pub pairs: PairPool,
    /// Per-object corrections and deferred effects
    pub accumulators: Accumulators,
    /// Platform contacts awaiting per-rider selection
    pub platform_contacts: Vec<PlatformContact>,
    /// Counters for the tick in progress
    pub stats: TickStats,
}

impl TickContext {
    /// Allocate scratch state sized from the configuration
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            grid: BumpGrid::new(config.grid.cell_size),
            pairs: PairPool::new(config.capacity.max_pairs),
            accumulators: Accumulators::new(),
            platform_contacts: Vec::new(),
            stats: TickStats::default(),
        }
    }
}

/// The collision and contact resolution engine
///
/// Owns its configuration and tick scratch state; the world and mesh are
/// borrowed for each tick.
#[derive(Debug)]
pub struct CollisionSystem {
    config: PhysicsConfig,
    context: TickContext,
    tick: u64,
}

impl CollisionSystem {
    /// Create a collision system, rejecting a configuration that fails validation
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = TickContext::new(&config);
        log::info!(
            "Collision system ready: cell size {}, {} pair capacity",
            config.grid.cell_size,
            config.capacity.max_pairs
        );
        Ok(Self { config, context, tick: 0 })
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Bump grid as built by the last tick
    pub fn grid(&self) -> &BumpGrid {
        &self.context.grid
    }

    /// Statistics of the last completed tick
    pub fn last_stats(&self) -> &TickStats {
        &self.context.stats
    }

    /// Number of ticks resolved so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Detach a rider from its mount, starting the configured grace period
    pub fn dismount(&self, world: &mut World, rider: CharacterId) -> Result<CharacterId, WorldError> {
        world.dismount(rider, self.config.mount.dismount_grace_ticks)
    }

    /// Run one full collision tick over `world`
    pub fn resolve_tick(&mut self, world: &mut World, mesh: &dyn Mesh) -> TickStats {
        let stopwatch = self.config.enable_profiling.then(Stopwatch::start_new);
        self.tick += 1;

        let ctx = &mut self.context;
        ctx.stats = TickStats { tick: self.tick, ..TickStats::default() };

        // Index
        ctx.stats.indexed = ctx.grid.rebuild(world, mesh.extent());
        ctx.accumulators.reset(world);
        ctx.platform_contacts.clear();

        // Discover
        let world_view: &World = world;
        ctx.stats.dropped_pairs =
            pairs::discover(world_view, &ctx.grid, &mut ctx.pairs, self.config.mount.horizontal_tolerance);
        ctx.stats.candidate_pairs = ctx.pairs.len();
        ctx.stats.duplicate_pairs = ctx.pairs.duplicates();

        // Classify and resolve
        for record in ctx.pairs.records() {
            let Some(interaction) = classify::classify(world_view, &self.config, record.key) else {
                log::trace!("Skipping stale pair {:?}", record.key);
                ctx.stats.stale_pairs += 1;
                continue;
            };

            match interaction {
                Interaction::Excluded => ctx.stats.excluded_pairs += 1,
                Interaction::NoStrength => ctx.stats.no_strength += 1,
                Interaction::Separate => ctx.stats.separated += 1,
                Interaction::Mount { rider, mount } => {
                    coupling::queue_mount(rider, mount, &mut ctx.accumulators, &mut ctx.stats);
                }
                Interaction::Platform(platform) => ctx.platform_contacts.push(platform),
                Interaction::Solid(solid) => {
                    contact::resolve(world_view, &self.config.contact, &solid, &mut ctx.accumulators, &mut ctx.stats);
                }
                Interaction::Particle(touch) => {
                    projectile::resolve(world_view, &self.config, &touch, &mut ctx.accumulators, &mut ctx.stats);
                }
            }
        }
        coupling::resolve_platforms(
            world_view,
            &self.config.platform,
            &mut ctx.platform_contacts,
            &mut ctx.accumulators,
            &mut ctx.stats,
        );

        // Integrate
        integrate::integrate(world, mesh, &self.config, &ctx.accumulators, &mut ctx.stats);

        if let Some(mut stopwatch) = stopwatch {
            stopwatch.stop();
            ctx.stats.elapsed_ms = Some(stopwatch.elapsed_millis());
        }
        log::debug!("{}", ctx.stats);
        ctx.stats
    }
}
