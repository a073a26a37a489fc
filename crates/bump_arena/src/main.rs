//! Headless arena for the bump engine
//!
//! Spawns a crowd of walkers, archers, platforms and mounts on a walled tile
//! mesh and runs the collision pipeline for a fixed number of ticks, logging
//! what happened along the way.
//!
//! ```text
//! bump_arena [config.toml|config.ron]
//! ```

mod arena;
mod config;

use bump_engine::config::Config;
use bump_engine::foundation::logging;
use bump_engine::physics::{CollisionSystem, TickStats};

use crate::arena::Arena;
use crate::config::ArenaConfig;

/// Running totals over a whole run
#[derive(Debug, Default)]
struct RunTotals {
    contacts: u64,
    impulses: u64,
    platform_contacts: u64,
    mounts: u64,
    hits: u64,
    deflections: u64,
    pickups: u64,
    dropped_pairs: u64,
    corrupted: u64,
    arrows: u64,
    slowest_ms: f32,
}

impl RunTotals {
    fn add(&mut self, stats: &TickStats) {
        self.contacts += stats.contacts() as u64;
        self.impulses += stats.impulses as u64;
        self.platform_contacts += stats.platform_contacts as u64;
        self.mounts += stats.mount_attempts as u64;
        self.hits += stats.particle_hits as u64;
        self.deflections += stats.deflections as u64;
        self.pickups += stats.money_pickups as u64;
        self.dropped_pairs += stats.dropped_pairs as u64;
        self.corrupted += stats.corrupted as u64;
        if let Some(ms) = stats.elapsed_ms {
            self.slowest_ms = self.slowest_ms.max(ms);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "arena.toml".to_string());
    let config = ArenaConfig::load_or_default(&path)?;

    logging::init_with_level(&config.physics.log_level);
    log::info!("Starting bump arena ({})", path);

    let mut arena = Arena::new(&config.scenario);
    let mut physics = CollisionSystem::new(config.physics.clone())?;
    let grace_ticks = physics.config().mount.dismount_grace_ticks;
    let mut totals = RunTotals::default();

    for tick in 1..=config.scenario.ticks {
        arena.move_everything(tick);
        totals.arrows += arena.fire_arrows(tick) as u64;

        let stats = physics.resolve_tick(&mut arena.world, &arena.mesh);
        totals.add(&stats);

        arena.tidy(grace_ticks);

        if tick % config.scenario.report_every == 0 {
            log::info!("{}", stats);
        }
    }

    let census = arena.census();
    log::info!(
        "Finished {} ticks: {} contacts ({} impulses, {} platform), {} mounts, {} arrows fired",
        physics.ticks(),
        totals.contacts,
        totals.impulses,
        totals.platform_contacts,
        totals.mounts,
        totals.arrows
    );
    log::info!(
        "Particles: {} hits, {} deflected, {} coins picked up, {} still in flight",
        totals.hits,
        totals.deflections,
        totals.pickups,
        census.particles
    );
    log::info!(
        "Characters: {} alive, {} dead, {} riding, {} gold carried",
        census.alive,
        census.dead,
        census.riding,
        census.money
    );
    if totals.dropped_pairs > 0 || totals.corrupted > 0 {
        log::warn!(
            "{} pairs dropped over capacity, {} corrupted states discarded",
            totals.dropped_pairs,
            totals.corrupted
        );
    }
    if config.physics.enable_profiling {
        log::info!("Slowest tick: {:.3} ms", totals.slowest_ms);
    }

    Ok(())
}
