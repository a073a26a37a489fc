//! Integration of the tick's accumulated corrections
//!
//! Runs once per tick after every pair has been resolved:
//!
//! 1. Count down per-character timers.
//! 2. Apply deferred effects in the order they were queued.
//! 3. Apply each free character's corrections, rejecting non-finite values,
//!    rolling back moves that end in a wall and clamping to the floor.
//! 4. Snap attached characters to the grip of whatever carries them.
//! 5. Apply particle corrections the same way.
//! 6. Remember this tick's state as the previous state for the next tick.

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{utils, Vec3};
use crate::physics::accumulator::{Accumulators, CharacterAccum, Effect, ParticleAccum};
use crate::physics::stats::TickStats;
use crate::world::{Alerts, Mesh, ParticleFlags, TileFlags, World};

/// Apply everything in `acc` to the world
pub fn integrate(world: &mut World, mesh: &dyn Mesh, config: &PhysicsConfig, acc: &Accumulators, stats: &mut TickStats) {
    tick_timers(world);
    apply_effects(world, config, &acc.effects, stats);
    integrate_characters(world, mesh, acc, stats);
    follow_attachments(world);
    integrate_particles(world, mesh, acc, stats);
}

fn tick_timers(world: &mut World) {
    for character in world.characters.values_mut() {
        character.damage_timer = character.damage_timer.saturating_sub(1);
        if character.dismount_timer > 0 {
            character.dismount_timer -= 1;
            if character.dismount_timer == 0 {
                character.dismounted_from = None;
            }
        }
    }
}

/// Apply deferred effects; each one re-checks the state it depends on
pub fn apply_effects(world: &mut World, config: &PhysicsConfig, effects: &[Effect], stats: &mut TickStats) {
    for effect in effects {
        match *effect {
            Effect::Bump { target, by } => {
                if let Some(character) = world.character_mut(target) {
                    character.notifications.alerts |= Alerts::BUMPED;
                    character.notifications.last_bumped_by = Some(by);
                }
            }
            Effect::Damage { target, amount, attacker } => {
                let Some(character) = world.character_mut(target) else {
                    continue;
                };
                // A second particle this tick finds the cooldown already running
                if character.damage_timer > 0 || !character.alive {
                    continue;
                }
                character.life -= amount;
                character.damage_timer = config.projectile.damage_cooldown_ticks;
                character.notifications.alerts |= Alerts::ATTACKED;
                character.notifications.last_hit_by = attacker;
                log::debug!("{} took {:.1} damage ({:.1} left)", character.name, amount, character.life);
                if character.life <= 0.0 {
                    character.alive = false;
                    log::info!("{} was killed", character.name);
                }
            }
            Effect::HitEffects { target, effects } => {
                if let Some(character) = world.character_mut(target) {
                    character.on_fire_ticks = character.on_fire_ticks.max(effects.ignite_ticks);
                    character.grog_ticks = character.grog_ticks.max(effects.grog_ticks);
                    character.daze_ticks = character.daze_ticks.max(effects.daze_ticks);
                }
            }
            Effect::Struck { target, particle, attacker } => {
                if let Some(character) = world.character_mut(target) {
                    character.notifications.alerts |= Alerts::HIT;
                    if attacker.is_some() {
                        character.notifications.last_hit_by = attacker;
                    }
                }
                if let Some(particle) = world.particle_mut(particle) {
                    particle.last_hit = Some(target);
                    if let Some(bumps) = particle.bumps_remaining.as_mut() {
                        *bumps = bumps.saturating_sub(1);
                    }
                    let spent = particle.bumps_remaining == Some(0) || particle.flags.contains(ParticleFlags::END_ON_HIT);
                    if spent && particle.is_active() {
                        particle.terminate();
                        stats.terminated_particles += 1;
                    }
                }
            }
            Effect::Deflected { target, particle, cost, reflect } => {
                let Some(character) = world.character_mut(target) else {
                    continue;
                };
                character.mana = (character.mana - cost).max(0.0);
                character.notifications.alerts |= Alerts::BLOCKED;
                let team = character.team;
                if let Some(particle) = world.particle_mut(particle) {
                    particle.last_hit = Some(target);
                    if reflect {
                        particle.owner = Some(target);
                        particle.team = team;
                    }
                }
            }
            Effect::Money { target, particle } => {
                let amount = match world.particle_mut(particle) {
                    Some(coin) if coin.is_active() => {
                        coin.terminate();
                        coin.money
                    }
                    _ => continue,
                };
                stats.terminated_particles += 1;
                if let Some(character) = world.character_mut(target) {
                    character.money = character.money.saturating_add(amount);
                    character.notifications.alerts |= Alerts::GOT_MONEY;
                }
            }
            Effect::Mount { rider, mount } => {
                if let Err(err) = world.mount(rider, mount) {
                    log::debug!("Mount attempt failed: {}", err);
                }
            }
        }
    }
}

fn integrate_characters(world: &mut World, mesh: &dyn Mesh, acc: &Accumulators, stats: &mut TickStats) {
    for (id, character) in &mut world.characters {
        if character.attached_to.is_some() {
            continue;
        }

        let accum = acc.characters.get(id).copied().unwrap_or_default();
        let accum = if accum.is_finite() {
            accum
        } else {
            log::error!("Discarding non-finite corrections for {}: {:?}", character.name, accum);
            stats.corrupted += 1;
            CharacterAccum::default()
        };

        let mut position = character.position + accum.position;
        let mut velocity = character.velocity + accum.velocity;
        let facing = utils::wrap_angle(character.facing + accum.facing);
        if !utils::is_finite(&position) || !utils::is_finite(&velocity) || !facing.is_finite() {
            log::error!("{} has non-finite state, leaving it untouched", character.name);
            stats.corrupted += 1;
        } else {
            if roll_back_walls(mesh, TileFlags::BLOCKS_CHARACTERS, &character.position, &mut position, &mut velocity) {
                stats.wall_rollbacks += 1;
            }
            let floor = mesh.floor_level_at(position.x, position.y);
            if position.z < floor {
                position.z = floor;
                velocity.z = velocity.z.max(0.0);
            }

            character.position = position;
            character.velocity = velocity;
            character.facing = facing;
        }

        character.on_platform = accum.platform;
        character.holding_weight = accum.riders_weight;
        character.previous_position = character.position;
        character.previous_velocity = character.velocity;
        character.previous_facing = character.facing;
    }
}

fn follow_attachments(world: &mut World) {
    let snaps: Vec<_> = world
        .characters
        .iter()
        .filter_map(|(id, character)| {
            let carrier = world.character(character.attached_to?)?;
            Some((id, carrier.grip_position(), carrier.velocity, carrier.facing))
        })
        .collect();

    for (id, grip, velocity, facing) in snaps {
        if let Some(character) = world.character_mut(id) {
            character.position = grip;
            character.velocity = velocity;
            character.facing = facing;
            character.on_platform = None;
            character.previous_position = grip;
            character.previous_velocity = velocity;
            character.previous_facing = facing;
        }
    }
}

fn integrate_particles(world: &mut World, mesh: &dyn Mesh, acc: &Accumulators, stats: &mut TickStats) {
    for (id, particle) in &mut world.particles {
        let accum = acc.particles.get(id).copied().unwrap_or_default();
        let accum = if accum.is_finite() {
            accum
        } else {
            log::error!("Discarding non-finite particle corrections: {:?}", accum);
            stats.corrupted += 1;
            ParticleAccum::default()
        };

        let mut position = particle.position + accum.position;
        let velocity = particle.velocity + accum.velocity;
        if utils::is_finite(&position) && utils::is_finite(&velocity) {
            let moved = position.x != particle.position.x || position.y != particle.position.y;
            if moved && mesh.tile_flags_at(position.x, position.y).intersects(TileFlags::BLOCKS_PARTICLES) {
                position = particle.position;
                stats.wall_rollbacks += 1;
            }
            particle.position = position;
            particle.velocity = velocity;
        } else {
            log::error!("Particle has non-finite state, leaving it untouched");
            stats.corrupted += 1;
        }
        particle.previous_position = particle.position;
    }
}

/// Undo the part of a move that ends inside a blocking tile, sliding along
/// the wall when one horizontal axis alone is clear. Returns `true` when
/// anything was rolled back.
pub fn roll_back_walls(mesh: &dyn Mesh, blocks: TileFlags, from: &Vec3, to: &mut Vec3, velocity: &mut Vec3) -> bool {
    let blocked = |x: f32, y: f32| mesh.tile_flags_at(x, y).intersects(blocks);
    let moved = to.x != from.x || to.y != from.y;
    if !moved || !blocked(to.x, to.y) {
        return false;
    }

    if !blocked(to.x, from.y) {
        to.y = from.y;
        velocity.y = 0.0;
    } else if !blocked(from.x, to.y) {
        to.x = from.x;
        velocity.x = 0.0;
    } else {
        to.x = from.x;
        to.y = from.y;
        velocity.x = 0.0;
        velocity.y = 0.0;
    }
    true
}
