//! Particle impacts on characters
//!
//! A particle touching a character goes through, in order: money pickup, the
//! hit filter, deflection, damage and side effects, then knockback and
//! rebound. Damage only lands when the target's cooldown has expired and its
//! current animation frame is not invulnerable; the impact itself (and its
//! knockback) happens regardless.

use crate::core::config::{PhysicsConfig, ProjectileConfig};
use crate::physics::accumulator::{Accumulators, Effect};
use crate::physics::classify::ParticleTouch;
use crate::physics::contact::contact_normal;
use crate::physics::hit_filter::HitFilter;
use crate::physics::stats::TickStats;
use crate::world::{Capabilities, Character, CharacterId, DeflectPolicy, Particle, ParticleFlags, World};

/// Damage multiplier from one owner stat
pub fn stat_bonus(stat: f32, config: &ProjectileConfig) -> f32 {
    (1.0 + (stat - config.stat_bonus_base) * config.stat_bonus_scale).max(0.0)
}

/// Final damage `particle` would deal to `target`
pub fn damage_amount(world: &World, config: &ProjectileConfig, particle: &Particle, target: &Character) -> f32 {
    if particle.damage <= 0.0 {
        return 0.0;
    }

    let mut amount = particle.damage;
    if let Some(owner) = particle.owner.and_then(|id| world.character(id)) {
        if particle.flags.contains(ParticleFlags::INT_DAMAGE_BONUS) {
            amount *= stat_bonus(owner.attributes.intelligence, config);
        }
        if particle.flags.contains(ParticleFlags::WIS_DAMAGE_BONUS) {
            amount *= stat_bonus(owner.attributes.wisdom, config);
        }
    }
    amount * target.defense.multiplier(particle.damage_type, config.vulnerability_multiplier)
}

/// Mass a particle carries into an impact: heavier for more damage, lighter
/// for faster particles
pub fn effective_mass(particle: &Particle, config: &ProjectileConfig) -> f32 {
    let energy = config.energy_per_damage * particle.damage.max(0.0);
    2.0 * energy / (particle.velocity.norm_squared() + 1.0)
}

/// Whoever swings the weapon a particle is attached to
fn wielder(world: &World, particle: &Particle) -> Option<CharacterId> {
    let attached = particle.attached_to?;
    let holder = world.character(attached)?;
    if holder.capabilities.contains(Capabilities::ITEM) {
        holder.attached_to
    } else {
        Some(attached)
    }
}

/// Resolve one particle touch into the accumulators
pub fn resolve(
    world: &World,
    config: &PhysicsConfig,
    touch: &ParticleTouch,
    acc: &mut Accumulators,
    stats: &mut TickStats,
) {
    let (Some(character), Some(particle)) = (world.character(touch.character), world.particle(touch.particle)) else {
        stats.stale_pairs += 1;
        return;
    };

    // Still inside the character it hit last: not a new hit
    if particle.last_hit == Some(touch.character) && !touch.fresh {
        return;
    }

    if particle.is_money() {
        if character.capabilities.contains(Capabilities::CAN_GRAB_MONEY) {
            acc.defer(Effect::Money { target: touch.character, particle: touch.particle });
            stats.money_pickups += 1;
        }
        return;
    }

    if !HitFilter::can_hit(&world.teams, particle, Some(touch.character), character) {
        return;
    }

    let normal = contact_normal(
        &particle.world_bounds(),
        &character.world_bounds(),
        &touch.depths,
        config.contact.normal_exponent,
        config.contact.epsilon,
    );
    let into = particle.velocity.dot(&normal);

    // Mana already committed to other deflections this tick is not available
    let mana = character.mana - acc.mana_spent(touch.character);
    let can_deflect = particle.flags.contains(ParticleFlags::DEFLECTABLE)
        && character.deflect != DeflectPolicy::None
        && mana >= character.deflect_cost;
    if can_deflect {
        acc.spend_mana(touch.character, character.deflect_cost);
        if into > 0.0 {
            acc.push_particle_velocity(touch.particle, -normal * (2.0 * into));
        }
        acc.defer(Effect::Deflected {
            target: touch.character,
            particle: touch.particle,
            cost: character.deflect_cost,
            reflect: character.deflect == DeflectPolicy::Reflect,
        });
        stats.deflections += 1;
        log::debug!("{} deflected a particle", character.name);
        return;
    }

    if particle.hits_left().is_some_and(|left| acc.particle_hits(touch.particle) >= left) {
        return;
    }
    acc.record_hit(touch.particle);

    let projectile = &config.projectile;
    let amount = damage_amount(world, projectile, particle, character);
    let invulnerable = character.animation.invictus;
    if amount > 0.0 && character.damage_timer == 0 && !invulnerable {
        acc.defer(Effect::Damage { target: touch.character, amount, attacker: particle.owner });
    }
    if !invulnerable && !particle.effects.is_empty() {
        acc.defer(Effect::HitEffects { target: touch.character, effects: particle.effects });
    }
    acc.defer(Effect::Struck { target: touch.character, particle: touch.particle, attacker: particle.owner });
    stats.particle_hits += 1;

    let mass = effective_mass(particle, projectile);
    if mass <= 0.0 || particle.velocity.norm_squared() <= config.contact.epsilon * config.contact.epsilon {
        return;
    }
    let momentum = particle.velocity * mass;

    if particle.flags.contains(ParticleFlags::ALLOW_PUSH) {
        if let Some(weight) = character.effective_weight().finite() {
            acc.push_velocity(touch.character, momentum / (mass + weight));
        }
    }

    if particle.flags.contains(ParticleFlags::REBOUNDS) {
        if into > 0.0 {
            acc.push_particle_velocity(touch.particle, -normal * (2.0 * into));
        }
        let recoiling = wielder(world, particle).and_then(|id| Some((id, world.character(id)?.effective_weight().finite()?)));
        if let Some((wielder_id, weight)) = recoiling {
            acc.push_velocity(wielder_id, -momentum / (mass + weight) * projectile.owner_recoil_fraction);
        }
    }
}
