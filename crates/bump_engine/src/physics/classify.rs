//! Overlap classification
//!
//! Every candidate pair is sorted into exactly one kind of interaction before
//! anything is resolved. The checks run cheapest first: stale handles and
//! exclusions, then the interaction-strength guard, then mounting and
//! platform riding, and only then the five-axis overlap test.

use crate::core::config::PhysicsConfig;
use crate::physics::coupling::{self, PlatformContact};
use crate::physics::octagon::AxisDepths;
use crate::physics::pairs::PairKey;
use crate::world::{CharacterId, ParticleId, World};

/// Two characters overlapping as solids
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidContact {
    /// First character
    pub a: CharacterId,
    /// Second character
    pub b: CharacterId,
    /// Current overlap on each axis
    pub depths: AxisDepths,
    /// The pair already overlapped at last tick's positions
    pub was_touching: bool,
    /// Rider-onto-platform relationships in the pair (0 to 2)
    pub platform_relations: u8,
}

/// A particle overlapping a character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTouch {
    /// The character
    pub character: CharacterId,
    /// The particle
    pub particle: ParticleId,
    /// Current overlap on each axis
    pub depths: AxisDepths,
    /// The pair was apart at last tick's positions
    pub fresh: bool,
}

/// What a candidate pair turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Attached to each other, carried, or otherwise out of play
    Excluded,
    /// A member has no interaction strength
    NoStrength,
    /// The five-axis test found a separating axis
    Separate,
    /// A rider grabs a mount's grip
    Mount {
        /// The rider
        rider: CharacterId,
        /// The mount
        mount: CharacterId,
    },
    /// A rider rests on a platform
    Platform(PlatformContact),
    /// Two solids overlap
    Solid(SolidContact),
    /// A particle overlaps a character
    Particle(ParticleTouch),
}

/// Classify a pair; `None` when either handle no longer names a live object
pub fn classify(world: &World, config: &PhysicsConfig, key: PairKey) -> Option<Interaction> {
    match key {
        PairKey::Characters(a, b) => classify_characters(world, config, a, b),
        PairKey::CharacterParticle(c, p) => classify_particle(world, c, p),
    }
}

fn classify_characters(world: &World, config: &PhysicsConfig, a_id: CharacterId, b_id: CharacterId) -> Option<Interaction> {
    let a = world.character(a_id)?;
    let b = world.character(b_id)?;

    let attached_together = a.attached_to == Some(b_id)
        || b.attached_to == Some(a_id)
        || (a.attached_to.is_some() && a.attached_to == b.attached_to);
    if a_id == b_id || !a.is_indexable() || !b.is_indexable() || attached_together {
        return Some(Interaction::Excluded);
    }

    if !a.has_interaction_strength() || !b.has_interaction_strength() {
        return Some(Interaction::NoStrength);
    }

    if let Some((rider, mount)) = coupling::mount_between(world, &config.mount, a_id, a, b_id, b) {
        return Some(Interaction::Mount { rider, mount });
    }

    if let Some(contact) = coupling::platform_between(&config.platform, a_id, a, b_id, b) {
        return Some(Interaction::Platform(contact));
    }

    let depths = AxisDepths::between(&a.world_bounds(), &b.world_bounds());
    if !depths.all_positive() {
        return Some(Interaction::Separate);
    }
    let was_touching = AxisDepths::between(&a.previous_world_bounds(), &b.previous_world_bounds()).all_positive();

    let platform_relations =
        u8::from(a.can_use_platforms() && b.is_platform()) + u8::from(b.can_use_platforms() && a.is_platform());

    Some(Interaction::Solid(SolidContact { a: a_id, b: b_id, depths, was_touching, platform_relations }))
}

fn classify_particle(world: &World, character_id: CharacterId, particle_id: ParticleId) -> Option<Interaction> {
    let character = world.character(character_id)?;
    let particle = world.particle(particle_id)?;

    // A weapon's swing never touches the weapon or whoever holds it
    let wielded_by_character = particle
        .attached_to
        .and_then(|weapon| world.character(weapon))
        .is_some_and(|weapon| weapon.attached_to == Some(character_id));
    if !particle.is_active()
        || !character.alive
        || !character.is_indexable()
        || particle.attached_to == Some(character_id)
        || wielded_by_character
    {
        return Some(Interaction::Excluded);
    }

    if !character.has_interaction_strength() || particle.radius <= 0.0 {
        return Some(Interaction::NoStrength);
    }

    let depths = AxisDepths::between(&character.world_bounds(), &particle.world_bounds());
    if !depths.all_positive() {
        return Some(Interaction::Separate);
    }
    let fresh = !AxisDepths::between(&character.previous_world_bounds(), &particle.previous_world_bounds()).all_positive();

    Some(Interaction::Particle(ParticleTouch { character: character_id, particle: particle_id, depths, fresh }))
}
