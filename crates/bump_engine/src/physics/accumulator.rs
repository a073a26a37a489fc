//! Per-tick accumulators and deferred effects
//!
//! Contact resolution never writes to the world. Every pair adds its
//! position, velocity and facing corrections to per-object accumulators, and
//! every gameplay consequence (damage, money, mounting, termination) is queued
//! as an [`Effect`]. The integration step applies both once all pairs have
//! been seen, so the result does not depend on pair order.

use slotmap::SecondaryMap;

use crate::foundation::math::{utils, Vec3};
use crate::world::{CharacterId, HitEffects, ParticleId, World};

/// Corrections gathered for one character this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterAccum {
    /// Position correction
    pub position: Vec3,
    /// Velocity correction
    pub velocity: Vec3,
    /// Facing correction in radians
    pub facing: f32,
    /// Platform this character ends the tick resting on
    pub platform: Option<CharacterId>,
    /// Weight of riders resting on this character
    pub riders_weight: f32,
    /// Mana committed to deflections this tick
    pub mana_spent: f32,
}

impl Default for CharacterAccum {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            facing: 0.0,
            platform: None,
            riders_weight: 0.0,
            mana_spent: 0.0,
        }
    }
}

impl CharacterAccum {
    /// No corrupted component anywhere
    pub fn is_finite(&self) -> bool {
        utils::is_finite(&self.position) && utils::is_finite(&self.velocity) && self.facing.is_finite()
    }
}

/// Corrections gathered for one particle this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleAccum {
    /// Position correction
    pub position: Vec3,
    /// Velocity correction
    pub velocity: Vec3,
    /// Characters struck this tick
    pub hits: u32,
}

impl Default for ParticleAccum {
    fn default() -> Self {
        Self { position: Vec3::zeros(), velocity: Vec3::zeros(), hits: 0 }
    }
}

impl ParticleAccum {
    /// No corrupted component anywhere
    pub fn is_finite(&self) -> bool {
        utils::is_finite(&self.position) && utils::is_finite(&self.velocity)
    }
}

/// A gameplay consequence applied during integration
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `target` was bumped by `by`
    Bump {
        /// Who gets the notification
        target: CharacterId,
        /// Who bumped them
        by: CharacterId,
    },
    /// Hit points lost to a particle
    Damage {
        /// Victim
        target: CharacterId,
        /// Final damage after bonuses and vulnerability
        amount: f32,
        /// Owner of the particle
        attacker: Option<CharacterId>,
    },
    /// Status effects from a particle
    HitEffects {
        /// Victim
        target: CharacterId,
        /// What to apply
        effects: HitEffects,
    },
    /// A particle struck `target`, whether or not damage landed
    Struck {
        /// Victim
        target: CharacterId,
        /// The particle
        particle: ParticleId,
        /// Owner of the particle
        attacker: Option<CharacterId>,
    },
    /// `target` turned a particle away
    Deflected {
        /// The blocker
        target: CharacterId,
        /// The particle
        particle: ParticleId,
        /// Mana spent
        cost: f32,
        /// Ownership passes to the blocker
        reflect: bool,
    },
    /// `target` picked up a money particle
    Money {
        /// Who gets the money
        target: CharacterId,
        /// The pickup
        particle: ParticleId,
    },
    /// `rider` climbs onto `mount`
    Mount {
        /// The rider
        rider: CharacterId,
        /// The mount
        mount: CharacterId,
    },
}

/// Everything resolution produced this tick
#[derive(Debug, Default)]
pub struct Accumulators {
    /// Character corrections
    pub characters: SecondaryMap<CharacterId, CharacterAccum>,
    /// Particle corrections
    pub particles: SecondaryMap<ParticleId, ParticleAccum>,
    /// Deferred effects in resolution order
    pub effects: Vec<Effect>,
}

impl Accumulators {
    /// Create empty accumulators
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every accumulator, keeping the storage
    pub fn reset(&mut self, world: &World) {
        self.characters.clear();
        self.particles.clear();
        self.effects.clear();
        for id in world.characters.keys() {
            self.characters.insert(id, CharacterAccum::default());
        }
        for id in world.particles.keys() {
            self.particles.insert(id, ParticleAccum::default());
        }
    }

    /// Accumulator for a character; `None` for a handle that was not live at reset
    pub fn character(&mut self, id: CharacterId) -> Option<&mut CharacterAccum> {
        self.characters.get_mut(id)
    }

    /// Accumulator for a particle
    pub fn particle(&mut self, id: ParticleId) -> Option<&mut ParticleAccum> {
        self.particles.get_mut(id)
    }

    /// Add a velocity correction to a character
    pub fn push_velocity(&mut self, id: CharacterId, delta: Vec3) {
        if let Some(accum) = self.characters.get_mut(id) {
            accum.velocity += delta;
        }
    }

    /// Add a position correction to a character
    pub fn push_position(&mut self, id: CharacterId, delta: Vec3) {
        if let Some(accum) = self.characters.get_mut(id) {
            accum.position += delta;
        }
    }

    /// Add a velocity correction to a particle
    pub fn push_particle_velocity(&mut self, id: ParticleId, delta: Vec3) {
        if let Some(accum) = self.particles.get_mut(id) {
            accum.velocity += delta;
        }
    }

    /// Hits a particle has already made this tick
    pub fn particle_hits(&self, id: ParticleId) -> u32 {
        self.particles.get(id).map_or(0, |accum| accum.hits)
    }

    /// Count one more hit for a particle
    pub fn record_hit(&mut self, id: ParticleId) {
        if let Some(accum) = self.particles.get_mut(id) {
            accum.hits += 1;
        }
    }

    /// Mana a character has committed this tick
    pub fn mana_spent(&self, id: CharacterId) -> f32 {
        self.characters.get(id).map_or(0.0, |accum| accum.mana_spent)
    }

    /// Commit mana for a deflection
    pub fn spend_mana(&mut self, id: CharacterId, cost: f32) {
        if let Some(accum) = self.characters.get_mut(id) {
            accum.mana_spent += cost;
        }
    }

    /// Queue an effect
    pub fn defer(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::octagon::Octagon;
    use crate::world::Character;

    #[test]
    fn test_reset_zeroes_previous_tick() {
        let mut world = World::new();
        let id = world.spawn_character(Character::new("a", Vec3::zeros(), Octagon::regular(10.0, 10.0)));

        let mut acc = Accumulators::new();
        acc.reset(&world);
        acc.push_velocity(id, Vec3::new(1.0, 0.0, 0.0));
        acc.defer(Effect::Bump { target: id, by: id });

        acc.reset(&world);
        assert_eq!(acc.characters[id], CharacterAccum::default());
        assert!(acc.effects.is_empty());
    }

    #[test]
    fn test_corrections_sum() {
        let mut world = World::new();
        let id = world.spawn_character(Character::new("a", Vec3::zeros(), Octagon::regular(10.0, 10.0)));

        let mut acc = Accumulators::new();
        acc.reset(&world);
        acc.push_position(id, Vec3::new(1.0, 0.0, 0.0));
        acc.push_position(id, Vec3::new(0.0, 2.0, 0.0));

        assert_eq!(acc.characters[id].position, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_nan_is_not_finite() {
        let accum = CharacterAccum { facing: f32::NAN, ..CharacterAccum::default() };
        assert!(!accum.is_finite());
    }

    #[test]
    fn test_hit_and_mana_budgets_accumulate() {
        let mut world = World::new();
        let id = world.spawn_character(Character::new("a", Vec3::zeros(), Octagon::regular(10.0, 10.0)));
        let bolt = world.spawn_particle(crate::world::Particle::new(Vec3::zeros(), Vec3::zeros(), 2.0, 2.0));

        let mut acc = Accumulators::new();
        acc.reset(&world);
        acc.record_hit(bolt);
        acc.record_hit(bolt);
        acc.spend_mana(id, 3.0);
        acc.spend_mana(id, 2.0);

        assert_eq!(acc.particle_hits(bolt), 2);
        assert_eq!(acc.mana_spent(id), 5.0);
        acc.reset(&world);
        assert_eq!(acc.particle_hits(bolt), 0);
    }

    #[test]
    fn test_unknown_handle_ignored() {
        let mut world = World::new();
        let id = world.spawn_character(Character::new("a", Vec3::zeros(), Octagon::regular(10.0, 10.0)));
        let mut acc = Accumulators::new();
        acc.reset(&World::new());

        acc.push_velocity(id, Vec3::new(1.0, 0.0, 0.0));
        assert!(acc.character(id).is_none());
    }
}
