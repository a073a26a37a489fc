//! Particles: projectiles, melee swings, spells and money
//!
//! A particle carries a simple radius footprint instead of a full octagon,
//! an owner, a hit policy and a lifecycle state. The collision core never
//! frees particles; it flags them for the pool to reap.

use bitflags::bitflags;

use crate::foundation::math::Vec3;
use crate::physics::octagon::Octagon;
use crate::spatial::CellId;
use crate::world::damage::DamageType;
use crate::world::team::TeamId;
use crate::world::CharacterId;

bitflags! {
    /// Hit policy and behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParticleFlags: u16 {
        /// May damage characters its team does not hate
        const FRIENDLY_FIRE = 1 << 0;
        /// Only damages characters on its own team (healing, buffs)
        const ONLY_DAMAGE_FRIENDS = 1 << 1;
        /// May hit its own owner
        const HITS_OWNER = 1 << 2;
        /// Pushes what it hits
        const ALLOW_PUSH = 1 << 3;
        /// Terminates after its first hit
        const END_ON_HIT = 1 << 4;
        /// Damage scales with the owner's intelligence
        const INT_DAMAGE_BONUS = 1 << 5;
        /// Damage scales with the owner's wisdom
        const WIS_DAMAGE_BONUS = 1 << 6;
        /// Bounces off what it hits, returning recoil to its wielder
        const REBOUNDS = 1 << 7;
        /// Can be deflected or reflected
        const DEFLECTABLE = 1 << 8;
    }
}

/// Lifecycle of a particle as seen by the collision core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleState {
    /// Simulated and collidable
    #[default]
    Active,
    /// Asked to be removed; the pool reaps it after the tick
    PendingTermination,
}

/// Side effects applied to a struck character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitEffects {
    /// Ticks to set the target on fire for
    pub ignite_ticks: u32,
    /// Ticks of grog
    pub grog_ticks: u32,
    /// Ticks of daze
    pub daze_ticks: u32,
}

impl HitEffects {
    /// True when there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.ignite_ticks == 0 && self.grog_ticks == 0 && self.daze_ticks == 0
    }
}

/// A simulated particle
#[derive(Debug, Clone)]
pub struct Particle {
    /// Centre position
    pub position: Vec3,
    /// Velocity in world units per tick
    pub velocity: Vec3,
    /// Position at the end of the previous tick
    pub previous_position: Vec3,
    /// Horizontal bump radius
    pub radius: f32,
    /// Vertical extent, centred on the position
    pub height: f32,

    /// Character that spawned this particle
    pub owner: Option<CharacterId>,
    /// Weapon or character this particle is attached to (melee swings)
    pub attached_to: Option<CharacterId>,
    /// Team the particle fights for
    pub team: TeamId,
    /// Policy and behaviour
    pub flags: ParticleFlags,

    /// Base damage dealt on a hit
    pub damage: f32,
    /// Kind of damage
    pub damage_type: DamageType,
    /// Side effects on a hit
    pub effects: HitEffects,
    /// Money granted to whoever picks this particle up
    pub money: u32,
    /// Hits left before the particle ends; `None` is unlimited
    pub bumps_remaining: Option<u32>,
    /// Character hit most recently
    pub last_hit: Option<CharacterId>,

    /// Lifecycle
    pub state: ParticleState,
    /// Bump grid cell from the last indexing pass
    pub cell: Option<CellId>,
}

impl Particle {
    /// Create an active particle
    pub fn new(position: Vec3, velocity: Vec3, radius: f32, height: f32) -> Self {
        Self {
            position,
            velocity,
            previous_position: position,
            radius,
            height,
            owner: None,
            attached_to: None,
            team: TeamId::NEUTRAL,
            flags: ParticleFlags::ALLOW_PUSH,
            damage: 0.0,
            damage_type: DamageType::default(),
            effects: HitEffects::default(),
            money: 0,
            bumps_remaining: None,
            last_hit: None,
            state: ParticleState::Active,
            cell: None,
        }
    }

    /// Set the owner and team
    pub fn with_owner(mut self, owner: CharacterId, team: TeamId) -> Self {
        self.owner = Some(owner);
        self.team = team;
        self
    }

    /// Set damage and type
    pub fn with_damage(mut self, damage: f32, damage_type: DamageType) -> Self {
        self.damage = damage;
        self.damage_type = damage_type;
        self
    }

    /// Replace the flags
    pub fn with_flags(mut self, flags: ParticleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set hit effects
    pub fn with_effects(mut self, effects: HitEffects) -> Self {
        self.effects = effects;
        self
    }

    /// Make this a money pickup
    pub fn with_money(mut self, money: u32) -> Self {
        self.money = money;
        self
    }

    /// Limit the number of hits
    pub fn with_bumps(mut self, bumps: u32) -> Self {
        self.bumps_remaining = Some(bumps);
        self
    }

    /// Attach to a weapon or character
    pub fn attached(mut self, to: CharacterId) -> Self {
        self.attached_to = Some(to);
        self
    }

    /// Set the position held at the end of the previous tick
    pub fn with_previous_position(mut self, previous: Vec3) -> Self {
        self.previous_position = previous;
        self
    }

    /// Still taking part in the simulation
    pub fn is_active(&self) -> bool {
        self.state == ParticleState::Active
    }

    /// Characters this particle may still strike, `None` for unlimited
    pub fn hits_left(&self) -> Option<u32> {
        let limit = self.flags.contains(ParticleFlags::END_ON_HIT).then_some(1);
        match (limit, self.bumps_remaining) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Flag for removal at the next reap
    pub fn terminate(&mut self) {
        self.state = ParticleState::PendingTermination;
    }

    /// Local footprint
    pub fn footprint(&self) -> Octagon {
        Octagon::from_radius(self.radius, self.height)
    }

    /// Footprint at the current position
    pub fn world_bounds(&self) -> Octagon {
        self.footprint().translate(&self.position)
    }

    /// Footprint at the previous position
    pub fn previous_world_bounds(&self) -> Octagon {
        self.footprint().translate(&self.previous_position)
    }

    /// Does this particle pick up rather than hurt?
    pub fn is_money(&self) -> bool {
        self.money > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_defaults() {
        let particle = Particle::new(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros(), 4.0, 8.0);
        assert!(particle.is_active());
        assert!(particle.flags.contains(ParticleFlags::ALLOW_PUSH));
        assert!(!particle.is_money());
        assert_eq!(particle.previous_position, particle.position);
        assert_eq!(particle.world_bounds().min(crate::physics::octagon::OctAxis::Z), -1.0);
    }

    #[test]
    fn test_hits_left() {
        let particle = Particle::new(Vec3::zeros(), Vec3::zeros(), 1.0, 1.0);
        assert_eq!(particle.hits_left(), None);
        assert_eq!(particle.clone().with_bumps(3).hits_left(), Some(3));
        let arrow = particle.with_flags(ParticleFlags::END_ON_HIT);
        assert_eq!(arrow.hits_left(), Some(1));
        assert_eq!(arrow.with_bumps(0).hits_left(), Some(0));
    }
}
