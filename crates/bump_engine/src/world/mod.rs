//! Simulation world: object pools for characters and particles
//!
//! The collision core reads and writes physical state on these records but
//! never creates or frees them during a tick; spawning and reaping belong to
//! the caller.

pub mod character;
pub mod damage;
pub mod mesh;
pub mod particle;
pub mod team;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

pub use character::{
    Alerts, AnimationState, Attributes, Capabilities, Character, DeflectPolicy, Grip, Notifications, Weight,
};
pub use damage::{DamageProfile, DamageType, DamageTypes};
pub use mesh::{Mesh, TileFlags, TileMesh};
pub use particle::{HitEffects, Particle, ParticleFlags, ParticleState};
pub use team::{TeamId, TeamTable};

new_key_type! {
    /// Generational handle to a character; stale handles fail lookup
    pub struct CharacterId;

    /// Generational handle to a particle; stale handles fail lookup
    pub struct ParticleId;
}

/// Errors from explicit world operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The handle does not name a live character
    #[error("unknown character {0:?}")]
    UnknownCharacter(CharacterId),

    /// The target cannot be ridden
    #[error("character {0:?} is not a mount")]
    NotAMount(CharacterId),

    /// The mount's grip already holds someone
    #[error("mount {0:?} already has a rider")]
    GripOccupied(CharacterId),

    /// The rider cannot climb on right now
    #[error("character {0:?} cannot mount: {1}")]
    RiderNotEligible(CharacterId, &'static str),

    /// The character is not attached to anything
    #[error("character {0:?} is not attached")]
    NotAttached(CharacterId),
}

/// Object pools and the team table
#[derive(Debug, Default)]
pub struct World {
    /// All characters
    pub characters: SlotMap<CharacterId, Character>,
    /// All particles
    pub particles: SlotMap<ParticleId, Particle>,
    /// Team relationships
    pub teams: TeamTable,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character
    pub fn spawn_character(&mut self, character: Character) -> CharacterId {
        self.characters.insert(character)
    }

    /// Add a particle
    pub fn spawn_particle(&mut self, particle: Particle) -> ParticleId {
        self.particles.insert(particle)
    }

    /// Look up a character
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    /// Look up a character mutably
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    /// Look up a particle
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    /// Look up a particle mutably
    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    /// Remove a character, releasing any grip it held or occupied
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        let removed = self.characters.remove(id)?;
        if let Some(mount) = removed.attached_to.and_then(|m| self.characters.get_mut(m)) {
            if mount.grip.held == Some(id) {
                mount.grip.held = None;
            }
        }
        if let Some(rider) = removed.grip.held.and_then(|r| self.characters.get_mut(r)) {
            rider.attached_to = None;
        }
        Some(removed)
    }

    /// Check whether `rider` may climb onto `mount` right now
    pub fn check_mount(&self, rider_id: CharacterId, mount_id: CharacterId) -> Result<(), WorldError> {
        let rider = self.character(rider_id).ok_or(WorldError::UnknownCharacter(rider_id))?;
        let mount = self.character(mount_id).ok_or(WorldError::UnknownCharacter(mount_id))?;

        if rider_id == mount_id {
            return Err(WorldError::RiderNotEligible(rider_id, "cannot ride itself"));
        }
        if rider.attached_to.is_some() {
            return Err(WorldError::RiderNotEligible(rider_id, "already attached"));
        }
        if !rider.alive {
            return Err(WorldError::RiderNotEligible(rider_id, "dead"));
        }
        if rider.flying {
            return Err(WorldError::RiderNotEligible(rider_id, "flying"));
        }
        if !rider.animation.can_mount {
            return Err(WorldError::RiderNotEligible(rider_id, "no mount animation"));
        }
        if rider.dismount_timer > 0 && rider.dismounted_from == Some(mount_id) {
            return Err(WorldError::RiderNotEligible(rider_id, "just dismounted"));
        }
        if !mount.alive || !mount.is_mount() {
            return Err(WorldError::NotAMount(mount_id));
        }
        if mount.grip.held.is_some() {
            return Err(WorldError::GripOccupied(mount_id));
        }
        Ok(())
    }

    /// Attach `rider` to `mount`'s grip
    pub fn mount(&mut self, rider_id: CharacterId, mount_id: CharacterId) -> Result<(), WorldError> {
        self.check_mount(rider_id, mount_id)?;

        let (grip, mount_velocity) = {
            let mount = self.characters.get_mut(mount_id).ok_or(WorldError::UnknownCharacter(mount_id))?;
            mount.grip.held = Some(rider_id);
            mount.notifications.alerts |= Alerts::GRABBED;
            mount.notifications.grabbed_by = Some(rider_id);
            (mount.grip_position(), mount.velocity)
        };

        let rider = self.characters.get_mut(rider_id).ok_or(WorldError::UnknownCharacter(rider_id))?;
        rider.attached_to = Some(mount_id);
        rider.position = grip;
        rider.velocity = mount_velocity;
        rider.on_platform = None;
        rider.notifications.alerts |= Alerts::MOUNTED;

        log::debug!("{} mounted {:?}", rider.name, mount_id);
        Ok(())
    }

    /// Detach `rider` from whatever it rides and start the dismount grace period
    pub fn dismount(&mut self, rider_id: CharacterId, grace_ticks: u32) -> Result<CharacterId, WorldError> {
        let rider = self.characters.get_mut(rider_id).ok_or(WorldError::UnknownCharacter(rider_id))?;
        let mount_id = rider.attached_to.take().ok_or(WorldError::NotAttached(rider_id))?;
        rider.dismount_timer = grace_ticks;
        rider.dismounted_from = Some(mount_id);

        if let Some(mount) = self.characters.get_mut(mount_id) {
            if mount.grip.held == Some(rider_id) {
                mount.grip.held = None;
            }
        }
        Ok(mount_id)
    }

    /// Remove every particle flagged for termination, returning how many went
    pub fn reap_particles(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|_, particle| particle.is_active());
        before - self.particles.len()
    }
}
