//! Characters: everything with an octagonal bound that can bump, ride or be ridden
//!
//! Characters, mounts, platforms and items share one record; what a character
//! can do is described by [`Capabilities`] rather than by its type.

use bitflags::bitflags;

use crate::foundation::math::Vec3;
use crate::physics::octagon::Octagon;
use crate::spatial::CellId;
use crate::world::damage::DamageProfile;
use crate::world::team::TeamId;
use crate::world::CharacterId;

bitflags! {
    /// Static capabilities read from the character's profile
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        /// Other characters can stand on top of this one
        const PLATFORM = 1 << 0;
        /// This character can stand on platforms
        const CAN_USE_PLATFORMS = 1 << 1;
        /// This character can be ridden
        const MOUNT = 1 << 2;
        /// This is an item (weapon, armour, pickup)
        const ITEM = 1 << 3;
        /// This character picks up money particles
        const CAN_GRAB_MONEY = 1 << 4;
    }
}

bitflags! {
    /// Notifications written by the collision core for the scripting layer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Alerts: u16 {
        /// Bumped into another character
        const BUMPED = 1 << 0;
        /// Struck by a particle
        const HIT = 1 << 1;
        /// Took damage from a particle
        const ATTACKED = 1 << 2;
        /// A rider just climbed onto this mount
        const GRABBED = 1 << 3;
        /// Just climbed onto a mount
        const MOUNTED = 1 << 4;
        /// A particle was deflected or reflected
        const BLOCKED = 1 << 5;
        /// Picked up money
        const GOT_MONEY = 1 << 6;
    }
}

/// Mass used by the contact resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weight {
    /// Ordinary mass
    Finite(f32),
    /// Immovable; takes none of any impulse
    Infinite,
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Finite(100.0)
    }
}

impl Weight {
    /// Finite value, if any
    pub fn finite(self) -> Option<f32> {
        match self {
            Weight::Finite(w) => Some(w),
            Weight::Infinite => None,
        }
    }

    /// Share of an impulse taken by the side with weight `self` against `other`.
    ///
    /// Each side takes the other side's weight fraction. An infinite side
    /// takes nothing (two infinite sides never move) and two zero weights
    /// split evenly.
    pub fn share_against(self, other: Weight) -> f32 {
        match (self, other) {
            (Weight::Infinite, _) => 0.0,
            (Weight::Finite(_), Weight::Infinite) => 1.0,
            (Weight::Finite(own), Weight::Finite(theirs)) => {
                let own = own.max(0.0);
                let theirs = theirs.max(0.0);
                let total = own + theirs;
                if total > 0.0 {
                    theirs / total
                } else {
                    0.5
                }
            }
        }
    }
}

/// Per-frame animation facts supplied by the animation system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    /// The current frame blocks incoming hits and their side effects
    pub invictus: bool,
    /// The character has a mount animation and can play it now
    pub can_mount: bool,
}

/// Left-hand grip slot of a mount
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Grip {
    /// Animated grip bone position relative to the character's position
    pub offset: Vec3,
    /// Whoever currently occupies the grip
    pub held: Option<CharacterId>,
}

/// Stats that scale particle damage dealt by this character
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attributes {
    /// Boosts damage of particles flagged with an intelligence bonus
    pub intelligence: f32,
    /// Boosts damage of particles flagged with a wisdom bonus
    pub wisdom: f32,
}

/// How a character responds to incoming deflectable particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeflectPolicy {
    /// Always take the hit
    #[default]
    None,
    /// Bounce the particle away
    Deflect,
    /// Bounce the particle away and take ownership of it
    Reflect,
}

/// Scripting-facing notifications, reset by the consumer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Notifications {
    /// Alerts raised this tick
    pub alerts: Alerts,
    /// Last character this one bumped into
    pub last_bumped_by: Option<CharacterId>,
    /// Owner of the last particle that hit this character
    pub last_hit_by: Option<CharacterId>,
    /// Rider that last climbed onto this mount
    pub grabbed_by: Option<CharacterId>,
}

/// A simulated character
#[derive(Debug, Clone)]
pub struct Character {
    /// Display name for diagnostics
    pub name: String,
    /// Feet position
    pub position: Vec3,
    /// Velocity in world units per tick
    pub velocity: Vec3,
    /// Position at the end of the previous tick
    pub previous_position: Vec3,
    /// Velocity at the end of the previous tick
    pub previous_velocity: Vec3,
    /// Heading in radians
    pub facing: f32,
    /// Heading at the end of the previous tick
    pub previous_facing: f32,

    /// Local bounding extent
    pub bounds: Octagon,
    /// Interaction strength; zero means the character never bumps
    pub bump_strength: f32,
    /// Mass
    pub weight: Weight,
    /// Bounciness; zero makes the character immovable in contacts
    pub bump_dampen: f32,
    /// Profile capabilities
    pub capabilities: Capabilities,
    /// Team membership
    pub team: TeamId,

    /// Still alive
    pub alive: bool,
    /// Hidden from the world
    pub hidden: bool,
    /// Stored in someone's inventory
    pub in_pack: bool,
    /// Currently airborne by choice (levitating, flying)
    pub flying: bool,

    /// Mount or wielder this character is attached to
    pub attached_to: Option<CharacterId>,
    /// Grip slot used when this character is a mount
    pub grip: Grip,
    /// Platform this character rested on during the last tick
    pub on_platform: Option<CharacterId>,
    /// Total weight of riders resting on this platform during the last tick
    pub holding_weight: f32,
    /// Bump grid cell from the last indexing pass
    pub cell: Option<CellId>,

    /// Animation facts for this frame
    pub animation: AnimationState,
    /// Damage-scaling stats
    pub attributes: Attributes,
    /// Damage vulnerabilities and immunities
    pub defense: DamageProfile,
    /// Response to deflectable particles
    pub deflect: DeflectPolicy,
    /// Mana spent per deflected particle
    pub deflect_cost: f32,

    /// Hit points
    pub life: f32,
    /// Mana points
    pub mana: f32,
    /// Money carried
    pub money: u32,

    /// Ticks of remaining damage immunity
    pub damage_timer: u32,
    /// Ticks remaining in the dismount grace period
    pub dismount_timer: u32,
    /// Mount left most recently
    pub dismounted_from: Option<CharacterId>,
    /// Ticks left burning
    pub on_fire_ticks: u32,
    /// Ticks left grogged
    pub grog_ticks: u32,
    /// Ticks left dazed
    pub daze_ticks: u32,

    /// Notifications for the scripting layer
    pub notifications: Notifications,
}

impl Character {
    /// Create a character at rest
    pub fn new(name: impl Into<String>, position: Vec3, bounds: Octagon) -> Self {
        Self {
            name: name.into(),
            position,
            velocity: Vec3::zeros(),
            previous_position: position,
            previous_velocity: Vec3::zeros(),
            facing: 0.0,
            previous_facing: 0.0,
            bounds,
            bump_strength: 1.0,
            weight: Weight::default(),
            bump_dampen: 1.0,
            capabilities: Capabilities::empty(),
            team: TeamId::NEUTRAL,
            alive: true,
            hidden: false,
            in_pack: false,
            flying: false,
            attached_to: None,
            grip: Grip::default(),
            on_platform: None,
            holding_weight: 0.0,
            cell: None,
            animation: AnimationState::default(),
            attributes: Attributes::default(),
            defense: DamageProfile::default(),
            deflect: DeflectPolicy::None,
            deflect_cost: 0.0,
            life: 100.0,
            mana: 0.0,
            money: 0,
            damage_timer: 0,
            dismount_timer: 0,
            dismounted_from: None,
            on_fire_ticks: 0,
            grog_ticks: 0,
            daze_ticks: 0,
            notifications: Notifications::default(),
        }
    }

    /// Set velocity, treating it as the velocity of the previous tick too
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self.previous_velocity = velocity;
        self
    }

    /// Set the position the character held at the end of the previous tick
    pub fn with_previous_position(mut self, previous: Vec3) -> Self {
        self.previous_position = previous;
        self
    }

    /// Set weight
    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    /// Set bump dampen
    pub fn with_bump_dampen(mut self, dampen: f32) -> Self {
        self.bump_dampen = dampen;
        self
    }

    /// Add capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities |= capabilities;
        self
    }

    /// Set team
    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = team;
        self
    }

    /// Set the animated grip bone offset
    pub fn with_grip_offset(mut self, offset: Vec3) -> Self {
        self.grip.offset = offset;
        self
    }

    /// Set the animation state
    pub fn with_animation(mut self, animation: AnimationState) -> Self {
        self.animation = animation;
        self
    }

    /// Set the deflect policy and its mana cost
    pub fn with_deflect(mut self, policy: DeflectPolicy, cost: f32, mana: f32) -> Self {
        self.deflect = policy;
        self.deflect_cost = cost;
        self.mana = mana;
        self
    }

    /// Move instantly, discarding the previous-tick position
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.previous_position = position;
    }

    /// Bounds at the current position
    pub fn world_bounds(&self) -> Octagon {
        self.bounds.translate(&self.position)
    }

    /// Bounds at the previous tick's position
    pub fn previous_world_bounds(&self) -> Octagon {
        self.bounds.translate(&self.previous_position)
    }

    /// Height of the top surface in world space
    pub fn top(&self) -> f32 {
        self.position.z + self.bounds.maxs[2]
    }

    /// Weight the contact resolver uses: zero dampen means immovable
    pub fn effective_weight(&self) -> Weight {
        if self.bump_dampen <= 0.0 {
            Weight::Infinite
        } else {
            self.weight
        }
    }

    /// Horizontal distance from the position within which this character can
    /// touch anything: its bound, or its grip point when it is a mount
    pub fn reach(&self) -> f32 {
        let reach = self.bounds.half_width();
        if self.is_mount() {
            reach.max(self.grip.offset.xy().norm())
        } else {
            reach
        }
    }

    /// Whether this character can take part in bumping at all
    pub fn has_interaction_strength(&self) -> bool {
        self.bump_strength > 0.0 && !self.bounds.is_flat()
    }

    /// Carried items and hidden characters take no part in collision
    pub fn is_indexable(&self) -> bool {
        !self.hidden && !self.in_pack && !self.is_held_item()
    }

    /// An item currently held by someone
    pub fn is_held_item(&self) -> bool {
        self.capabilities.contains(Capabilities::ITEM) && self.attached_to.is_some()
    }

    /// Is this character a platform?
    pub fn is_platform(&self) -> bool {
        self.capabilities.contains(Capabilities::PLATFORM)
    }

    /// Can this character stand on platforms?
    pub fn can_use_platforms(&self) -> bool {
        self.capabilities.contains(Capabilities::CAN_USE_PLATFORMS)
    }

    /// Can this character be ridden?
    pub fn is_mount(&self) -> bool {
        self.capabilities.contains(Capabilities::MOUNT)
    }

    /// Grip point in world space
    pub fn grip_position(&self) -> Vec3 {
        self.position + self.grip.offset
    }
}
