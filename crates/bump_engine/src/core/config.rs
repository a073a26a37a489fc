//! # Physics Configuration
//!
//! Every tunable constant the collision pipeline reads, grouped by the stage
//! that consumes it. All velocities are in world units per tick; the engine
//! runs on a fixed timestep and never sees wall-clock time.
//!
//! ## Configuration Categories
//!
//! - **Grid**: bump grid cell size
//! - **Capacity**: hard per-tick limit on candidate pairs
//! - **Contact**: restitution, pressure, friction and normal weighting
//! - **Platform**: rider attachment tolerance and blending
//! - **Mount**: grip tolerances and dismount grace period
//! - **Projectile**: damage cooldown, stat bonuses and recoil

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};

/// Bump grid settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of one square bucket, in world units
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cell_size: 512.0 }
    }
}

/// Fixed-capacity limits for the tick-scoped pair pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Maximum number of candidate pair records accepted per tick
    pub max_pairs: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self { max_pairs: 8192 }
    }
}

/// Solid-solid contact resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Restitution used for fresh contacts (0 = inelastic, 1 = elastic)
    pub restitution: f32,
    /// Fraction of the dominant penetration depth removed per tick under sustained overlap
    pub pressure_strength: f32,
    /// Coulomb friction coefficient applied to the tangential velocity
    pub friction: f32,
    /// Base exponent for the `1 / depth^exponent` normal weighting
    pub normal_exponent: f32,
    /// Added to the exponent for each rider-onto-platform relationship in the pair
    pub platform_exponent_step: f32,
    /// Speeds and lengths below this are treated as zero
    pub epsilon: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            restitution: 0.5,
            pressure_strength: 0.25,
            friction: 0.5,
            normal_exponent: 1.0,
            platform_exponent_step: 2.0,
            epsilon: 1.0e-4,
        }
    }
}

/// Platform riding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Height above a platform's top surface within which a rider attaches
    pub tolerance: f32,
    /// Relative vertical speed at which the velocity blend drops to one half
    pub velocity_blend_scale: f32,
    /// Fraction of the platform's horizontal velocity difference passed to a fully attached rider
    pub carry: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            tolerance: 50.0,
            velocity_blend_scale: 10.0,
            carry: 0.5,
        }
    }
}

/// Mounting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Maximum horizontal distance between rider and grip point
    pub horizontal_tolerance: f32,
    /// Maximum height of the rider above the grip point
    pub vertical_tolerance: f32,
    /// Ticks after a dismount during which friction is skipped and the same mount is refused
    pub dismount_grace_ticks: u32,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            horizontal_tolerance: 20.0,
            vertical_tolerance: 30.0,
            dismount_grace_ticks: 25,
        }
    }
}

/// Projectile impacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Ticks a character is immune to further damage after taking a hit
    pub damage_cooldown_ticks: u32,
    /// Owner stat value that yields no damage bonus
    pub stat_bonus_base: f32,
    /// Damage multiplier gained per stat point above the base
    pub stat_bonus_scale: f32,
    /// Kinetic energy attributed to each point of damage
    pub energy_per_damage: f32,
    /// Share of the recoil returned to the wielder of a rebounding melee particle
    pub owner_recoil_fraction: f32,
    /// Damage multiplier against a vulnerable damage type
    pub vulnerability_multiplier: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            damage_cooldown_ticks: 15,
            stat_bonus_base: 14.0,
            stat_bonus_scale: 0.05,
            energy_per_damage: 3.0,
            owner_recoil_fraction: 0.5,
            vulnerability_multiplier: 2.0,
        }
    }
}

/// # Complete Physics Configuration
///
/// Top-level configuration handed to [`crate::physics::CollisionSystem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Default log filter for drivers that initialise logging
    pub log_level: String,
    /// Measure and report the wall-clock duration of each tick
    pub enable_profiling: bool,
    /// Bump grid
    pub grid: GridConfig,
    /// Pair pool limits
    pub capacity: CapacityConfig,
    /// Solid contact resolution
    pub contact: ContactConfig,
    /// Platform riding
    pub platform: PlatformConfig,
    /// Mounting
    pub mount: MountConfig,
    /// Projectile impacts
    pub projectile: ProjectileConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_profiling: false,
            grid: GridConfig::default(),
            capacity: CapacityConfig::default(),
            contact: ContactConfig::default(),
            platform: PlatformConfig::default(),
            mount: MountConfig::default(),
            projectile: ProjectileConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable profiling
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.enable_profiling = enabled;
        self
    }

    /// Set the bump grid cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.grid.cell_size = cell_size;
        self
    }

    /// Set the per-tick pair capacity
    pub fn with_max_pairs(mut self, max_pairs: usize) -> Self {
        self.capacity.max_pairs = max_pairs;
        self
    }

    /// Set the restitution used for fresh contacts
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.contact.restitution = restitution;
        self
    }

    /// Set the friction coefficient
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.contact.friction = friction;
        self
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

impl Config for PhysicsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            return Err(invalid("grid.cell_size", format!("must be positive, got {}", self.grid.cell_size)));
        }
        if self.capacity.max_pairs == 0 {
            return Err(invalid("capacity.max_pairs", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.contact.restitution) {
            return Err(invalid("contact.restitution", format!("must be in [0, 1], got {}", self.contact.restitution)));
        }
        if !(self.contact.pressure_strength > 0.0 && self.contact.pressure_strength <= 1.0) {
            return Err(invalid(
                "contact.pressure_strength",
                format!("must be in (0, 1], got {}", self.contact.pressure_strength),
            ));
        }
        if self.contact.friction < 0.0 {
            return Err(invalid("contact.friction", "must not be negative"));
        }
        if self.contact.epsilon <= 0.0 {
            return Err(invalid("contact.epsilon", "must be positive"));
        }
        if self.platform.tolerance <= 0.0 || self.platform.velocity_blend_scale <= 0.0 {
            return Err(invalid("platform", "tolerance and velocity_blend_scale must be positive"));
        }
        if !(0.0..=1.0).contains(&self.platform.carry) {
            return Err(invalid("platform.carry", "must be in [0, 1]"));
        }
        if self.mount.horizontal_tolerance < 0.0 || self.mount.vertical_tolerance < 0.0 {
            return Err(invalid("mount", "tolerances must not be negative"));
        }
        if self.projectile.energy_per_damage < 0.0 || self.projectile.vulnerability_multiplier < 0.0 {
            return Err(invalid("projectile", "energy_per_damage and vulnerability_multiplier must not be negative"));
        }
        Ok(())
    }
}
