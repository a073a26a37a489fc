//! # Bump Engine
//!
//! Per-tick collision detection and contact resolution for a crowded 3D
//! world of characters, mounts, platforms and particles.
//!
//! ## Features
//!
//! - **Bump grid**: uniform spatial buckets rebuilt every tick
//! - **Pair discovery**: each unordered pair found once, with a fixed capacity
//! - **Octagonal bounds**: five-axis overlap tests with per-axis depths
//! - **Contact resolution**: impulse for fresh contacts, pressure for overlaps
//! - **Platforms and mounts**: soft welding to moving platforms, grip attachment
//! - **Particle impacts**: team filtering, deflection, damage and knockback
//!
//! ## Quick Start
//!
//! ```rust
//! use bump_engine::prelude::*;
//!
//! let mut world = World::new();
//! world.spawn_character(Character::new("knight", Vec3::new(100.0, 100.0, 0.0), Octagon::regular(32.0, 60.0)));
//! world.spawn_character(Character::new("troll", Vec3::new(120.0, 100.0, 0.0), Octagon::regular(32.0, 60.0)));
//!
//! let mesh = TileMesh::flat(8, 8, 128.0);
//! let mut physics = CollisionSystem::new(PhysicsConfig::default())?;
//! let stats = physics.resolve_tick(&mut world, &mesh);
//! assert_eq!(stats.pressure_contacts, 1);
//! # Ok::<(), ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod world;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::PhysicsConfig,
        foundation::math::{Vec2, Vec3},
        physics::{CollisionSystem, Octagon, TickStats},
        world::{
            Capabilities, Character, CharacterId, Mesh, Particle, ParticleFlags, ParticleId, TeamId, TileMesh,
            Weight, World,
        },
    };
}
