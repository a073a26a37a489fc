//! Whole-tick scenarios run through [`CollisionSystem::resolve_tick`]

mod particle_scenarios;
mod riding_scenarios;

use crate::core::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::{CollisionSystem, Octagon};
use crate::world::{Character, TileMesh};

/// Open 2048 x 2048 arena with a flat floor at zero
fn arena() -> TileMesh {
    TileMesh::flat(16, 16, 128.0)
}

/// A person-sized character at rest
fn body(name: &str, position: Vec3) -> Character {
    Character::new(name, position, Octagon::regular(32.0, 60.0))
}

fn system() -> CollisionSystem {
    CollisionSystem::new(PhysicsConfig::default()).expect("default config is valid")
}
