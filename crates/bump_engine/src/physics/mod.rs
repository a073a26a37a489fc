//! Physics module for collision detection and contact resolution
//!
//! Provides the octagonal bounding volume, candidate pair discovery over the
//! bump grid, overlap classification and the resolvers for solid contacts,
//! platforms, mounts and particle impacts.

pub mod accumulator;
pub mod classify;
pub mod collision_system;
pub mod contact;
pub mod coupling;
pub mod hit_filter;
pub mod integrate;
pub mod octagon;
pub mod pairs;
pub mod projectile;
pub mod stats;

#[cfg(test)]
mod tests;

pub use accumulator::{Accumulators, CharacterAccum, Effect, ParticleAccum};
pub use classify::{Interaction, ParticleTouch, SolidContact};
pub use collision_system::{CollisionSystem, TickContext};
pub use coupling::PlatformContact;
pub use hit_filter::HitFilter;
pub use octagon::{AxisDepths, OctAxis, Octagon};
pub use pairs::{PairKey, PairPool, PairRecord};
pub use stats::TickStats;
