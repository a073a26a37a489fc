//! Solid contact resolution
//!
//! Two overlapping characters are pushed apart in one of two ways:
//!
//! - **Impulse** for a fresh contact with approaching velocities. The
//!   relative normal velocity is reversed with restitution and split between
//!   the pair by weight, followed by Coulomb friction on the tangent.
//! - **Pressure** for an overlap that was already there last tick (or a fresh
//!   one that is not closing). A fraction of the shallowest penetration is
//!   removed by moving the positions; velocities are left alone.
//!
//! Nothing here touches the world; results go into the tick accumulators.

use crate::core::config::ContactConfig;
use crate::foundation::math::{utils, Vec3};
use crate::physics::accumulator::{Accumulators, Effect};
use crate::physics::classify::SolidContact;
use crate::physics::octagon::{AxisDepths, OctAxis, Octagon};
use crate::physics::stats::TickStats;
use crate::world::{Character, World};

/// Contact normal pointing from `a` toward `b`.
///
/// Each overlapping axis contributes its direction (signed by which side `b`
/// is on) weighted by `1 / depth^exponent`, so the shallowest axis dominates.
/// With no usable axis the horizontal centre offset is used, then `+X`.
pub fn contact_normal(a: &Octagon, b: &Octagon, depths: &AxisDepths, exponent: f32, epsilon: f32) -> Vec3 {
    let mut normal = Vec3::zeros();
    for axis in OctAxis::ALL {
        let depth = depths.depth(axis);
        if depth <= 0.0 {
            continue;
        }
        let offset = b.center(axis) - a.center(axis);
        if offset.abs() <= epsilon {
            continue;
        }
        normal += axis.direction() * (offset.signum() / depth.powf(exponent));
    }

    if let Some(unit) = normal.try_normalize(epsilon) {
        return unit;
    }

    let horizontal = Vec3::new(
        b.center(OctAxis::X) - a.center(OctAxis::X),
        b.center(OctAxis::Y) - a.center(OctAxis::Y),
        0.0,
    );
    horizontal.try_normalize(epsilon).unwrap_or_else(|| Vec3::new(1.0, 0.0, 0.0))
}

/// Coulomb friction opposing the tangential velocity left after `impulse`.
///
/// The reduction is bounded by both `friction * |impulse|` and the tangential
/// speed itself, so it can stop a slide but never reverse it.
pub fn friction(character: &Character, impulse: &Vec3, normal: &Vec3, config: &ContactConfig) -> Vec3 {
    if character.dismount_timer > 0 {
        return Vec3::zeros();
    }

    let tangent = utils::reject(&(character.velocity + impulse), normal);
    let speed = tangent.norm();
    if speed < config.epsilon {
        return Vec3::zeros();
    }

    let reduction = (config.friction * impulse.norm()).min(speed);
    -tangent * (reduction / speed)
}

/// Position correction for `b` (apply the negated share to `a`) under sustained overlap
pub fn pressure(a: &Octagon, b: &Octagon, depths: &AxisDepths, normal: &Vec3, config: &ContactConfig) -> Vec3 {
    let Some((axis, depth)) = depths.shallowest() else {
        return Vec3::zeros();
    };

    let offset = b.center(axis) - a.center(axis);
    let direction = if offset.abs() > config.epsilon {
        axis.direction() * offset.signum()
    } else {
        *normal
    };
    direction * (depth * config.pressure_strength)
}

/// Resolve one solid contact into the accumulators
pub fn resolve(
    world: &World,
    config: &ContactConfig,
    contact: &SolidContact,
    acc: &mut Accumulators,
    stats: &mut TickStats,
) {
    let (Some(a), Some(b)) = (world.character(contact.a), world.character(contact.b)) else {
        stats.stale_pairs += 1;
        return;
    };

    let bounds_a = a.world_bounds();
    let bounds_b = b.world_bounds();
    let exponent = config.normal_exponent + config.platform_exponent_step * f32::from(contact.platform_relations);
    let normal = contact_normal(&bounds_a, &bounds_b, &contact.depths, exponent, config.epsilon);

    let share_a = a.effective_weight().share_against(b.effective_weight());
    let share_b = b.effective_weight().share_against(a.effective_weight());

    let closing = (b.velocity - a.velocity).dot(&normal);
    let fresh = !contact.was_touching;

    if share_a + share_b > 0.0 {
        if fresh && closing < -config.epsilon {
            let magnitude = (1.0 + config.restitution) * -closing;
            let impulse_a = -normal * (magnitude * share_a);
            let impulse_b = normal * (magnitude * share_b);

            let friction_a = friction(a, &impulse_a, &normal, config);
            let friction_b = friction(b, &impulse_b, &normal, config);
            acc.push_velocity(contact.a, impulse_a + friction_a);
            acc.push_velocity(contact.b, impulse_b + friction_b);
            stats.impulses += 1;
        } else {
            let push = pressure(&bounds_a, &bounds_b, &contact.depths, &normal, config);
            acc.push_position(contact.a, -push * share_a);
            acc.push_position(contact.b, push * share_b);
            stats.pressure_contacts += 1;
        }
    }

    // A sustained contact only counts as a new bump when the pair reverses direction
    let previous_closing = (b.previous_velocity - a.previous_velocity).dot(&normal);
    if fresh || previous_closing * closing < 0.0 {
        acc.defer(Effect::Bump { target: contact.a, by: contact.b });
        acc.defer(Effect::Bump { target: contact.b, by: contact.a });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::classify::{classify, Interaction};
    use crate::physics::pairs::PairKey;
    use crate::core::config::PhysicsConfig;
    use crate::world::{CharacterId, Weight};
    use approx::assert_relative_eq;

    fn body(name: &str, position: Vec3, previous: Vec3, velocity: Vec3) -> Character {
        Character::new(name, position, Octagon::regular(32.0, 60.0))
            .with_previous_position(previous)
            .with_velocity(velocity)
    }

    fn solve(world: &World, a: CharacterId, b: CharacterId) -> (Accumulators, TickStats) {
        let config = PhysicsConfig::default();
        let mut acc = Accumulators::new();
        acc.reset(world);
        let mut stats = TickStats::default();
        match classify(world, &config, PairKey::characters(a, b)) {
            Some(Interaction::Solid(contact)) => resolve(world, &config.contact, &contact, &mut acc, &mut stats),
            other => panic!("expected a solid contact, got {:?}", other),
        }
        (acc, stats)
    }

    #[test]
    fn test_normal_of_side_by_side_pair_is_horizontal() {
        let a = Octagon::regular(32.0, 60.0).translate(&Vec3::new(100.0, 100.0, 0.0));
        let b = Octagon::regular(32.0, 60.0).translate(&Vec3::new(110.0, 100.0, 0.0));
        let depths = AxisDepths::between(&a, &b);

        let normal = contact_normal(&a, &b, &depths, 1.0, 1e-4);
        assert_relative_eq!(normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_normal_falls_back_when_centred() {
        let a = Octagon::regular(32.0, 60.0).translate(&Vec3::new(100.0, 100.0, 0.0));
        let depths = AxisDepths::between(&a, &a);

        assert_eq!(contact_normal(&a, &a, &depths, 1.0, 1e-4), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_fresh_head_on_contact_splits_evenly() {
        let mut world = World::new();
        let a = world.spawn_character(body("a", Vec3::new(100.0, 100.0, 0.0), Vec3::new(20.0, 100.0, 0.0), Vec3::new(2.0, 0.0, 0.0)));
        let b = world.spawn_character(body("b", Vec3::new(110.0, 100.0, 0.0), Vec3::new(190.0, 100.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)));

        let (acc, stats) = solve(&world, a, b);

        assert_eq!(stats.impulses, 1);
        // closing speed 4, restitution 0.5: total change 6, half each
        assert_relative_eq!(acc.characters[a].velocity, Vec3::new(-3.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(acc.characters[b].velocity, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(acc.effects.len(), 2);
    }

    #[test]
    fn test_impulse_split_inverse_to_weight() {
        let mut world = World::new();
        let heavy = world.spawn_character(
            body("heavy", Vec3::new(100.0, 100.0, 0.0), Vec3::new(20.0, 100.0, 0.0), Vec3::new(2.0, 0.0, 0.0))
                .with_weight(Weight::Finite(300.0)),
        );
        let light = world.spawn_character(
            body("light", Vec3::new(110.0, 100.0, 0.0), Vec3::new(190.0, 100.0, 0.0), Vec3::new(-2.0, 0.0, 0.0))
                .with_weight(Weight::Finite(100.0)),
        );

        let (acc, _) = solve(&world, heavy, light);

        let dv_heavy = acc.characters[heavy].velocity.norm();
        let dv_light = acc.characters[light].velocity.norm();
        assert_relative_eq!(dv_light / dv_heavy, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_immovable_side_takes_nothing() {
        let mut world = World::new();
        let wall = world.spawn_character(
            body("statue", Vec3::new(100.0, 100.0, 0.0), Vec3::new(100.0, 100.0, 0.0), Vec3::zeros()).with_bump_dampen(0.0),
        );
        let runner = world.spawn_character(body(
            "runner",
            Vec3::new(150.0, 100.0, 0.0),
            Vec3::new(190.0, 100.0, 0.0),
            Vec3::new(-4.0, 0.0, 0.0),
        ));

        let (acc, _) = solve(&world, wall, runner);

        assert_eq!(acc.characters[wall].velocity, Vec3::zeros());
        assert_relative_eq!(acc.characters[runner].velocity.x, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sustained_overlap_uses_pressure_only() {
        let mut world = World::new();
        let a = world.spawn_character(body("a", Vec3::new(100.0, 100.0, 0.0), Vec3::new(100.0, 100.0, 0.0), Vec3::zeros()));
        let b = world.spawn_character(body("b", Vec3::new(110.0, 100.0, 0.0), Vec3::new(110.0, 100.0, 0.0), Vec3::zeros()));

        let (acc, stats) = solve(&world, a, b);

        assert_eq!(stats.pressure_contacts, 1);
        assert_eq!(acc.characters[a].velocity, Vec3::zeros());
        assert_eq!(acc.characters[b].velocity, Vec3::zeros());
        // Shallowest axis is X at depth 54; a quarter of it split evenly
        assert_relative_eq!(acc.characters[a].position, Vec3::new(-6.75, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(acc.characters[b].position, Vec3::new(6.75, 0.0, 0.0), epsilon = 1e-4);
        assert!(acc.effects.is_empty());
    }

    #[test]
    fn test_friction_never_reverses_slide() {
        let config = ContactConfig { friction: 10.0, ..ContactConfig::default() };
        let slider = Character::new("slider", Vec3::zeros(), Octagon::regular(10.0, 10.0)).with_velocity(Vec3::new(0.0, 1.0, 0.0));
        let normal = Vec3::new(1.0, 0.0, 0.0);
        let impulse = Vec3::new(-5.0, 0.0, 0.0);

        let applied = friction(&slider, &impulse, &normal, &config);
        assert_relative_eq!(applied, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_friction_skipped_in_dismount_grace() {
        let config = ContactConfig::default();
        let mut slider = Character::new("slider", Vec3::zeros(), Octagon::regular(10.0, 10.0)).with_velocity(Vec3::new(0.0, 1.0, 0.0));
        slider.dismount_timer = 3;

        let applied = friction(&slider, &Vec3::new(-5.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0), &config);
        assert_eq!(applied, Vec3::zeros());
    }

    #[test]
    fn test_friction_ignores_negligible_tangent() {
        let config = ContactConfig::default();
        let slider = Character::new("slider", Vec3::zeros(), Octagon::regular(10.0, 10.0)).with_velocity(Vec3::new(0.0, 1.0e-6, 0.0));

        let applied = friction(&slider, &Vec3::new(-5.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0), &config);
        assert_eq!(applied, Vec3::zeros());
    }
}
