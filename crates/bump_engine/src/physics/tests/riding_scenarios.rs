//! Platforms and mounts

use super::{arena, body, system};
use crate::foundation::math::Vec3;
use crate::physics::Octagon;
use crate::world::{Alerts, AnimationState, Capabilities, Character, CharacterId, World};
use approx::assert_relative_eq;

fn lift(world: &mut World, velocity: Vec3) -> CharacterId {
    world.spawn_character(
        Character::new("lift", Vec3::new(600.0, 600.0, 0.0), Octagon::regular(60.0, 40.0))
            .with_capabilities(Capabilities::PLATFORM)
            .with_velocity(velocity),
    )
}

fn passenger(position: Vec3, velocity: Vec3) -> Character {
    Character::new("passenger", position, Octagon::regular(12.0, 50.0))
        .with_capabilities(Capabilities::CAN_USE_PLATFORMS)
        .with_velocity(velocity)
}

#[test]
fn test_rider_velocity_converges_to_platform() {
    let mut world = World::new();
    let platform = lift(&mut world, Vec3::new(1.0, 0.0, 2.0));
    let rider = world.spawn_character(passenger(Vec3::new(600.0, 600.0, 40.0), Vec3::new(0.0, 0.0, -3.0)));
    let mut physics = system();
    let mesh = arena();

    let mut gap = f32::INFINITY;
    for _ in 0..30 {
        let stats = physics.resolve_tick(&mut world, &mesh);
        assert_eq!(stats.platform_contacts, 1);

        let now = (world.characters[rider].velocity.z - 2.0).abs();
        assert!(now <= gap);
        gap = now;
    }

    let rider_state = &world.characters[rider];
    assert_relative_eq!(rider_state.velocity.z, 2.0, epsilon = 1e-3);
    assert_relative_eq!(rider_state.velocity.x, 1.0, epsilon = 1e-3);
    assert_eq!(rider_state.on_platform, Some(platform));
    assert!(world.characters[platform].holding_weight > 0.0);
    // The platform is not dragged by its rider
    assert_eq!(world.characters[platform].velocity, Vec3::new(1.0, 0.0, 2.0));
}

#[test]
fn test_rider_settles_onto_surface() {
    let mut world = World::new();
    let platform = lift(&mut world, Vec3::zeros());
    let rider = world.spawn_character(passenger(Vec3::new(610.0, 600.0, 45.0), Vec3::zeros()));
    let mut physics = system();
    let mesh = arena();

    for _ in 0..40 {
        physics.resolve_tick(&mut world, &mesh);
    }

    let top = world.characters[platform].top();
    assert_relative_eq!(world.characters[rider].position.z, top, epsilon = 1e-2);
}

#[test]
fn test_rider_beside_platform_is_a_solid_contact() {
    let mut world = World::new();
    lift(&mut world, Vec3::zeros());
    world.spawn_character(passenger(Vec3::new(665.0, 600.0, 0.0), Vec3::zeros()));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.platform_contacts, 0);
    assert_eq!(stats.pressure_contacts, 1);
}

fn horse(world: &mut World) -> CharacterId {
    world.spawn_character(
        Character::new("horse", Vec3::new(800.0, 800.0, 0.0), Octagon::regular(30.0, 40.0))
            .with_capabilities(Capabilities::MOUNT)
            .with_grip_offset(Vec3::new(0.0, 0.0, 40.0)),
    )
}

fn jumper(position: Vec3) -> Character {
    body("jumper", position)
        .with_velocity(Vec3::new(0.0, 0.0, -3.0))
        .with_animation(AnimationState { can_mount: true, ..AnimationState::default() })
}

#[test]
fn test_falling_rider_mounts() {
    let mut world = World::new();
    let mount = horse(&mut world);
    let rider = world.spawn_character(jumper(Vec3::new(805.0, 800.0, 50.0)));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.mount_attempts, 1);
    assert_eq!(world.characters[rider].attached_to, Some(mount));
    assert_eq!(world.characters[rider].position, Vec3::new(800.0, 800.0, 40.0));
    assert_eq!(world.characters[mount].grip.held, Some(rider));
    assert!(world.characters[rider].notifications.alerts.contains(Alerts::MOUNTED));
    assert!(world.characters[mount].notifications.alerts.contains(Alerts::GRABBED));
}

#[test]
fn test_dismount_grace_blocks_remount() {
    let mut world = World::new();
    let mount = horse(&mut world);
    let rider = world.spawn_character(jumper(Vec3::new(805.0, 800.0, 50.0)));
    let mut physics = system();
    let mesh = arena();

    physics.resolve_tick(&mut world, &mesh);
    assert_eq!(physics.dismount(&mut world, rider), Ok(mount));
    assert_eq!(world.characters[rider].dismount_timer, physics.config().mount.dismount_grace_ticks);

    world.characters[rider].velocity = Vec3::new(0.0, 0.0, -3.0);
    let stats = physics.resolve_tick(&mut world, &mesh);

    assert_eq!(stats.mount_attempts, 0);
    assert_eq!(world.characters[rider].attached_to, None);
    assert_eq!(world.characters[mount].grip.held, None);
}

#[test]
fn test_mounted_rider_travels_with_mount() {
    let mut world = World::new();
    let mount = horse(&mut world);
    let rider = world.spawn_character(jumper(Vec3::new(805.0, 800.0, 50.0)));
    let mut physics = system();
    let mesh = arena();
    physics.resolve_tick(&mut world, &mesh);

    // External movement between ticks
    world.characters[mount].position += Vec3::new(16.0, 0.0, 0.0);
    physics.resolve_tick(&mut world, &mesh);

    assert_eq!(world.characters[rider].position, Vec3::new(816.0, 800.0, 40.0));
}
