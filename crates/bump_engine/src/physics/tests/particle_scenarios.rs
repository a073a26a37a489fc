//! Particle impacts through the whole pipeline

use super::{arena, body, system};
use crate::foundation::math::Vec3;
use crate::world::{
    Alerts, Capabilities, CharacterId, DamageType, DeflectPolicy, Particle, ParticleFlags, TeamId, World,
};

fn knight(world: &mut World) -> CharacterId {
    world.spawn_character(body("knight", Vec3::new(400.0, 400.0, 0.0)).with_team(TeamId(2)))
}

/// A bolt that was clear of the knight last tick and overlaps it now
fn bolt(owner: Option<CharacterId>, flags: ParticleFlags) -> Particle {
    let mut bolt = Particle::new(Vec3::new(425.0, 400.0, 30.0), Vec3::new(-10.0, 0.0, 0.0), 4.0, 4.0)
        .with_previous_position(Vec3::new(470.0, 400.0, 30.0))
        .with_damage(10.0, DamageType::Fire)
        .with_flags(flags);
    bolt.owner = owner;
    bolt.team = TeamId(1);
    bolt
}

#[test]
fn test_hit_without_push_still_damages() {
    let mut world = World::new();
    let target = knight(&mut world);
    world.spawn_particle(bolt(None, ParticleFlags::empty()));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.particle_hits, 1);
    let knight = &world.characters[target];
    assert_eq!(knight.velocity, Vec3::zeros());
    assert_eq!(knight.life, 90.0);
    assert!(knight.notifications.alerts.contains(Alerts::ATTACKED | Alerts::HIT));
}

#[test]
fn test_damage_cooldown_spans_ticks() {
    let mut world = World::new();
    let target = knight(&mut world);
    let mut physics = system();
    let mesh = arena();

    world.spawn_particle(bolt(None, ParticleFlags::END_ON_HIT));
    physics.resolve_tick(&mut world, &mesh);
    assert_eq!(world.characters[target].life, 90.0);
    assert_eq!(world.reap_particles(), 1);

    world.spawn_particle(bolt(None, ParticleFlags::END_ON_HIT));
    let stats = physics.resolve_tick(&mut world, &mesh);
    assert_eq!(stats.particle_hits, 1);
    assert_eq!(world.characters[target].life, 90.0);
}

#[test]
fn test_lingering_particle_hits_once() {
    let mut world = World::new();
    let target = knight(&mut world);
    let mut physics = system();
    let mesh = arena();
    world.spawn_particle(bolt(None, ParticleFlags::empty()));

    physics.resolve_tick(&mut world, &mesh);
    // Let the cooldown run out while the particle stays put inside the knight
    for _ in 0..20 {
        physics.resolve_tick(&mut world, &mesh);
    }

    assert_eq!(world.characters[target].life, 90.0);
}

#[test]
fn test_knockback_pushes_along_flight() {
    let mut world = World::new();
    let target = knight(&mut world);
    world.spawn_particle(bolt(None, ParticleFlags::ALLOW_PUSH));

    system().resolve_tick(&mut world, &arena());

    let velocity = world.characters[target].velocity;
    assert!(velocity.x < 0.0);
    assert_eq!(velocity.y, 0.0);
}

#[test]
fn test_reflected_particle_changes_sides() {
    let mut world = World::new();
    let target = world.spawn_character(
        body("paladin", Vec3::new(400.0, 400.0, 0.0))
            .with_team(TeamId(2))
            .with_deflect(DeflectPolicy::Reflect, 4.0, 10.0),
    );
    let particle = world.spawn_particle(bolt(None, ParticleFlags::DEFLECTABLE));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.deflections, 1);
    let paladin = &world.characters[target];
    assert_eq!(paladin.life, 100.0);
    assert_eq!(paladin.mana, 6.0);
    assert!(paladin.notifications.alerts.contains(Alerts::BLOCKED));

    let particle = &world.particles[particle];
    assert_eq!(particle.owner, Some(target));
    assert_eq!(particle.team, TeamId(2));
    assert!(particle.velocity.x > 0.0);
}

#[test]
fn test_owner_not_hit_by_own_particle() {
    let mut world = World::new();
    let target = knight(&mut world);
    world.characters[target].team = TeamId(1);
    world.spawn_particle(bolt(Some(target), ParticleFlags::FRIENDLY_FIRE));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.particle_hits, 0);
    assert_eq!(world.characters[target].life, 100.0);
}

#[test]
fn test_money_is_collected_once() {
    let mut world = World::new();
    let greedy = world.spawn_character(
        body("greedy", Vec3::new(400.0, 400.0, 0.0)).with_capabilities(Capabilities::CAN_GRAB_MONEY),
    );
    world.spawn_particle(bolt(None, ParticleFlags::empty()).with_money(50));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.money_pickups, 1);
    assert_eq!(world.characters[greedy].money, 50);
    assert_eq!(world.characters[greedy].life, 100.0);
    assert_eq!(world.reap_particles(), 1);
}

fn lives(world: &World, a: CharacterId, b: CharacterId) -> [f32; 2] {
    let mut lives = [world.characters[a].life, world.characters[b].life];
    lives.sort_by(f32::total_cmp);
    lives
}

#[test]
fn test_end_on_hit_strikes_one_of_two_overlapping_targets() {
    let mut world = World::new();
    let a = knight(&mut world);
    let b = world.spawn_character(body("squire", Vec3::new(450.0, 400.0, 0.0)).with_team(TeamId(2)));
    world.spawn_particle(bolt(None, ParticleFlags::END_ON_HIT));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.particle_hits, 1);
    assert_eq!(stats.terminated_particles, 1);
    assert_eq!(lives(&world, a, b), [90.0, 100.0]);
}

#[test]
fn test_pass_through_count_limits_hits_within_a_tick() {
    let mut world = World::new();
    let a = knight(&mut world);
    let b = world.spawn_character(body("squire", Vec3::new(450.0, 400.0, 0.0)).with_team(TeamId(2)));
    world.spawn_particle(bolt(None, ParticleFlags::empty()).with_bumps(1));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.particle_hits, 1);
    assert_eq!(lives(&world, a, b), [90.0, 100.0]);
}

#[test]
fn test_pass_through_particle_hits_both_targets() {
    let mut world = World::new();
    let a = knight(&mut world);
    let b = world.spawn_character(body("squire", Vec3::new(450.0, 400.0, 0.0)).with_team(TeamId(2)));
    world.spawn_particle(bolt(None, ParticleFlags::empty()).with_bumps(2));

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.particle_hits, 2);
    assert_eq!(lives(&world, a, b), [90.0, 90.0]);
}

#[test]
fn test_one_mana_payment_deflects_one_particle() {
    let mut world = World::new();
    let target = world.spawn_character(
        body("paladin", Vec3::new(400.0, 400.0, 0.0))
            .with_team(TeamId(2))
            .with_deflect(DeflectPolicy::Deflect, 5.0, 5.0),
    );
    world.spawn_particle(bolt(None, ParticleFlags::DEFLECTABLE));
    let mut second = bolt(None, ParticleFlags::DEFLECTABLE);
    second.position.y += 4.0;
    second.previous_position.y += 4.0;
    world.spawn_particle(second);

    let stats = system().resolve_tick(&mut world, &arena());

    assert_eq!(stats.deflections, 1);
    assert_eq!(stats.particle_hits, 1);
    let paladin = &world.characters[target];
    assert_eq!(paladin.mana, 0.0);
    assert_eq!(paladin.life, 90.0);
}
