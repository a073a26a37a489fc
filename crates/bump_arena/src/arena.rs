//! Arena population and between-tick behaviour
//!
//! Everything here stands in for the game logic that would normally drive the
//! collision engine: wandering, shooting, and the occasional dismount.

use bump_engine::foundation::math::{Vec2, Vec3};
use bump_engine::physics::Octagon;
use bump_engine::world::{
    AnimationState, Capabilities, Character, CharacterId, DamageType, DeflectPolicy, Mesh, Particle,
    ParticleFlags, TeamId, TileFlags, TileMesh, Weight, World,
};
use nalgebra::Rotation2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ScenarioConfig;

const ARCHER_TEAM: TeamId = TeamId(4);
const WALKER_TEAMS: [TeamId; 3] = [TeamId(1), TeamId(2), TeamId(3)];
const WALK_SPEED: f32 = 3.0;
const ARROW_SPEED: f32 = 24.0;
const SPAWN_ATTEMPTS: usize = 1000;

/// Headcount of the arena after a run
#[derive(Debug, Clone, Copy, Default)]
pub struct Census {
    pub alive: usize,
    pub dead: usize,
    pub riding: usize,
    pub money: u32,
    pub particles: usize,
}

/// A populated world and the mesh it lives on
pub struct Arena {
    pub world: World,
    pub mesh: TileMesh,
    rng: StdRng,
    walkers: Vec<CharacterId>,
    archers: Vec<CharacterId>,
    scenario: ScenarioConfig,
}

impl Arena {
    pub fn new(scenario: &ScenarioConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(scenario.seed);
        let mesh = build_mesh(scenario, &mut rng);
        let mut arena = Self {
            world: World::new(),
            mesh,
            rng,
            walkers: Vec::new(),
            archers: Vec::new(),
            scenario: scenario.clone(),
        };

        for i in 0..scenario.platforms {
            let position = arena.open_spot(0.0);
            let drift = arena.random_heading() * 0.5;
            arena.world.spawn_character(
                Character::new(format!("platform-{i}"), position, Octagon::regular(64.0, 32.0))
                    .with_capabilities(Capabilities::PLATFORM)
                    .with_bump_dampen(0.0)
                    .with_velocity(drift),
            );
        }

        for i in 0..scenario.mounts {
            let position = arena.open_spot(0.0);
            arena.world.spawn_character(
                Character::new(format!("horse-{i}"), position, Octagon::regular(28.0, 48.0))
                    .with_capabilities(Capabilities::MOUNT)
                    .with_weight(Weight::Finite(500.0))
                    .with_grip_offset(Vec3::new(0.0, 0.0, 50.0)),
            );
        }

        for i in 0..scenario.walkers {
            let position = arena.open_spot(0.0);
            let velocity = arena.random_heading() * WALK_SPEED;
            let team = WALKER_TEAMS[i % WALKER_TEAMS.len()];
            let mut walker = Character::new(format!("walker-{i}"), position, Octagon::regular(16.0, 56.0))
                .with_capabilities(Capabilities::CAN_USE_PLATFORMS | Capabilities::CAN_GRAB_MONEY)
                .with_team(team)
                .with_velocity(velocity)
                .with_weight(Weight::Finite(arena.rng.gen_range(60.0..140.0)))
                .with_animation(AnimationState { can_mount: true, ..AnimationState::default() });
            if i % 10 == 0 {
                walker = walker.with_deflect(DeflectPolicy::Deflect, 5.0, 50.0);
            } else if i % 25 == 1 {
                walker = walker.with_deflect(DeflectPolicy::Reflect, 10.0, 50.0);
            }
            let id = arena.world.spawn_character(walker);
            arena.walkers.push(id);
        }

        for i in 0..scenario.archers {
            let position = arena.open_spot(0.0);
            let id = arena.world.spawn_character(
                Character::new(format!("archer-{i}"), position, Octagon::regular(16.0, 56.0))
                    .with_team(ARCHER_TEAM)
                    .with_weight(Weight::Finite(90.0)),
            );
            arena.archers.push(id);
        }

        for _ in 0..scenario.coins {
            let position = arena.open_spot(8.0);
            let value = arena.rng.gen_range(1..=25);
            arena.world.spawn_particle(Particle::new(position, Vec3::zeros(), 6.0, 4.0).with_money(value));
        }

        log::info!(
            "Arena ready: {} characters, {} particles on a {}x{} mesh",
            arena.world.characters.len(),
            arena.world.particles.len(),
            scenario.tiles,
            scenario.tiles
        );
        arena
    }

    /// Advance every free character and particle by its own velocity
    pub fn move_everything(&mut self, tick: u64) {
        let gravity = self.scenario.gravity;
        let turn_chance = 0.02;

        for character in self.world.characters.values_mut() {
            if character.attached_to.is_some() {
                continue;
            }
            if !character.alive {
                character.velocity = Vec3::zeros();
                continue;
            }

            let floor = self.mesh.floor_level_at(character.position.x, character.position.y);
            if character.position.z > floor && character.on_platform.is_none() && !character.is_platform() {
                character.velocity.z -= gravity;
            }

            if self.rng.gen_bool(turn_chance) && !character.is_platform() {
                let turned = Rotation2::new(self.rng.gen_range(-1.0f32..1.0)) * character.velocity.xy();
                character.velocity.x = turned.x;
                character.velocity.y = turned.y;
            }

            let next = character.position + character.velocity;
            let blocked = self.mesh.tile_flags_at(next.x, next.y).intersects(TileFlags::BLOCKS_CHARACTERS);
            if blocked {
                character.velocity.x = -character.velocity.x;
                character.velocity.y = -character.velocity.y;
            } else {
                character.position = next;
            }
        }

        for particle in self.world.particles.values_mut() {
            if !particle.is_active() || particle.attached_to.is_some() {
                continue;
            }
            particle.position += particle.velocity;
            if self.mesh.tile_flags_at(particle.position.x, particle.position.y).intersects(TileFlags::BLOCKS_PARTICLES) {
                particle.terminate();
            }
        }

        if tick % 90 == 0 {
            self.jump_walkers();
        }
    }

    /// Each archer looses an arrow at a random walker on its firing tick
    pub fn fire_arrows(&mut self, tick: u64) -> usize {
        let interval = self.scenario.fire_interval.max(1);
        let mut fired = 0;

        for (slot, &archer_id) in self.archers.iter().enumerate() {
            if (tick + slot as u64) % interval != 0 || self.walkers.is_empty() {
                continue;
            }
            let Some(archer) = self.world.character(archer_id).filter(|a| a.alive) else {
                continue;
            };
            let target_id = self.walkers[self.rng.gen_range(0..self.walkers.len())];
            let Some(target) = self.world.character(target_id).filter(|t| t.alive) else {
                continue;
            };

            let aim: Vec2 = target.position.xy() - archer.position.xy();
            let Some(direction) = aim.try_normalize(f32::EPSILON) else {
                continue;
            };
            let muzzle = archer.position.xy() + direction * (archer.reach() + 8.0);
            let launch = Vec3::new(muzzle.x, muzzle.y, archer.position.z + 30.0);
            let velocity = Vec3::new(direction.x, direction.y, 0.0) * ARROW_SPEED;

            let arrow = Particle::new(launch, velocity, 3.0, 3.0)
                .with_previous_position(launch)
                .with_owner(archer_id, archer.team)
                .with_damage(self.rng.gen_range(4.0..12.0), DamageType::Poke)
                .with_flags(ParticleFlags::END_ON_HIT | ParticleFlags::ALLOW_PUSH | ParticleFlags::DEFLECTABLE);
            self.world.spawn_particle(arrow);
            fired += 1;
        }
        fired
    }

    /// Between-tick cleanup: spent particles go, a few riders get off
    pub fn tidy(&mut self, grace_ticks: u32) -> usize {
        let riders: Vec<CharacterId> = self
            .world
            .characters
            .iter()
            .filter(|(_, c)| c.attached_to.is_some())
            .map(|(id, _)| id)
            .collect();
        for rider in riders {
            if self.rng.gen_bool(0.01) {
                match self.world.dismount(rider, grace_ticks) {
                    Ok(mount) => log::debug!("{:?} got off {:?}", rider, mount),
                    Err(error) => log::warn!("Dismount failed: {}", error),
                }
            }
        }
        self.world.reap_particles()
    }

    pub fn census(&self) -> Census {
        let mut census = Census {
            particles: self.world.particles.len(),
            ..Census::default()
        };
        for character in self.world.characters.values() {
            if character.alive {
                census.alive += 1;
            } else {
                census.dead += 1;
            }
            if character.attached_to.is_some() {
                census.riding += 1;
            }
            census.money += character.money;
        }
        census
    }

    /// Some walkers hop so that they can land on platforms and mounts
    fn jump_walkers(&mut self) {
        for &id in &self.walkers {
            if let Some(walker) = self.world.characters.get_mut(id) {
                if walker.alive && walker.attached_to.is_none() && self.rng.gen_bool(0.1) {
                    walker.velocity.z = 6.0;
                }
            }
        }
    }

    fn random_heading(&mut self) -> Vec3 {
        let heading = Rotation2::new(self.rng.gen_range(0.0f32..std::f32::consts::TAU)) * Vec2::x();
        Vec3::new(heading.x, heading.y, 0.0)
    }

    /// A random point on an open tile, `lift` above the floor
    fn open_spot(&mut self, lift: f32) -> Vec3 {
        let extent = self.mesh.extent();
        let margin = self.mesh.tile_size();
        for _ in 0..SPAWN_ATTEMPTS {
            let x = self.rng.gen_range(margin..extent.x - margin);
            let y = self.rng.gen_range(margin..extent.y - margin);
            if self.mesh.tile_flags_at(x, y).is_empty() {
                return Vec3::new(x, y, self.mesh.floor_level_at(x, y) + lift);
            }
        }
        // The centre tile is always left open
        let centre = extent / 2.0;
        Vec3::new(centre.x, centre.y, self.mesh.floor_level_at(centre.x, centre.y) + lift)
    }
}

/// Walled square with a sprinkling of interior walls and raised tiles
fn build_mesh(scenario: &ScenarioConfig, rng: &mut StdRng) -> TileMesh {
    let tiles = scenario.tiles;
    let mut mesh = TileMesh::flat(tiles, tiles, scenario.tile_size).with_border_walls();
    let centre = tiles / 2;
    for tx in 1..tiles - 1 {
        for ty in 1..tiles - 1 {
            if tx == centre && ty == centre {
                continue;
            }
            let roll: f32 = rng.gen();
            if roll < 0.04 {
                mesh.set_flags(tx, ty, TileFlags::WALL);
            } else if roll < 0.08 {
                mesh.set_height(tx, ty, 16.0);
            }
        }
    }
    mesh
}
