//! Platform and mount coupling
//!
//! A rider whose feet are over a platform's footprint and close to its top
//! surface is welded to it softly: the vertical gap is closed by a blend
//! factor that grows as the gap shrinks and falls off as the vertical speeds
//! disagree, so a jumping rider is released instead of being dragged along.
//!
//! A rider falling onto a mount's grip point is attached outright; the
//! attachment itself is deferred to integration.

use crate::core::config::{MountConfig, PlatformConfig};
use crate::foundation::math::utils;
use crate::physics::accumulator::{Accumulators, Effect};
use crate::physics::stats::TickStats;
use crate::world::{Character, CharacterId, World};

/// A rider resting on (or settling onto) a platform this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformContact {
    /// The rider
    pub rider: CharacterId,
    /// The platform
    pub platform: CharacterId,
    /// Height of the rider's feet above the platform top; negative when sunk in
    pub gap: f32,
    /// World height of the platform top
    pub top: f32,
}

/// Platform contact between `rider` and `platform`, if the rider qualifies
pub fn platform_contact(
    config: &PlatformConfig,
    rider_id: CharacterId,
    rider: &Character,
    platform_id: CharacterId,
    platform: &Character,
) -> Option<PlatformContact> {
    if !platform.is_platform() || !rider.can_use_platforms() || rider.flying || rider.attached_to.is_some() {
        return None;
    }
    if !platform.world_bounds().contains_xy(&rider.position) {
        return None;
    }

    let top = platform.top();
    let gap = rider.position.z - top;
    if gap.abs() >= config.tolerance {
        return None;
    }

    Some(PlatformContact { rider: rider_id, platform: platform_id, gap, top })
}

/// Platform contact in whichever direction applies; when both do, the higher
/// character is the rider
pub fn platform_between(
    config: &PlatformConfig,
    a_id: CharacterId,
    a: &Character,
    b_id: CharacterId,
    b: &Character,
) -> Option<PlatformContact> {
    match (
        platform_contact(config, a_id, a, b_id, b),
        platform_contact(config, b_id, b, a_id, a),
    ) {
        (Some(a_on_b), Some(b_on_a)) => {
            if a.position.z >= b.position.z {
                Some(a_on_b)
            } else {
                Some(b_on_a)
            }
        }
        (a_on_b, b_on_a) => a_on_b.or(b_on_a),
    }
}

/// Vertical position blend: 1 at the surface, 0 at the tolerance edge
pub fn lerp_z(gap: f32, tolerance: f32) -> f32 {
    if tolerance <= 0.0 {
        return 0.0;
    }
    1.0 - (gap / tolerance).clamp(0.0, 1.0)
}

/// Vertical velocity blend: 1 when rider and platform move together,
/// one half when they differ by `scale`
pub fn vlerp_z(relative_vz: f32, scale: f32) -> f32 {
    if scale <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + relative_vz.abs() / scale)
}

/// Couple every rider to the best platform beneath it.
///
/// A rider touching several platforms at once stands on the one with the
/// highest top surface.
pub fn resolve_platforms(
    world: &World,
    config: &PlatformConfig,
    contacts: &mut Vec<PlatformContact>,
    acc: &mut Accumulators,
    stats: &mut TickStats,
) {
    contacts.sort_by(|a, b| a.rider.cmp(&b.rider).then(b.top.total_cmp(&a.top)));
    contacts.dedup_by_key(|contact| contact.rider);

    for contact in contacts.iter() {
        let (Some(rider), Some(platform)) = (world.character(contact.rider), world.character(contact.platform)) else {
            stats.stale_pairs += 1;
            continue;
        };

        let relative_vz = platform.velocity.z - rider.velocity.z;
        let position_blend = lerp_z(contact.gap, config.tolerance);
        let blend = position_blend * vlerp_z(relative_vz, config.velocity_blend_scale);
        let turn = utils::wrap_angle(platform.facing - platform.previous_facing);

        if let Some(accum) = acc.character(contact.rider) {
            accum.position.z += (contact.top - rider.position.z) * blend;
            accum.velocity.z += relative_vz * blend;
            accum.velocity.x += (platform.velocity.x - rider.velocity.x) * config.carry * position_blend;
            accum.velocity.y += (platform.velocity.y - rider.velocity.y) * config.carry * position_blend;
            accum.facing += turn * blend;
            accum.platform = Some(contact.platform);
        }
        if let Some(accum) = acc.character(contact.platform) {
            accum.riders_weight += rider.weight.finite().unwrap_or(0.0);
        }

        log::trace!(
            "{} rides {} (gap {:.2}, blend {:.3})",
            rider.name,
            platform.name,
            contact.gap,
            blend
        );
        stats.platform_contacts += 1;
    }
}

/// Can `rider` grab `mount`'s grip this tick?
pub fn mount_attempt(
    world: &World,
    config: &MountConfig,
    rider_id: CharacterId,
    rider: &Character,
    mount_id: CharacterId,
    mount: &Character,
) -> bool {
    if !mount.is_mount() || world.check_mount(rider_id, mount_id).is_err() {
        return false;
    }
    if rider.velocity.z - mount.velocity.z >= 0.0 {
        return false;
    }

    let grip = mount.grip_position();
    let vertical = rider.position.z - grip.z;
    let horizontal_squared = utils::horizontal_distance_squared(&rider.position, &grip);
    vertical.abs() <= config.vertical_tolerance
        && horizontal_squared <= config.horizontal_tolerance * config.horizontal_tolerance
}

/// Mount attempt in whichever direction applies
pub fn mount_between(
    world: &World,
    config: &MountConfig,
    a_id: CharacterId,
    a: &Character,
    b_id: CharacterId,
    b: &Character,
) -> Option<(CharacterId, CharacterId)> {
    if mount_attempt(world, config, a_id, a, b_id, b) {
        Some((a_id, b_id))
    } else if mount_attempt(world, config, b_id, b, a_id, a) {
        Some((b_id, a_id))
    } else {
        None
    }
}

/// Queue the attachment of `rider` to `mount`
pub fn queue_mount(rider: CharacterId, mount: CharacterId, acc: &mut Accumulators, stats: &mut TickStats) {
    acc.defer(Effect::Mount { rider, mount });
    stats.mount_attempts += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::octagon::Octagon;
    use crate::world::{AnimationState, Capabilities};
    use approx::assert_relative_eq;

    fn crate_platform(position: Vec3) -> Character {
        Character::new("crate", position, Octagon::regular(40.0, 30.0)).with_capabilities(Capabilities::PLATFORM)
    }

    fn walker(position: Vec3) -> Character {
        Character::new("walker", position, Octagon::regular(10.0, 50.0))
            .with_capabilities(Capabilities::CAN_USE_PLATFORMS)
    }

    #[test]
    fn test_blend_factors() {
        assert_relative_eq!(lerp_z(0.0, 50.0), 1.0);
        assert_relative_eq!(lerp_z(-5.0, 50.0), 1.0);
        assert_relative_eq!(lerp_z(25.0, 50.0), 0.5);
        assert_relative_eq!(lerp_z(80.0, 50.0), 0.0);

        assert_relative_eq!(vlerp_z(0.0, 10.0), 1.0);
        assert_relative_eq!(vlerp_z(-10.0, 10.0), 0.5);
    }

    #[test]
    fn test_platform_contact_needs_feet_over_footprint() {
        let mut world = World::new();
        let platform = world.spawn_character(crate_platform(Vec3::new(100.0, 100.0, 0.0)));
        let on_top = world.spawn_character(walker(Vec3::new(110.0, 100.0, 32.0)));
        let beside = world.spawn_character(walker(Vec3::new(145.0, 100.0, 32.0)));
        let config = PlatformConfig::default();

        let contact = platform_contact(&config, on_top, &world.characters[on_top], platform, &world.characters[platform]);
        assert_relative_eq!(contact.map(|c| c.gap).unwrap_or(f32::NAN), 2.0);
        assert!(
            platform_contact(&config, beside, &world.characters[beside], platform, &world.characters[platform])
                .is_none()
        );
    }

    #[test]
    fn test_highest_platform_wins() {
        let mut world = World::new();
        let low = world.spawn_character(crate_platform(Vec3::new(100.0, 100.0, 0.0)));
        let high = world.spawn_character(crate_platform(Vec3::new(100.0, 100.0, 10.0)));
        let rider = world.spawn_character(walker(Vec3::new(100.0, 100.0, 40.0)));
        let config = PlatformConfig::default();

        let mut contacts: Vec<_> = [low, high]
            .into_iter()
            .filter_map(|p| platform_contact(&config, rider, &world.characters[rider], p, &world.characters[p]))
            .collect();
        assert_eq!(contacts.len(), 2);

        let mut acc = Accumulators::new();
        acc.reset(&world);
        let mut stats = TickStats::default();
        resolve_platforms(&world, &config, &mut contacts, &mut acc, &mut stats);

        assert_eq!(stats.platform_contacts, 1);
        assert_eq!(acc.characters[rider].platform, Some(high));
        assert!(acc.characters[high].riders_weight > 0.0);
        assert_relative_eq!(acc.characters[low].riders_weight, 0.0);
    }

    #[test]
    fn test_rider_velocity_pulled_toward_platform() {
        let mut world = World::new();
        let platform = world.spawn_character(
            crate_platform(Vec3::new(100.0, 100.0, 0.0)).with_velocity(Vec3::new(2.0, 0.0, 5.0)),
        );
        let rider = world.spawn_character(walker(Vec3::new(100.0, 100.0, 30.0)).with_velocity(Vec3::new(0.0, 0.0, -5.0)));
        let config = PlatformConfig::default();

        let mut contacts =
            vec![platform_contact(&config, rider, &world.characters[rider], platform, &world.characters[platform])
                .expect("rider is on the platform")];
        let mut acc = Accumulators::new();
        acc.reset(&world);
        resolve_platforms(&world, &config, &mut contacts, &mut acc, &mut TickStats::default());

        // Feet exactly on top: full position blend, velocity blend of one half
        let accum = acc.characters[rider];
        assert_relative_eq!(accum.velocity.z, 5.0);
        assert_relative_eq!(accum.velocity.x, 1.0);
        assert_relative_eq!(accum.position.z, 0.0);
    }

    #[test]
    fn test_mount_attempt_conditions() {
        let mut world = World::new();
        let horse = world.spawn_character(
            Character::new("horse", Vec3::new(100.0, 100.0, 0.0), Octagon::regular(30.0, 40.0))
                .with_capabilities(Capabilities::MOUNT)
                .with_grip_offset(Vec3::new(0.0, 0.0, 40.0)),
        );
        let rider = world.spawn_character(
            Character::new("rider", Vec3::new(105.0, 100.0, 50.0), Octagon::regular(10.0, 50.0))
                .with_velocity(Vec3::new(0.0, 0.0, -3.0))
                .with_animation(AnimationState { can_mount: true, ..AnimationState::default() }),
        );
        let config = MountConfig::default();

        assert_eq!(
            mount_between(&world, &config, horse, &world.characters[horse], rider, &world.characters[rider]),
            Some((rider, horse))
        );

        // Rising riders do not grab
        world.characters[rider].velocity.z = 1.0;
        assert!(!mount_attempt(&world, &config, rider, &world.characters[rider], horse, &world.characters[horse]));
    }
}
