//! Projectile hit filtering
//!
//! Decides whether a particle may affect a character at all, from ownership,
//! team hostility and the particle's friendly-fire policy. Filtering happens
//! before any damage, deflection or knockback is computed.

use crate::world::{Character, CharacterId, Particle, ParticleFlags, TeamTable};

/// Stateless team and ownership rules for particle hits
pub struct HitFilter;

impl HitFilter {
    /// Can `particle` hit `target`?
    ///
    /// # Rules
    /// * A particle never hits its owner unless it carries `HITS_OWNER`.
    /// * `ONLY_DAMAGE_FRIENDS` particles (healing, buffs) only hit their own team.
    /// * Otherwise the particle's team must hate the target's team, or the
    ///   particle must allow `FRIENDLY_FIRE`.
    ///
    /// # Example
    /// ```
    /// use bump_engine::foundation::math::Vec3;
    /// use bump_engine::physics::{octagon::Octagon, HitFilter};
    /// use bump_engine::world::{Character, Particle, TeamId, TeamTable};
    ///
    /// let teams = TeamTable::new();
    /// let target = Character::new("orc", Vec3::zeros(), Octagon::regular(20.0, 60.0)).with_team(TeamId(2));
    /// let mut arrow = Particle::new(Vec3::zeros(), Vec3::zeros(), 4.0, 4.0);
    /// arrow.team = TeamId(1);
    ///
    /// assert!(HitFilter::can_hit(&teams, &arrow, None, &target));
    /// ```
    pub fn can_hit(teams: &TeamTable, particle: &Particle, target_id: Option<CharacterId>, target: &Character) -> bool {
        if target_id.is_some()
            && particle.owner == target_id
            && !particle.flags.contains(ParticleFlags::HITS_OWNER)
        {
            return false;
        }

        if particle.flags.contains(ParticleFlags::ONLY_DAMAGE_FRIENDS) {
            return particle.team == target.team;
        }

        teams.hates(particle.team, target.team) || particle.flags.contains(ParticleFlags::FRIENDLY_FIRE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::octagon::Octagon;
    use crate::world::{TeamId, World};

    fn character(team: TeamId) -> Character {
        Character::new("target", Vec3::zeros(), Octagon::regular(20.0, 60.0)).with_team(team)
    }

    fn particle(team: TeamId, flags: ParticleFlags) -> Particle {
        let mut particle = Particle::new(Vec3::zeros(), Vec3::zeros(), 4.0, 4.0).with_flags(flags);
        particle.team = team;
        particle
    }

    #[test]
    fn test_hostile_teams_hit() {
        let teams = TeamTable::new();
        assert!(HitFilter::can_hit(&teams, &particle(TeamId(1), ParticleFlags::empty()), None, &character(TeamId(2))));
    }

    #[test]
    fn test_same_team_needs_friendly_fire() {
        let teams = TeamTable::new();
        let target = character(TeamId(1));

        assert!(!HitFilter::can_hit(&teams, &particle(TeamId(1), ParticleFlags::empty()), None, &target));
        assert!(HitFilter::can_hit(&teams, &particle(TeamId(1), ParticleFlags::FRIENDLY_FIRE), None, &target));
    }

    #[test]
    fn test_only_damage_friends() {
        let teams = TeamTable::new();
        let heal = particle(TeamId(1), ParticleFlags::ONLY_DAMAGE_FRIENDS);

        assert!(HitFilter::can_hit(&teams, &heal, None, &character(TeamId(1))));
        assert!(!HitFilter::can_hit(&teams, &heal, None, &character(TeamId(2))));
    }

    #[test]
    fn test_owner_is_spared_unless_hits_owner() {
        let mut world = World::new();
        let owner = world.spawn_character(character(TeamId(1)));
        let teams = TeamTable::new();

        let mut bolt = particle(TeamId(1), ParticleFlags::FRIENDLY_FIRE);
        bolt.owner = Some(owner);
        assert!(!HitFilter::can_hit(&teams, &bolt, Some(owner), &world.characters[owner]));

        bolt.flags |= ParticleFlags::HITS_OWNER;
        assert!(HitFilter::can_hit(&teams, &bolt, Some(owner), &world.characters[owner]));
    }
}
