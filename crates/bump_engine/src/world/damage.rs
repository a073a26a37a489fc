//! Damage types and per-character defenses

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

/// Kind of damage a particle deals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    /// Blades
    #[default]
    Slash,
    /// Blunt weapons and falling rocks
    Crush,
    /// Arrows and spears
    Poke,
    /// Holy magic
    Holy,
    /// Evil magic
    Evil,
    /// Fire
    Fire,
    /// Ice
    Ice,
    /// Lightning
    Zap,
}

bitflags! {
    /// A set of damage types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DamageTypes: u8 {
        /// Slash
        const SLASH = 1 << 0;
        /// Crush
        const CRUSH = 1 << 1;
        /// Poke
        const POKE = 1 << 2;
        /// Holy
        const HOLY = 1 << 3;
        /// Evil
        const EVIL = 1 << 4;
        /// Fire
        const FIRE = 1 << 5;
        /// Ice
        const ICE = 1 << 6;
        /// Zap
        const ZAP = 1 << 7;
    }
}

impl From<DamageType> for DamageTypes {
    fn from(kind: DamageType) -> Self {
        match kind {
            DamageType::Slash => Self::SLASH,
            DamageType::Crush => Self::CRUSH,
            DamageType::Poke => Self::POKE,
            DamageType::Holy => Self::HOLY,
            DamageType::Evil => Self::EVIL,
            DamageType::Fire => Self::FIRE,
            DamageType::Ice => Self::ICE,
            DamageType::Zap => Self::ZAP,
        }
    }
}

/// How a character takes damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageProfile {
    /// Damage of these types is multiplied by the configured vulnerability multiplier
    pub vulnerable: DamageTypes,
    /// Damage of these types is ignored entirely
    pub immune: DamageTypes,
}

impl DamageProfile {
    /// Multiplier for an incoming hit of the given type
    pub fn multiplier(&self, kind: DamageType, vulnerability_multiplier: f32) -> f32 {
        let kind = DamageTypes::from(kind);
        if self.immune.contains(kind) {
            0.0
        } else if self.vulnerable.contains(kind) {
            vulnerability_multiplier
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier() {
        let profile = DamageProfile {
            vulnerable: DamageTypes::FIRE,
            immune: DamageTypes::ICE,
        };
        assert_eq!(profile.multiplier(DamageType::Fire, 2.0), 2.0);
        assert_eq!(profile.multiplier(DamageType::Ice, 2.0), 0.0);
        assert_eq!(profile.multiplier(DamageType::Slash, 2.0), 1.0);
    }
}
