//! Team membership and the hate table
//!
//! Particles decide what they may hurt from the relationship between their
//! team and the struck character's team.

use serde::{Serialize, Deserialize};

/// Number of teams the hate table can describe
pub const MAX_TEAMS: usize = 32;

/// Team identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// The neutral team: hates nobody and is hated by nobody
    pub const NEUTRAL: TeamId = TeamId(0);

    /// Row in the hate table; `None` for ids the table cannot describe
    fn index(self) -> Option<usize> {
        let index = usize::from(self.0);
        (index < MAX_TEAMS).then_some(index)
    }
}

/// Who hates whom. Row `a`, bit `b` set means team `a` hates team `b`.
#[derive(Debug, Clone)]
pub struct TeamTable {
    hates: [u32; MAX_TEAMS],
}

impl Default for TeamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamTable {
    /// Every non-neutral team hates every other non-neutral team
    pub fn new() -> Self {
        let mut hates = [0u32; MAX_TEAMS];
        let neutral = usize::from(TeamId::NEUTRAL.0);
        let neutral_bit = 1u32 << neutral;
        for (team, row) in hates.iter_mut().enumerate() {
            if team == neutral {
                continue;
            }
            *row = !(1u32 << team) & !neutral_bit;
        }
        Self { hates }
    }

    /// Set whether `a` hates `b` (one direction only). Ids outside the table
    /// are ignored.
    pub fn set_hates(&mut self, a: TeamId, b: TeamId, hates: bool) {
        let (Some(row), Some(column)) = (a.index(), b.index()) else {
            log::warn!("Ignoring hate entry for out-of-range teams {:?} -> {:?}", a, b);
            return;
        };
        let bit = 1u32 << column;
        if hates {
            self.hates[row] |= bit;
        } else {
            self.hates[row] &= !bit;
        }
    }

    /// Does team `a` hate team `b`? Teams outside the table hate nobody and
    /// are hated by nobody.
    pub fn hates(&self, a: TeamId, b: TeamId) -> bool {
        match (a.index(), b.index()) {
            (Some(row), Some(column)) => self.hates[row] & (1u32 << column) != 0,
            _ => false,
        }
    }
}
