//! Capability tags: the only channel through which one component
//! conditions its behaviour on another entity.
//!
//! RULE: Never branch on "what kind of actor is this". Ask the
//! entity's CapabilitySet instead.
//!
//! The tag enum is closed and append-only: each variant owns one bit
//! of the set, so reordering would silently change membership.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Capability {
    // ── Abilities ──────────────────────────────────
    EnterFloor = 0,
    VoidImmune = 1,
    DrinkFromGround = 2,
    InteractWithGate = 3,

    // ── Status ─────────────────────────────────────
    HostileToEnemy = 8,
    Enemy = 9,
    Merchant = 10,
    HostileToWeather = 11,
    Spawned = 12,
    BossEnemy = 13,
    BossDefeated = 14,
    Unspawnable = 15,
    Lethal = 16,
    Pursuer = 17,

    // ── Weather ────────────────────────────────────
    Sunny = 24,
    Rainy = 25,
    Normal = 26,
}

impl Capability {
    fn bit(self) -> u32 {
        1 << (self as u8)
    }

    pub const ALL: [Capability; 17] = [
        Self::EnterFloor,
        Self::VoidImmune,
        Self::DrinkFromGround,
        Self::InteractWithGate,
        Self::HostileToEnemy,
        Self::Enemy,
        Self::Merchant,
        Self::HostileToWeather,
        Self::Spawned,
        Self::BossEnemy,
        Self::BossDefeated,
        Self::Unspawnable,
        Self::Lethal,
        Self::Pursuer,
        Self::Sunny,
        Self::Rainy,
        Self::Normal,
    ];
}

/// A set of capability tags. Copy, no ordering, no duplicates,
/// O(1) membership.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn add(&mut self, tag: Capability) {
        self.0 |= tag.bit();
    }

    pub fn remove(&mut self, tag: Capability) {
        self.0 &= !tag.bit();
    }

    pub fn has(&self, tag: Capability) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn with(mut self, tag: Capability) -> Self {
        self.add(tag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(move |tag| self.has(*tag))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for tag in iter {
            set.add(tag);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_has() {
        let mut set = CapabilitySet::new();
        assert!(!set.has(Capability::Enemy));

        set.add(Capability::Enemy);
        set.add(Capability::Enemy);
        assert!(set.has(Capability::Enemy));
        assert_eq!(set.len(), 1);

        set.remove(Capability::Enemy);
        assert!(set.is_empty());

        // removing an absent tag is a no-op
        set.remove(Capability::Sunny);
        assert!(set.is_empty());
    }

    #[test]
    fn every_tag_has_its_own_bit() {
        let all: CapabilitySet = Capability::ALL.into_iter().collect();
        assert_eq!(all.len(), Capability::ALL.len());
        for tag in Capability::ALL {
            let mut set = all;
            set.remove(tag);
            assert!(!set.has(tag));
            assert_eq!(set.len(), Capability::ALL.len() - 1);
        }
    }
}
