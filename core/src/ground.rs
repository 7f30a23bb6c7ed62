//! Ground cells: terrain, capability tags, and an optional spawner.

use crate::{
    capability::{Capability, CapabilitySet},
    spawn::SpawnGround,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Dirt,
    Floor,
    Wall,
    Puddle,
    Void,
    Graveyard,
    Hut,
    Bush,
}

impl Terrain {
    pub fn from_glyph(glyph: char) -> Option<Terrain> {
        Some(match glyph {
            '.' => Self::Dirt,
            '_' => Self::Floor,
            '#' => Self::Wall,
            '~' => Self::Puddle,
            '+' => Self::Void,
            'n' => Self::Graveyard,
            'h' => Self::Hut,
            'm' => Self::Bush,
            _ => return None,
        })
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Dirt => '.',
            Self::Floor => '_',
            Self::Wall => '#',
            Self::Puddle => '~',
            Self::Void => '+',
            Self::Graveyard => 'n',
            Self::Hut => 'h',
            Self::Bush => 'm',
        }
    }

    /// Tags every cell of this terrain starts with.
    fn intrinsic_capabilities(self) -> CapabilitySet {
        match self {
            Self::Void => CapabilitySet::new()
                .with(Capability::Unspawnable)
                .with(Capability::Lethal),
            _ => CapabilitySet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ground {
    pub terrain: Terrain,
    pub capabilities: CapabilitySet,
    pub spawner: Option<SpawnGround>,
}

impl Ground {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            capabilities: terrain.intrinsic_capabilities(),
            spawner: None,
        }
    }

    pub fn spawning(terrain: Terrain, spawner: SpawnGround) -> Self {
        Self {
            spawner: Some(spawner),
            ..Self::new(terrain)
        }
    }

    pub fn glyph(&self) -> char {
        self.terrain.glyph()
    }

    /// Whether an actor carrying `tags` may stand here.
    pub fn admits(&self, tags: &CapabilitySet) -> bool {
        match self.terrain {
            Terrain::Wall => false,
            Terrain::Floor => tags.has(Capability::EnterFloor),
            _ => true,
        }
    }

    /// Whether a newly spawned actor carrying `tags` may be placed here.
    pub fn accepts_spawn(&self, tags: &CapabilitySet) -> bool {
        !self.capabilities.has(Capability::Unspawnable) || tags.has(Capability::VoidImmune)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_round_trip_through_the_table() {
        for glyph in ['.', '_', '#', '~', '+', 'n', 'h', 'm'] {
            let terrain = Terrain::from_glyph(glyph).unwrap();
            assert_eq!(terrain.glyph(), glyph);
        }
        assert_eq!(Terrain::from_glyph('Q'), None);
    }

    #[test]
    fn floor_needs_enter_floor_and_walls_block_everyone() {
        let floor = Ground::new(Terrain::Floor);
        let wall = Ground::new(Terrain::Wall);
        let walker = CapabilitySet::new();
        let player = CapabilitySet::new().with(Capability::EnterFloor);

        assert!(!floor.admits(&walker));
        assert!(floor.admits(&player));
        assert!(!wall.admits(&player));
    }

    #[test]
    fn void_refuses_spawns_unless_immune() {
        let void = Ground::new(Terrain::Void);
        assert!(!void.accepts_spawn(&CapabilitySet::new()));
        assert!(void.accepts_spawn(&CapabilitySet::new().with(Capability::VoidImmune)));
        assert!(Ground::new(Terrain::Dirt).accepts_spawn(&CapabilitySet::new()));
    }
}
