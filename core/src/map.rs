//! Grid geometry: cells, exits, and actor placement.
//!
//! A map owns positions; actors themselves live in the world's actor
//! table and are looked up here by id.
//!
//! EXIT ORDER (fixed): clockwise from North. Attack, Follow, Wander
//! and spawn placement all rely on it for their tie-breaks.

use crate::{
    capability::CapabilitySet,
    error::{SimError, SimResult},
    ground::{Ground, Terrain},
    types::{ActorId, Point},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const EXIT_DIRECTIONS: [(&str, char, i32, i32); 8] = [
    ("North", '8', 0, -1),
    ("North-East", '9', 1, -1),
    ("East", '6', 1, 0),
    ("South-East", '3', 1, 1),
    ("South", '2', 0, 1),
    ("South-West", '1', -1, 1),
    ("West", '4', -1, 0),
    ("North-West", '7', -1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub name: &'static str,
    pub hotkey: char,
    pub destination: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Cleared from the ground by a world reset.
    pub perishable: bool,
}

#[derive(Debug, Clone)]
struct Cell {
    ground: Ground,
    occupant: Option<ActorId>,
    items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct GameMap {
    pub name: String,
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    roster: Vec<ActorId>,
    positions: HashMap<ActorId, Point>,
}

impl GameMap {
    /// A `width` × `height` map filled with `fill`.
    pub fn new(name: impl Into<String>, width: i32, height: i32, fill: Terrain) -> Self {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        let cells = (0..width * height)
            .map(|_| Cell { ground: Ground::new(fill), occupant: None, items: Vec::new() })
            .collect();
        Self {
            name: name.into(),
            width,
            height,
            cells,
            roster: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Parse a map from text rows using the terrain glyph table.
    pub fn from_rows<S: AsRef<str>>(name: &str, rows: &[S]) -> SimResult<Self> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(SimError::RaggedMap { map: name.into(), expected: 1, row: 0, actual: 0 });
        }

        let mut map = GameMap::new(name, width as i32, rows.len() as i32, Terrain::Dirt);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(SimError::RaggedMap { map: name.into(), expected: width, row: y, actual });
            }
            for (x, glyph) in row.chars().enumerate() {
                let at = Point::new(x as i32, y as i32);
                let terrain = Terrain::from_glyph(glyph)
                    .ok_or_else(|| SimError::InvalidGlyph { map: name.into(), glyph, at })?;
                map.set_ground(at, Ground::new(terrain))?;
            }
        }
        Ok(map)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p).then(|| (p.y * self.width + p.x) as usize)
    }

    fn out_of_bounds(&self, at: Point) -> SimError {
        SimError::OutOfBounds { map: self.name.clone(), at }
    }

    /// Every coordinate, row-major: y outer, x inner.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Point::new(x, y)))
    }

    pub fn ground(&self, p: Point) -> Option<&Ground> {
        self.index(p).map(|i| &self.cells[i].ground)
    }

    pub fn ground_mut(&mut self, p: Point) -> Option<&mut Ground> {
        self.index(p).map(|i| &mut self.cells[i].ground)
    }

    pub fn set_ground(&mut self, p: Point, ground: Ground) -> SimResult<()> {
        let i = self.index(p).ok_or_else(|| self.out_of_bounds(p))?;
        self.cells[i].ground = ground;
        Ok(())
    }

    /// Neighbouring tiles in the fixed clockwise order, skipping
    /// anything off the edge of the map.
    pub fn exits(&self, from: Point) -> Vec<Exit> {
        EXIT_DIRECTIONS
            .iter()
            .map(|&(name, hotkey, dx, dy)| Exit { name, hotkey, destination: from.offset(dx, dy) })
            .filter(|exit| self.in_bounds(exit.destination))
            .collect()
    }

    pub fn actor_at(&self, p: Point) -> Option<ActorId> {
        self.index(p).and_then(|i| self.cells[i].occupant)
    }

    pub fn locate(&self, actor: ActorId) -> Option<Point> {
        self.positions.get(&actor).copied()
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.positions.contains_key(&actor)
    }

    /// Actors on this map, in registration order.
    pub fn roster(&self) -> &[ActorId] {
        &self.roster
    }

    /// Whether an actor carrying `tags` could step onto `p` right now.
    pub fn can_enter(&self, p: Point, tags: &CapabilitySet) -> bool {
        match self.index(p) {
            Some(i) => self.cells[i].occupant.is_none() && self.cells[i].ground.admits(tags),
            None => false,
        }
    }

    /// Put `actor` on the map at `p`, appending it to the roster.
    pub fn place(&mut self, actor: ActorId, p: Point) -> SimResult<()> {
        let i = self.index(p).ok_or_else(|| self.out_of_bounds(p))?;
        if self.cells[i].occupant.is_some() {
            return Err(SimError::Occupied { map: self.name.clone(), at: p });
        }
        assert!(!self.contains(actor), "actor {actor} placed twice on '{}'", self.name);
        self.cells[i].occupant = Some(actor);
        self.positions.insert(actor, p);
        self.roster.push(actor);
        Ok(())
    }

    /// Take `actor` off the map. Returns where it stood.
    pub fn remove(&mut self, actor: ActorId) -> Option<Point> {
        let p = self.positions.remove(&actor)?;
        if let Some(i) = self.index(p) {
            self.cells[i].occupant = None;
        }
        self.roster.retain(|id| *id != actor);
        Some(p)
    }

    /// Move an actor already on this map to an empty tile.
    pub fn move_actor(&mut self, actor: ActorId, to: Point) -> bool {
        let Some(from) = self.locate(actor) else { return false };
        let Some(dest) = self.index(to) else { return false };
        if self.cells[dest].occupant.is_some() {
            return false;
        }
        if let Some(src) = self.index(from) {
            self.cells[src].occupant = None;
        }
        self.cells[dest].occupant = Some(actor);
        self.positions.insert(actor, to);
        true
    }

    pub fn items_at(&self, p: Point) -> &[Item] {
        match self.index(p) {
            Some(i) => &self.cells[i].items,
            None => &[],
        }
    }

    pub fn add_item(&mut self, p: Point, item: Item) {
        if let Some(i) = self.index(p) {
            self.cells[i].items.push(item);
        }
    }

    /// Drop every perishable item on the map. Returns how many went.
    pub fn clear_perishables(&mut self) -> usize {
        let mut cleared = 0;
        for cell in &mut self.cells {
            let before = cell.items.len();
            cell.items.retain(|item| !item.perishable);
            cleared += before - cell.items.len();
        }
        cleared
    }

    pub fn item_count(&self) -> usize {
        self.cells.iter().map(|c| c.items.len()).sum()
    }

    /// Text rendering: actor glyphs over ground glyphs.
    pub fn render(&self, glyph_of: impl Fn(ActorId) -> char) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x, y);
                let ch = match self.actor_at(p) {
                    Some(id) => glyph_of(id),
                    None => self.ground(p).map(Ground::glyph).unwrap_or(' '),
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exits_run_clockwise_from_north_and_clip_edges() {
        let map = GameMap::new("t", 3, 3, Terrain::Dirt);
        let centre: Vec<&str> = map.exits(Point::new(1, 1)).iter().map(|e| e.name).collect();
        assert_eq!(
            centre,
            vec!["North", "North-East", "East", "South-East", "South", "South-West", "West", "North-West"]
        );

        let corner: Vec<Point> = map.exits(Point::new(0, 0)).iter().map(|e| e.destination).collect();
        assert_eq!(corner, vec![Point::new(1, 0), Point::new(1, 1), Point::new(0, 1)]);
    }

    #[test]
    fn from_rows_rejects_unknown_glyphs_and_ragged_rows() {
        assert!(matches!(
            GameMap::from_rows("bad", &["..", ".Z"]),
            Err(SimError::InvalidGlyph { glyph: 'Z', .. })
        ));
        assert!(matches!(
            GameMap::from_rows("ragged", &["...", ".."]),
            Err(SimError::RaggedMap { row: 1, .. })
        ));
        let ok = GameMap::from_rows("ok", &["#.#", "+m_"]).unwrap();
        assert_eq!(ok.ground(Point::new(0, 1)).unwrap().terrain, Terrain::Void);
        assert_eq!(ok.ground(Point::new(1, 1)).unwrap().terrain, Terrain::Bush);
    }

    #[test]
    fn place_move_remove_keep_roster_and_cells_in_sync() {
        let mut map = GameMap::new("t", 4, 4, Terrain::Dirt);
        let a = ActorId(1);
        let b = ActorId(2);
        map.place(a, Point::new(0, 0)).unwrap();
        map.place(b, Point::new(1, 0)).unwrap();
        assert!(matches!(map.place(ActorId(3), Point::new(1, 0)), Err(SimError::Occupied { .. })));
        assert!(matches!(map.place(ActorId(3), Point::new(9, 0)), Err(SimError::OutOfBounds { .. })));

        assert!(!map.move_actor(a, Point::new(1, 0)));
        assert!(map.move_actor(a, Point::new(0, 1)));
        assert_eq!(map.actor_at(Point::new(0, 0)), None);
        assert_eq!(map.locate(a), Some(Point::new(0, 1)));

        assert_eq!(map.remove(a), Some(Point::new(0, 1)));
        assert_eq!(map.roster(), &[b]);
        assert!(!map.contains(a));
    }

    #[test]
    fn perishables_are_cleared_others_stay() {
        let mut map = GameMap::new("t", 2, 1, Terrain::Dirt);
        let p = Point::new(0, 0);
        map.add_item(p, Item { name: "Runes".into(), perishable: true });
        map.add_item(p, Item { name: "Healing Vial".into(), perishable: false });
        assert_eq!(map.clear_perishables(), 1);
        assert_eq!(map.items_at(p)[0].name, "Healing Vial");
    }
}
