//! Per-seat mutable state: score and rack.

use crate::tile::Tile;

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub score: i16,
    pub rack: Vec<Tile>,
}

impl PlayerState {
    pub fn new() -> Self {
        PlayerState::default()
    }

    /// Sum of the point values of every tile still in the rack; this is
    /// what gets deducted from a player's score when a game ends with
    /// tiles left in their hand.
    pub fn rack_points(&self) -> i16 {
        self.rack.iter().map(|t| t.points as i16).sum()
    }

    pub fn has_tile(&self, id: u8) -> bool {
        self.rack.iter().any(|t| t.id == id)
    }

    /// Removes the given tile ids from the rack. Panics if an id is
    /// missing — callers must validate ownership first.
    pub fn remove_tiles(&mut self, ids: &[u8]) -> Vec<Tile> {
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            let index = self
                .rack
                .iter()
                .position(|t| t.id == id)
                .expect("caller validated tile ownership");
            removed.push(self.rack.remove(index));
        }
        removed
    }

    pub fn add_tiles(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        self.rack.extend(tiles);
    }
}
