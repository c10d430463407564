//! The tile bag: identity, point values, and the fixed initial
//! distribution of the English-language set.

use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// A single physical tile. `letter` is `None` only for an unassigned blank;
/// once a blank is placed the player must supply a letter for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: u8,
    pub points: u8,
    pub letter: Option<char>,
}

/// `(letter, count, points)` — `None` letter marks the two blanks.
const DISTRIBUTION: &[(Option<char>, u8, u8)] = &[
    (None, 2, 0),
    (Some('E'), 12, 1),
    (Some('A'), 9, 1),
    (Some('I'), 9, 1),
    (Some('O'), 8, 1),
    (Some('N'), 6, 1),
    (Some('R'), 6, 1),
    (Some('T'), 6, 1),
    (Some('L'), 4, 1),
    (Some('S'), 4, 1),
    (Some('U'), 4, 1),
    (Some('D'), 4, 2),
    (Some('G'), 3, 2),
    (Some('B'), 2, 3),
    (Some('C'), 2, 3),
    (Some('M'), 2, 3),
    (Some('P'), 2, 3),
    (Some('F'), 2, 4),
    (Some('H'), 2, 4),
    (Some('V'), 2, 4),
    (Some('W'), 2, 4),
    (Some('Y'), 2, 4),
    (Some('K'), 1, 5),
    (Some('J'), 1, 8),
    (Some('X'), 1, 8),
    (Some('Q'), 1, 10),
    (Some('Z'), 1, 10),
];

/// Number of tiles in a freshly assembled bag.
pub const TOTAL_TILES: usize = 100;

/// A shuffled, draw-from-front sequence of the remaining tiles.
#[derive(Debug, Clone)]
pub struct TileBag {
    tiles: VecDeque<Tile>,
}

impl TileBag {
    /// An empty bag, used before a game's first deal.
    pub fn empty() -> Self {
        TileBag {
            tiles: VecDeque::new(),
        }
    }

    /// Builds the full 100-tile bag in distribution order, ids assigned
    /// `0..100` in that same order, then shuffles it.
    pub fn new_shuffled() -> Self {
        let mut id = 0u8;
        let mut tiles = Vec::with_capacity(TOTAL_TILES);
        for &(letter, count, points) in DISTRIBUTION {
            for _ in 0..count {
                tiles.push(Tile { id, points, letter });
                id += 1;
            }
        }
        debug_assert_eq!(tiles.len(), TOTAL_TILES);
        let mut rng = rand::rng();
        tiles.shuffle(&mut rng);
        TileBag {
            tiles: tiles.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Draws up to `count` tiles from the front. Returns fewer if the bag
    /// runs out first.
    pub fn draw(&mut self, count: usize) -> Vec<Tile> {
        let n = count.min(self.tiles.len());
        self.tiles.drain(..n).collect()
    }

    /// Returns tiles to the bag and reshuffles.
    pub fn give_back(&mut self, returned: impl IntoIterator<Item = Tile>) {
        self.tiles.extend(returned);
        let mut rng = rand::rng();
        let mut as_vec: Vec<_> = self.tiles.drain(..).collect();
        as_vec.shuffle(&mut rng);
        self.tiles = as_vec.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_has_exactly_one_hundred_tiles() {
        let bag = TileBag::new_shuffled();
        assert_eq!(bag.len(), TOTAL_TILES);
    }

    #[test]
    fn ids_are_unique_and_dense() {
        let mut bag = TileBag::new_shuffled();
        let mut ids: Vec<u8> = bag.draw(TOTAL_TILES).iter().map(|t| t.id).collect();
        ids.sort_unstable();
        let expected: Vec<u8> = (0..TOTAL_TILES as u8).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn exactly_two_blanks_at_zero_points() {
        let mut bag = TileBag::new_shuffled();
        let drawn = bag.draw(TOTAL_TILES);
        let blanks: Vec<_> = drawn.iter().filter(|t| t.letter.is_none()).collect();
        assert_eq!(blanks.len(), 2);
        assert!(blanks.iter().all(|t| t.points == 0));
    }

    #[test]
    fn draw_more_than_available_returns_remainder_only() {
        let mut bag = TileBag::new_shuffled();
        bag.draw(95);
        let rest = bag.draw(50);
        assert_eq!(rest.len(), 5);
        assert!(bag.is_empty());
    }
}
