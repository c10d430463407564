//! The `PlaceTiles` validator and scorer: geometry, premiums, dictionary
//! membership, and the bingo bonus.

use crate::board::{Board, BoardTile, SquareKind};
use crate::player::PlayerState;
use std::collections::HashMap;
use wordbase_protocol::TilePlacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Horizontal,
    Vertical,
}

struct FullTile {
    id: u8,
    row: usize,
    col: usize,
    letter: char,
    points: u8,
}

/// A single formed word: its text, raw score, and whether it touches a
/// tile placed in an earlier turn.
struct WordCount {
    word: String,
    score: i32,
    connected: bool,
}

/// What a validated placement does to the game, computed without
/// mutating anything. The caller commits this only once every check has
/// passed.
pub struct PlacementOutcome {
    pub notifications: Vec<String>,
    pub score_delta: i32,
    pub bingo: bool,
    pub committed: Vec<(usize, usize, BoardTile)>,
    pub placed_tile_ids: Vec<u8>,
    pub wire_placed: Vec<wordbase_protocol::PlacedTile>,
}

/// Runs the full validation and scoring pipeline for one `PlaceTiles`
/// submission. `placements` must be non-empty — an empty placement list
/// (a skip) is handled by the caller before reaching here.
pub fn validate_and_score(
    board: &Board,
    rack: &PlayerState,
    placements: &[TilePlacement],
    dictionary: &crate::dictionary::Dictionary,
) -> Result<PlacementOutcome, String> {
    debug_assert!(!placements.is_empty());

    // Step 2/3: materialize against the rack, reject unassigned blanks.
    let mut tiles = Vec::with_capacity(placements.len());
    for placement in placements {
        let rack_tile = rack
            .rack
            .iter()
            .find(|t| t.id == placement.tile_id)
            .ok_or_else(|| "Placed tiles do not belong to player!".to_string())?;
        let letter = rack_tile.letter.or(placement.letter);
        let letter = letter.ok_or_else(|| "Blank tiles must be assigned a letter!".to_string())?;
        let (row, col) = wordbase_protocol::position_to_row_col(placement.position);
        tiles.push(FullTile {
            id: rack_tile.id,
            row: row as usize,
            col: col as usize,
            letter,
            points: rack_tile.points,
        });
    }
    let tile_count = tiles.len();

    // Step 4: orientation.
    let orientation = if tiles.iter().all(|t| t.row == tiles[0].row) {
        Orientation::Horizontal
    } else if tiles.iter().all(|t| t.col == tiles[0].col) {
        Orientation::Vertical
    } else {
        return Err("Tiles must form a horizontal or vertical line!".to_string());
    };

    // Step 5: sort along the line, reject overlap/out-of-bounds/duplicates.
    let varying = |t: &FullTile| -> usize {
        match orientation {
            Orientation::Horizontal => t.col,
            Orientation::Vertical => t.row,
        }
    };
    tiles.sort_by_key(varying);
    let fixed = match orientation {
        Orientation::Horizontal => tiles[0].row,
        Orientation::Vertical => tiles[0].col,
    };

    let mut by_varying: HashMap<usize, usize> = HashMap::new(); // varying coord -> index in tiles
    for (idx, tile) in tiles.iter().enumerate() {
        if tile.row >= crate::board::DIM || tile.col >= crate::board::DIM {
            return Err("Tiles are overlapping or out of bounds!".to_string());
        }
        if board.is_occupied(tile.row, tile.col) {
            return Err("Tiles are overlapping or out of bounds!".to_string());
        }
        if by_varying.insert(varying(tile), idx).is_some() {
            return Err("Tiles are overlapping or out of bounds!".to_string());
        }
    }

    // Step 6: no gaps across the span of the new placement.
    let coord = |fixed: usize, pos: usize| -> (usize, usize) {
        match orientation {
            Orientation::Horizontal => (fixed, pos),
            Orientation::Vertical => (pos, fixed),
        }
    };
    let min_varying = varying(&tiles[0]);
    let max_varying = varying(&tiles[tiles.len() - 1]);
    for pos in (min_varying + 1)..=max_varying {
        let (r, c) = coord(fixed, pos);
        if !by_varying.contains_key(&pos) && !board.is_occupied(r, c) {
            return Err("Tiles must form a single line!".to_string());
        }
    }

    // Step 7: first-move center rule.
    let (center_row, center_col) = Board::center();
    if !board.is_occupied(center_row, center_col) {
        let covers_center = tiles.iter().any(|t| t.row == center_row && t.col == center_col);
        if !covers_center {
            return Err("The center square must be populated!".to_string());
        }
        if tile_count == 1 {
            return Err("The first word must be at least 2 characters long!".to_string());
        }
    }

    // Step 8: word formation.
    let placements_by_coord: HashMap<(usize, usize), &FullTile> =
        tiles.iter().map(|t| ((t.row, t.col), t)).collect();
    let main_step = match orientation {
        Orientation::Horizontal => (0i32, 1i32),
        Orientation::Vertical => (1i32, 0i32),
    };
    let cross_step = (main_step.1, main_step.0);

    let mut words = Vec::new();
    if let Some(main) = scan_word(
        board,
        &placements_by_coord,
        (tiles[0].row, tiles[0].col),
        main_step,
    ) {
        words.push(main);
    }
    for tile in &tiles {
        if let Some(cross) = scan_word(board, &placements_by_coord, (tile.row, tile.col), cross_step) {
            words.push(cross);
        }
    }

    // Step 9: connectedness, unless this is the first move on an empty board.
    let board_has_prior_tiles = board.is_occupied(center_row, center_col);
    if board_has_prior_tiles && words.iter().all(|w| !w.connected) {
        return Err("Must connect with pre-existing tiles!".to_string());
    }

    // Step 10: dictionary.
    let mut seen = std::collections::HashSet::new();
    let mut invalid = Vec::new();
    for w in &words {
        if !dictionary.contains(&w.word) && seen.insert(w.word.clone()) {
            invalid.push(w.word.clone());
        }
    }
    if !invalid.is_empty() {
        let plural = if invalid.len() == 1 { "" } else { "s" };
        return Err(format!("Invalid word{}: {}", plural, invalid.join(", ")));
    }

    // Step 11: commit and score.
    let mut notifications = Vec::new();
    let mut score_delta = 0i32;
    for w in &words {
        score_delta += w.score;
        notifications.push(format!("{} - {} points", w.word, w.score));
    }
    let bingo = tile_count == 7;
    if bingo {
        score_delta += 50;
        notifications.push("Bingo! - 50 points".to_string());
    }

    let mut committed = Vec::with_capacity(tiles.len());
    let mut wire_placed = Vec::with_capacity(tiles.len());
    let mut placed_tile_ids = Vec::with_capacity(tiles.len());
    for tile in &tiles {
        let board_tile = BoardTile {
            letter: tile.letter,
            points: tile.points,
        };
        committed.push((tile.row, tile.col, board_tile));
        wire_placed.push(wordbase_protocol::PlacedTile {
            position: wordbase_protocol::row_col_to_position(tile.row as u8, tile.col as u8),
            points: tile.points,
            letter: tile.letter,
        });
        placed_tile_ids.push(tile.id);
    }

    Ok(PlacementOutcome {
        notifications,
        score_delta,
        bingo,
        committed,
        placed_tile_ids,
        wire_placed,
    })
}

/// Expands outward from `anchor` along `step`, collecting every
/// contiguous already-committed or newly-placed square into one word.
/// Premiums apply only to squares present in `placements`. Returns `None`
/// for a word shorter than two letters.
fn scan_word(
    board: &Board,
    placements: &HashMap<(usize, usize), &FullTile>,
    anchor: (usize, usize),
    step: (i32, i32),
) -> Option<WordCount> {
    let mut row = anchor.0 as i32;
    let mut col = anchor.1 as i32;

    loop {
        let (pr, pc) = (row - step.0, col - step.1);
        if !Board::in_bounds(pr, pc) {
            break;
        }
        if board.is_occupied(pr as usize, pc as usize) {
            row = pr;
            col = pc;
        } else {
            break;
        }
    }

    let mut word = String::new();
    let mut points = 0i32;
    let mut multiplier = 1i32;
    let mut connected = false;

    loop {
        if !Board::in_bounds(row, col) {
            break;
        }
        let (r, c) = (row as usize, col as usize);
        if let Some(existing) = board.get(r, c).tile {
            word.push(existing.letter);
            points += existing.points as i32;
            connected = true;
        } else if let Some(&placed) = placements.get(&(r, c)) {
            let kind = board.get(r, c).kind;
            let letter_points = match kind {
                SquareKind::Dls => placed.points as i32 * 2,
                SquareKind::Tls => placed.points as i32 * 3,
                _ => placed.points as i32,
            };
            points += letter_points;
            match kind {
                SquareKind::Dws => multiplier *= 2,
                SquareKind::Tws => multiplier *= 3,
                _ => {}
            }
            word.push(placed.letter);
        } else {
            break;
        }
        row += step.0;
        col += step.1;
    }

    if word.chars().count() > 1 {
        Some(WordCount {
            word,
            score: points * multiplier,
            connected,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerState;
    use crate::tile::Tile;

    fn dict(words: &[&str]) -> crate::dictionary::Dictionary {
        crate::dictionary::Dictionary::load_from_reader(words.join("\n").as_bytes()).unwrap()
    }

    fn tile(id: u8, points: u8, letter: char) -> Tile {
        Tile {
            id,
            points,
            letter: Some(letter),
        }
    }

    fn rack_of(tiles: Vec<Tile>) -> PlayerState {
        PlayerState { score: 0, rack: tiles }
    }

    fn place_at(row: u8, col: u8, tile_id: u8) -> TilePlacement {
        TilePlacement {
            position: wordbase_protocol::row_col_to_position(row, col),
            tile_id,
            letter: None,
        }
    }

    #[test]
    fn first_move_off_center_is_rejected() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 1, 'A')]);
        let d = dict(&["HI"]);
        let err = validate_and_score(&board, &rack, &[place_at(0, 0, 0)], &d).unwrap_err();
        assert_eq!(err, "The center square must be populated!");
    }

    #[test]
    fn first_move_single_tile_is_too_short() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 1, 'A')]);
        let d = dict(&["A"]);
        let err = validate_and_score(&board, &rack, &[place_at(7, 7, 0)], &d).unwrap_err();
        assert_eq!(err, "The first word must be at least 2 characters long!");
    }

    #[test]
    fn first_move_hi_scores_via_center_double_word() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 4, 'H'), tile(1, 1, 'I')]);
        let d = dict(&["HI"]);
        let placements = vec![place_at(7, 7, 0), place_at(7, 8, 1)];
        let outcome = validate_and_score(&board, &rack, &placements, &d).unwrap();
        // (4 + 1) points x2 for the center DWS, per the worked scoring
        // example in the seed test scenarios.
        assert_eq!(outcome.score_delta, 10);
        assert!(!outcome.bingo);
        assert_eq!(outcome.notifications, vec!["HI - 10 points".to_string()]);
    }

    #[test]
    fn blank_tile_without_letter_is_rejected() {
        let board = Board::new();
        let rack = rack_of(vec![
            Tile {
                id: 0,
                points: 0,
                letter: None,
            },
            tile(1, 1, 'I'),
        ]);
        let d = dict(&["HI"]);
        let placements = vec![place_at(7, 7, 0), place_at(7, 8, 1)];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Blank tiles must be assigned a letter!");
    }

    #[test]
    fn tile_not_in_rack_is_rejected() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 4, 'H')]);
        let d = dict(&["HI"]);
        let err = validate_and_score(&board, &rack, &[place_at(7, 7, 99)], &d).unwrap_err();
        assert_eq!(err, "Placed tiles do not belong to player!");
    }

    #[test]
    fn diagonal_placement_is_rejected() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 4, 'H'), tile(1, 1, 'I')]);
        let d = dict(&["HI"]);
        let placements = vec![place_at(7, 7, 0), place_at(8, 8, 1)];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Tiles must form a horizontal or vertical line!");
    }

    #[test]
    fn gap_in_line_is_rejected() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 4, 'H'), tile(1, 1, 'I')]);
        let d = dict(&["HI"]);
        // Columns 7 and 9 with nothing (placed or committed) at column 8.
        let placements = vec![place_at(7, 7, 0), place_at(7, 9, 1)];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Tiles must form a single line!");
    }

    #[test]
    fn out_of_bounds_position_is_rejected() {
        let mut board = Board::new();
        board.place(7, 7, BoardTile { letter: 'H', points: 4 });
        let rack = rack_of(vec![tile(0, 1, 'I')]);
        let d = dict(&["HI"]);
        // row 15 is one past the last valid row.
        let placements = vec![TilePlacement {
            position: wordbase_protocol::row_col_to_position(15, 5),
            tile_id: 0,
            letter: None,
        }];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Tiles are overlapping or out of bounds!");
    }

    #[test]
    fn second_move_must_connect_to_existing_tiles() {
        let mut board = Board::new();
        board.place(7, 7, BoardTile { letter: 'H', points: 4 });
        board.place(7, 8, BoardTile { letter: 'I', points: 1 });
        let rack = rack_of(vec![tile(0, 1, 'A'), tile(1, 1, 'T')]);
        let d = dict(&["HI", "AT"]);
        // Far away from (7,7)/(7,8), touching nothing committed.
        let placements = vec![place_at(0, 0, 0), place_at(0, 1, 1)];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Must connect with pre-existing tiles!");
    }

    #[test]
    fn invalid_word_is_rejected_with_no_mutation() {
        let board = Board::new();
        let rack = rack_of(vec![tile(0, 10, 'Z'), tile(1, 10, 'Z'), tile(2, 10, 'Z'), tile(3, 10, 'Z')]);
        let d = dict(&["HI"]);
        let placements = vec![
            place_at(7, 7, 0),
            place_at(7, 8, 1),
            place_at(7, 9, 2),
            place_at(7, 10, 3),
        ];
        let err = validate_and_score(&board, &rack, &placements, &d).unwrap_err();
        assert_eq!(err, "Invalid word: ZZZZ");
        assert!(!board.is_occupied(7, 7));
        assert_eq!(rack.rack.len(), 4);
    }

    #[test]
    fn all_seven_tiles_placed_scores_the_bingo_bonus() {
        let board = Board::new();
        let letters = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];
        let rack = rack_of(
            letters
                .iter()
                .enumerate()
                .map(|(i, &c)| tile(i as u8, 1, c))
                .collect(),
        );
        let d = dict(&["ABCDEFG"]);
        // Row 7, columns 4..=10: covers the center (col 7) with one DWS and
        // no other premiums in this particular span.
        let placements: Vec<TilePlacement> = (0..7u8).map(|i| place_at(7, 4 + i, i)).collect();
        let outcome = validate_and_score(&board, &rack, &placements, &d).unwrap();
        assert!(outcome.bingo);
        assert_eq!(outcome.score_delta, 7 * 2 + 50);
        assert_eq!(
            outcome.notifications,
            vec!["ABCDEFG - 14 points".to_string(), "Bingo! - 50 points".to_string()]
        );
    }
}
