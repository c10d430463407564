//! Pure game logic: board, tile bag, players, the `PlaceTiles` validator,
//! and the `Game` state machine that ties them together. No networking.

mod board;
mod dictionary;
mod error;
mod game;
mod placement;
mod player;
mod tile;

pub use board::{Board, BoardTile, Square, SquareKind, DIM};
pub use dictionary::Dictionary;
pub use error::AdmissionError;
pub use game::{Game, Outgoing, Recipient, MAX_SEATED};
pub use placement::PlacementOutcome;
pub use player::PlayerState;
pub use tile::{Tile, TileBag, TOTAL_TILES};
