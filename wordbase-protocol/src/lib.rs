//! The wire codec: tag constants, primitive encodings, and the
//! `ClientMessage`/`ServerMessage` pair that make up the full message
//! taxonomy exchanged between server and client.

pub mod error;
pub mod message;
pub mod tags;
pub mod wire;

pub use error::ProtocolError;
pub use message::{
    ClientMessage, FinalScore, PlacedTile, PlayerSummary, RackTile, ServerMessage, TileCount,
    TilePlacement,
};

/// Board dimension; both axes of the 15x15 grid.
pub const BOARD_SIZE: u8 = 15;

/// Splits a wire `position` byte into `(row, col)`.
pub fn position_to_row_col(position: u8) -> (u8, u8) {
    (position / BOARD_SIZE, position % BOARD_SIZE)
}

/// Packs `(row, col)` into the wire `position` byte.
pub fn row_col_to_position(row: u8, col: u8) -> u8 {
    row * BOARD_SIZE + col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_roundtrips() {
        for position in 0..225u8 {
            let (row, col) = position_to_row_col(position);
            assert_eq!(row_col_to_position(row, col), position);
        }
    }
}
