//! Wire tag constants, one per message kind.
//!
//! Client-to-server tags occupy `0x00..=0x05`; server-to-client tags occupy
//! `0x06..=0x10`. A reader on either side rejects a tag from the wrong range.

pub const JOIN: u8 = 0x00;
pub const READY: u8 = 0x01;
pub const LEAVE: u8 = 0x02;
pub const TILE_EXCHANGE: u8 = 0x03;
pub const PLACE_TILES: u8 = 0x04;
pub const CHAT: u8 = 0x05;

pub const JOIN_OK: u8 = 0x06;
pub const ACTION_REJECTED: u8 = 0x07;
pub const PLAYER_JOINED: u8 = 0x08;
pub const PLAYER_LEFT: u8 = 0x09;
pub const PLAYER_READY: u8 = 0x0A;
pub const START_TURN: u8 = 0x0B;
pub const END_TURN: u8 = 0x0C;
pub const END_GAME: u8 = 0x0D;
pub const SHUTDOWN: u8 = 0x0E;
pub const PLAYER_CHAT: u8 = 0x0F;
pub const NOTIFICATION: u8 = 0x10;

/// True for any tag a server-side reader is allowed to accept.
pub fn is_client_tag(tag: u8) -> bool {
    (JOIN..=CHAT).contains(&tag)
}

/// True for any tag a client-side reader is allowed to accept.
pub fn is_server_tag(tag: u8) -> bool {
    (JOIN_OK..=NOTIFICATION).contains(&tag)
}
