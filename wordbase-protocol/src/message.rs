//! The message taxonomy and its `encode`/`decode` pair.
//!
//! Every message is a tag byte followed by a type-specific payload; there is
//! no outer frame length because each payload is self-delimiting (every
//! variable-length field carries its own length prefix).

use crate::error::ProtocolError;
use crate::tags;
use crate::wire::*;
use std::io::Read;

/// One rack slot offered to a player at the start of their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackTile {
    pub tile_id: u8,
    pub points: u8,
    pub letter: Option<char>,
}

/// A placement submitted by the client: board position plus the tile being
/// placed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePlacement {
    pub position: u8,
    pub tile_id: u8,
    pub letter: Option<char>,
}

/// A tile as it appears committed on the board after a turn, echoed back in
/// `EndTurn`. Unlike `TilePlacement`, the letter is always present here —
/// a committed tile can never be an unassigned blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTile {
    pub position: u8,
    pub points: u8,
    pub letter: char,
}

/// One seat's identity and readiness, as sent in `JoinOk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub id: u8,
    pub ready: bool,
    pub name: String,
}

/// One player's remaining hand size, as sent in `StartTurn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCount {
    pub id: u8,
    pub tile_count: u8,
}

/// One player's final score, as sent in `EndGame`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScore {
    pub id: u8,
    pub score: i16,
}

/// Messages a client may send to the server (tags `0x00..=0x05`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Join { name: String },
    Ready,
    Leave,
    TileExchange { tile_ids: Vec<u8> },
    PlaceTiles { placements: Vec<TilePlacement> },
    Chat { text: String },
}

/// Messages the server may send to a client (tags `0x06..=0x10`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    JoinOk {
        self_id: u8,
        players: Vec<PlayerSummary>,
    },
    ActionRejected {
        reason: String,
    },
    PlayerJoined {
        id: u8,
        name: String,
    },
    PlayerLeft {
        id: u8,
    },
    PlayerReady {
        id: u8,
    },
    StartTurn {
        turn_id: u8,
        tiles_left: u8,
        rack: Vec<RackTile>,
        tile_counts: Vec<TileCount>,
    },
    EndTurn {
        id: u8,
        score: i16,
        placed: Vec<PlacedTile>,
    },
    EndGame {
        players: Vec<FinalScore>,
    },
    Shutdown,
    PlayerChat {
        id: u8,
        text: String,
    },
    Notification {
        text: String,
    },
}

impl ClientMessage {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            ClientMessage::Join { name } => {
                write_u8(buf, tags::JOIN);
                write_str8(buf, name);
            }
            ClientMessage::Ready => write_u8(buf, tags::READY),
            ClientMessage::Leave => write_u8(buf, tags::LEAVE),
            ClientMessage::TileExchange { tile_ids } => {
                write_u8(buf, tags::TILE_EXCHANGE);
                write_u8(buf, tile_ids.len() as u8);
                for id in tile_ids {
                    write_u8(buf, *id);
                }
            }
            ClientMessage::PlaceTiles { placements } => {
                write_u8(buf, tags::PLACE_TILES);
                write_u8(buf, placements.len() as u8);
                for placement in placements {
                    write_u8(buf, placement.position);
                    write_u8(buf, placement.tile_id);
                    write_opt_str(buf, placement.letter);
                }
            }
            ClientMessage::Chat { text } => {
                write_u8(buf, tags::CHAT);
                write_str16(buf, text);
            }
        }
    }

    /// Reads a single tag and dispatches to the matching payload parser.
    /// Returns `Err(UnknownTag)` for any tag outside the client range; the
    /// caller (the frame transport) treats that as a graceful leave.
    pub fn decode(r: &mut impl Read) -> Result<Self, ProtocolError> {
        let tag = read_u8(r)?;
        match tag {
            tags::JOIN => Ok(ClientMessage::Join {
                name: read_str8(r)?,
            }),
            tags::READY => Ok(ClientMessage::Ready),
            tags::LEAVE => Ok(ClientMessage::Leave),
            tags::TILE_EXCHANGE => {
                let n = read_u8(r)? as usize;
                let mut tile_ids = Vec::with_capacity(n);
                for _ in 0..n {
                    tile_ids.push(read_u8(r)?);
                }
                Ok(ClientMessage::TileExchange { tile_ids })
            }
            tags::PLACE_TILES => {
                let n = read_u8(r)? as usize;
                let mut placements = Vec::with_capacity(n);
                for _ in 0..n {
                    let position = read_u8(r)?;
                    let tile_id = read_u8(r)?;
                    let letter = read_opt_str(r)?;
                    placements.push(TilePlacement {
                        position,
                        tile_id,
                        letter,
                    });
                }
                Ok(ClientMessage::PlaceTiles { placements })
            }
            tags::CHAT => Ok(ClientMessage::Chat {
                text: read_str16(r)?,
            }),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

impl ServerMessage {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            ServerMessage::JoinOk { self_id, players } => {
                write_u8(buf, tags::JOIN_OK);
                write_u8(buf, *self_id);
                write_u8(buf, players.len() as u8);
                for p in players {
                    write_u8(buf, p.id);
                    write_u8(buf, p.ready as u8);
                    write_str8(buf, &p.name);
                }
            }
            ServerMessage::ActionRejected { reason } => {
                write_u8(buf, tags::ACTION_REJECTED);
                write_str16(buf, reason);
            }
            ServerMessage::PlayerJoined { id, name } => {
                write_u8(buf, tags::PLAYER_JOINED);
                write_u8(buf, *id);
                write_str8(buf, name);
            }
            ServerMessage::PlayerLeft { id } => {
                write_u8(buf, tags::PLAYER_LEFT);
                write_u8(buf, *id);
            }
            ServerMessage::PlayerReady { id } => {
                write_u8(buf, tags::PLAYER_READY);
                write_u8(buf, *id);
            }
            ServerMessage::StartTurn {
                turn_id,
                tiles_left,
                rack,
                tile_counts,
            } => {
                write_u8(buf, tags::START_TURN);
                write_u8(buf, *turn_id);
                write_u8(buf, *tiles_left);
                write_u8(buf, rack.len() as u8);
                for t in rack {
                    write_u8(buf, t.tile_id);
                    write_u8(buf, t.points);
                    write_opt_str(buf, t.letter);
                }
                write_u8(buf, tile_counts.len() as u8);
                for c in tile_counts {
                    write_u8(buf, c.id);
                    write_u8(buf, c.tile_count);
                }
            }
            ServerMessage::EndTurn { id, score, placed } => {
                write_u8(buf, tags::END_TURN);
                write_u8(buf, *id);
                write_i16(buf, *score);
                write_u8(buf, placed.len() as u8);
                for t in placed {
                    write_u8(buf, t.position);
                    write_u8(buf, t.points);
                    write_str8(buf, &t.letter.to_string());
                }
            }
            ServerMessage::EndGame { players } => {
                write_u8(buf, tags::END_GAME);
                write_u8(buf, players.len() as u8);
                for p in players {
                    write_u8(buf, p.id);
                    write_i16(buf, p.score);
                }
            }
            ServerMessage::Shutdown => write_u8(buf, tags::SHUTDOWN),
            ServerMessage::PlayerChat { id, text } => {
                write_u8(buf, tags::PLAYER_CHAT);
                write_u8(buf, *id);
                write_str16(buf, text);
            }
            ServerMessage::Notification { text } => {
                write_u8(buf, tags::NOTIFICATION);
                write_str16(buf, text);
            }
        }
    }

    pub fn decode(r: &mut impl Read) -> Result<Self, ProtocolError> {
        let tag = read_u8(r)?;
        match tag {
            tags::JOIN_OK => {
                let self_id = read_u8(r)?;
                let n = read_u8(r)? as usize;
                let mut players = Vec::with_capacity(n);
                for _ in 0..n {
                    let id = read_u8(r)?;
                    let ready = read_u8(r)? != 0;
                    let name = read_str8(r)?;
                    players.push(PlayerSummary { id, ready, name });
                }
                Ok(ServerMessage::JoinOk { self_id, players })
            }
            tags::ACTION_REJECTED => Ok(ServerMessage::ActionRejected {
                reason: read_str16(r)?,
            }),
            tags::PLAYER_JOINED => Ok(ServerMessage::PlayerJoined {
                id: read_u8(r)?,
                name: read_str8(r)?,
            }),
            tags::PLAYER_LEFT => Ok(ServerMessage::PlayerLeft { id: read_u8(r)? }),
            tags::PLAYER_READY => Ok(ServerMessage::PlayerReady { id: read_u8(r)? }),
            tags::START_TURN => {
                let turn_id = read_u8(r)?;
                let tiles_left = read_u8(r)?;
                let n = read_u8(r)? as usize;
                let mut rack = Vec::with_capacity(n);
                for _ in 0..n {
                    let tile_id = read_u8(r)?;
                    let points = read_u8(r)?;
                    let letter = read_opt_str(r)?;
                    rack.push(RackTile {
                        tile_id,
                        points,
                        letter,
                    });
                }
                let m = read_u8(r)? as usize;
                let mut tile_counts = Vec::with_capacity(m);
                for _ in 0..m {
                    let id = read_u8(r)?;
                    let tile_count = read_u8(r)?;
                    tile_counts.push(TileCount { id, tile_count });
                }
                Ok(ServerMessage::StartTurn {
                    turn_id,
                    tiles_left,
                    rack,
                    tile_counts,
                })
            }
            tags::END_TURN => {
                let id = read_u8(r)?;
                let score = read_i16(r)?;
                let n = read_u8(r)? as usize;
                let mut placed = Vec::with_capacity(n);
                for _ in 0..n {
                    let position = read_u8(r)?;
                    let points = read_u8(r)?;
                    let letter_str = read_str8(r)?;
                    let letter = letter_str.chars().next().ok_or(ProtocolError::InvalidUtf8)?;
                    placed.push(PlacedTile {
                        position,
                        points,
                        letter,
                    });
                }
                Ok(ServerMessage::EndTurn { id, score, placed })
            }
            tags::END_GAME => {
                let n = read_u8(r)? as usize;
                let mut players = Vec::with_capacity(n);
                for _ in 0..n {
                    let id = read_u8(r)?;
                    let score = read_i16(r)?;
                    players.push(FinalScore { id, score });
                }
                Ok(ServerMessage::EndGame { players })
            }
            tags::SHUTDOWN => Ok(ServerMessage::Shutdown),
            tags::PLAYER_CHAT => Ok(ServerMessage::PlayerChat {
                id: read_u8(r)?,
                text: read_str16(r)?,
            }),
            tags::NOTIFICATION => Ok(ServerMessage::Notification {
                text: read_str16(r)?,
            }),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_client(msg: ClientMessage) {
        let mut buf = Vec::new();
        msg.encode(&mut buf);
        let decoded = ClientMessage::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(msg, decoded);
    }

    fn roundtrip_server(msg: ServerMessage) {
        let mut buf = Vec::new();
        msg.encode(&mut buf);
        let decoded = ServerMessage::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn join_roundtrips() {
        roundtrip_client(ClientMessage::Join {
            name: "Ada".to_string(),
        });
    }

    #[test]
    fn place_tiles_with_blank_roundtrips() {
        roundtrip_client(ClientMessage::PlaceTiles {
            placements: vec![
                TilePlacement {
                    position: 112,
                    tile_id: 4,
                    letter: Some('A'),
                },
                TilePlacement {
                    position: 113,
                    tile_id: 99,
                    letter: None,
                },
            ],
        });
    }

    #[test]
    fn start_turn_roundtrips() {
        roundtrip_server(ServerMessage::StartTurn {
            turn_id: 2,
            tiles_left: 84,
            rack: vec![RackTile {
                tile_id: 7,
                points: 1,
                letter: Some('E'),
            }],
            tile_counts: vec![TileCount {
                id: 0,
                tile_count: 7,
            }],
        });
    }

    #[test]
    fn end_game_negative_score_roundtrips() {
        roundtrip_server(ServerMessage::EndGame {
            players: vec![FinalScore { id: 1, score: -12 }],
        });
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes = [0xFFu8];
        let err = ClientMessage::decode(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownTag(0xFF)));
    }

    #[test]
    fn eof_on_empty_stream_is_clean_disconnect() {
        let bytes: [u8; 0] = [];
        let err = ClientMessage::decode(&mut &bytes[..]).unwrap_err();
        assert!(err.is_clean_disconnect());
    }
}
