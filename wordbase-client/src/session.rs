//! The client-side mirror of server state: a pure projection of
//! `ServerMessage`s into local bookkeeping, plus the human-readable text
//! each message implies for a view to display.
//!
//! Grounded on `pyscrabble/client.py`'s `Handler._mappings` dispatch table:
//! each arm below corresponds to one of that table's handler classes, and
//! the returned strings are carried over verbatim ("has joined", "has
//! left", "Your turn!"/"{name}'s turn!", "Game over!").

use std::collections::HashMap;
use wordbase_protocol::{FinalScore, RackTile, ServerMessage};

/// One seat as mirrored locally: enough to render a lobby/scoreboard, not
/// the authoritative state itself.
#[derive(Debug, Clone)]
pub struct LocalClient {
    pub id: u8,
    pub name: String,
    pub ready: bool,
    pub score: i16,
    pub tile_count: Option<u8>,
}

/// Committed tiles as mirrored locally, keyed by board position.
#[derive(Debug, Clone, Default)]
pub struct LocalBoard {
    pub tiles: HashMap<u8, (u8, char)>,
}

#[derive(Debug, Clone)]
pub struct LocalGame {
    pub self_id: Option<u8>,
    pub clients: HashMap<u8, LocalClient>,
    pub board: LocalBoard,
    pub lobby: bool,
    pub turn_player_id: Option<u8>,
    pub tiles_left: Option<u8>,
    pub rack: Vec<RackTile>,
    pub final_scores: Vec<FinalScore>,
}

impl Default for LocalGame {
    fn default() -> Self {
        LocalGame {
            self_id: None,
            clients: HashMap::new(),
            board: LocalBoard::default(),
            lobby: true,
            turn_player_id: None,
            tiles_left: None,
            rack: Vec::new(),
            final_scores: Vec::new(),
        }
    }
}

impl LocalGame {
    pub fn new() -> Self {
        LocalGame::default()
    }

    pub fn is_my_turn(&self) -> bool {
        self.self_id.is_some() && self.turn_player_id == self.self_id
    }
}

/// A `Session` owns the mirrored state and exposes the same shape the
/// original client's `Connection`/`Game` pair did: `start`/`send`/`stop`
/// live in `connection.rs`, this type is just the `apply()` projection the
/// consumer thread drives.
pub struct Session {
    pub game: LocalGame,
}

impl Session {
    pub fn new() -> Self {
        Session { game: LocalGame::new() }
    }

    /// Applies one server message, mutating `self.game`, and returns the
    /// text a view should display alongside it (`None` for messages with
    /// no user-facing text, matching the original's unmapped/no-return
    /// handlers).
    pub fn apply(&mut self, msg: &ServerMessage) -> Option<String> {
        apply(&mut self.game, msg)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

fn apply(game: &mut LocalGame, msg: &ServerMessage) -> Option<String> {
    match msg {
        ServerMessage::JoinOk { self_id, players } => {
            game.self_id = Some(*self_id);
            for p in players {
                game.clients.insert(
                    p.id,
                    LocalClient {
                        id: p.id,
                        name: p.name.clone(),
                        ready: p.ready,
                        score: 0,
                        tile_count: None,
                    },
                );
            }
            None
        }
        ServerMessage::ActionRejected { reason } => Some(reason.clone()),
        ServerMessage::PlayerJoined { id, name } => {
            game.clients.insert(
                *id,
                LocalClient {
                    id: *id,
                    name: name.clone(),
                    ready: false,
                    score: 0,
                    tile_count: None,
                },
            );
            Some(format!("{} has joined", name))
        }
        ServerMessage::PlayerLeft { id } => {
            let removed = game.clients.remove(id);
            if game.clients.len() == 1 {
                game.lobby = true;
            }
            removed.map(|c| format!("{} has left", c.name))
        }
        ServerMessage::PlayerReady { id } => {
            if let Some(client) = game.clients.get_mut(id) {
                client.ready = !client.ready;
            }
            None
        }
        ServerMessage::StartTurn {
            turn_id,
            tiles_left,
            rack,
            tile_counts,
        } => {
            if game.lobby {
                game.lobby = false;
                game.board = LocalBoard::default();
                for client in game.clients.values_mut() {
                    client.score = 0;
                }
            }
            game.turn_player_id = Some(*turn_id);
            game.tiles_left = Some(*tiles_left);
            game.rack = rack.clone();
            for count in tile_counts {
                if let Some(client) = game.clients.get_mut(&count.id) {
                    client.tile_count = Some(count.tile_count);
                }
            }
            let turn_name = game.clients.get(turn_id).map(|c| c.name.clone()).unwrap_or_default();
            if game.is_my_turn() {
                Some("Your turn!".to_string())
            } else {
                Some(format!("{}'s turn!", turn_name))
            }
        }
        ServerMessage::EndTurn { id, score, placed } => {
            if let Some(client) = game.clients.get_mut(id) {
                client.score = *score;
            }
            for tile in placed {
                game.board.tiles.insert(tile.position, (tile.points, tile.letter));
            }
            None
        }
        ServerMessage::EndGame { players } => {
            game.lobby = true;
            for client in game.clients.values_mut() {
                client.ready = false;
            }
            game.final_scores = players.clone();
            Some("Game over!".to_string())
        }
        // Unmapped in the original dispatch table — a disconnect and an
        // explicit Shutdown both carry no display text of their own.
        ServerMessage::Shutdown => None,
        ServerMessage::PlayerChat { id, text } => {
            let name = game.clients.get(id).map(|c| c.name.clone()).unwrap_or_default();
            Some(format!("{}: {}", name, text))
        }
        ServerMessage::Notification { text } => Some(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbase_protocol::PlayerSummary;

    #[test]
    fn join_ok_seats_self_and_others() {
        let mut session = Session::new();
        let text = session.apply(&ServerMessage::JoinOk {
            self_id: 1,
            players: vec![
                PlayerSummary { id: 0, ready: false, name: "Ada".into() },
                PlayerSummary { id: 1, ready: false, name: "Lin".into() },
            ],
        });
        assert_eq!(text, None);
        assert_eq!(session.game.self_id, Some(1));
        assert_eq!(session.game.clients.len(), 2);
    }

    #[test]
    fn player_left_reopens_lobby_at_one_remaining() {
        let mut session = Session::new();
        session.apply(&ServerMessage::JoinOk {
            self_id: 0,
            players: vec![
                PlayerSummary { id: 0, ready: false, name: "Ada".into() },
                PlayerSummary { id: 1, ready: false, name: "Lin".into() },
            ],
        });
        session.game.lobby = false;
        let text = session.apply(&ServerMessage::PlayerLeft { id: 1 });
        assert_eq!(text, Some("Lin has left".to_string()));
        assert!(session.game.lobby);
    }

    #[test]
    fn start_turn_reports_own_vs_other_turn() {
        let mut session = Session::new();
        session.apply(&ServerMessage::JoinOk {
            self_id: 0,
            players: vec![
                PlayerSummary { id: 0, ready: false, name: "Ada".into() },
                PlayerSummary { id: 1, ready: false, name: "Lin".into() },
            ],
        });
        let own_turn = session.apply(&ServerMessage::StartTurn {
            turn_id: 0,
            tiles_left: 84,
            rack: vec![],
            tile_counts: vec![],
        });
        assert_eq!(own_turn, Some("Your turn!".to_string()));

        let other_turn = session.apply(&ServerMessage::StartTurn {
            turn_id: 1,
            tiles_left: 84,
            rack: vec![],
            tile_counts: vec![],
        });
        assert_eq!(other_turn, Some("Lin's turn!".to_string()));
    }

    #[test]
    fn action_rejected_surfaces_its_reason() {
        let mut session = Session::new();
        let text = session.apply(&ServerMessage::ActionRejected {
            reason: "Not player's turn!".to_string(),
        });
        assert_eq!(text, Some("Not player's turn!".to_string()));
    }
}
