//! The authoritative game: lobby admission, turn scheduling, and the
//! handler for every client message kind.

use crate::board::Board;
use crate::dictionary::Dictionary;
use crate::error::AdmissionError;
use crate::placement;
use crate::player::PlayerState;
use crate::tile::TileBag;
use rand::Rng;
use std::sync::Arc;
use wordbase_protocol::{
    ClientMessage, FinalScore, PlayerSummary, RackTile, ServerMessage, TileCount, TilePlacement,
};

struct Seat {
    id: u8,
    name: String,
    ready: bool,
    player: Option<PlayerState>,
}

/// Who an outbound message is destined for; the engine never writes to a
/// socket directly, only produces these for the caller to dispatch.
#[derive(Debug, Clone, Copy)]
pub enum Recipient {
    All,
    Only(u8),
    AllExcept(u8),
}

#[derive(Debug, Clone)]
pub struct Outgoing {
    pub to: Recipient,
    pub message: ServerMessage,
}

impl Outgoing {
    fn all(message: ServerMessage) -> Self {
        Outgoing {
            to: Recipient::All,
            message,
        }
    }

    fn only(id: u8, message: ServerMessage) -> Self {
        Outgoing {
            to: Recipient::Only(id),
            message,
        }
    }

    fn all_except(id: u8, message: ServerMessage) -> Self {
        Outgoing {
            to: Recipient::AllExcept(id),
            message,
        }
    }
}

pub struct Game {
    board: Board,
    free_tiles: TileBag,
    clients: Vec<Seat>,
    lobby: bool,
    turn_player_id: Option<u8>,
    turns_without_score: u8,
    dictionary: Arc<Dictionary>,
    max_seated: usize,
}

/// The table's hard seat cap; a game variant with more players than this
/// is out of scope.
pub const MAX_SEATED: usize = 4;

impl Game {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Game::with_seat_cap(dictionary, MAX_SEATED)
    }

    /// As `new`, but with a configurable seat cap (never above
    /// [`MAX_SEATED`]) — the server's `--config` overlay can tighten this
    /// for a smaller table.
    pub fn with_seat_cap(dictionary: Arc<Dictionary>, max_seated: usize) -> Self {
        Game {
            board: Board::new(),
            free_tiles: TileBag::empty(),
            clients: Vec::new(),
            lobby: true,
            turn_player_id: None,
            turns_without_score: 0,
            dictionary,
            max_seated: max_seated.min(MAX_SEATED).max(2),
        }
    }

    pub fn is_lobby(&self) -> bool {
        self.lobby
    }

    pub fn seated_count(&self) -> usize {
        self.clients.len()
    }

    fn lowest_free_id(&self) -> u8 {
        for candidate in 0u16..=255 {
            let candidate = candidate as u8;
            if !self.clients.iter().any(|c| c.id == candidate) {
                return candidate;
            }
        }
        unreachable!("the 4-seat cap is enforced before this is called")
    }

    fn seat_name(&self, id: u8) -> String {
        self.clients
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    /// Dispatches one client message to its handler. `Join` never reaches
    /// here — admission happens before a reader/writer pair exists.
    pub fn dispatch(&mut self, client_id: u8, msg: ClientMessage) -> Vec<Outgoing> {
        match msg {
            ClientMessage::Join { .. } => Vec::new(),
            ClientMessage::Ready => self.handle_ready(client_id),
            ClientMessage::Leave => self.handle_leave(client_id),
            ClientMessage::TileExchange { tile_ids } => {
                self.handle_tile_exchange(client_id, tile_ids)
            }
            ClientMessage::PlaceTiles { placements } => {
                self.handle_place_tiles(client_id, placements)
            }
            ClientMessage::Chat { text } => self.handle_chat(client_id, text),
        }
    }

    /// Admission: takes the new client's name, returns its assigned
    /// id and the messages to send (PlayerJoined to everyone else, JoinOk
    /// to the newcomer).
    pub fn admit(&mut self, name: String) -> Result<(u8, Vec<Outgoing>), AdmissionError> {
        if self.clients.len() >= self.max_seated {
            return Err(AdmissionError::ServerFull);
        }
        if !self.lobby {
            return Err(AdmissionError::GameInProgress);
        }
        let id = self.lowest_free_id();
        let mut outgoing = vec![Outgoing::all_except(
            id,
            ServerMessage::PlayerJoined {
                id,
                name: name.clone(),
            },
        )];
        self.clients.push(Seat {
            id,
            name,
            ready: false,
            player: None,
        });
        let players = self
            .clients
            .iter()
            .map(|c| PlayerSummary {
                id: c.id,
                ready: c.ready,
                name: c.name.clone(),
            })
            .collect();
        outgoing.push(Outgoing::only(id, ServerMessage::JoinOk { self_id: id, players }));
        Ok((id, outgoing))
    }

    fn handle_ready(&mut self, client_id: u8) -> Vec<Outgoing> {
        if !self.lobby {
            return Vec::new();
        }
        let Some(seat) = self.clients.iter_mut().find(|c| c.id == client_id) else {
            return Vec::new();
        };
        seat.ready = !seat.ready;
        let all_ready = self.clients.len() > 1 && self.clients.iter().all(|c| c.ready);
        if all_ready {
            self.start_game()
        } else {
            vec![Outgoing::all(ServerMessage::PlayerReady { id: client_id })]
        }
    }

    fn start_game(&mut self) -> Vec<Outgoing> {
        self.board = Board::new();
        self.free_tiles = TileBag::new_shuffled();
        self.turns_without_score = 0;
        let ids: Vec<u8> = self.clients.iter().map(|c| c.id).collect();
        for id in ids {
            let rack = self.free_tiles.draw(7);
            if let Some(seat) = self.clients.iter_mut().find(|c| c.id == id) {
                seat.ready = false;
                seat.player = Some(PlayerState { score: 0, rack });
            }
        }

        let mut outgoing = vec![Outgoing::all(ServerMessage::Notification {
            text: "Game started!".to_string(),
        })];

        let turn_index = rand::rng().random_range(0..self.clients.len());
        self.turn_player_id = Some(self.clients[turn_index].id);
        let tiles_left = self.free_tiles.len() as u8;
        let tile_counts: Vec<TileCount> = self
            .clients
            .iter()
            .map(|c| TileCount {
                id: c.id,
                tile_count: 7,
            })
            .collect();
        for seat in &self.clients {
            let rack = rack_to_wire(seat.player.as_ref().unwrap());
            outgoing.push(Outgoing::only(
                seat.id,
                ServerMessage::StartTurn {
                    turn_id: self.turn_player_id.unwrap(),
                    tiles_left,
                    rack,
                    tile_counts: tile_counts.clone(),
                },
            ));
        }
        self.lobby = false;
        outgoing
    }

    fn handle_leave(&mut self, client_id: u8) -> Vec<Outgoing> {
        let Some(i) = self.clients.iter().position(|c| c.id == client_id) else {
            return Vec::new();
        };
        let was_turn_holder = self.turn_player_id == Some(client_id);
        let leaver_rack = self.clients[i].player.take().map(|p| p.rack);
        self.clients.remove(i);

        let mut outgoing = vec![Outgoing::all(ServerMessage::PlayerLeft { id: client_id })];

        if self.lobby {
            if self.clients.len() > 1 && self.clients.iter().all(|c| c.ready) {
                outgoing.extend(self.start_game());
            }
            return outgoing;
        }

        if self.clients.len() < 2 {
            outgoing.extend(self.deduct_and_end_game());
            return outgoing;
        }

        if was_turn_holder {
            if let Some(rack) = leaver_rack {
                self.free_tiles.give_back(rack);
            }
            // Reference behavior: the next turn holder is the client now
            // sitting at the leaver's old index, modulo the new seat count
            // — not a "previous index" or any other adjusted formula.
            let next_index = i % self.clients.len();
            self.turn_player_id = Some(self.clients[next_index].id);
            outgoing.extend(self.broadcast_start_turn());
        }
        outgoing
    }

    fn handle_chat(&mut self, client_id: u8, text: String) -> Vec<Outgoing> {
        vec![Outgoing::all(ServerMessage::PlayerChat { id: client_id, text })]
    }

    fn handle_tile_exchange(&mut self, client_id: u8, tile_ids: Vec<u8>) -> Vec<Outgoing> {
        if self.turn_player_id != Some(client_id) {
            return vec![reject(client_id, "Not player's turn!")];
        }
        if self.free_tiles.len() < 7 {
            return vec![reject(client_id, "There are less than 7 tiles left!")];
        }
        if tile_ids.is_empty() {
            return vec![reject(
                client_id,
                "Tile exchange requires at least one selected tile!",
            )];
        }
        let mut unique_ids = tile_ids.clone();
        unique_ids.sort_unstable();
        unique_ids.dedup();
        let seat_index = self.clients.iter().position(|c| c.id == client_id).unwrap();
        let all_owned = unique_ids.len() == tile_ids.len()
            && unique_ids
                .iter()
                .all(|id| self.clients[seat_index].player.as_ref().unwrap().has_tile(*id));
        if !all_owned {
            return vec![reject(client_id, "Selected tiles do not belong to player!")];
        }

        let removed = self.clients[seat_index]
            .player
            .as_mut()
            .unwrap()
            .remove_tiles(&unique_ids);
        let count = removed.len();
        self.free_tiles.give_back(removed);
        let drawn = self.free_tiles.draw(count);
        self.clients[seat_index].player.as_mut().unwrap().add_tiles(drawn);

        let name = self.clients[seat_index].name.clone();
        let mut outgoing = vec![
            Outgoing::all_except(
                client_id,
                ServerMessage::Notification {
                    text: format!("{} exchanged tiles", name),
                },
            ),
            Outgoing::only(
                client_id,
                ServerMessage::Notification {
                    text: "You exchanged tiles".to_string(),
                },
            ),
        ];
        outgoing.extend(self.end_of_scoreless_turn(client_id));
        outgoing
    }

    fn handle_place_tiles(&mut self, client_id: u8, placements: Vec<TilePlacement>) -> Vec<Outgoing> {
        if self.turn_player_id != Some(client_id) {
            return vec![reject(client_id, "Not player's turn!")];
        }

        if placements.is_empty() {
            let name = self.seat_name(client_id);
            let mut outgoing = vec![
                Outgoing::all_except(
                    client_id,
                    ServerMessage::Notification {
                        text: format!("{} skipped", name),
                    },
                ),
                Outgoing::only(
                    client_id,
                    ServerMessage::Notification {
                        text: "You skipped".to_string(),
                    },
                ),
            ];
            outgoing.extend(self.end_of_scoreless_turn(client_id));
            return outgoing;
        }

        let seat_index = self.clients.iter().position(|c| c.id == client_id).unwrap();
        let outcome = {
            let player = self.clients[seat_index].player.as_ref().unwrap();
            placement::validate_and_score(&self.board, player, &placements, &self.dictionary)
        };
        let outcome = match outcome {
            Ok(o) => o,
            Err(reason) => return vec![Outgoing::only(client_id, ServerMessage::ActionRejected { reason })],
        };

        for &(row, col, tile) in &outcome.committed {
            self.board.place(row, col, tile);
        }

        let mut outgoing: Vec<Outgoing> = outcome
            .notifications
            .iter()
            .cloned()
            .map(|text| Outgoing::all(ServerMessage::Notification { text }))
            .collect();

        let placed_count = outcome.placed_tile_ids.len();
        {
            let player = self.clients[seat_index].player.as_mut().unwrap();
            player.score += outcome.score_delta as i16;
            player.remove_tiles(&outcome.placed_tile_ids);
        }
        let new_score = self.clients[seat_index].player.as_ref().unwrap().score;
        outgoing.push(Outgoing::all(ServerMessage::EndTurn {
            id: client_id,
            score: new_score,
            placed: outcome.wire_placed,
        }));
        self.turns_without_score = 0;

        if !self.free_tiles.is_empty() {
            let take = placed_count.min(self.free_tiles.len());
            let drawn = self.free_tiles.draw(take);
            self.clients[seat_index].player.as_mut().unwrap().add_tiles(drawn);
        } else if self.clients[seat_index].player.as_ref().unwrap().rack.is_empty() {
            outgoing.extend(self.played_out_end_game(client_id));
            return outgoing;
        }

        outgoing.extend(self.advance_turn_and_broadcast());
        outgoing
    }

    /// The shared "what happens after a turn that scored nothing" logic,
    /// used by a skip (empty PlaceTiles) and by TileExchange.
    fn end_of_scoreless_turn(&mut self, acted_client_id: u8) -> Vec<Outgoing> {
        if self.turns_without_score == 5 {
            let mut outgoing = vec![Outgoing::all(ServerMessage::Notification {
                text: "6 consecutive scoreless turns have occurred!".to_string(),
            })];
            outgoing.extend(self.deduct_and_end_game());
            outgoing
        } else {
            self.turns_without_score += 1;
            let score = self
                .clients
                .iter()
                .find(|c| c.id == acted_client_id)
                .and_then(|c| c.player.as_ref())
                .map(|p| p.score)
                .unwrap_or(0);
            let mut outgoing = vec![Outgoing::all(ServerMessage::EndTurn {
                id: acted_client_id,
                score,
                placed: Vec::new(),
            })];
            outgoing.extend(self.advance_turn_and_broadcast());
            outgoing
        }
    }

    fn advance_turn_and_broadcast(&mut self) -> Vec<Outgoing> {
        let current_id = self.turn_player_id.unwrap();
        let idx = self.clients.iter().position(|c| c.id == current_id).unwrap();
        let next_idx = (idx + 1) % self.clients.len();
        self.turn_player_id = Some(self.clients[next_idx].id);
        self.broadcast_start_turn()
    }

    fn broadcast_start_turn(&self) -> Vec<Outgoing> {
        let tiles_left = self.free_tiles.len() as u8;
        let tile_counts: Vec<TileCount> = self
            .clients
            .iter()
            .map(|c| TileCount {
                id: c.id,
                tile_count: c.player.as_ref().map(|p| p.rack.len() as u8).unwrap_or(0),
            })
            .collect();
        self.clients
            .iter()
            .map(|seat| {
                let rack = seat
                    .player
                    .as_ref()
                    .map(rack_to_wire)
                    .unwrap_or_default();
                Outgoing::only(
                    seat.id,
                    ServerMessage::StartTurn {
                        turn_id: self.turn_player_id.unwrap(),
                        tiles_left,
                        rack,
                        tile_counts: tile_counts.clone(),
                    },
                )
            })
            .collect()
    }

    /// Deducts each remaining player's rack points and ends the game.
    /// Shared by "fewer than two players remain" (Leave) and "six
    /// consecutive scoreless turns" (end_of_scoreless_turn).
    fn deduct_and_end_game(&mut self) -> Vec<Outgoing> {
        let mut outgoing = Vec::new();
        for seat in &mut self.clients {
            if let Some(player) = seat.player.as_mut() {
                let deduction = player.rack_points();
                outgoing.push(Outgoing::only(
                    seat.id,
                    ServerMessage::Notification {
                        text: format!("Deducted {} points", deduction),
                    },
                ));
                player.score -= deduction;
            }
        }
        outgoing.push(Outgoing::all(ServerMessage::EndGame {
            players: self.final_scores(),
        }));
        self.lobby = true;
        outgoing
    }

    /// Called when the bag is empty and the placing player's rack is now
    /// empty too — transfers everyone else's remaining rack points to
    /// them.
    fn played_out_end_game(&mut self, played_out_id: u8) -> Vec<Outgoing> {
        let name = self.seat_name(played_out_id);
        let mut outgoing = vec![
            Outgoing::all_except(
                played_out_id,
                ServerMessage::Notification {
                    text: format!("{} has played out!", name),
                },
            ),
            Outgoing::only(
                played_out_id,
                ServerMessage::Notification {
                    text: "You have played out!".to_string(),
                },
            ),
        ];
        let mut all_sums = 0i16;
        for seat in &mut self.clients {
            if seat.id == played_out_id {
                continue;
            }
            if let Some(player) = seat.player.as_mut() {
                let deduction = player.rack_points();
                player.score -= deduction;
                all_sums += deduction;
                outgoing.push(Outgoing::only(
                    seat.id,
                    ServerMessage::Notification {
                        text: format!("Deducted {} points", deduction),
                    },
                ));
            }
        }
        if let Some(player) = self
            .clients
            .iter_mut()
            .find(|c| c.id == played_out_id)
            .and_then(|c| c.player.as_mut())
        {
            player.score += all_sums;
        }
        outgoing.push(Outgoing::only(
            played_out_id,
            ServerMessage::Notification {
                text: format!("Awarded {} points", all_sums),
            },
        ));
        outgoing.push(Outgoing::all(ServerMessage::EndGame {
            players: self.final_scores(),
        }));
        self.lobby = true;
        outgoing
    }

    fn final_scores(&self) -> Vec<FinalScore> {
        self.clients
            .iter()
            .filter_map(|c| c.player.as_ref().map(|p| FinalScore { id: c.id, score: p.score }))
            .collect()
    }

    /// Broadcasts `Shutdown` to every seated client. The caller is
    /// responsible for posting the engine's stop sentinel and closing the
    /// listener afterward.
    pub fn shutdown_messages(&self) -> Vec<Outgoing> {
        vec![Outgoing::all(ServerMessage::Shutdown)]
    }
}

fn reject(client_id: u8, reason: &str) -> Outgoing {
    Outgoing::only(
        client_id,
        ServerMessage::ActionRejected {
            reason: reason.to_string(),
        },
    )
}

fn rack_to_wire(player: &PlayerState) -> Vec<RackTile> {
    player
        .rack
        .iter()
        .map(|t| RackTile {
            tile_id: t.id,
            points: t.points,
            letter: t.letter,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_dict(words: &[&str]) -> Game {
        let dictionary = Arc::new(Dictionary::load_from_reader(words.join("\n").as_bytes()).unwrap());
        Game::new(dictionary)
    }

    fn contains_start_turn(outgoing: &[Outgoing]) -> bool {
        outgoing
            .iter()
            .any(|o| matches!(o.message, ServerMessage::StartTurn { .. }))
    }

    #[test]
    fn admission_rejects_a_fifth_client() {
        let mut game = game_with_dict(&[]);
        for i in 0..4 {
            assert!(game.admit(format!("p{i}")).is_ok());
        }
        let err = game.admit("fifth".to_string()).unwrap_err();
        assert!(matches!(err, AdmissionError::ServerFull));
    }

    #[test]
    fn admission_rejects_mid_game() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let (b, _) = game.admit("B".to_string()).unwrap();
        game.dispatch(a, ClientMessage::Ready);
        game.dispatch(b, ClientMessage::Ready);
        assert!(!game.is_lobby());
        let err = game.admit("late".to_string()).unwrap_err();
        assert!(matches!(err, AdmissionError::GameInProgress));
    }

    #[test]
    fn one_ready_client_does_not_start_a_game() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let outgoing = game.dispatch(a, ClientMessage::Ready);
        assert!(game.is_lobby());
        assert!(!contains_start_turn(&outgoing));
    }

    #[test]
    fn two_ready_clients_start_with_eighty_six_tiles_left() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let (b, _) = game.admit("B".to_string()).unwrap();
        game.dispatch(a, ClientMessage::Ready);
        let outgoing = game.dispatch(b, ClientMessage::Ready);
        assert!(!game.is_lobby());
        assert!(outgoing
            .iter()
            .any(|o| matches!(&o.message, ServerMessage::Notification { text } if text == "Game started!")));
        let start_turns: Vec<_> = outgoing
            .iter()
            .filter_map(|o| match &o.message {
                ServerMessage::StartTurn {
                    turn_id, tiles_left, ..
                } => Some((*turn_id, *tiles_left)),
                _ => None,
            })
            .collect();
        assert_eq!(start_turns.len(), 2);
        for (turn_id, tiles_left) in start_turns {
            assert!(turn_id == a || turn_id == b);
            // 100 - 2*7, computed after both initial 7-tile draws.
            assert_eq!(tiles_left, 86);
        }
    }

    #[test]
    fn exchange_with_fewer_than_seven_tiles_left_is_rejected() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let (b, _) = game.admit("B".to_string()).unwrap();
        game.dispatch(a, ClientMessage::Ready);
        game.dispatch(b, ClientMessage::Ready);
        let turn_id = game.turn_player_id.unwrap();
        // Drain the bag below 7 so the next exchange attempt must fail.
        game.free_tiles.draw(game.free_tiles.len() - 3);
        let tile_id = game.clients.iter().find(|c| c.id == turn_id).unwrap().player.as_ref().unwrap().rack[0].id;
        let outgoing = game.dispatch(turn_id, ClientMessage::TileExchange { tile_ids: vec![tile_id] });
        assert_eq!(outgoing.len(), 1);
        match &outgoing[0].message {
            ServerMessage::ActionRejected { reason } => {
                assert_eq!(reason, "There are less than 7 tiles left!");
            }
            other => panic!("expected ActionRejected, got {:?}", other),
        }
    }

    #[test]
    fn six_consecutive_scoreless_turns_end_the_game() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let (b, _) = game.admit("B".to_string()).unwrap();
        game.dispatch(a, ClientMessage::Ready);
        game.dispatch(b, ClientMessage::Ready);

        let mut last_outgoing = Vec::new();
        for _ in 0..6 {
            let turn_id = game.turn_player_id.unwrap();
            last_outgoing = game.dispatch(turn_id, ClientMessage::PlaceTiles { placements: Vec::new() });
        }

        assert!(game.is_lobby());
        assert!(last_outgoing.iter().any(|o| matches!(
            &o.message,
            ServerMessage::Notification { text } if text.contains("consecutive scoreless turns")
        )));
        assert!(last_outgoing
            .iter()
            .any(|o| matches!(o.message, ServerMessage::EndGame { .. })));
    }

    #[test]
    fn leave_below_two_players_ends_the_game_with_rack_deductions() {
        let mut game = game_with_dict(&[]);
        let (a, _) = game.admit("A".to_string()).unwrap();
        let (b, _) = game.admit("B".to_string()).unwrap();
        game.dispatch(a, ClientMessage::Ready);
        game.dispatch(b, ClientMessage::Ready);
        assert!(!game.is_lobby());

        let outgoing = game.dispatch(a, ClientMessage::Leave);
        assert!(game.is_lobby());
        assert!(outgoing
            .iter()
            .any(|o| matches!(o.message, ServerMessage::EndGame { .. })));
    }
}
