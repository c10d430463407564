//! The single consumer thread that owns `Game` outright and serializes
//! every admission decision and handler dispatch through one channel.
//!
//! One consumer, no separate mutex: the thread just blocks on `recv()`
//! between messages and mutates `Game` directly, since nothing else ever
//! touches it concurrently.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use wordbase_engine::{AdmissionError, Game, Outgoing, Recipient};
use wordbase_protocol::{ClientMessage, ServerMessage};

/// Everything that reaches the engine: new-connection admission, a
/// decoded client message, a reader-thread disconnect, or the shutdown
/// sentinel. All four funnel through the same channel so the engine never
/// observes two of them interleaved.
pub enum EngineRequest {
    Admit {
        name: String,
        outbound: Sender<ServerMessage>,
        reply: Sender<Result<u8, AdmissionError>>,
    },
    Message(u8, ClientMessage),
    Disconnected(u8),
    Shutdown,
}

/// Runs until `EngineRequest::Shutdown` arrives or the channel closes.
pub fn run(mut game: Game, requests: Receiver<EngineRequest>) {
    let mut outbound_senders: HashMap<u8, Sender<ServerMessage>> = HashMap::new();

    while let Ok(request) = requests.recv() {
        match request {
            EngineRequest::Admit { name, outbound, reply } => {
                let outcome = game.admit(name);
                match outcome {
                    Ok((id, outgoing)) => {
                        outbound_senders.insert(id, outbound);
                        dispatch(&outbound_senders, outgoing);
                        let _ = reply.send(Ok(id));
                    }
                    Err(err) => {
                        tracing::info!(%err, "Rejected admission.");
                        let _ = reply.send(Err(err));
                    }
                }
            }
            EngineRequest::Message(client_id, msg) => {
                tracing::debug!(client_id, ?msg, "Dispatching client message.");
                if matches!(msg, ClientMessage::Leave) {
                    outbound_senders.remove(&client_id);
                }
                let outgoing = game.dispatch(client_id, msg);
                dispatch(&outbound_senders, outgoing);
            }
            EngineRequest::Disconnected(client_id) => {
                tracing::debug!(client_id, "Synthesizing leave for disconnected client.");
                outbound_senders.remove(&client_id);
                let outgoing = game.dispatch(client_id, ClientMessage::Leave);
                dispatch(&outbound_senders, outgoing);
            }
            EngineRequest::Shutdown => {
                tracing::info!("Engine shutting down.");
                let outgoing = game.shutdown_messages();
                dispatch(&outbound_senders, outgoing);
                return;
            }
        }
    }
}

fn dispatch(senders: &HashMap<u8, Sender<ServerMessage>>, outgoing: Vec<Outgoing>) {
    for item in outgoing {
        match item.to {
            Recipient::All => {
                for sender in senders.values() {
                    let _ = sender.send(item.message.clone());
                }
            }
            Recipient::Only(id) => {
                if let Some(sender) = senders.get(&id) {
                    let _ = sender.send(item.message.clone());
                }
            }
            Recipient::AllExcept(id) => {
                for (seat_id, sender) in senders.iter() {
                    if *seat_id != id {
                        let _ = sender.send(item.message.clone());
                    }
                }
            }
        }
    }
}
