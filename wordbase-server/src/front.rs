//! The accept loop: one handler thread per socket, performing the join
//! handshake before handing the connection off to [`transport::run_connection`].
//!
//! Grounded on `hand_shake.rs::process_handshake_server/client` — read one
//! framed message, validate under the shared authority (there the room
//! map behind a `Mutex`, here the engine's single channel), then either
//! reject-and-close or register-and-spawn the read/write loops.

use crate::engine_thread::EngineRequest;
use crate::transport;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Sender};
use wordbase_protocol::{ClientMessage, ServerMessage};

/// Accepts connections until the listener errors out (or is closed by
/// dropping it, which happens when `main` returns after a shutdown).
pub fn accept_loop(listener: TcpListener, requests: Sender<EngineRequest>) {
    for incoming in listener.incoming() {
        match incoming {
            Ok(stream) => {
                let requests = requests.clone();
                std::thread::spawn(move || handle_connection(stream, requests));
            }
            Err(err) => {
                tracing::warn!(?err, "Error accepting connection.");
            }
        }
    }
}

fn handle_connection(stream: TcpStream, requests: Sender<EngineRequest>) {
    let peer = stream.peer_addr().ok();
    let mut handshake_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(?peer, ?err, "Failed to clone socket for handshake.");
            return;
        }
    };

    let name = match ClientMessage::decode(&mut handshake_stream) {
        Ok(ClientMessage::Join { name }) => name,
        Ok(_) => {
            tracing::warn!(?peer, "First message from client was not Join, closing.");
            return;
        }
        Err(err) => {
            tracing::warn!(?peer, ?err, "Handshake failed before a Join was read.");
            return;
        }
    };

    let (outbound_tx, outbound_rx) = mpsc::channel::<ServerMessage>();
    let (reply_tx, reply_rx) = mpsc::channel();
    let admit_sent = requests.send(EngineRequest::Admit {
        name: name.clone(),
        outbound: outbound_tx,
        reply: reply_tx,
    });
    if admit_sent.is_err() {
        tracing::warn!(?peer, "Engine is gone, dropping connection before admission.");
        return;
    }

    let client_id = match reply_rx.recv() {
        Ok(Ok(id)) => id,
        Ok(Err(reason)) => {
            tracing::info!(?peer, %name, %reason, "Rejected at admission.");
            let mut rejection = Vec::new();
            ServerMessage::ActionRejected {
                reason: reason.to_string(),
            }
            .encode(&mut rejection);
            let _ = std::io::Write::write_all(&mut handshake_stream, &rejection);
            return;
        }
        Err(_) => {
            tracing::warn!(?peer, "Engine reply channel closed during admission.");
            return;
        }
    };

    tracing::info!(?peer, %name, client_id, "Client admitted.");
    transport::run_connection(client_id, stream, requests, outbound_rx);
}
