//! Per-connection blocking reader/writer loops and the outbound queue.
//!
//! One thread reads, one thread writes, whichever finishes first ends the
//! connection and the other is joined out. Neither loop ever touches
//! `Game` directly; they only move bytes and messages.

use crate::engine_thread::EngineRequest;
use std::io::Write;
use std::net::TcpStream;
use std::sync::mpsc::{Receiver, Sender};
use wordbase_protocol::{ClientMessage, ServerMessage};

/// Spawns the reader and writer threads for one accepted connection and
/// blocks until both have stopped. Called from the per-connection handler
/// thread spawned by the accept loop, after admission has already
/// assigned `client_id`.
pub fn run_connection(
    client_id: u8,
    stream: TcpStream,
    inbound: Sender<EngineRequest>,
    outbound: Receiver<ServerMessage>,
) {
    let reader_stream = stream.try_clone().expect("TCP stream clone never fails on a live socket");
    let writer_stream = stream;

    let reader = std::thread::Builder::new()
        .name(format!("client-{}-reader", client_id))
        .spawn(move || read_loop(client_id, reader_stream, inbound))
        .expect("failed to spawn reader thread");

    let writer = std::thread::Builder::new()
        .name(format!("client-{}-writer", client_id))
        .spawn(move || write_loop(client_id, writer_stream, outbound))
        .expect("failed to spawn writer thread");

    // Either loop ending means the connection is over; join both so the
    // handler thread doesn't return until the socket is fully quiesced.
    let _ = reader.join();
    let _ = writer.join();
}

fn read_loop(client_id: u8, mut stream: TcpStream, inbound: Sender<EngineRequest>) {
    loop {
        match ClientMessage::decode(&mut stream) {
            Ok(ClientMessage::Join { .. }) => {
                // A second Join on an already-admitted connection is
                // nonsensical; ignore it rather than tearing down the
                // socket over a client bug.
                tracing::warn!(client_id, "Ignoring redundant Join after admission.");
            }
            Ok(ClientMessage::Leave) => {
                let _ = inbound.send(EngineRequest::Message(client_id, ClientMessage::Leave));
                tracing::debug!(client_id, "Client left, stopping reader.");
                let _ = stream.shutdown(std::net::Shutdown::Both);
                return;
            }
            Ok(msg) => {
                if inbound.send(EngineRequest::Message(client_id, msg)).is_err() {
                    tracing::debug!(client_id, "Engine inbound channel closed, stopping reader.");
                    return;
                }
            }
            Err(err) => {
                if err.is_clean_disconnect() {
                    tracing::debug!(client_id, "Client disconnected.");
                } else {
                    tracing::warn!(client_id, ?err, "Protocol error reading from client.");
                }
                let _ = inbound.send(EngineRequest::Disconnected(client_id));
                return;
            }
        }
    }
}

fn write_loop(client_id: u8, mut stream: TcpStream, outbound: Receiver<ServerMessage>) {
    while let Ok(msg) = outbound.recv() {
        let is_shutdown = matches!(msg, ServerMessage::Shutdown);
        let mut buf = Vec::new();
        msg.encode(&mut buf);
        if let Err(err) = stream.write_all(&buf) {
            tracing::warn!(client_id, ?err, "Error writing to client, stopping writer.");
            return;
        }
        if is_shutdown {
            // Sending Shutdown closes the socket. The reader thread holds
            // its own duplicated fd, so dropping this one on scope exit
            // would not by itself send a FIN to the remote client nor
            // unblock our own reader's blocking read on the same socket —
            // an explicit shutdown() is required, as on the client side.
            let _ = stream.shutdown(std::net::Shutdown::Both);
            return;
        }
    }
    tracing::debug!(client_id, "Outbound queue closed, stopping writer.");
}
