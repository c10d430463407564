//! Blocking socket transport for the client session: a reader thread, a
//! writer thread, and a consumer thread that drives [`Session::apply`].
//!
//! Mirrors `wordbase_server::transport` on the other end of the wire, and
//! `pyscrabble/client.py::Connection`'s three-thread shape (`listen_incoming`,
//! `listen_outgoing`, `process_incoming_messages`).

use crate::session::Session;
use std::io::Write;
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use wordbase_protocol::{ClientMessage, ServerMessage};

/// What the writer thread's channel actually carries. `Close` is the
/// sentinel `stop()` posts after `Leave` — it is never put on the wire,
/// it just tells the writer to shut the socket down and return, which in
/// turn unblocks the reader thread blocked on that same socket.
enum WriterCommand {
    Send(ClientMessage),
    Close,
}

pub struct Connection {
    outbound: Option<Sender<WriterCommand>>,
    session: Arc<Mutex<Session>>,
}

impl Connection {
    pub fn new() -> Self {
        Connection {
            outbound: None,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub fn session(&self) -> Arc<Mutex<Session>> {
        self.session.clone()
    }

    /// Connects, queues the initial `Join`, and spawns the reader, writer,
    /// and consumer threads. `on_update` runs on the consumer thread for
    /// every server message, in arrival order, mirroring the original's
    /// `game.on_update(msg, text)` call from inside `Handler.handle`.
    pub fn start(
        &mut self,
        host: &str,
        port: u16,
        name: &str,
        on_update: impl Fn(&ServerMessage, Option<&str>) + Send + 'static,
    ) -> std::io::Result<()> {
        let stream = TcpStream::connect((host, port))?;
        let reader_stream = stream.try_clone()?;
        let writer_stream = stream;

        let (out_tx, out_rx) = mpsc::channel::<WriterCommand>();
        let (in_tx, in_rx) = mpsc::channel::<ServerMessage>();

        out_tx
            .send(WriterCommand::Send(ClientMessage::Join {
                name: name.to_string(),
            }))
            .expect("outbound channel just created, receiver not yet dropped");

        std::thread::Builder::new()
            .name("client-writer".to_string())
            .spawn(move || write_loop(writer_stream, out_rx))
            .expect("failed to spawn writer thread");

        std::thread::Builder::new()
            .name("client-reader".to_string())
            .spawn(move || read_loop(reader_stream, in_tx))
            .expect("failed to spawn reader thread");

        let session = self.session.clone();
        std::thread::Builder::new()
            .name("client-consumer".to_string())
            .spawn(move || consume_loop(session, in_rx, on_update))
            .expect("failed to spawn consumer thread");

        self.outbound = Some(out_tx);
        Ok(())
    }

    pub fn send(&self, msg: ClientMessage) {
        if let Some(outbound) = &self.outbound {
            let _ = outbound.send(WriterCommand::Send(msg));
        }
    }

    /// Queues `Leave`, then the internal `Close` sentinel. The writer
    /// drains `Leave` onto the wire, then shuts the socket down on
    /// `Close` and returns; that shutdown is what unblocks the reader
    /// thread, which is otherwise parked in a blocking `read_exact` on
    /// the same socket with nothing more coming from the server.
    pub fn stop(&self) {
        self.send(ClientMessage::Leave);
        if let Some(outbound) = &self.outbound {
            let _ = outbound.send(WriterCommand::Close);
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Connection::new()
    }
}

fn write_loop(mut stream: TcpStream, outbound: Receiver<WriterCommand>) {
    while let Ok(cmd) = outbound.recv() {
        match cmd {
            WriterCommand::Send(msg) => {
                let mut buf = Vec::new();
                msg.encode(&mut buf);
                if let Err(err) = stream.write_all(&buf) {
                    tracing::warn!(?err, "Error writing to server, stopping writer.");
                    return;
                }
            }
            WriterCommand::Close => {
                let _ = stream.shutdown(std::net::Shutdown::Both);
                return;
            }
        }
    }
}

fn read_loop(mut stream: TcpStream, inbound: Sender<ServerMessage>) {
    loop {
        match ServerMessage::decode(&mut stream) {
            Ok(msg) => {
                let is_shutdown = matches!(msg, ServerMessage::Shutdown);
                if inbound.send(msg).is_err() {
                    return;
                }
                if is_shutdown {
                    return;
                }
            }
            Err(err) => {
                if err.is_clean_disconnect() {
                    tracing::debug!("Server closed the connection.");
                } else {
                    tracing::warn!(?err, "Protocol error reading from server.");
                }
                return;
            }
        }
    }
}

fn consume_loop(
    session: Arc<Mutex<Session>>,
    inbound: Receiver<ServerMessage>,
    on_update: impl Fn(&ServerMessage, Option<&str>),
) {
    while let Ok(msg) = inbound.recv() {
        let is_shutdown = matches!(msg, ServerMessage::Shutdown);
        let text = {
            let mut session = session.lock().expect("session mutex poisoned");
            session.apply(&msg)
        };
        on_update(&msg, text.as_deref());
        if is_shutdown {
            break;
        }
    }
}
