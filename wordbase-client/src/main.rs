//! A headless demo binary: joins a server, prints every update to stdout
//! via `tracing`, and accepts a few lines of stdin to exercise `Ready`,
//! `Chat`, and `Leave` without a GUI.

use clap::Parser;
use std::io::BufRead;
use wordbase_client::Connection;
use wordbase_protocol::ClientMessage;

#[derive(Parser, Debug)]
#[command(about = "Headless demo client for a crossword-tile board game server")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long)]
    name: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_names(true)
        .init();

    let cli = Cli::parse();
    let mut connection = Connection::new();

    let connected = connection.start(&cli.host, cli.port, &cli.name, |msg, text| {
        match text {
            Some(text) => tracing::info!(?msg, text, "update"),
            None => tracing::info!(?msg, "update"),
        }
    });
    if let Err(err) = connected {
        tracing::error!(?err, host = %cli.host, port = cli.port, "Failed to connect.");
        return;
    }
    tracing::info!(host = %cli.host, port = cli.port, name = %cli.name, "Connected, joining.");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        match line {
            "ready" => connection.send(ClientMessage::Ready),
            "quit" | "leave" => {
                connection.stop();
                break;
            }
            _ => {
                if let Some(text) = line.strip_prefix("chat ") {
                    connection.send(ClientMessage::Chat { text: text.to_string() });
                } else if !line.is_empty() {
                    tracing::warn!(%line, "Unrecognized command (try: ready, chat <text>, leave)");
                }
            }
        }
    }
}
