mod config;
mod engine_thread;
mod front;
mod transport;

use clap::Parser;
use config::ServerConfig;
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordbase_engine::{Dictionary, Game};

#[derive(Parser, Debug)]
#[command(about = "Authoritative server for a networked crossword-tile board game")]
struct Cli {
    /// Address to bind; overrides the config overlay's `bind`.
    #[arg(long)]
    bind: Option<String>,
    /// Port to bind; overrides the config overlay's `port`.
    #[arg(long)]
    port: Option<u16>,
    /// Path to the newline-delimited word list.
    #[arg(long)]
    dictionary: Option<String>,
    /// Optional JSON file overlaying bind/port/dictionary/max_players.
    #[arg(long)]
    config: Option<String>,
}

/// Sets up structured tracing, parses CLI flags and an optional config
/// overlay, loads the dictionary, then runs the engine and accept loop
/// until the listener stops producing connections.
fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => match config::load_overlay(path) {
            Ok(c) => c,
            Err(message) => {
                tracing::error!(message, "Failed to load config overlay.");
                panic!("Failed to load config overlay: {}", message);
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        cfg.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(dictionary) = cli.dictionary {
        cfg.dictionary = dictionary;
    }

    if cfg.dictionary.is_empty() {
        tracing::error!("No dictionary path given (use --dictionary or a config overlay).");
        panic!("No dictionary path given.");
    }

    let dictionary = match Dictionary::load_from_path(&cfg.dictionary) {
        Ok(d) => d,
        Err(err) => {
            tracing::error!(?err, path = %cfg.dictionary, "Failed to load dictionary.");
            panic!("Failed to load dictionary: {}", err);
        }
    };
    tracing::info!(word_count = dictionary.len(), "Dictionary loaded.");

    let game = Game::with_seat_cap(Arc::new(dictionary), cfg.max_players as usize);

    let (requests_tx, requests_rx) = mpsc::channel();
    let engine_handle = std::thread::Builder::new()
        .name("engine".to_string())
        .spawn(move || engine_thread::run(game, requests_rx))
        .expect("failed to spawn engine thread");

    let bind_addr = format!("{}:{}", cfg.bind, cfg.port);
    let listener = match TcpListener::bind(&bind_addr) {
        Ok(l) => l,
        Err(err) => {
            tracing::error!(?err, address = %bind_addr, "Failed to bind listener.");
            panic!("Failed to bind {}: {}", bind_addr, err);
        }
    };
    tracing::info!(address = %bind_addr, "Server listening.");

    front::accept_loop(listener, requests_tx);

    let _ = engine_handle.join();
}
