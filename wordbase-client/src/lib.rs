//! The client-side session: a mirror of server state plus the blocking
//! transport that keeps it in sync. No rendering.

pub mod connection;
pub mod session;

pub use connection::Connection;
pub use session::{LocalBoard, LocalClient, LocalGame, Session};
