/// Rejections raised at connection admission time, before a client is
/// seated. Unlike in-game rejections these always end in the connection
/// being closed, so they carry no other payload.
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum AdmissionError {
    #[error("Server is full")]
    ServerFull,
    #[error("Game in progress")]
    GameInProgress,
}
