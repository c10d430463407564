use std::io;

/// Everything that can go wrong turning bytes into a message or back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    Eof,
    #[error("unrecognized tag byte {0:#04x}")]
    UnknownTag(u8),
    #[error("string was not valid utf-8")]
    InvalidUtf8,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ProtocolError {
    /// EOF on the very first byte of a message is an ordinary disconnect,
    /// not a protocol violation; callers use this to decide whether to log
    /// at `warn` or let the reader loop simply return.
    pub fn is_clean_disconnect(&self) -> bool {
        matches!(self, ProtocolError::Eof)
            || matches!(self, ProtocolError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}
