use std::fmt;
use std::io;

use thiserror::Error;

/// Errors surfaced by the session, its entity graph and its transport.
///
/// [`ClientError::Codec`] and [`ClientError::Transport`] are terminal for
/// the owning [`crate::session::Session`]; the others are local to the
/// call that raised them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The VM replied with a nonzero error code, or the client observed an
    /// event-kind or value-tag it does not recognise.
    #[error("request failed with code {0}")]
    Request(u16),

    /// Attempted to construct an `Object` from id 0.
    #[error("object id 0 does not name a live object")]
    Void,

    /// Buffer underflow/overflow or malformed wire data: a protocol desync.
    #[error("codec fault: {0}")]
    Codec(io::Error),

    /// The connection was lost, or the handshake failed.
    #[error("transport fault: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::Codec(_) | ClientError::Transport(_))
    }
}

/// An unrecognised wire discriminant (an enum value or a `Tag` byte) the
/// client doesn't know. Carried as the source of an `io::Error` so the
/// `JdwpReadable` impls that hit it can stay on their `io::Result` return
/// type; [`From<io::Error>`] below unwraps it back out into a recoverable
/// [`ClientError::Request`] instead of a terminal [`ClientError::Codec`].
#[derive(Debug)]
pub(crate) struct UnrecognizedDiscriminant(pub u16);

impl fmt::Display for UnrecognizedDiscriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised discriminant {}", self.0)
    }
}

impl std::error::Error for UnrecognizedDiscriminant {}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        match err.get_ref().and_then(|e| e.downcast_ref::<UnrecognizedDiscriminant>()) {
            Some(&UnrecognizedDiscriminant(value)) => ClientError::Request(value),
            None => ClientError::Codec(err),
        }
    }
}
