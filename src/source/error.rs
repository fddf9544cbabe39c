//! Error types for the event stream.

use thiserror::Error;

/// Errors from the live WebSocket stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Could not establish the connection.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The socket failed after the connection was established.
    #[error("WebSocket protocol error: {0}")]
    Protocol(String),

    /// A frame could not be decoded into an event.
    #[error("Failed to decode frame: {0}")]
    Decode(String),

    /// The server closed the connection.
    #[error("Connection closed by server")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error;
        match err {
            Error::ConnectionClosed | Error::AlreadyClosed => StreamError::Closed,
            other => StreamError::Protocol(other.to_string()),
        }
    }
}
