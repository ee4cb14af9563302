//! Message-framed duplex channel consumed by the client.

use std::future::Future;
use std::io;

/// One discrete message on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Frame {
    /// A UTF-8 text frame.
    Text(String),
    /// A binary frame.
    Binary(Vec<u8>),
}

impl Frame {
    /// Raw bytes of the frame, regardless of kind.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(t) => t.as_bytes(),
            Self::Binary(b) => b,
        }
    }
}

/// An open, bidirectional, message-framed channel to the daemon.
///
/// Implementations must deliver frames in order. Control traffic such as
/// WebSocket ping/pong is handled below this trait and never surfaces from
/// [`recv`](Self::recv).
pub trait Transport {
    /// Sends a text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = io::Result<()>> + Send;

    /// Sends a binary frame.
    fn send_binary(&mut self, data: Vec<u8>) -> impl Future<Output = io::Result<()>> + Send;

    /// Receives the next data frame, or `None` once the peer has closed.
    fn recv(&mut self) -> impl Future<Output = io::Result<Option<Frame>>> + Send;

    /// Returns `true` while frames can still be exchanged.
    fn is_open(&self) -> bool;
}
