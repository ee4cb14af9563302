//! WebSocket transport built on `tokio-tungstenite`.

use std::io;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::transport::{Frame, Transport};

/// Default address of a locally running daemon.
pub const DEFAULT_ADDRESS: &str = "ws://localhost:8080";

/// A [`Transport`] over a WebSocket connection.
#[derive(Debug)]
pub struct WsTransport<S = MaybeTlsStream<TcpStream>> {
    /// The underlying WebSocket stream.
    stream: WebSocketStream<S>,
    /// Cleared once a close frame, end of stream or error is seen.
    open: bool,
}

impl WsTransport {
    /// Connects to a daemon at `url`, e.g. [`DEFAULT_ADDRESS`].
    pub async fn connect(url: &str) -> io::Result<Self> {
        let (stream, _resp) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(into_io)?;
        tracing::debug!(url, "websocket connected");
        Ok(Self::new(stream))
    }
}

impl<S> WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already-established WebSocket stream.
    pub const fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream, open: true }
    }

    /// Sends a close frame and waits for the close handshake.
    pub async fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(into_io(e)),
        }
    }

    /// Sends one message, marking the transport closed on failure.
    async fn send_message(&mut self, msg: Message) -> io::Result<()> {
        if let Err(e) = self.stream.send(msg).await {
            self.open = false;
            return Err(into_io(e));
        }
        Ok(())
    }
}

impl<S> Transport for WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_text(&mut self, text: String) -> io::Result<()> {
        self.send_message(Message::text(text)).await
    }

    async fn send_binary(&mut self, data: Vec<u8>) -> io::Result<()> {
        self.send_message(Message::binary(data)).await
    }

    async fn recv(&mut self) -> io::Result<Option<Frame>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(t))) => return Ok(Some(Frame::Text(t.to_string()))),
                Some(Ok(Message::Binary(b))) => return Ok(Some(Frame::Binary(b.to_vec()))),
                // Pongs are queued by tungstenite and flushed on the next write.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    self.open = false;
                    return Ok(None);
                }
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    self.open = false;
                    return Ok(None);
                }
                Some(Err(e)) => {
                    self.open = false;
                    return Err(into_io(e));
                }
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Maps a tungstenite error onto `io::Error`, keeping I/O errors intact.
fn into_io(e: WsError) -> io::Error {
    match e {
        WsError::Io(io_err) => io_err,
        closed @ (WsError::ConnectionClosed | WsError::AlreadyClosed) => {
            io::Error::new(io::ErrorKind::NotConnected, closed)
        }
        other => io::Error::other(other),
    }
}
