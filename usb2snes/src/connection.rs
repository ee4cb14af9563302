//! Request/response engine.
//!
//! The protocol has no request IDs: the next inbound frame is always the
//! reply to the most recent command. [`Connection`] enforces that by
//! tracking whether a reply is outstanding and refusing to interleave.

use std::io;

use usb2snes_proto::{Opcode, Request};

use crate::transport::Transport;
use crate::{Error, Result};

/// Where the connection is in the request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exchange {
    /// No reply outstanding.
    Idle,
    /// A command that expects a `Results` reply has been sent.
    AwaitingResponse(Opcode),
}

/// A transport plus the single-outstanding-request state machine.
#[derive(Debug)]
pub struct Connection<T> {
    /// The framed channel to the daemon.
    transport: T,
    /// Request/response state.
    exchange: Exchange,
}

impl<T: Transport> Connection<T> {
    /// Wraps an open transport.
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            exchange: Exchange::Idle,
        }
    }

    /// Returns `true` while the transport is open.
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Returns `true` if a reply is still expected.
    pub fn is_awaiting_response(&self) -> bool {
        matches!(self.exchange, Exchange::AwaitingResponse(_))
    }

    /// Returns a reference to the underlying transport.
    pub const fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub const fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the connection, returning the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Fails with [`Error::ConnectionClosed`] if the transport is closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.transport.is_open() {
            Ok(())
        } else {
            Err(Error::ConnectionClosed)
        }
    }

    /// Sends one command as a JSON text frame.
    ///
    /// Does not check attachment; that is the caller's job.
    pub async fn send_command(&mut self, opcode: Opcode, operands: &[&str]) -> Result<()> {
        self.ensure_open()?;
        if let Exchange::AwaitingResponse(pending) = self.exchange {
            return Err(Error::RequestPending { pending });
        }

        let text = usb2snes_proto::encode(&Request::new(opcode, operands.iter().copied()))?;
        tracing::debug!(%opcode, operands = operands.len(), "sending command");
        self.transport
            .send_text(text)
            .await
            .map_err(|e| self.lost(e))?;

        if opcode.expects_response() {
            self.exchange = Exchange::AwaitingResponse(opcode);
        }
        Ok(())
    }

    /// Receives the reply to the outstanding command and returns its `Results`.
    pub async fn await_response(&mut self) -> Result<Vec<String>> {
        let Exchange::AwaitingResponse(opcode) = self.exchange else {
            return Err(Error::NoPendingRequest);
        };

        // Stay AwaitingResponse until recv completes: a cancelled wait must
        // not let the next command claim this reply.
        let received = self.transport.recv().await;
        self.exchange = Exchange::Idle;

        let frame = match received {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::warn!(%opcode, "connection closed while awaiting response");
                return Err(Error::ConnectionClosed);
            }
            Err(e) => return Err(self.lost(e)),
        };

        let results = usb2snes_proto::decode(frame.as_bytes())?;
        tracing::debug!(%opcode, results = results.len(), "received response");
        Ok(results)
    }

    /// Sends a command and waits for its reply.
    pub async fn request_response(
        &mut self,
        opcode: Opcode,
        operands: &[&str],
    ) -> Result<Vec<String>> {
        self.send_command(opcode, operands).await?;
        self.await_response().await
    }

    /// Sends one raw payload frame following a `PutFile` command.
    pub async fn send_payload(&mut self, chunk: Vec<u8>) -> io::Result<()> {
        self.transport.send_binary(chunk).await
    }

    /// Classifies a transport failure.
    pub(crate) fn lost(&self, e: io::Error) -> Error {
        if self.transport.is_open() {
            Error::Transport(e)
        } else {
            tracing::warn!(error = %e, "transport dropped");
            Error::ConnectionClosed
        }
    }
}
