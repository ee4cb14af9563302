//! Error types for usb2snes client operations.

use std::io;

use usb2snes_proto::{Opcode, PathError};

/// Alias for `Result<T, usb2snes::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection to the daemon is closed.
    ///
    /// The daemon also closes the connection when asked to list a path that
    /// does not exist; that case is reported here too.
    #[error("socket is closed")]
    ConnectionClosed,

    /// A device operation was issued before attaching.
    #[error("not attached to device")]
    NotAttached,

    /// The client is already attached; re-attaching is unsupported.
    #[error("already attached to {device}")]
    AlreadyAttached {
        /// Device the client is bound to.
        device: String,
    },

    /// `DeviceList` held no SD2SNES device.
    #[error("could not find a usb2snes device, DeviceList returned: {devices:?}")]
    DeviceNotFound {
        /// Raw device names reported by the daemon.
        devices: Vec<String>,
    },

    /// A remote path broke the path dialect. Nothing was sent.
    #[error("invalid usb2snes path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Which rule it broke.
        reason: PathError,
    },

    /// The daemon sent something this client cannot interpret.
    #[error("protocol error")]
    Protocol(#[source] usb2snes_proto::Error),

    /// Bytes streamed for an upload differ from the size declared up front.
    #[error("transferred bytes ({actual}) does not match file size ({expected})")]
    TransferSizeMismatch {
        /// Size declared in the `PutFile` command.
        expected: u64,
        /// Bytes actually sent.
        actual: u64,
    },

    /// A payload frame could not be sent; the remote file is incomplete.
    #[error("upload aborted after {sent} bytes")]
    TransferFailed {
        /// Bytes sent before the failure.
        sent: u64,
        /// Underlying transport error.
        #[source]
        source: io::Error,
    },

    /// A command was issued while the reply to `pending` is still unread.
    #[error("cannot send a command while a {pending} response is pending")]
    RequestPending {
        /// Opcode whose reply is outstanding.
        pending: Opcode,
    },

    /// A reply was awaited with no command outstanding.
    #[error("no request is awaiting a response")]
    NoPendingRequest,

    /// The transport failed while the connection still reports open.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// Local file access failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<usb2snes_proto::Error> for Error {
    fn from(e: usb2snes_proto::Error) -> Self {
        match e {
            usb2snes_proto::Error::InvalidPath { path, reason } => Self::InvalidPath { path, reason },
            other => Self::Protocol(other),
        }
    }
}
