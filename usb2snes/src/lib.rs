//! Async client for the USB2SNES device-control protocol.
//!
//! A USB2SNES daemon (QUsb2Snes, usb2snes) bridges a WebSocket to an SD2SNES
//! cartridge's filesystem. This crate speaks its JSON command protocol:
//! device discovery and attachment, directory listings, file uploads and
//! booting ROMs.
//!
//! # Quick start
//!
//! ```no_run
//! use usb2snes::{Client, WsTransport};
//!
//! # async fn run() -> usb2snes::Result<()> {
//! let transport = WsTransport::connect(usb2snes::DEFAULT_ADDRESS).await?;
//! let mut client = Client::new(transport);
//!
//! let device = client.find_and_attach_device().await?;
//! client.put_file("game.sfc", "/games/game.sfc").await?;
//! if client.file_exists("/games/game.sfc").await? {
//!     client.boot("/games/game.sfc").await?;
//! }
//! # let _ = device;
//! # Ok(())
//! # }
//! ```
//!
//! The transport and the local file source are traits ([`Transport`],
//! [`LocalFiles`]) so the client can be driven by anything that moves
//! frames and bytes.

mod client;
mod connection;
mod error;
mod files;
#[cfg(test)]
mod testing;
mod transport;
mod ws;

pub use client::{Attachment, BLOCK_SIZE, Client, DEVICE_MARKER};
pub use connection::Connection;
pub use error::{Error, Result};
pub use files::{LocalFiles, TokioFs};
pub use transport::{Frame, Transport};
pub use usb2snes_proto::{Listing, Opcode, PathError, RemotePath, path};
pub use ws::{DEFAULT_ADDRESS, WsTransport};
