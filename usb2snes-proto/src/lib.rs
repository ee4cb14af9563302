//! Wire protocol for the USB2SNES device-control daemon.
//!
//! Commands are single JSON objects sent as text frames; structured replies
//! come back as JSON objects carrying a `Results` array of strings. File
//! payloads follow a `PutFile` command as raw binary frames.
//!
//! Nothing in this crate performs I/O. The client lives in the `usb2snes`
//! crate.

mod codec;
mod error;
mod listing;
mod message;
pub mod path;

pub use codec::{decode, encode};
pub use error::Error;
pub use listing::{DIR_PATH_TYPE, Entry, EntryKind, Listing, entries};
pub use message::{Opcode, Request, Response, SPACE};
pub use path::{PathError, RemotePath};
