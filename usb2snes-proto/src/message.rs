//! Protocol message types for client↔daemon communication.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address space every request is issued against.
pub const SPACE: &str = "SNES";

/// Operation requested from the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Opcode {
    /// Enumerate the devices the daemon can see.
    DeviceList,
    /// Bind the connection to one device.
    Attach,
    /// List a directory on the device.
    List,
    /// Start a file upload; payload frames follow.
    PutFile,
    /// Boot a file already on the device.
    Boot,
}

impl Opcode {
    /// Wire name of the opcode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceList => "DeviceList",
            Self::Attach => "Attach",
            Self::List => "List",
            Self::PutFile => "PutFile",
            Self::Boot => "Boot",
        }
    }

    /// Returns `true` if the daemon answers this opcode with a `Results` frame.
    ///
    /// `Attach`, `PutFile` and `Boot` are fire-and-forget.
    pub const fn expects_response(self) -> bool {
        matches!(self, Self::DeviceList | Self::List)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command sent from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Request {
    /// Requested operation.
    #[serde(rename = "Opcode")]
    pub opcode: Opcode,
    /// Address space, always [`SPACE`].
    #[serde(rename = "Space")]
    pub space: String,
    /// Unused by this client, always `null` on the wire.
    #[serde(rename = "Flags")]
    pub flags: Option<Vec<String>>,
    /// Positional string arguments.
    #[serde(rename = "Operands")]
    pub operands: Vec<String>,
}

impl Request {
    /// Builds a request for `opcode` with the given operands.
    pub fn new<I, S>(opcode: Opcode, operands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            opcode,
            space: SPACE.to_owned(),
            flags: None,
            operands: operands.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reply sent from daemon to client.
///
/// The meaning of `results` depends on the opcode: device names for
/// [`Opcode::DeviceList`], flattened (type, name) pairs for [`Opcode::List`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Response {
    /// Opcode-specific result strings.
    #[serde(rename = "Results")]
    pub results: Vec<String>,
}
