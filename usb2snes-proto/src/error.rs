//! Errors raised while encoding, decoding or validating protocol values.

use crate::path::PathError;

/// Errors from protocol encoding, decoding and path validation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A remote path does not follow the USB2SNES path dialect.
    #[error("invalid usb2snes path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Which rule it broke.
        reason: PathError,
    },

    /// A frame was not JSON, or lacked the expected fields.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A `List` response did not hold (type, name) pairs.
    #[error("invalid response from usb2snes: got {0} entries, expected an even number of entries")]
    OddListing(usize),
}
