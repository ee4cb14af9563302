//! JSON frame codec.
//!
//! A request is one JSON object per text frame. Replies are parsed from the
//! raw frame bytes so that text and binary frames are treated alike.

use crate::{Error, Request, Response};

/// Serializes `req` as the text of a single frame.
pub fn encode(req: &Request) -> Result<String, Error> {
    Ok(serde_json::to_string(req)?)
}

/// Parses a reply frame and returns its `Results` sequence.
pub fn decode(frame: &[u8]) -> Result<Vec<String>, Error> {
    let resp: Response = serde_json::from_slice(frame)?;
    Ok(resp.results)
}
