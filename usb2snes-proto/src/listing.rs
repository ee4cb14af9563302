//! Decoding of `List` results into directory entries.

use crate::Error;

/// Type tag the daemon uses for directories; anything else is a file.
pub const DIR_PATH_TYPE: &str = "0";

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
}

impl EntryKind {
    /// Classifies a wire type tag.
    pub fn from_tag(tag: &str) -> Self {
        if tag == DIR_PATH_TYPE {
            Self::Directory
        } else {
            Self::File
        }
    }
}

/// One (type, name) pair from a `List` response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Entry {
    /// Directory or file.
    pub kind: EntryKind,
    /// Base name within the listed directory.
    pub name: String,
}

/// Pairs up a flat `List` result sequence.
///
/// Fails with [`Error::OddListing`] if `results` has an odd length.
pub fn entries(results: Vec<String>) -> Result<Vec<Entry>, Error> {
    if results.len() % 2 != 0 {
        return Err(Error::OddListing(results.len()));
    }
    let mut out = Vec::with_capacity(results.len() / 2);
    let mut it = results.into_iter();
    while let (Some(tag), Some(name)) = (it.next(), it.next()) {
        out.push(Entry {
            kind: EntryKind::from_tag(&tag),
            name,
        });
    }
    Ok(out)
}

/// Directory contents split by kind, each in daemon order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Listing {
    /// Subdirectory names.
    pub dirs: Vec<String>,
    /// File names.
    pub files: Vec<String>,
}

impl FromIterator<Entry> for Listing {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut listing = Self::default();
        for entry in iter {
            match entry.kind {
                EntryKind::Directory => listing.dirs.push(entry.name),
                EntryKind::File => listing.files.push(entry.name),
            }
        }
        listing
    }
}
