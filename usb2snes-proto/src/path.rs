//! The USB2SNES remote path dialect.
//!
//! Remote paths are POSIX-like: absolute, `/`-separated, no backslashes, and
//! no trailing `/` except for the root itself.

use std::fmt;

use crate::Error;

/// Rule broken by a rejected remote path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PathError {
    /// The path contains `\`.
    #[error("usb2snes path must not contain \\")]
    Backslash,
    /// The path does not start with `/`.
    #[error("usb2snes path must start with a /")]
    NotAbsolute,
    /// The path ends with `/` and is not the root.
    #[error("usb2snes path must not end with /")]
    TrailingSlash,
}

/// Checks `path` against the remote path dialect.
pub fn check(path: &str) -> Result<(), PathError> {
    if path.contains('\\') {
        return Err(PathError::Backslash);
    }
    if !path.starts_with('/') {
        return Err(PathError::NotAbsolute);
    }
    if path.ends_with('/') && path != "/" {
        return Err(PathError::TrailingSlash);
    }
    Ok(())
}

/// A remote path that has passed [`check`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// The device root, `/`.
    pub fn root() -> Self {
        Self("/".to_owned())
    }

    /// Validates `path`.
    pub fn parse(path: &str) -> Result<Self, Error> {
        check(path).map_err(|reason| Error::InvalidPath {
            path: path.to_owned(),
            reason,
        })?;
        Ok(Self(path.to_owned()))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RemotePath> for String {
    fn from(p: RemotePath) -> Self {
        p.0
    }
}

/// Splits `path` into (directory, base name).
///
/// Follows POSIX `dirname`/`basename` rules: the directory keeps a lone
/// leading `/`, loses any other trailing slashes, and is empty when `path`
/// has no `/` at all.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        None => ("", path),
        Some(i) => {
            let head = &path[..=i];
            let tail = &path[i + 1..];
            let trimmed = head.trim_end_matches('/');
            if trimmed.is_empty() {
                (head, tail)
            } else {
                (trimmed, tail)
            }
        }
    }
}

/// Joins a remote directory and a file name with exactly one `/`.
///
/// An absolute `name` replaces `dir`.
pub fn join(dir: &str, name: &str) -> String {
    if name.starts_with('/') || dir.is_empty() {
        name.to_owned()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
